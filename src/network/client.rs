//! HTTP client wrapper - envelope reads, multipart writes, error normalization

use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::constants::PHOTO_FIELD;
use crate::error::ResourceError;
use crate::models::{ApiParams, Envelope, FormFields, HttpMethod, WriteAck};

/// Handle to the inventory API. Cheap to clone; clones share one
/// connection pool.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        ApiClient {
            http: create_client(config.timeout_secs),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        }
    }

    /// Client with default settings against the given base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let config = ClientConfig {
            api_base_url: base_url.into(),
            ..Default::default()
        };
        Self::new(&config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve an endpoint path against the base URL. Absolute URLs pass
    /// through untouched.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// Build a request with the shared headers applied
    fn build_request(&self, method: HttpMethod, path: &str) -> reqwest::RequestBuilder {
        let url = self.url(path);

        let mut req_builder = match method {
            HttpMethod::GET => self.http.get(&url),
            HttpMethod::POST => self.http.post(&url),
            HttpMethod::PATCH => self.http.patch(&url),
            HttpMethod::DELETE => self.http.delete(&url),
        };

        req_builder = req_builder.header("Accept", "application/json");

        if let Some(token) = &self.auth_token {
            req_builder = req_builder.bearer_auth(token);
        }

        req_builder
    }

    /// GET an endpoint and unwrap its `{success, data, message}` envelope
    pub async fn fetch_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ApiParams,
    ) -> Result<T, ResourceError> {
        let req_builder = self.build_request(HttpMethod::GET, path).query(params);
        let body = self.execute(HttpMethod::GET, path, req_builder).await?;
        parse_envelope(&body)
    }

    /// POST or PATCH a multipart form. Returns the server's message, if any.
    pub async fn submit_form<F: FormFields + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        payload: &F,
    ) -> Result<Option<String>, ResourceError> {
        debug_assert!(method.has_body());
        let form = build_form(payload)?;
        let req_builder = self.build_request(method, path).multipart(form);
        let body = self.execute(method, path, req_builder).await?;
        parse_ack(&body)
    }

    /// DELETE an endpoint. Returns the server's message, if any.
    pub async fn delete(&self, path: &str) -> Result<Option<String>, ResourceError> {
        let req_builder = self.build_request(HttpMethod::DELETE, path);
        let body = self.execute(HttpMethod::DELETE, path, req_builder).await?;
        parse_ack(&body)
    }

    /// Send and read the body; non-2xx becomes an error
    async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        req_builder: reqwest::RequestBuilder,
    ) -> Result<String, ResourceError> {
        let start = Instant::now();
        tracing::debug!(method = method.as_str(), endpoint = %path, "Sending request");

        let resp = req_builder.send().await.map_err(|e| {
            let err = ResourceError::from_reqwest(&e);
            tracing::warn!(
                method = method.as_str(),
                endpoint = %path,
                error = %err,
                "Request failed"
            );
            err
        })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ResourceError::Transport(format!("Error reading body: {}", e)))?;
        let elapsed = start.elapsed().as_millis() as u64;

        tracing::debug!(
            method = method.as_str(),
            endpoint = %path,
            status = status.as_u16(),
            time_ms = elapsed,
            "Request completed"
        );

        if !status.is_success() {
            return Err(match server_message(&body) {
                Some(message) => ResourceError::Application {
                    status: Some(status.as_u16()),
                    message,
                },
                None => ResourceError::Transport(format!(
                    "Request failed with status {}",
                    status.as_u16()
                )),
            });
        }

        Ok(body)
    }
}

/// Encode the set fields of a payload, plus its photo, as multipart.
/// The photo is validated first; a rejected file means no form at all.
pub fn build_form<F: FormFields + ?Sized>(payload: &F) -> Result<Form, ResourceError> {
    let mut form = Form::new();

    for (name, value) in payload.form_fields() {
        if let Some(value) = value {
            form = form.text(name, value);
        }
    }

    if let Some(upload) = payload.photo() {
        upload.validate()?;
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime_type)
            .map_err(|e| ResourceError::Validation(format!("Invalid file type: {}", e)))?;
        form = form.part(PHOTO_FIELD, part);
    }

    Ok(form)
}

/// `message` field of an error body, if the body is JSON and has one
/// Read the envelope loosely, then type `data` only once `success` holds
fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T, ResourceError> {
    let envelope: Envelope<Value> = serde_json::from_str(body).map_err(malformed)?;
    let data = envelope.into_result()?;
    serde_json::from_value(data).map_err(malformed)
}

fn malformed(e: serde_json::Error) -> ResourceError {
    ResourceError::Transport(format!("Malformed response: {}", e))
}

fn server_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<serde_json::Value>(body).ok()?;
    json.get("message")?
        .as_str()
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Writes may answer with nothing, or with `{success?, message?}`
fn parse_ack(body: &str) -> Result<Option<String>, ResourceError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let ack: WriteAck = serde_json::from_str(body).unwrap_or_default();
    if ack.success == Some(false) {
        return Err(ResourceError::application(
            ack.message
                .unwrap_or_else(|| "Request was not successful".to_string()),
        ));
    }
    Ok(ack.message.filter(|m| !m.is_empty()))
}

/// Create an HTTP client with the configured timeout
pub fn create_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SupplierDraft, Upload};

    #[test]
    fn test_url_joins_paths() {
        let client = ApiClient::with_base_url("http://localhost:5000/api/");
        assert_eq!(client.url("/suppliers"), "http://localhost:5000/api/suppliers");
        assert_eq!(client.url("suppliers/3"), "http://localhost:5000/api/suppliers/3");
        assert_eq!(client.url("https://other.host/x"), "https://other.host/x");
    }

    #[test]
    fn test_server_message_extraction() {
        assert_eq!(
            server_message(r#"{"success":false,"message":"Duplicate email"}"#),
            Some("Duplicate email".to_string())
        );
        assert_eq!(server_message("<html>502</html>"), None);
        assert_eq!(server_message(r#"{"message":""}"#), None);
    }

    #[test]
    fn test_failure_message_survives_mistyped_data() {
        let err = parse_envelope::<Vec<i64>>(
            r#"{"success":false,"message":"Report not available","data":{}}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Report not available");

        let err = parse_envelope::<Vec<i64>>(r#"{"success":true,"data":{}}"#).unwrap_err();
        assert!(err.to_string().starts_with("Malformed response"));

        let ids = parse_envelope::<Vec<i64>>(r#"{"success":true,"data":[3,4]}"#).unwrap();
        assert_eq!(ids, vec![3, 4]);
    }

    #[test]
    fn test_parse_ack() {
        assert_eq!(parse_ack("").unwrap(), None);
        assert_eq!(
            parse_ack(r#"{"message":"Saved"}"#).unwrap(),
            Some("Saved".to_string())
        );
        let err = parse_ack(r#"{"success":false,"message":"Duplicate email"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate email");
        // Non-JSON success bodies are accepted
        assert_eq!(parse_ack("OK").unwrap(), None);
    }

    #[test]
    fn test_build_form_rejects_bad_photo() {
        let draft = SupplierDraft {
            name: Some("Acme".into()),
            photo: Some(Upload::new("cv.exe", "application/octet-stream", vec![0u8; 4])),
            ..Default::default()
        };
        assert!(build_form(&draft).unwrap_err().is_validation());
    }
}
