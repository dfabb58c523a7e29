use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::constants::{ALLOWED_IMAGE_TYPES, MAX_UPLOAD_BYTES};
use crate::error::ResourceError;

/// Query parameters of a read, sorted by name
pub type ApiParams = BTreeMap<String, String>;

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    GET,
    POST,
    PATCH,
    DELETE,
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::DELETE => "DELETE",
        }
    }

    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::POST | HttpMethod::PATCH)
    }
}

/// The `{success, data, message}` wrapper every read comes back in
#[derive(Clone, Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, treating `success=false` like any other failure.
    pub fn into_result(self) -> Result<T, ResourceError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(ResourceError::application(
                self.message
                    .unwrap_or_else(|| "Response contained no data".to_string()),
            )),
            (false, _) => Err(ResourceError::application(
                self.message
                    .unwrap_or_else(|| "Request was not successful".to_string()),
            )),
        }
    }
}

/// Optional body of a write response
#[derive(Clone, Debug, Default, Deserialize)]
pub struct WriteAck {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Which list endpoint a collection reads from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    Admin,
    #[default]
    User,
}

impl Scope {
    pub fn from_admin_flag(is_admin: bool) -> Self {
        if is_admin {
            Scope::Admin
        } else {
            Scope::User
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Scope::Admin => "admin",
            Scope::User => "user",
        }
    }
}

/// An image attached to a create/update submission
#[derive(Clone, Debug, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Upload {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reject disallowed types and oversized files before they are sent.
    pub fn validate(&self) -> Result<(), ResourceError> {
        if !ALLOWED_IMAGE_TYPES.contains(&self.mime_type.as_str()) {
            return Err(ResourceError::Validation(format!(
                "Unsupported file type '{}'. Allowed: JPEG, PNG, GIF, WebP",
                self.mime_type
            )));
        }
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ResourceError::Validation(format!(
                "File '{}' is too large ({} bytes, max {} MB)",
                self.file_name,
                self.bytes.len(),
                MAX_UPLOAD_BYTES / (1024 * 1024)
            )));
        }
        Ok(())
    }
}

/// Explicit list of form fields an entity submits.
pub trait FormFields {
    /// Field name and value pairs; `None` values are left out of the form.
    fn form_fields(&self) -> Vec<(&'static str, Option<String>)>;

    fn photo(&self) -> Option<&Upload> {
        None
    }
}

/// A record owned by a collection resource
pub trait Entity: DeserializeOwned + Clone + Send + Sync + 'static {
    type Id: fmt::Display + Send + Sync;
    type Draft: FormFields + Send + Sync;

    fn id(&self) -> Self::Id;
}

/// Supplier record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Create/update payload for a supplier; unset fields are not sent
#[derive(Clone, Debug, Default)]
pub struct SupplierDraft {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub photo: Option<Upload>,
}

impl FormFields for SupplierDraft {
    fn form_fields(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("name", self.name.clone()),
            ("email", self.email.clone()),
            ("phone", self.phone.clone()),
            ("address", self.address.clone()),
            ("category", self.category.clone()),
            ("status", self.status.clone()),
        ]
    }

    fn photo(&self) -> Option<&Upload> {
        self.photo.as_ref()
    }
}

impl Entity for Supplier {
    type Id = i64;
    type Draft = SupplierDraft;

    fn id(&self) -> i64 {
        self.id
    }
}

/// Product record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub supplier_id: Option<i64>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ProductDraft {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<f64>,
    pub supplier_id: Option<i64>,
    pub photo: Option<Upload>,
}

impl FormFields for ProductDraft {
    fn form_fields(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("name", self.name.clone()),
            ("sku", self.sku.clone()),
            ("category", self.category.clone()),
            ("quantity", self.quantity.map(|q| q.to_string())),
            ("price", self.price.map(|p| p.to_string())),
            ("supplier_id", self.supplier_id.map(|id| id.to_string())),
        ]
    }

    fn photo(&self) -> Option<&Upload> {
        self.photo.as_ref()
    }
}

impl Entity for Product {
    type Id = i64;
    type Draft = ProductDraft;

    fn id(&self) -> i64 {
        self.id
    }
}
