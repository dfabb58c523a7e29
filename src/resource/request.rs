//! Single remote read with loading/error state

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::watch;

use crate::models::ApiParams;
use crate::network::ApiClient;
use crate::notify::Notifier;
use crate::resource::state::Resource;

/// Values a resource re-fetches on. Compared element by element.
pub type DependencyKey = Vec<String>;

/// Wraps one endpoint read: `data`, `loading`, `error` and `refetch`.
///
/// Fetches overlap freely, but only the most recently started one may
/// write state; earlier ones still resolve with their own payload.
pub struct RequestResource<T> {
    client: ApiClient,
    endpoint: String,
    params: ApiParams,
    key: DependencyKey,
    notifier: Arc<dyn Notifier>,
    success_message: Option<String>,
    state: watch::Sender<Resource<T>>,
    generation: AtomicU64,
}

impl<T> RequestResource<T>
where
    T: DeserializeOwned + Clone,
{
    /// Build without fetching. Most callers want [`RequestResource::create`].
    pub fn new(
        client: ApiClient,
        endpoint: impl Into<String>,
        params: ApiParams,
        key: DependencyKey,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state, _) = watch::channel(Resource::default());
        RequestResource {
            client,
            endpoint: endpoint.into(),
            params,
            key,
            notifier,
            success_message: None,
            state,
            generation: AtomicU64::new(0),
        }
    }

    /// Build and issue the first fetch.
    pub async fn create(
        client: ApiClient,
        endpoint: impl Into<String>,
        params: ApiParams,
        key: DependencyKey,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let resource = Self::new(client, endpoint, params, key, notifier);
        resource.refetch().await;
        resource
    }

    /// Notify with this text whenever a fetch succeeds
    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    /// Run the fetch again. Never fails: errors end up in `error()` and
    /// the notifier, and the call resolves to `None`.
    pub async fn refetch(&self) -> Option<T> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(Resource::begin);

        let result = self
            .client
            .fetch_envelope::<T>(&self.endpoint, &self.params)
            .await;

        let is_latest = self.generation.load(Ordering::SeqCst) == generation;
        if !is_latest {
            tracing::debug!(endpoint = %self.endpoint, generation, "Discarding stale response");
        }

        match result {
            Ok(data) => {
                if is_latest {
                    self.state.send_modify(|s| s.succeed(data.clone()));
                    if let Some(message) = &self.success_message {
                        self.notifier.notify_success(message);
                    }
                }
                Some(data)
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(endpoint = %self.endpoint, error = %message, "Fetch failed");
                if is_latest {
                    self.state.send_modify(|s| s.fail(message.clone()));
                    self.notifier.notify_error(&message);
                }
                None
            }
        }
    }

    /// Swap params and key; fetch only when the key actually changed.
    /// Returns whether a fetch was issued.
    pub async fn set_dependencies(&mut self, params: ApiParams, key: DependencyKey) -> bool {
        if self.key == key {
            return false;
        }
        self.params = params;
        self.key = key;
        self.refetch().await;
        true
    }

    pub fn data(&self) -> Option<T> {
        self.state.borrow().data.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn snapshot(&self) -> Resource<T> {
        self.state.borrow().clone()
    }

    /// Observe every state transition
    pub fn subscribe(&self) -> watch::Receiver<Resource<T>> {
        self.state.subscribe()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn params(&self) -> &ApiParams {
        &self.params
    }

    pub fn key(&self) -> &[String] {
        &self.key
    }
}
