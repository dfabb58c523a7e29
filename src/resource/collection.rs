//! Mutable collection backed by list/create/update/delete endpoints
//!
//! Every mutation ends in a full `reload()`; items are never patched in
//! place, and `stats` is only ever computed from a freshly loaded list.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::constants::{
    PRODUCTS_ADMIN_LIST, PRODUCTS_ITEM, PRODUCTS_USER_LIST, SUPPLIERS_ADMIN_LIST,
    SUPPLIERS_ITEM, SUPPLIERS_USER_LIST,
};
use crate::error::ResourceError;
use crate::models::{ApiParams, Entity, HttpMethod, Product, Scope, Supplier};
use crate::network::ApiClient;
use crate::notify::Notifier;

/// Count per category label
pub type DerivedStats = BTreeMap<String, usize>;

/// Turns a collection snapshot into its stats
pub type StatsReducer<T> = Box<dyn Fn(&[T]) -> DerivedStats + Send + Sync>;

/// Label used for records without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Reducer counting items per `key(item)`
pub fn count_by<T, F>(key: F) -> StatsReducer<T>
where
    T: 'static,
    F: Fn(&T) -> String + Send + Sync + 'static,
{
    Box::new(move |items| {
        let mut stats = DerivedStats::new();
        for item in items {
            *stats.entry(key(item)).or_insert(0) += 1;
        }
        stats
    })
}

pub fn supplier_stats() -> StatsReducer<Supplier> {
    count_by(|s: &Supplier| {
        s.category
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED.to_string())
    })
}

pub fn product_stats() -> StatsReducer<Product> {
    count_by(|p: &Product| {
        p.category
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED.to_string())
    })
}

/// Where a collection lives on the API
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionEndpoints {
    /// Singular noun used in notifications, e.g. "Supplier"
    pub label: String,
    pub admin_list: String,
    pub user_list: String,
    /// Base for create (`POST item`) and `item/{id}` update/delete
    pub item: String,
}

impl CollectionEndpoints {
    pub fn new(
        label: impl Into<String>,
        admin_list: impl Into<String>,
        user_list: impl Into<String>,
        item: impl Into<String>,
    ) -> Self {
        CollectionEndpoints {
            label: label.into(),
            admin_list: admin_list.into(),
            user_list: user_list.into(),
            item: item.into(),
        }
    }

    pub fn suppliers() -> Self {
        Self::new(
            "Supplier",
            SUPPLIERS_ADMIN_LIST,
            SUPPLIERS_USER_LIST,
            SUPPLIERS_ITEM,
        )
    }

    pub fn products() -> Self {
        Self::new(
            "Product",
            PRODUCTS_ADMIN_LIST,
            PRODUCTS_USER_LIST,
            PRODUCTS_ITEM,
        )
    }

    pub fn list(&self, scope: Scope) -> &str {
        match scope {
            Scope::Admin => &self.admin_list,
            Scope::User => &self.user_list,
        }
    }

    pub fn item_path(&self, id: &impl fmt::Display) -> String {
        format!("{}/{}", self.item.trim_end_matches('/'), id)
    }
}

/// Observable state of a collection
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub stats: DerivedStats,
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        CollectionState {
            items: Vec::new(),
            loading: false,
            stats: DerivedStats::new(),
        }
    }
}

/// Sole owner of a list of entities, with create/update/delete.
pub struct CollectionResource<T: Entity> {
    client: ApiClient,
    endpoints: CollectionEndpoints,
    scope: Scope,
    reducer: StatsReducer<T>,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<CollectionState<T>>,
    generation: AtomicU64,
}

impl<T: Entity> CollectionResource<T> {
    /// Build without loading
    pub fn new(
        client: ApiClient,
        endpoints: CollectionEndpoints,
        scope: Scope,
        reducer: StatsReducer<T>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state, _) = watch::channel(CollectionState::default());
        CollectionResource {
            client,
            endpoints,
            scope,
            reducer,
            notifier,
            state,
            generation: AtomicU64::new(0),
        }
    }

    /// Build and load the first snapshot
    pub async fn create(
        client: ApiClient,
        endpoints: CollectionEndpoints,
        scope: Scope,
        reducer: StatsReducer<T>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let resource = Self::new(client, endpoints, scope, reducer, notifier);
        resource.reload().await;
        resource
    }

    /// Fetch the whole list for the current scope and replace `items` and
    /// `stats` with it. Returns whether a fresh snapshot was applied; on
    /// failure the previous items stay in place.
    pub async fn reload(&self) -> bool {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| s.loading = true);

        let endpoint = self.endpoints.list(self.scope);
        let result = self
            .client
            .fetch_envelope::<Vec<T>>(endpoint, &ApiParams::new())
            .await;

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(endpoint = %endpoint, generation, "Discarding stale collection");
            return false;
        }

        match result {
            Ok(items) => {
                let stats = (self.reducer)(items.as_slice());
                tracing::info!(
                    endpoint = %endpoint,
                    scope = self.scope.as_str(),
                    count = items.len(),
                    "Collection loaded"
                );
                self.state.send_modify(|s| {
                    s.items = items;
                    s.stats = stats;
                    s.loading = false;
                });
                true
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(endpoint = %endpoint, error = %message, "Collection load failed");
                self.state.send_modify(|s| s.loading = false);
                self.notifier.notify_error(&message);
                false
            }
        }
    }

    /// Create an item. Reloads and returns true on success; on failure
    /// notifies and leaves `items` alone.
    pub async fn add(&self, draft: &T::Draft) -> bool {
        let result = self
            .client
            .submit_form(HttpMethod::POST, &self.endpoints.item, draft)
            .await;
        self.finish_mutation(result, "created").await
    }

    /// Partially update an existing item (PATCH). Same contract as `add`.
    pub async fn update(&self, id: &T::Id, draft: &T::Draft) -> bool {
        let path = self.endpoints.item_path(id);
        let result = self
            .client
            .submit_form(HttpMethod::PATCH, &path, draft)
            .await;
        self.finish_mutation(result, "updated").await
    }

    /// Delete by id. The outcome is reported through the notifier only.
    pub async fn remove(&self, id: &T::Id) {
        let path = self.endpoints.item_path(id);
        let result = self.client.delete(&path).await;
        self.finish_mutation(result, "deleted").await;
    }

    async fn finish_mutation(
        &self,
        result: Result<Option<String>, ResourceError>,
        verb: &str,
    ) -> bool {
        match result {
            Ok(message) => {
                let message = message
                    .unwrap_or_else(|| format!("{} {} successfully", self.endpoints.label, verb));
                self.notifier.notify_success(&message);
                self.reload().await;
                true
            }
            Err(err) => {
                let message = err.to_string();
                if err.is_validation() {
                    tracing::info!(
                        label = %self.endpoints.label,
                        verb,
                        error = %message,
                        "Mutation rejected before upload"
                    );
                } else {
                    tracing::warn!(
                        label = %self.endpoints.label,
                        verb,
                        status = ?err.status(),
                        error = %message,
                        "Mutation failed"
                    );
                }
                self.notifier.notify_error(&message);
                false
            }
        }
    }

    /// Switch between admin and user listings; reloads when it changes
    pub async fn set_scope(&mut self, scope: Scope) -> bool {
        if self.scope == scope {
            return false;
        }
        self.scope = scope;
        self.reload().await;
        true
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn endpoints(&self) -> &CollectionEndpoints {
        &self.endpoints
    }

    pub fn items(&self) -> Vec<T> {
        self.state.borrow().items.clone()
    }

    pub fn stats(&self) -> DerivedStats {
        self.state.borrow().stats.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn snapshot(&self) -> CollectionState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CollectionState<T>> {
        self.state.subscribe()
    }
}
