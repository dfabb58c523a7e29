//! # Stockroom
//!
//! Request-state core of an inventory dashboard, talking to a backend that
//! wraps every answer in a `{success, data, message}` envelope.
//!
//! ## Features
//! - `RequestResource`: one remote read with data/loading/error and refetch
//! - `CollectionResource`: a list with create/update/delete, full reloads
//!   and derived per-category stats
//! - `DateRange`: inclusive date selection with named presets
//! - `CsvExporter`: client-side CSV export behind a download port
//!
//! ## Architecture
//! - Network layer (reqwest) - envelope reads, multipart writes
//! - Resources - state owned by one view, observable through `watch`
//! - Ports - `Notifier` and `DownloadSink` isolate every side effect

pub mod config;
pub mod constants;
pub mod date_range;
pub mod error;
pub mod export;
pub mod models;
pub mod network;
pub mod notify;
pub mod resource;

// Re-export commonly used types
pub use config::ClientConfig;
pub use date_range::{DateRange, Preset};
pub use error::{ExportError, ResourceError};
pub use export::{CsvExporter, DownloadSink, FileDownloads, Record};
pub use models::{
    ApiParams, Entity, Product, ProductDraft, Scope, Supplier, SupplierDraft, Upload,
};
pub use network::ApiClient;
pub use notify::{MemoryNotifier, Notifier, TracingNotifier};
pub use resource::{
    CollectionEndpoints, CollectionResource, DependencyKey, DerivedStats, RequestResource,
    Resource,
};
