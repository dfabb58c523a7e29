//! Application constants
//!
//! Centralized location for endpoint paths and configuration defaults.
//! Everything here is immutable and injected at startup.

/// Default base URL of the inventory API
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Span of the default date range ("last N days")
pub const DEFAULT_RANGE_DAYS: i64 = 30;
/// Upper bound for a configured default range
pub const MAX_RANGE_DAYS: i64 = 3650;

/// Multipart field name for an attached image
pub const PHOTO_FIELD: &str = "photo";

/// Largest image accepted for upload
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Image types accepted for upload
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Wire format used for query dates
pub const API_DATE_FORMAT: &str = "%Y-%m-%d";

/// MIME type of exported files
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8";

/// Supplier endpoints
pub const SUPPLIERS_ADMIN_LIST: &str = "/suppliers/all";
pub const SUPPLIERS_USER_LIST: &str = "/suppliers";
pub const SUPPLIERS_ITEM: &str = "/suppliers";

/// Product endpoints
pub const PRODUCTS_ADMIN_LIST: &str = "/products/all";
pub const PRODUCTS_USER_LIST: &str = "/products";
pub const PRODUCTS_ITEM: &str = "/products";

/// Application name
pub const APP_NAME: &str = "stockroom";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
