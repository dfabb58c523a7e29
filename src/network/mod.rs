//! Network layer - HTTP execution against the inventory API
//!
//! Resources call into `ApiClient`; everything that crosses the wire
//! comes back as `Result<_, ResourceError>`.

pub mod client;

pub use client::ApiClient;
