//! Resources - request state containers owned by a view
//!
//! A resource wraps remote data plus its loading/error state and is the
//! only writer of that state. Changes can be observed through a
//! `tokio::sync::watch` receiver.

pub mod collection;
pub mod request;
pub mod state;

pub use collection::{
    count_by, product_stats, supplier_stats, CollectionEndpoints, CollectionResource,
    CollectionState, DerivedStats, StatsReducer,
};
pub use request::{DependencyKey, RequestResource};
pub use state::Resource;
