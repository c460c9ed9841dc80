//! Promotions
//!
//! Feed ingestion, the refresh cycle and lookups for the promotions snapshot.

pub mod errors;
pub mod feed;
pub mod loader;
pub mod records;
mod repository;
pub mod refresh;
pub mod service;
pub mod store;

pub use errors::{FeedError, LoadError, PromotionsServiceError, RefreshError};
pub use service::*;
