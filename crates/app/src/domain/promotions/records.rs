//! Promotions Records

use jiff::Timestamp;

/// Promotion Record
///
/// One row of a feed snapshot. The `id` is only stable within the snapshot it
/// was loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct Promotion {
    pub id: String,
    pub price: f64,
    pub expiration_date: Timestamp,
}
