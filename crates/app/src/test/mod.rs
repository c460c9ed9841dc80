//! Test support.


use jiff::Timestamp;

use crate::domain::promotions::records::Promotion;

pub(crate) use context::TestContext;

/// A promotion expiring at the start of 2030.
pub(crate) fn promotion(id: &str, price: f64) -> Promotion {
    Promotion {
        id: id.to_string(),
        price,
        expiration_date: Timestamp::from_second(1_893_456_000).unwrap_or(Timestamp::UNIX_EPOCH),
    }
}
