//! Index Handler

use salvo::prelude::*;

/// Fixed acknowledgement served at `/`.
#[handler]
pub(crate) async fn handler() -> &'static str {
    "Promotions Api"
}
