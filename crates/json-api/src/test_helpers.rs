//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};

use promofeed_app::{
    context::AppContext,
    domain::promotions::{MockPromotionsService, records::Promotion, store::MockPromotionStore},
};

use crate::{router::app_router, state::State};

/// Request handling never writes to the store.
fn strict_store_mock() -> MockPromotionStore {
    let mut store = MockPromotionStore::new();

    store.expect_ensure_schema().never();
    store.expect_clear().never();
    store.expect_insert_batch().never();
    store.expect_promote_staging().never();

    store
}

pub(crate) fn strict_promotions_mock() -> MockPromotionsService {
    let mut promotions = MockPromotionsService::new();

    promotions.expect_get_promotion().never();

    promotions
}

pub(crate) fn state_with_promotions(promotions: MockPromotionsService) -> Arc<State> {
    State::from_app_context(AppContext {
        promotions: Arc::new(promotions),
        store: Arc::new(strict_store_mock()),
    })
}

/// The full application router with mocked services injected.
pub(crate) fn promotions_service(promotions: MockPromotionsService) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_promotions(promotions)))
            .push(app_router()),
    )
}

pub(crate) fn make_promotion(id: &str, price: f64) -> Promotion {
    Promotion {
        id: id.to_string(),
        price,
        expiration_date: Timestamp::from_second(1_735_689_600).unwrap_or(Timestamp::UNIX_EPOCH),
    }
}
