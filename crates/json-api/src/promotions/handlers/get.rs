//! Get Promotion Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use promofeed_app::domain::promotions::records::Promotion;

use crate::{
    promotions::errors::{PromotionHttpError, into_http_error},
    state::State,
};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PromotionResponse {
    /// The promotion identifier from the feed
    #[serde(rename = "ID")]
    pub id: String,

    /// The promotion price
    #[serde(rename = "Price")]
    pub price: f64,

    /// When the promotion expires
    #[serde(rename = "ExpirationDate")]
    pub expiration_date: Timestamp,
}

impl From<Promotion> for PromotionResponse {
    fn from(promotion: Promotion) -> Self {
        PromotionResponse {
            id: promotion.id,
            price: promotion.price,
            expiration_date: promotion.expiration_date,
        }
    }
}

/// Get Promotion Handler
///
/// Looks up a promotion by the last segment of the request path. A path
/// ending in `/` has an empty last segment.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Text<String>, PromotionHttpError> {
    let trailing_slash = req.uri().path().ends_with('/');
    let path = req.param::<String>("id").unwrap_or_default();
    let id = if trailing_slash {
        ""
    } else {
        path.rsplit('/').next().unwrap_or_default()
    };

    debug!("promotion id from request: {id:?}");

    if id.is_empty() {
        return Err(PromotionHttpError::MissingId);
    }

    let state = depot
        .obtain::<Arc<State>>()
        .map_err(|_ignored| PromotionHttpError::Retrieve)?;

    let promotion = state
        .app
        .promotions
        .get_promotion(id.to_string())
        .await
        .map_err(into_http_error)?;

    if !promotion.price.is_finite() {
        error!(
            promotion_id = %promotion.id,
            price = promotion.price,
            "promotion price has no JSON representation"
        );

        return Err(PromotionHttpError::Serialize);
    }

    let body = serde_json::to_string(&PromotionResponse::from(promotion)).map_err(|source| {
        error!("failed to serialize promotion: {source}");

        PromotionHttpError::Serialize
    })?;

    Ok(Text::Json(body))
}
