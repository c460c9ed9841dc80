//! Promotion Errors

use salvo::{http::StatusCode, prelude::*};
use thiserror::Error;
use tracing::error;

use promofeed_app::domain::promotions::PromotionsServiceError;

/// Failures of the promotion lookup, rendered as plaintext bodies.
#[derive(Debug, Error)]
pub(crate) enum PromotionHttpError {
    #[error("Missing promotion ID")]
    MissingId,

    #[error("Promotion not found")]
    NotFound,

    #[error("Error retrieving promotion")]
    Retrieve,

    #[error("Error serializing promotion")]
    Serialize,
}

impl PromotionHttpError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingId => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Retrieve | Self::Serialize => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Scribe for PromotionHttpError {
    fn render(self, res: &mut Response) {
        res.status_code(self.status_code());
        res.render(Text::Plain(self.to_string()));
    }
}

pub(crate) fn into_http_error(error: PromotionsServiceError) -> PromotionHttpError {
    match error {
        PromotionsServiceError::NotFound => PromotionHttpError::NotFound,
        PromotionsServiceError::Sql(source) => {
            error!("failed to retrieve promotion: {source}");

            PromotionHttpError::Retrieve
        }
    }
}
