//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::promotions::{
        PgPromotionsService, PromotionsService,
        store::{PgPromotionStore, PromotionStore},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// Store handles shared by the refresh scheduler and request handling.
#[derive(Clone)]
pub struct AppContext {
    pub promotions: Arc<dyn PromotionsService>,
    pub store: Arc<dyn PromotionStore>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool);

        Ok(Self {
            promotions: Arc::new(PgPromotionsService::new(db.clone())),
            store: Arc::new(PgPromotionStore::new(db)),
        })
    }
}
