//! Promotions Service

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::promotions::{
        PromotionsServiceError, records::Promotion, repository::PgPromotionsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgPromotionsService {
    db: Db,
    repository: PgPromotionsRepository,
}

impl PgPromotionsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgPromotionsRepository::new(),
        }
    }
}

#[async_trait]
impl PromotionsService for PgPromotionsService {
    #[tracing::instrument(
        name = "promotions.service.get_promotion",
        skip(self, id),
        fields(promotion_id = %id),
        err
    )]
    async fn get_promotion(&self, id: String) -> Result<Promotion, PromotionsServiceError> {
        let mut tx = self.db.begin().await?;

        let promotion = self.repository.get_promotion(&mut tx, &id).await?;

        tx.commit().await?;

        Ok(promotion)
    }
}

#[automock]
#[async_trait]
pub trait PromotionsService: Send + Sync {
    /// Retrieve the promotion with the given id from the current snapshot.
    async fn get_promotion(&self, id: String) -> Result<Promotion, PromotionsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use crate::{
        domain::promotions::store::{PromotionStore, PromotionTable},
        test::{TestContext, promotion},
    };

    use super::*;

    #[tokio::test]
    async fn get_promotion_returns_stored_row() -> TestResult {
        let ctx = TestContext::new().await;
        let expiration_date: Timestamp = "2024-12-31T23:59:59-05:00".parse()?;

        ctx.store
            .insert_batch(
                PromotionTable::Live,
                &[Promotion {
                    id: "P2".to_string(),
                    price: 5.5,
                    expiration_date,
                }],
            )
            .await?;

        let found = ctx.promotions.get_promotion("P2".to_string()).await?;

        assert_eq!(found.id, "P2");
        assert!((found.price - 5.5).abs() < f64::EPSILON);
        assert_eq!(found.expiration_date, expiration_date);

        Ok(())
    }

    #[tokio::test]
    async fn get_promotion_matches_id_exactly() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.store
            .insert_batch(PromotionTable::Live, &[promotion("P1", 19.99)])
            .await?;

        let result = ctx.promotions.get_promotion("p1".to_string()).await;

        assert!(
            matches!(result, Err(PromotionsServiceError::NotFound)),
            "expected not found, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_promotion_on_empty_table_is_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.promotions.get_promotion(String::new()).await;

        assert!(
            matches!(result, Err(PromotionsServiceError::NotFound)),
            "expected not found, got {result:?}"
        );
    }
}
