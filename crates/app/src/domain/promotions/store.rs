//! Promotions Store
//!
//! The write side of the promotions table, as seen by the loader and the
//! refresh scheduler.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::promotions::{records::Promotion, repository::PgPromotionsRepository},
};

/// Table a snapshot is written into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionTable {
    /// The table lookups read from.
    Live,

    /// Shadow table used to stage a snapshot before it replaces the live rows.
    Staging,
}

#[automock]
#[async_trait]
pub trait PromotionStore: Send + Sync {
    /// Create the live and staging tables when absent.
    async fn ensure_schema(&self) -> Result<(), sqlx::Error>;

    /// Remove every row from `table`. Not part of any batch transaction.
    async fn clear(&self, table: PromotionTable) -> Result<(), sqlx::Error>;

    /// Insert `batch` into `table` in a single transaction.
    async fn insert_batch(
        &self,
        table: PromotionTable,
        batch: &[Promotion],
    ) -> Result<(), sqlx::Error>;

    /// Atomically replace the live rows with the staged rows.
    async fn promote_staging(&self) -> Result<u64, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct PgPromotionStore {
    db: Db,
    repository: PgPromotionsRepository,
}

impl PgPromotionStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgPromotionsRepository::new(),
        }
    }
}

#[async_trait]
impl PromotionStore for PgPromotionStore {
    async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        let mut conn = self.db.acquire().await?;

        self.repository.create_tables(&mut conn).await
    }

    async fn clear(&self, table: PromotionTable) -> Result<(), sqlx::Error> {
        let mut conn = self.db.acquire().await?;

        self.repository.truncate(&mut conn, table).await
    }

    async fn insert_batch(
        &self,
        table: PromotionTable,
        batch: &[Promotion],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.db.begin().await?;

        // An early return drops `tx`, which rolls the whole batch back.
        for promotion in batch {
            self.repository
                .insert_promotion(&mut tx, table, promotion)
                .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn promote_staging(&self) -> Result<u64, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let copied = self.repository.replace_from_staging(&mut tx).await?;

        tx.commit().await?;

        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use sqlx::query_scalar;
    use testresult::TestResult;

    use crate::test::{TestContext, promotion};

    use super::*;

    async fn count(ctx: &TestContext, table: &str) -> Result<i64, sqlx::Error> {
        query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(ctx.db.pool())
            .await
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.store.ensure_schema().await?;
        ctx.store.ensure_schema().await?;

        assert_eq!(count(&ctx, "promotions").await?, 0);
        assert_eq!(count(&ctx, "promotions_staging").await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn insert_batch_commits_all_rows() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.store
            .insert_batch(
                PromotionTable::Live,
                &[promotion("P1", 19.99), promotion("P2", 5.5)],
            )
            .await?;

        assert_eq!(count(&ctx, "promotions").await?, 2);
        assert_eq!(count(&ctx, "promotions_staging").await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn insert_batch_with_duplicate_id_rolls_back() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .store
            .insert_batch(
                PromotionTable::Live,
                &[promotion("P1", 1.0), promotion("P2", 2.0), promotion("P1", 3.0)],
            )
            .await;

        assert!(result.is_err(), "duplicate id should fail the batch");
        assert_eq!(count(&ctx, "promotions").await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn clear_only_touches_the_given_table() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.store
            .insert_batch(PromotionTable::Live, &[promotion("P1", 1.0)])
            .await?;
        ctx.store
            .insert_batch(PromotionTable::Staging, &[promotion("P2", 2.0)])
            .await?;

        ctx.store.clear(PromotionTable::Staging).await?;

        assert_eq!(count(&ctx, "promotions").await?, 1);
        assert_eq!(count(&ctx, "promotions_staging").await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn promote_staging_replaces_live_rows() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.store
            .insert_batch(PromotionTable::Live, &[promotion("OLD", 1.0)])
            .await?;
        ctx.store
            .insert_batch(
                PromotionTable::Staging,
                &[promotion("NEW1", 2.0), promotion("NEW2", 3.0)],
            )
            .await?;

        let copied = ctx.store.promote_staging().await?;

        let ids: Vec<String> = query_scalar("SELECT id FROM promotions ORDER BY id")
            .fetch_all(ctx.db.pool())
            .await?;

        assert_eq!(copied, 2);
        assert_eq!(ids, ["NEW1", "NEW2"]);

        Ok(())
    }
}
