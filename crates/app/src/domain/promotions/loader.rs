//! Batch Loader

use std::num::NonZeroUsize;

use tracing::debug;

use crate::domain::promotions::{
    errors::LoadError,
    records::Promotion,
    store::{PromotionStore, PromotionTable},
};

/// Default number of records written per transaction.
pub const BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(size) => size,
    None => NonZeroUsize::MIN,
};

/// Outcome of a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub records: usize,
    pub batches: usize,
}

/// Insert `promotions` into `table`, `batch_size` records per transaction.
///
/// Batches are committed independently. When batch `k` fails, batches before
/// it stay committed and later batches are never attempted.
///
/// # Errors
///
/// Returns [`LoadError::Batch`] with the 1-based index of the failing batch.
pub async fn load_batches(
    store: &dyn PromotionStore,
    table: PromotionTable,
    promotions: &[Promotion],
    batch_size: NonZeroUsize,
) -> Result<LoadReport, LoadError> {
    let mut report = LoadReport::default();

    for (index, batch) in promotions.chunks(batch_size.get()).enumerate() {
        let batch_number = index + 1;

        store
            .insert_batch(table, batch)
            .await
            .map_err(|source| LoadError::Batch {
                batch: batch_number,
                source,
            })?;

        report.batches += 1;
        report.records += batch.len();

        debug!(
            batch = batch_number,
            records = batch.len(),
            ?table,
            "inserted promotions batch"
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use sqlx::query_scalar;
    use testresult::TestResult;

    use crate::{
        domain::promotions::store::MockPromotionStore,
        test::{TestContext, promotion},
    };

    use super::*;

    fn promotions(count: usize) -> Vec<Promotion> {
        (0..count)
            .map(|n| promotion(&format!("P{n}"), 1.0))
            .collect()
    }

    fn batch_size(size: usize) -> NonZeroUsize {
        NonZeroUsize::new(size).unwrap_or(NonZeroUsize::MIN)
    }

    fn strict_store() -> MockPromotionStore {
        let mut store = MockPromotionStore::new();

        store.expect_ensure_schema().never();
        store.expect_clear().never();
        store.expect_promote_staging().never();

        store
    }

    #[tokio::test]
    async fn splits_records_into_ceil_batches() -> TestResult {
        let mut store = strict_store();
        let sizes = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&sizes);

        store
            .expect_insert_batch()
            .times(3)
            .withf(|table, _| *table == PromotionTable::Live)
            .returning(move |_, batch| {
                if let Ok(mut sizes) = recorded.lock() {
                    sizes.push(batch.len());
                }

                Ok(())
            });

        let report =
            load_batches(&store, PromotionTable::Live, &promotions(2500), BATCH_SIZE).await?;

        assert_eq!(
            report,
            LoadReport {
                records: 2500,
                batches: 3
            }
        );
        assert_eq!(*sizes.lock().map_err(|e| e.to_string())?, [1000, 1000, 500]);

        Ok(())
    }

    #[tokio::test]
    async fn empty_snapshot_writes_no_batches() -> TestResult {
        let mut store = strict_store();

        store.expect_insert_batch().never();

        let report = load_batches(&store, PromotionTable::Live, &[], BATCH_SIZE).await?;

        assert_eq!(report, LoadReport::default());

        Ok(())
    }

    #[tokio::test]
    async fn failing_batch_stops_the_load() {
        let mut store = strict_store();
        let mut calls = 0_usize;

        store.expect_insert_batch().times(2).returning(move |_, _| {
            calls += 1;

            if calls == 2 {
                Err(sqlx::Error::PoolTimedOut)
            } else {
                Ok(())
            }
        });

        let result = load_batches(
            &store,
            PromotionTable::Staging,
            &promotions(10),
            batch_size(3),
        )
        .await;

        assert!(
            matches!(result, Err(LoadError::Batch { batch: 2, .. })),
            "expected second batch to fail, got {result:?}"
        );
    }

    #[tokio::test]
    async fn earlier_batches_stay_committed_after_failure() -> TestResult {
        let ctx = TestContext::new().await;

        let snapshot = vec![
            promotion("A", 1.0),
            promotion("B", 2.0),
            promotion("C", 3.0),
            promotion("A", 4.0),
            promotion("D", 5.0),
        ];

        let result = load_batches(
            &ctx.store,
            PromotionTable::Live,
            &snapshot,
            batch_size(2),
        )
        .await;

        let ids: Vec<String> = query_scalar("SELECT id FROM promotions ORDER BY id")
            .fetch_all(ctx.db.pool())
            .await?;

        assert!(
            matches!(result, Err(LoadError::Batch { batch: 2, .. })),
            "expected duplicate id to fail batch 2, got {result:?}"
        );
        assert_eq!(ids, ["A", "B"]);

        Ok(())
    }
}
