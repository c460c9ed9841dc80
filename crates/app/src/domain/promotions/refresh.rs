//! Refresh Scheduler
//!
//! Loads a baseline snapshot at startup, then replaces the store contents from
//! the feed on a fixed period until cancelled.

use std::{fmt, num::NonZeroUsize, path::PathBuf, sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::domain::promotions::{
    errors::{LoadError, RefreshError},
    feed,
    loader::{BATCH_SIZE, LoadReport, load_batches},
    records::Promotion,
    store::{PromotionStore, PromotionTable},
};

/// How a refresh cycle replaces the live snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshStrategy {
    /// Truncate the live table, then insert batches into it. Readers can see
    /// an empty or partial table mid-cycle, and a failed batch leaves it so.
    #[default]
    Truncate,

    /// Load batches into the staging table, then swap the rows into the live
    /// table in one transaction. A failed load leaves the live table untouched.
    Swap,
}

/// Timing of the recurring cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSchedule {
    /// Wait before the first recurring cycle.
    pub initial_delay: Duration,

    /// Wait between the end of one cycle and the start of the next.
    pub period: Duration,
}

impl Default for RefreshSchedule {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(30),
            period: Duration::from_secs(30 * 60),
        }
    }
}

pub struct Refresher {
    store: Arc<dyn PromotionStore>,
    feed_path: PathBuf,
    batch_size: NonZeroUsize,
    strategy: RefreshStrategy,
}

impl fmt::Debug for Refresher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refresher")
            .field("feed_path", &self.feed_path)
            .field("batch_size", &self.batch_size)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl Refresher {
    #[must_use]
    pub fn new(store: Arc<dyn PromotionStore>, feed_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            feed_path: feed_path.into(),
            batch_size: BATCH_SIZE,
            strategy: RefreshStrategy::default(),
        }
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: NonZeroUsize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: RefreshStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Create the tables and load the baseline snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error when the schema cannot be created or the first cycle
    /// fails. Callers treat this as fatal.
    pub async fn bootstrap(&self) -> Result<LoadReport, RefreshError> {
        info!("creating promotions tables if absent");

        self.store
            .ensure_schema()
            .await
            .map_err(LoadError::Schema)?;

        self.run_cycle().await
    }

    /// Re-read the feed and replace the stored snapshot.
    ///
    /// The feed is parsed before anything is cleared, so an unreadable feed
    /// leaves the current snapshot in place.
    ///
    /// # Errors
    ///
    /// Returns an error when the feed cannot be parsed or the load fails.
    pub async fn run_cycle(&self) -> Result<LoadReport, RefreshError> {
        let promotions = feed::read_feed(&self.feed_path).await?;

        let report = match self.strategy {
            RefreshStrategy::Truncate => self.replace_live(&promotions).await?,
            RefreshStrategy::Swap => self.stage_and_swap(&promotions).await?,
        };

        info!(
            records = report.records,
            batches = report.batches,
            strategy = ?self.strategy,
            "promotions snapshot loaded"
        );

        Ok(report)
    }

    async fn replace_live(&self, promotions: &[Promotion]) -> Result<LoadReport, LoadError> {
        self.store
            .clear(PromotionTable::Live)
            .await
            .map_err(LoadError::Clear)?;

        load_batches(
            self.store.as_ref(),
            PromotionTable::Live,
            promotions,
            self.batch_size,
        )
        .await
    }

    async fn stage_and_swap(&self, promotions: &[Promotion]) -> Result<LoadReport, LoadError> {
        self.store
            .clear(PromotionTable::Staging)
            .await
            .map_err(LoadError::Clear)?;

        let report = load_batches(
            self.store.as_ref(),
            PromotionTable::Staging,
            promotions,
            self.batch_size,
        )
        .await?;

        self.store
            .promote_staging()
            .await
            .map_err(LoadError::Promote)?;

        Ok(report)
    }

    /// Run recurring cycles until `cancel` fires.
    ///
    /// A failed cycle is logged and the next one runs after the usual period.
    pub async fn run(&self, schedule: RefreshSchedule, cancel: CancellationToken) {
        if !sleep_or_cancel(schedule.initial_delay, &cancel).await {
            return;
        }

        loop {
            if let Err(error) = self.run_cycle().await {
                error!("promotions refresh failed: {error:?}");
            }

            if !sleep_or_cancel(schedule.period, &cancel).await {
                info!("promotions refresh stopped");

                return;
            }
        }
    }

    /// Spawn [`Refresher::run`] onto the runtime.
    pub fn spawn(
        self: Arc<Self>,
        schedule: RefreshSchedule,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(schedule, cancel).await })
    }
}

/// Returns `false` when cancelled before `duration` elapses.
async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        () = cancel.cancelled() => false,
        () = time::sleep(duration) => true,
    }
}
