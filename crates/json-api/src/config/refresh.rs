//! Refresh Config

use std::{num::NonZeroUsize, path::PathBuf, time::Duration};

use clap::Args;
use promofeed_app::domain::promotions::refresh::{RefreshSchedule, RefreshStrategy};

/// How each refresh replaces the live snapshot.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum RefreshStrategyArg {
    /// Truncate the live table and reload it in place.
    Truncate,

    /// Load a staging table, then swap it in within one transaction.
    Swap,
}

/// Feed and refresh cycle settings.
#[derive(Debug, Args)]
pub struct RefreshConfig {
    /// Path of the promotions CSV feed
    #[arg(long, env = "FEED_PATH", default_value = "promotions.csv")]
    pub feed_path: PathBuf,

    /// Seconds between refresh cycles
    #[arg(long, env = "REFRESH_PERIOD_SECS", default_value_t = 1_800)]
    pub refresh_period_secs: u64,

    /// Seconds to wait after startup before the first refresh cycle
    #[arg(long, env = "REFRESH_INITIAL_DELAY_SECS", default_value_t = 30)]
    pub refresh_initial_delay_secs: u64,

    /// Records inserted per transaction
    #[arg(long, env = "BATCH_SIZE", default_value = "1000")]
    pub batch_size: NonZeroUsize,

    /// Refresh strategy (truncate, swap)
    #[arg(
        long,
        env = "REFRESH_STRATEGY",
        value_enum,
        default_value_t = RefreshStrategyArg::Truncate
    )]
    pub refresh_strategy: RefreshStrategyArg,
}

impl RefreshConfig {
    #[must_use]
    pub fn schedule(&self) -> RefreshSchedule {
        RefreshSchedule {
            initial_delay: Duration::from_secs(self.refresh_initial_delay_secs),
            period: Duration::from_secs(self.refresh_period_secs),
        }
    }

    #[must_use]
    pub fn strategy(&self) -> RefreshStrategy {
        match self.refresh_strategy {
            RefreshStrategyArg::Truncate => RefreshStrategy::Truncate,
            RefreshStrategyArg::Swap => RefreshStrategy::Swap,
        }
    }
}
