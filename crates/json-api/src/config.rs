//! Server configuration module

use clap::Parser;

use crate::config::{
    db::DatabaseConfig, logging::LoggingConfig, refresh::RefreshConfig,
    server::ServerRuntimeConfig,
};

pub(crate) mod db;
pub(crate) mod logging;
pub(crate) mod refresh;
pub(crate) mod server;

/// Promotions JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "promofeed-json", about = "Promotions JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Feed location and refresh cycle settings.
    #[command(flatten)]
    pub refresh: RefreshConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroUsize, time::Duration};

    use promofeed_app::domain::promotions::refresh::RefreshStrategy;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn explicit_flags_override_defaults() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "promofeed-json",
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--feed-path",
            "/data/promotions.csv",
            "--refresh-period-secs",
            "60",
            "--refresh-initial-delay-secs",
            "5",
            "--batch-size",
            "250",
            "--refresh-strategy",
            "swap",
        ])?;

        assert_eq!(config.socket_addr(), "127.0.0.1:8080");
        assert_eq!(
            config.refresh.feed_path.to_str(),
            Some("/data/promotions.csv")
        );
        assert_eq!(config.refresh.schedule().period, Duration::from_secs(60));
        assert_eq!(
            config.refresh.schedule().initial_delay,
            Duration::from_secs(5)
        );
        assert_eq!(config.refresh.batch_size, NonZeroUsize::new(250).ok_or("zero")?);
        assert_eq!(config.refresh.strategy(), RefreshStrategy::Swap);

        Ok(())
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let result = ServerConfig::try_parse_from(["promofeed-json", "--batch-size", "0"]);

        assert!(result.is_err(), "batch size of zero should not parse");
    }
}
