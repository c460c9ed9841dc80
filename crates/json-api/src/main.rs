//! Promotions JSON API Server

use std::{process, sync::Arc};

use salvo::{affix_state::inject, prelude::*};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use promofeed_app::{context::AppContext, domain::promotions::refresh::Refresher};

use crate::{config::ServerConfig, state::State};

mod config;
mod index;
mod observability;
mod promotions;
mod router;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;

/// Promotions JSON API Server entry point
///
/// Loads a complete baseline snapshot before serving; any failure up to that
/// point exits the process.
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    if let Err(init_error) = observability::init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("{init_error}");
        }

        process::exit(1);
    }

    info!("connecting to database");

    let app = match AppContext::from_database_url(&config.database.database_url).await {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error:?}");

            process::exit(1);
        }
    };

    let refresher = Arc::new(
        Refresher::new(Arc::clone(&app.store), config.refresh.feed_path.clone())
            .with_batch_size(config.refresh.batch_size)
            .with_strategy(config.refresh.strategy()),
    );

    match refresher.bootstrap().await {
        Ok(report) => info!(
            records = report.records,
            batches = report.batches,
            "initial promotions loaded"
        ),
        Err(load_error) => {
            error!("failed to load initial promotions: {load_error:?}");

            process::exit(1);
        }
    }

    let cancel = CancellationToken::new();
    let refresh_task = refresher.spawn(config.refresh.schedule(), cancel.clone());

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    let listener = TcpListener::new(addr).bind().await;

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(observability::request_logging)
        .hoop(inject(State::from_app_context(app)))
        .push(router::app_router());

    let server = Server::new(listener);

    let handle = server.handle();

    // Listen for shutdown signal
    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle, cancel).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    // Start serving requests
    server.serve(router).await;

    if let Err(error) = refresh_task.await {
        error!("promotions refresh task failed: {error}");
    }
}
