//! Promotions errors.

use std::{io, path::PathBuf};

use sqlx::Error;
use thiserror::Error;

/// Errors raised while reading a promotions feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to open feed {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read feed row")]
    Csv(#[from] csv::Error),

    #[error("malformed row {row}: expected 3 columns, found {columns}")]
    MalformedRow { row: usize, columns: usize },

    #[error("error parsing price on row {row}: {value:?}")]
    InvalidPrice {
        row: usize,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("error parsing expiration date on row {row}: {value:?}")]
    InvalidExpirationDate { row: usize, value: String },
}

/// Errors raised while writing a snapshot into the store.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to ensure promotions schema")]
    Schema(#[source] Error),

    #[error("failed to clear promotions table")]
    Clear(#[source] Error),

    #[error("failed to insert batch {batch}")]
    Batch {
        batch: usize,
        #[source]
        source: Error,
    },

    #[error("failed to promote staged snapshot")]
    Promote(#[source] Error),
}

/// Errors raised by a refresh cycle.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("error reading promotions feed")]
    Feed(#[from] FeedError),

    #[error("error loading promotions")]
    Load(#[from] LoadError),
}

/// Errors raised by promotion lookups.
#[derive(Debug, Error)]
pub enum PromotionsServiceError {
    #[error("promotion not found")]
    NotFound,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for PromotionsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        Self::Sql(error)
    }
}
