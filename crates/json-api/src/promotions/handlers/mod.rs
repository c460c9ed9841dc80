//! Promotion Handlers

pub(crate) mod get;
