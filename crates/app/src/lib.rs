//! Promotions feed ingestion, storage and lookup.

pub mod context;
pub mod database;
pub mod domain;

#[cfg(test)]
mod test;
