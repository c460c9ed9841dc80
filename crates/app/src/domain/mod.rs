//! Promofeed Domain Concerns

pub mod promotions;
