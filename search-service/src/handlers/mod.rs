//! HTTP handlers for the search service.

pub mod health;
pub mod metrics;
pub mod search;
