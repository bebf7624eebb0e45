//! Best-effort audit logging of answered searches.
//!
//! Failures from a [`SearchLogStore`] are never surfaced to callers; the
//! relay discards them.

pub mod mock;
pub mod supabase;

use crate::models::SearchLogRecord;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogStoreError {
    #[error("Log store unreachable: {0}")]
    Network(String),

    #[error("Log store rejected insert ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait SearchLogStore: Send + Sync {
    /// Insert a single row.
    async fn insert(&self, record: &SearchLogRecord) -> Result<(), LogStoreError>;
}
