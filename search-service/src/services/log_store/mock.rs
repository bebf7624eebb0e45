//! Mock log stores for testing.

use super::{LogStoreError, SearchLogStore};
use crate::models::SearchLogRecord;
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Behaviour {
    Accept,
    Reject,
    Hang,
}

/// Records every attempted insert, then accepts, rejects or never finishes.
pub struct MockLogStore {
    behaviour: Behaviour,
    records: Mutex<Vec<SearchLogRecord>>,
}

impl MockLogStore {
    pub fn accepting() -> Self {
        Self::with_behaviour(Behaviour::Accept)
    }

    pub fn rejecting() -> Self {
        Self::with_behaviour(Behaviour::Reject)
    }

    /// An insert that never completes.
    pub fn hanging() -> Self {
        Self::with_behaviour(Behaviour::Hang)
    }

    fn with_behaviour(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<SearchLogRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SearchLogStore for MockLogStore {
    async fn insert(&self, record: &SearchLogRecord) -> Result<(), LogStoreError> {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }

        match self.behaviour {
            Behaviour::Accept => Ok(()),
            Behaviour::Reject => Err(LogStoreError::Rejected {
                status: 401,
                body: "Invalid API key".to_string(),
            }),
            Behaviour::Hang => std::future::pending().await,
        }
    }
}
