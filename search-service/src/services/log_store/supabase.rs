//! Supabase (PostgREST) log store.

use super::{LogStoreError, SearchLogStore};
use crate::models::SearchLogRecord;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

pub const DEFAULT_LOG_TABLE: &str = "search_logs";

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    pub anon_key: Secret<String>,
    pub table: String,
}

/// Inserts search log rows through the PostgREST API.
pub struct SupabaseLogStore {
    config: SupabaseConfig,
    client: Client,
}

impl SupabaseLogStore {
    pub fn new(config: SupabaseConfig) -> Result<Self, LogStoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LogStoreError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn insert_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.url.trim_end_matches('/'),
            self.config.table
        )
    }
}

#[async_trait]
impl SearchLogStore for SupabaseLogStore {
    async fn insert(&self, record: &SearchLogRecord) -> Result<(), LogStoreError> {
        let key = self.config.anon_key.expose_secret();

        let response = self
            .client
            .post(self.insert_url())
            .header("apikey", key.as_str())
            .bearer_auth(key)
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await
            .map_err(|e| LogStoreError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        Err(LogStoreError::Rejected {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}
