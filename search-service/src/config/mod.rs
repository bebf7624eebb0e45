use crate::services::log_store::supabase::{SupabaseConfig, DEFAULT_LOG_TABLE};
use crate::services::providers::groq::{GroqConfig, GROQ_API_BASE};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;

/// Default model for the standalone server.
pub const SERVER_DEFAULT_MODEL: &str = "qwen/qwen3-32b";

/// Default model for the serverless function.
pub const FUNCTION_DEFAULT_MODEL: &str = "llama-3.1-70b-versatile";

/// Process settings, read from `.env`, an optional `configuration` file and
/// the environment (`PORT`, `GROQ_API_KEY`, `SUPABASE_URL`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub otlp_endpoint: Option<String>,

    /// A missing key is not fatal at startup; searches answer 500 instead.
    pub groq_api_key: Option<Secret<String>>,
    #[serde(default = "default_groq_base_url")]
    pub groq_base_url: String,

    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<Secret<String>>,
    #[serde(default = "default_log_table")]
    pub supabase_log_table: String,

    /// Overrides the entry point's own default model.
    pub search_default_model: Option<String>,

    /// Directory holding the bundled UI.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_groq_base_url() -> String {
    GROQ_API_BASE.to_string()
}

fn default_log_table() -> String {
    DEFAULT_LOG_TABLE.to_string()
}

fn default_static_dir() -> String {
    "search-service/public".to_string()
}

impl Settings {
    pub fn load() -> Result<Self, AppError> {
        core_config::load()
    }

    /// Groq client settings, or `None` when no usable key is configured.
    pub fn groq_config(&self) -> Option<GroqConfig> {
        let api_key = non_empty_secret(self.groq_api_key.as_ref())?;
        Some(GroqConfig {
            api_key,
            base_url: self.groq_base_url.clone(),
        })
    }

    /// Supabase settings, or `None` unless both URL and key are set.
    pub fn supabase_config(&self) -> Option<SupabaseConfig> {
        let url = core_config::non_empty(self.supabase_url.clone())?;
        let anon_key = non_empty_secret(self.supabase_anon_key.as_ref())?;
        Some(SupabaseConfig {
            url,
            anon_key,
            table: self.supabase_log_table.clone(),
        })
    }

    pub fn default_model(&self, fallback: &str) -> String {
        core_config::non_empty(self.search_default_model.clone())
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn otlp_endpoint(&self) -> Option<&str> {
        self.otlp_endpoint
            .as_deref()
            .filter(|endpoint| !endpoint.trim().is_empty())
    }
}

fn non_empty_secret(secret: Option<&Secret<String>>) -> Option<Secret<String>> {
    secret
        .filter(|s| !s.expose_secret().trim().is_empty())
        .cloned()
}
