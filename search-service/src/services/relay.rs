//! The search relay: validate, complete, log, answer.
//!
//! Both entry points (standalone server and serverless function) drive the
//! same [`SearchRelay`]; they differ only in default model and in how the
//! log insert is dispatched.

use crate::config::Settings;
use crate::models::{SearchLogRecord, SearchRequest, SearchResponse};
use crate::services::log_store::supabase::SupabaseLogStore;
use crate::services::log_store::SearchLogStore;
use crate::services::providers::groq::GroqProvider;
use crate::services::providers::{ChatMessage, CompletionProvider, CompletionRequest};
use axum::body::Bytes;
use axum::http::Method;
use metrics::{counter, histogram};
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Instant;

/// Request bodies above this size are rejected with 413.
pub const MAX_BODY_BYTES: usize = 1_048_576;

pub const MISSING_API_KEY: &str = "Missing GROQ_API_KEY on server";

/// How the log insert relates to the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDispatch {
    /// Spawned onto the runtime; the response never waits for it.
    Detached,
    /// Awaited before responding, with the outcome discarded.
    Awaited,
}

#[derive(Clone)]
pub struct SearchRelay {
    provider: Option<Arc<dyn CompletionProvider>>,
    log_store: Option<Arc<dyn SearchLogStore>>,
    default_model: String,
    dispatch: LogDispatch,
}

impl SearchRelay {
    /// A relay without a log store. `provider` is `None` when no credential
    /// is configured; every search then fails with 500.
    pub fn new(
        provider: Option<Arc<dyn CompletionProvider>>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            log_store: None,
            default_model: default_model.into(),
            dispatch: LogDispatch::Detached,
        }
    }

    pub fn with_log_store(mut self, log_store: Arc<dyn SearchLogStore>) -> Self {
        self.log_store = Some(log_store);
        self
    }

    pub fn with_dispatch(mut self, dispatch: LogDispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Build the provider and log store clients once from settings.
    pub fn from_settings(
        settings: &Settings,
        fallback_model: &str,
        dispatch: LogDispatch,
    ) -> Result<Self, AppError> {
        let provider: Option<Arc<dyn CompletionProvider>> = match settings.groq_config() {
            Some(config) => {
                let provider = GroqProvider::new(config)
                    .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;
                Some(Arc::new(provider))
            }
            None => {
                tracing::warn!("GROQ_API_KEY is not set; searches will fail until it is configured");
                None
            }
        };

        let default_model = settings.default_model(fallback_model);
        let mut relay = Self::new(provider, default_model).with_dispatch(dispatch);

        if let Some(config) = settings.supabase_config() {
            tracing::info!(table = %config.table, "Search logging enabled");
            let store = SupabaseLogStore::new(config)
                .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;
            relay = relay.with_log_store(Arc::new(store));
        }

        tracing::info!(
            default_model = %relay.default_model,
            dispatch = ?relay.dispatch,
            "Initialized search relay"
        );

        Ok(relay)
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn logging_enabled(&self) -> bool {
        self.log_store.is_some()
    }

    /// Run one search. `body` is the already-read request body, or the error
    /// produced while reading it.
    pub async fn handle(
        &self,
        method: &Method,
        body: Result<Bytes, AppError>,
    ) -> Result<SearchResponse, AppError> {
        let result = self.process(method, body).await;

        let outcome = match &result {
            Ok(_) => "answered",
            Err(AppError::MethodNotAllowed { .. }) => "method_not_allowed",
            Err(AppError::BadRequest(_)) | Err(AppError::PayloadTooLarge) => "bad_request",
            Err(AppError::ServerMisconfigured(_)) => "misconfigured",
            Err(AppError::UpstreamFailure(_)) => "upstream_error",
            Err(_) => "internal_error",
        };
        counter!("search_requests_total", "outcome" => outcome).increment(1);

        result
    }

    async fn process(
        &self,
        method: &Method,
        body: Result<Bytes, AppError>,
    ) -> Result<SearchResponse, AppError> {
        if *method != Method::POST {
            return Err(AppError::MethodNotAllowed { allow: "POST" });
        }

        let request = SearchRequest::from_slice(&body?, &self.default_model)?;

        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| AppError::ServerMisconfigured(MISSING_API_KEY.to_string()))?;

        let completion_request = CompletionRequest {
            model: request.model.clone(),
            temperature: request.temperature,
            messages: vec![
                ChatMessage::system(request.system.as_str()),
                ChatMessage::user(request.query.as_str()),
            ],
        };

        let started = Instant::now();
        let result = provider.complete(&completion_request).await;
        histogram!("search_upstream_duration_seconds").record(started.elapsed().as_secs_f64());

        let completion = result.map_err(|e| {
            tracing::warn!(model = %request.model, error = %e, "Completion provider call failed");
            AppError::UpstreamFailure(e.to_string())
        })?;

        let answer = completion.content.unwrap_or_default();

        tracing::debug!(
            model = %request.model,
            query_len = request.query.len(),
            answer_len = answer.len(),
            "Search answered"
        );

        self.log_exchange(SearchLogRecord::new(&request, &answer)).await;

        Ok(SearchResponse { answer })
    }

    /// Best-effort insert. Whatever happens here never reaches the caller.
    async fn log_exchange(&self, record: SearchLogRecord) {
        let Some(store) = self.log_store.clone() else {
            return;
        };

        match self.dispatch {
            LogDispatch::Detached => {
                // The handle is dropped, so completion is never awaited.
                drop(tokio::spawn(async move {
                    let _ = store.insert(&record).await;
                }));
            }
            LogDispatch::Awaited => {
                let _ = store.insert(&record).await;
            }
        }
    }
}
