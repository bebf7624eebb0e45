//! Serverless function adapter.
//!
//! Hosting platforms route a single path to one handler, so [`SearchFunction`]
//! takes a bare `http::Request` and ignores the path. Log inserts are awaited
//! here because the platform may freeze the instance once the response is
//! written.

use crate::config::{Settings, FUNCTION_DEFAULT_MODEL};
use crate::services::relay::MAX_BODY_BYTES;
use crate::services::{LogDispatch, SearchRelay};
use axum::{
    body::{Body, Bytes},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use service_core::error::AppError;
use std::convert::Infallible;
use tower::{service_fn, Service};

#[derive(Clone)]
pub struct SearchFunction {
    relay: SearchRelay,
}

impl SearchFunction {
    pub fn new(relay: SearchRelay) -> Self {
        Self { relay }
    }

    /// Build from `.env` and the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        let settings = Settings::load()?;
        Self::from_settings(&settings)
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let relay =
            SearchRelay::from_settings(settings, FUNCTION_DEFAULT_MODEL, LogDispatch::Awaited)?;
        Ok(Self::new(relay))
    }

    pub async fn handle(&self, request: Request<Body>) -> Response {
        let (parts, body) = request.into_parts();

        match self.relay.handle(&parts.method, read_body(body).await).await {
            Ok(answer) => (StatusCode::OK, Json(answer)).into_response(),
            Err(e) => e.into_response(),
        }
    }

    /// Expose the handler as a `tower::Service` for platform runtimes.
    pub fn into_service(
        self,
    ) -> impl Service<Request<Body>, Response = Response, Error = Infallible> + Clone {
        service_fn(move |request: Request<Body>| {
            let function = self.clone();
            async move { Ok::<_, Infallible>(function.handle(request).await) }
        })
    }
}

async fn read_body(body: Body) -> Result<Bytes, AppError> {
    match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(AppError::PayloadTooLarge),
        Err(e) => Err(AppError::BadRequest(format!("Failed to read request body: {}", e))),
    }
}
