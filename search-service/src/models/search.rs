use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use service_core::error::AppError;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const MISSING_QUERY: &str = "Missing query";

/// A validated search request with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub system: String,
    pub model: String,
    /// Always within `[0, 1]`.
    pub temperature: f64,
}

impl SearchRequest {
    /// Parse a raw request body. Empty, malformed or non-object bodies are
    /// treated as `{}` and therefore fail on the missing query.
    pub fn from_slice(body: &[u8], default_model: &str) -> Result<Self, AppError> {
        let value = serde_json::from_slice::<Value>(body).unwrap_or(Value::Null);
        Self::from_body(&value, default_model)
    }

    pub fn from_body(body: &Value, default_model: &str) -> Result<Self, AppError> {
        let empty = Map::new();
        let fields = body.as_object().unwrap_or(&empty);

        let query = match fields.get("query") {
            Some(Value::String(q)) if !q.is_empty() => q.clone(),
            _ => return Err(AppError::BadRequest(MISSING_QUERY.to_string())),
        };

        Ok(Self {
            query,
            system: string_or(fields.get("system"), DEFAULT_SYSTEM_PROMPT),
            model: string_or(fields.get("model"), default_model),
            temperature: coerce_temperature(fields.get("temperature")),
        })
    }
}

fn string_or(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        _ => default.to_string(),
    }
}

/// Coerce a loosely typed temperature into `[0, 1]`.
///
/// Numbers pass through, numeric strings are parsed, booleans map to 1 and 0.
/// Anything else, or a NaN result, falls back to [`DEFAULT_TEMPERATURE`].
pub fn coerce_temperature(value: Option<&Value>) -> f64 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    match number {
        Some(n) if !n.is_nan() => n.clamp(0.0, 1.0),
        _ => DEFAULT_TEMPERATURE,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub answer: String,
}

/// Row written to the logging store after a successful completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchLogRecord {
    pub prompt: String,
    pub answer: String,
    pub model: String,
    pub temperature: f64,
}

impl SearchLogRecord {
    pub fn new(request: &SearchRequest, answer: &str) -> Self {
        Self {
            prompt: request.query.clone(),
            answer: answer.to_string(),
            model: request.model.clone(),
            temperature: request.temperature,
        }
    }
}
