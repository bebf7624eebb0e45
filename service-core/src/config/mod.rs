use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::de::DeserializeOwned;

/// Load settings from `.env`, an optional `configuration` file and the
/// process environment, in increasing order of precedence.
///
/// Environment keys are matched case-insensitively against field names, so
/// `GROQ_API_KEY` lands in `groq_api_key`.
pub fn load<T: DeserializeOwned>() -> Result<T, AppError> {
    dotenvy::dotenv().ok();
    load_from(Environment::default())
}

/// Same as [`load`] but with an explicit environment source, which lets tests
/// feed a fixed map instead of the real process environment.
pub fn load_from<T: DeserializeOwned>(environment: Environment) -> Result<T, AppError> {
    let config = Cfg::builder()
        .add_source(File::with_name("configuration").required(false))
        .add_source(environment)
        .build()?;

    Ok(config.try_deserialize()?)
}

/// Treat blank values the same as unset ones.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
