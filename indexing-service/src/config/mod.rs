use crate::services::indexing::INDEXING_API_URL;
use crate::services::ServiceAccountKey;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct IndexingConfig {
    pub common: core_config::Config,
    pub google: GoogleConfig,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// When false the service runs against the in-memory mock client.
    pub enabled: bool,
    /// Parsed once at startup from `GOOGLE_APPLICATION_CREDENTIALS`.
    pub credentials: Option<ServiceAccountKey>,
    pub api_base_url: String,
    pub request_timeout_secs: Option<u64>,
}

impl GoogleConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl IndexingConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let enabled = match env::var("GOOGLE_INDEXING_ENABLED") {
            Ok(raw) => parse_flag("GOOGLE_INDEXING_ENABLED", &raw)?,
            Err(_) => true,
        };

        if is_prod && !enabled {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GOOGLE_INDEXING_ENABLED=false is not allowed in production"
            )));
        }

        let credentials = match env::var("GOOGLE_APPLICATION_CREDENTIALS") {
            Ok(value) if !value.trim().is_empty() => Some(
                ServiceAccountKey::from_env_value(&value)
                    .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?,
            ),
            _ if enabled => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "GOOGLE_APPLICATION_CREDENTIALS is required when GOOGLE_INDEXING_ENABLED is true"
                )));
            }
            _ => None,
        };

        let request_timeout_secs = match env::var("GOOGLE_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Some(raw.parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!(
                    "GOOGLE_REQUEST_TIMEOUT_SECS must be a whole number of seconds: {}",
                    e
                ))
            })?),
            Err(_) => None,
        };

        Ok(IndexingConfig {
            common: common_config,
            google: GoogleConfig {
                enabled,
                credentials,
                api_base_url: env::var("GOOGLE_INDEXING_API_URL")
                    .unwrap_or_else(|_| INDEXING_API_URL.to_string()),
                request_timeout_secs,
            },
        })
    }
}

/// Accepts `true`/`false`/`1`/`0`, ignoring case and surrounding whitespace.
fn parse_flag(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be true or false, got {:?}",
            key,
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_accepts_common_spellings() {
        for raw in ["true", "TRUE", " True ", "1"] {
            assert!(parse_flag("FLAG", raw).unwrap(), "{raw:?}");
        }
        for raw in ["false", "False", "0\n"] {
            assert!(!parse_flag("FLAG", raw).unwrap(), "{raw:?}");
        }
    }

    #[test]
    fn unrecognised_flag_is_a_config_error() {
        for raw in ["flase", "yes", "off", ""] {
            let err = parse_flag("GOOGLE_INDEXING_ENABLED", raw).unwrap_err();
            assert!(matches!(err, AppError::ConfigError(_)));
            assert!(err.to_string().contains("GOOGLE_INDEXING_ENABLED"));
        }
    }
}
