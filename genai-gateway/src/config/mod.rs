use crate::services::providers::gemini::GEMINI_API_BASE;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Model used when `GENAI_TEXT_MODEL` is not set.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Default request body limit for uploads (20MB).
const DEFAULT_UPLOAD_MAX_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub google: GoogleConfig,
    pub models: ModelConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub api_key: String,
    /// Base URL of the Gemini REST API.
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model every generation request is sent to (e.g., gemini-2.5-flash)
    pub text_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Directory where uploads are staged while a request is in flight.
    pub dir: String,
    pub max_bytes: usize,
}

impl GatewayConfig {
    pub fn load() -> Result<Self, AppError> {
        let mut common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        if let Ok(port) = env::var("PORT") {
            common_config.port = port.parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("PORT must be a port number: {}", e))
            })?;
        }

        Ok(GatewayConfig {
            common: common_config,
            google: GoogleConfig {
                api_key: get_env("GOOGLE_API_KEY", None, is_prod)
                    .or_else(|_| get_env("API_KEY", None, is_prod))?,
                api_base: get_env("GEMINI_API_BASE", Some(GEMINI_API_BASE), is_prod)?,
            },
            models: ModelConfig {
                text_model: get_env("GENAI_TEXT_MODEL", Some(DEFAULT_TEXT_MODEL), is_prod)?,
            },
            uploads: UploadConfig {
                dir: get_env("UPLOAD_DIR", Some("uploads"), is_prod)?,
                max_bytes: parse_upload_max_bytes(&get_env(
                    "UPLOAD_MAX_BYTES",
                    Some(&DEFAULT_UPLOAD_MAX_BYTES.to_string()),
                    is_prod,
                )?)?,
            },
        })
    }
}

fn parse_upload_max_bytes(raw: &str) -> Result<usize, AppError> {
    raw.parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!(
            "UPLOAD_MAX_BYTES must be a byte count: {}",
            e
        ))
    })
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
