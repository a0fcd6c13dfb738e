use serde::Deserialize;
use service_core::config as core_config;
use service_core::config::Environment;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct UserConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub store: StoreBackend,
    pub mongodb: MongoConfig,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mongo,
    Memory,
}

impl UserConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let mut common = core_config::Config::load()?;
        if let Ok(port) = env::var("PORT") {
            common.port = port
                .parse()
                .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid PORT '{}': {}", port, e)))?;
        }

        let environment: Environment = get_env("ENVIRONMENT", Some("development"), false)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;
        let is_prod = environment.is_production();

        let store: StoreBackend = get_env("STORE_BACKEND", Some("mongo"), false)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        // The connection string has no safe default once deployed.
        let uri_required = is_prod && store == StoreBackend::Mongo;

        let timeout = get_env("MONGODB_TIMEOUT_SECS", Some("5"), false)?;
        let timeout_secs = timeout.parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Invalid MONGODB_TIMEOUT_SECS '{}': {}",
                timeout,
                e
            ))
        })?;

        Ok(UserConfig {
            common,
            environment,
            store,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), uri_required)?,
                database: get_env("MONGODB_DATABASE", Some("user_db"), false)?,
                timeout_secs,
            },
            log_level: get_env("LOG_LEVEL", Some("info"), false)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
        })
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

fn get_env(key: &str, default: Option<&str>, required: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if required {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}
