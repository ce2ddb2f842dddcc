use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

pub const SERVICE_NAME: &str = "registration-service";

#[derive(Debug, Clone)]
pub struct RegistrationConfig {
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: Secret<String>,
    pub database: String,
    pub collection: String,
    /// Bounds connection establishment and server selection.
    pub connect_timeout: Duration,
    /// Bounds every individual store operation.
    pub operation_timeout: Duration,
}

impl MongoConfig {
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: Secret::new(uri.into()),
            database: database.into(),
            collection: "users".to_string(),
            connect_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(30),
        }
    }
}

impl RegistrationConfig {
    pub fn load() -> Result<Self, AppError> {
        // Loads .env as a side effect, so it runs before the lookups below.
        let common = core_config::Config::load()?;

        Ok(RegistrationConfig {
            common,
            mongodb: MongoConfig::new(
                get_env("MONGODB_URI", None)?,
                get_env("MONGODB_DATABASE", Some("strongone"))?,
            ),
        })
    }
}

fn get_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => default.map(str::to_string).ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!("{} is required but not set", key))
        }),
    }
}
