use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Unprefixed variables read from the environment.
const BARE_KEYS: [&str; 4] = ["PORT", "LOG_LEVEL", "LOG_FORMAT", "OTLP_ENDPOINT"];

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Layers, lowest precedence first: `configuration.*` file, bare
    /// environment (`PORT`, `LOG_FORMAT`, ...), then `APP__*` variables.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let bare = std::env::vars()
            .filter(|(key, _)| BARE_KEYS.contains(&key.as_str()))
            .collect();

        Self::from_environment(
            Environment::default().try_parsing(true).source(Some(bare)),
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        )
    }

    fn from_environment(bare: Environment, prefixed: Environment) -> Result<Self, AppError> {
        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(bare)
            .add_source(prefixed)
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::default().try_parsing(true).source(Some(map))
    }

    fn prefixed(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true)
            .source(Some(map))
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_environment(env(&[]), prefixed(&[])).expect("config");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn bare_port_variable_is_honoured() {
        let config =
            Config::from_environment(env(&[("PORT", "8081")]), prefixed(&[])).expect("config");
        assert_eq!(config.port, 8081);
    }

    #[test]
    fn prefixed_variables_win_over_bare_ones() {
        let config = Config::from_environment(
            env(&[("PORT", "8081"), ("LOG_FORMAT", "pretty")]),
            prefixed(&[("APP__PORT", "9090")]),
        )
        .expect("config");
        assert_eq!(config.port, 9090);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn invalid_port_is_a_config_error() {
        let err = Config::from_environment(env(&[("PORT", "not-a-port")]), prefixed(&[]))
            .expect_err("should fail");
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
