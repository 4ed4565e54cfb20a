//! Configuration module
//!
//! Values come from the environment, optionally seeded from a `.env` file.

use std::env;

/// Configuration error
#[derive(Debug, thiserror::Error)]
#[error("Invalid value for {key}: '{value}'")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Label printed before every amount, e.g. `RM`
    pub currency_label: String,
    /// Decimal places shown on the result page
    pub display_decimals: u32,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            currency_label: env::var("CURRENCY_LABEL").unwrap_or(defaults.currency_label),
            display_decimals: parse_var("DISPLAY_DECIMALS", defaults.display_decimals)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            currency_label: "RM".to_string(),
            display_decimals: 2,
            log_level: "info".to_string(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError { key, value }),
        Err(_) => Ok(default),
    }
}
