//! Centralized configuration for api-server.
//!
//! All environment variables are loaded and validated at startup to fail fast
//! on misconfiguration rather than at request time.

use axum::http::HeaderValue;
use domain::ValidatorConfig;
use std::env;
use std::fmt;

/// Log output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Configuration error.
#[derive(Debug)]
pub struct ConfigError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration error for {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Server configuration loaded from environment variables.
///
/// All fields are validated at construction time.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 3001)
    pub port: u16,
    /// CORS allow origin
    pub cors_allow_origin: HeaderValue,
    /// Log format
    pub log_format: LogFormat,
    /// TLD allow-list override; `None` keeps the validator defaults
    pub allowed_tlds: Option<Vec<String>>,
    /// Cap on the warnings list of a validation result (default: 10)
    pub max_warnings: usize,
    /// Number of generations kept in history (default: 50)
    pub history_limit: usize,
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// Fails fast on invalid configuration.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Port
        let port = match lookup("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError {
                field: "PORT",
                message: format!("Invalid port '{}'", s),
            })?,
            None => 3001,
        };

        // CORS allow origin
        let cors_origin_str = lookup("CORS_ALLOW_ORIGIN").unwrap_or_else(|| "*".into());
        let cors_allow_origin = if cors_origin_str == "*" {
            HeaderValue::from_static("*")
        } else {
            HeaderValue::from_str(&cors_origin_str).map_err(|e| ConfigError {
                field: "CORS_ALLOW_ORIGIN",
                message: format!("Invalid header value '{}': {}", cors_origin_str, e),
            })?
        };

        // Log format
        let log_format =
            LogFormat::from_str(&lookup("LOG_FORMAT").unwrap_or_else(|| "pretty".into()));

        // TLD allow-list
        let allowed_tlds = match lookup("ALLOWED_TLDS").filter(|s| !s.trim().is_empty()) {
            Some(raw) => {
                let tlds = ValidatorConfig::default()
                    .with_tlds(raw.split(','))
                    .allowed_tlds;
                if tlds.is_empty() {
                    return Err(ConfigError {
                        field: "ALLOWED_TLDS",
                        message: "Must list at least one TLD".into(),
                    });
                }
                Some(tlds)
            }
            None => None,
        };

        // Warnings cap
        let max_warnings = match lookup("MAX_WARNINGS") {
            Some(s) => s.parse().map_err(|_| ConfigError {
                field: "MAX_WARNINGS",
                message: format!("Expected a non-negative integer, got '{}'", s),
            })?,
            None => domain::config::DEFAULT_MAX_WARNINGS,
        };

        // History size
        let history_limit = match lookup("HISTORY_LIMIT") {
            Some(s) => match s.parse::<usize>() {
                Ok(n) if (1..=http_common::MAX_LIMIT).contains(&n) => n,
                _ => {
                    return Err(ConfigError {
                        field: "HISTORY_LIMIT",
                        message: format!("Must be between 1 and {}", http_common::MAX_LIMIT),
                    })
                }
            },
            None => domain::adapters::memory_history::DEFAULT_CAPACITY,
        };

        Ok(Self {
            port,
            cors_allow_origin,
            log_format,
            allowed_tlds,
            max_warnings,
            history_limit,
        })
    }

    /// Validator settings derived from this configuration.
    pub fn validator_config(&self) -> ValidatorConfig {
        let cfg = ValidatorConfig::default().with_max_warnings(self.max_warnings);
        match &self.allowed_tlds {
            Some(tlds) => cfg.with_tlds(tlds),
            None => cfg,
        }
    }

    /// Log warnings about settings that diverge from the reference rules.
    pub fn warn_if_customized(&self) {
        if let Some(tlds) = &self.allowed_tlds {
            tracing::warn!(
                tlds = %tlds.join(","),
                "ALLOWED_TLDS is set: validation results will differ from the default allow-list."
            );
        }
        if self.max_warnings == 0 {
            tracing::warn!("MAX_WARNINGS=0: validation results will carry no warning details.");
        }
    }
}
