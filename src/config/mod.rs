//! Application configuration management

use std::env;

use anyhow::{Context, Result};

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// SQLite URL (`sqlite:...`) or database file path
    pub database_url: String,

    pub database_max_connections: u32,

    /// Send a notification mail for every created film
    pub mail_enabled: bool,

    /// Sender address of notification mail
    pub mail_from: String,

    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: "sqlite:./data/film.db".to_string(),
            database_max_connections: 10,
            mail_enabled: true,
            mail_from: "film-catalog@localhost".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // Prefer DATABASE_PATH, fall back to DATABASE_URL
        let database_url = lookup("DATABASE_PATH")
            .or_else(|| lookup("DATABASE_URL"))
            .unwrap_or(defaults.database_url);

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),

            port: lookup("PORT")
                .map(|p| p.parse::<u16>().context("Invalid PORT"))
                .transpose()?
                .unwrap_or(defaults.port),

            database_url,

            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.database_max_connections),

            mail_enabled: lookup("MAIL_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.mail_enabled),

            mail_from: lookup("MAIL_FROM").unwrap_or(defaults.mail_from),

            log_format: match lookup("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        })
    }

    /// Socket address to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
