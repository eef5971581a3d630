// Application configuration loaded from the environment (.env supported via dotenv)

use chrono::{FixedOffset, Offset, Utc};
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime configuration for the API server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub db_max_connections: u32,
    /// Wall-clock offset of the bakery; delivery dates are computed in this zone
    pub business_offset: FixedOffset,
}

impl AppConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(value) => match value.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::Invalid { key: "DB_MAX_CONNECTIONS", value }),
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let business_offset = match lookup("BUSINESS_UTC_OFFSET_MINUTES") {
            Some(value) => value
                .parse::<i32>()
                .ok()
                .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
                .ok_or(ConfigError::Invalid {
                    key: "BUSINESS_UTC_OFFSET_MINUTES",
                    value,
                })?,
            None => utc_offset(),
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            db_max_connections,
            business_offset,
        })
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}
