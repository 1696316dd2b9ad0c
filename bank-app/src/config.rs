//! Configuration loading from environment.

use std::env;

use bank_repo::SecretConfig;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub secrets: SecretConfig,
    /// Client name of the first API key issued by `/api/bootstrap`
    pub admin_name: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()?;

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let cost = match lookup("SECRET_HASH_COST") {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("SECRET_HASH_COST must be a number, got {raw}"))?,
            None => SecretConfig::default().cost,
        };

        let admin_name = lookup("ADMIN_NAME").unwrap_or_else(|| "admin".to_string());
        if admin_name.trim().is_empty() {
            anyhow::bail!("ADMIN_NAME cannot be empty");
        }

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            port,
            database_url,
            secrets: SecretConfig { cost },
            admin_name,
            log_format,
        })
    }
}
