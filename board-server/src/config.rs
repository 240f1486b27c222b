use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use board_core::{DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_RETRIES};
use board_persistence::connection::DEFAULT_DATABASE_URL;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub history_limit: u64,
    /// `None` keeps every claim record.
    pub history_retention: Option<u64>,
    pub compaction_interval_seconds: u64,
    pub claim_max_retries: u32,
    pub seed_sample_users: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; unset variables take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let compaction_interval_seconds = parse_var(
            &lookup,
            "COMPACTION_INTERVAL_SECONDS",
            defaults.compaction_interval_seconds,
        )?;
        if compaction_interval_seconds == 0 {
            return Err(ConfigError::Invalid {
                name: "COMPACTION_INTERVAL_SECONDS",
                value: "0".to_string(),
            });
        }

        let history_retention: Option<u64> = match lookup("HISTORY_RETENTION") {
            Some(value) if !value.trim().is_empty() => Some(value.trim().parse().map_err(|_| {
                ConfigError::Invalid {
                    name: "HISTORY_RETENTION",
                    value,
                }
            })?),
            _ => None,
        };

        let seed_sample_users = match lookup("SEED_SAMPLE_USERS") {
            Some(value) => parse_bool(&value).ok_or(ConfigError::Invalid {
                name: "SEED_SAMPLE_USERS",
                value,
            })?,
            None => defaults.seed_sample_users,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT", defaults.port)?,
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            history_limit: parse_var(&lookup, "HISTORY_LIMIT", defaults.history_limit)?,
            history_retention,
            compaction_interval_seconds,
            claim_max_retries: parse_var(&lookup, "CLAIM_MAX_RETRIES", defaults.claim_max_retries)?,
            seed_sample_users,
        })
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        let ip = self
            .host
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::Invalid {
                name: "HOST",
                value: self.host.clone(),
            })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8001,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            history_retention: None,
            compaction_interval_seconds: 300,
            claim_max_retries: DEFAULT_MAX_RETRIES,
            seed_sample_users: true,
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
