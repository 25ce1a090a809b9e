//! Server configuration
//!
//! Everything is read from the environment once at start-up (`.env` is
//! loaded by the binary through `dotenvy`). Parsing goes through a lookup
//! function so tests never have to mutate the process environment.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::database::DatabaseConfig;
use crate::validation::CreatePolicy;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOG_FILE: &str = "log.txt";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Environment lookup; empty values count as unset.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

pub(crate) fn env_lookup(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

pub(crate) fn lookup_var(lookup: Lookup<'_>, var: &str) -> Option<String> {
    lookup(var).filter(|value| !value.trim().is_empty())
}

pub(crate) fn parse_var<T>(lookup: Lookup<'_>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup_var(lookup, var) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

pub(crate) fn parse_flag(lookup: Lookup<'_>, var: &'static str, default: bool) -> Result<bool, ConfigError> {
    match lookup_var(lookup, var) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                var,
                value: raw,
                reason: "expected a boolean".to_string(),
            }),
        },
        None => Ok(default),
    }
}

/// Complete process configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Directory of the action log file.
    pub log_dir: PathBuf,
    pub log_file: String,
    pub policy: CreatePolicy,
    pub database: DatabaseConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&env_lookup)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self, ConfigError> {
        let bind_addr = match lookup_var(lookup, "SIRET_BIND_ADDR") {
            Some(addr) => addr,
            None => format!("0.0.0.0:{}", parse_var(lookup, "PORT", DEFAULT_PORT)?),
        };

        Ok(Self {
            bind_addr,
            log_dir: lookup_var(lookup, "SIRET_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            log_file: lookup_var(lookup, "SIRET_LOG_FILE")
                .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
            policy: CreatePolicy {
                require_trade_name: parse_flag(lookup, "SIRET_REQUIRE_TRADE_NAME", false)?,
            },
            database: DatabaseConfig::from_lookup(lookup)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(&lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.log_dir, PathBuf::from("."));
        assert_eq!(config.log_file, "log.txt");
        assert!(!config.policy.require_trade_name);
    }

    #[test]
    fn test_port_and_policy_overrides() {
        let config = ServerConfig::from_lookup(&lookup_from(&[
            ("PORT", "8080"),
            ("SIRET_REQUIRE_TRADE_NAME", "true"),
            ("SIRET_LOG_DIR", "/var/log/siret"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert!(config.policy.require_trade_name);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/siret"));
    }

    #[test]
    fn test_bind_addr_wins_over_port() {
        let config = ServerConfig::from_lookup(&lookup_from(&[
            ("PORT", "8080"),
            ("SIRET_BIND_ADDR", "127.0.0.1:4000"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:4000");
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = ServerConfig::from_lookup(&lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));

        let err = ServerConfig::from_lookup(&lookup_from(&[("SIRET_REQUIRE_TRADE_NAME", "maybe")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "SIRET_REQUIRE_TRADE_NAME",
                ..
            }
        ));
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let config = ServerConfig::from_lookup(&lookup_from(&[("PORT", "  ")])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
    }
}
