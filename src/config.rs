use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_file: PathBuf,
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
    pub seed_demo_users: bool,
    pub rate_per_second: u64,
    pub rate_burst: u32,
    pub tls_self_signed: bool,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `load` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let bcrypt_cost: u32 = try_load(&lookup, "BCRYPT_COST", "12")?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                reason: format!("{bcrypt_cost} is outside 4..=31"),
            });
        }

        Ok(Self {
            host: try_load(&lookup, "HOST", "0.0.0.0")?,
            port: try_load(&lookup, "PORT", "5000")?,
            log_file: try_load(&lookup, "LOG_FILE", "health_logs.txt")?,
            jwt_secret,
            bcrypt_cost,
            seed_demo_users: try_load(&lookup, "SEED_DEMO_USERS", "true")?,
            rate_per_second: try_load(&lookup, "RATE_PER_SECOND", "5")?,
            rate_burst: try_load(&lookup, "RATE_BURST", "10")?,
            tls_self_signed: try_load(&lookup, "TLS_SELF_SIGNED", "false")?,
        })
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn secret_is_required() {
        let err = Config::from_lookup(lookup(&[])).err();
        assert_eq!(err, Some(ConfigError::Missing("JWT_SECRET")));

        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "  ")])).err();
        assert_eq!(err, Some(ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.log_file, PathBuf::from("health_logs.txt"));
        assert_eq!(config.bcrypt_cost, 12);
        assert!(config.seed_demo_users);
        assert!(!config.tls_self_signed);
    }

    #[test]
    fn bad_values_are_errors_not_defaults() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "s"), ("PORT", "http")])).err();
        assert!(matches!(err, Some(ConfigError::Invalid { key: "PORT", .. })));

        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "s"), ("BCRYPT_COST", "2")])).err();
        assert!(matches!(err, Some(ConfigError::Invalid { key: "BCRYPT_COST", .. })));
    }
}
