//! Process configuration, loaded once at startup.
//!
//! Every value comes from the environment (optionally seeded from a `.env` file by
//! `main`). Loading fails fast: a missing or too-short signing key, or an unparseable
//! number, is reported as a [`ConfigError`] before any socket is bound.

use std::env;
use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;

/// Minimum length of the token signing secret, in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

/// Longest accepted token lifetime: one year.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("JWT_SECRET must be at least {min} bytes, got {len}")]
    SecretTooShort { len: usize, min: usize },
}

/// Settings consumed by the token service.
#[derive(Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"[hidden]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwtSettings {
    /// Rejects secrets shorter than [`MIN_SECRET_BYTES`].
    pub fn check_secret(&self) -> Result<(), ConfigError> {
        let len = self.secret.as_bytes().len();
        if len < MIN_SECRET_BYTES {
            return Err(ConfigError::SecretTooShort {
                len,
                min: MIN_SECRET_BYTES,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub bcrypt_cost: u32,
    pub jwt: JwtSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                reason: format!("{} is outside 4..=31", bcrypt_cost),
            });
        }

        let ttl_minutes: i64 = parse_or(&lookup, "JWT_TTL_MINUTES", 60)?;
        if !(1..=MAX_TTL_MINUTES).contains(&ttl_minutes) {
            return Err(ConfigError::Invalid {
                key: "JWT_TTL_MINUTES",
                reason: format!("{} is outside 1..={}", ttl_minutes, MAX_TTL_MINUTES),
            });
        }
        let ttl = Duration::try_minutes(ttl_minutes).ok_or_else(|| ConfigError::Invalid {
            key: "JWT_TTL_MINUTES",
            reason: "out of range".into(),
        })?;

        let jwt = JwtSettings {
            secret: required("JWT_SECRET")?,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "tasklist".to_string()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "tasklist-clients".to_string()),
            ttl,
        };
        jwt.check_secret()?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            bcrypt_cost,
            jwt,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://test"), ("JWT_SECRET", SECRET)]).unwrap();

        assert_eq!(config.database_url, "postgres://test");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.jwt.issuer, "tasklist");
        assert_eq!(config.jwt.audience, "tasklist-clients");
        assert_eq!(config.jwt.ttl, Duration::minutes(60));
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_custom_values() {
        let config = load(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", SECRET),
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("JWT_ISSUER", "issuer-x"),
            ("JWT_AUDIENCE", "aud-y"),
            ("JWT_TTL_MINUTES", "15"),
            ("BCRYPT_COST", "4"),
        ])
        .unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.jwt.issuer, "issuer-x");
        assert_eq!(config.jwt.audience, "aud-y");
        assert_eq!(config.jwt.ttl, Duration::minutes(15));
        assert_eq!(config.bcrypt_cost, 4);
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let err = load(&[("DATABASE_URL", "postgres://test")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let err = load(&[("DATABASE_URL", "postgres://test"), ("JWT_SECRET", "too-short")])
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::SecretTooShort { len: 9, min: MIN_SECRET_BYTES }
        ));
    }

    #[test]
    fn test_bad_numbers_are_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", SECRET),
            ("SERVER_PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SERVER_PORT", .. }));

        let err = load(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", SECRET),
            ("BCRYPT_COST", "2"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BCRYPT_COST", .. }));
    }

    #[test]
    fn test_ttl_out_of_range_is_rejected() {
        for raw in ["0", "-5", "100000000000000", "9223372036854775807"] {
            let err = load(&[
                ("DATABASE_URL", "postgres://test"),
                ("JWT_SECRET", SECRET),
                ("JWT_TTL_MINUTES", raw),
            ])
            .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: "JWT_TTL_MINUTES", .. }),
                "{} gave {:?}",
                raw,
                err
            );
        }

        let config = load(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", SECRET),
            ("JWT_TTL_MINUTES", &MAX_TTL_MINUTES.to_string()),
        ])
        .unwrap();
        assert_eq!(config.jwt.ttl, Duration::minutes(MAX_TTL_MINUTES));
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = load(&[("DATABASE_URL", "postgres://test"), ("JWT_SECRET", SECRET)]).unwrap();
        assert!(!format!("{:?}", config).contains(SECRET));
    }
}
