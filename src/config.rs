//! Database connection settings, read once from the environment at startup.

use thiserror::Error;

pub const ENV_DB_HOST: &str = "DB_HOST";
pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_DB_PORT: &str = "DB_PORT";
pub const ENV_DB_NAME: &str = "DB_NAME";

pub const REQUIRED_VARS: [&str; 5] = [
    ENV_DB_HOST,
    ENV_DB_USER,
    ENV_DB_PASSWORD,
    ENV_DB_PORT,
    ENV_DB_NAME,
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {0}")]
    Missing(String),
    #[error("DB_PORT is not a valid port number: '{0}'")]
    InvalidPort(String),
}

/// Connection settings for the indexer's PostgreSQL instance.
///
/// All five values are required and must be non-empty; the jobs refuse to
/// start without them, before any connection is attempted.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub port: u16,
    pub db_name: String,
}

impl DbConfig {
    /// Read the settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any name-to-value lookup. Empty values count as missing,
    /// and every missing variable is reported in one error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing: Vec<&str> = Vec::new();
        let mut required = |name: &'static str| -> String {
            match lookup(name) {
                Some(value) if !value.is_empty() => value,
                _ => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let host = required(ENV_DB_HOST);
        let user = required(ENV_DB_USER);
        let password = required(ENV_DB_PASSWORD);
        let port_raw = required(ENV_DB_PORT);
        let db_name = required(ENV_DB_NAME);

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing.join(", ")));
        }

        let port = port_raw
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(port_raw))?;

        Ok(Self {
            host,
            user,
            password,
            port,
            db_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (ENV_DB_HOST, "localhost"),
            (ENV_DB_USER, "indexer"),
            (ENV_DB_PASSWORD, "hunter2"),
            (ENV_DB_PORT, "5432"),
            (ENV_DB_NAME, "cosmos_indexer"),
        ])
    }

    fn lookup<'a>(env: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| env.get(name).map(|v| v.to_string())
    }

    #[test]
    fn test_complete_environment_parses() {
        let env = full_env();
        let cfg = DbConfig::from_lookup(lookup(&env)).unwrap();
        assert_eq!(cfg.host, "localhost");
        assert_eq!(cfg.user, "indexer");
        assert_eq!(cfg.password, "hunter2");
        assert_eq!(cfg.port, 5432);
        assert_eq!(cfg.db_name, "cosmos_indexer");
    }

    #[test]
    fn test_each_missing_var_is_fatal() {
        for var in REQUIRED_VARS {
            let mut env = full_env();
            env.remove(var);
            let err = DbConfig::from_lookup(lookup(&env)).unwrap_err();
            assert!(matches!(err, ConfigError::Missing(_)));
            assert!(err.to_string().contains(var), "error should name {}", var);
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut env = full_env();
        env.insert(ENV_DB_PASSWORD, "");
        let err = DbConfig::from_lookup(lookup(&env)).unwrap_err();
        assert!(err.to_string().contains(ENV_DB_PASSWORD));
    }

    #[test]
    fn test_all_missing_lists_every_var() {
        let err = DbConfig::from_lookup(|_| None).unwrap_err();
        let msg = err.to_string();
        for var in REQUIRED_VARS {
            assert!(msg.contains(var), "error should name {}", var);
        }
    }

    #[test]
    fn test_invalid_port_rejected() {
        for bad in ["fivefourthreetwo", "70000", "-1", "5432.0"] {
            let mut env = full_env();
            env.insert(ENV_DB_PORT, bad);
            let err = DbConfig::from_lookup(lookup(&env)).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidPort(_)), "port '{}'", bad);
        }
    }
}
