//! Runtime configuration loaded from the environment.
//!
//! `.env` files are picked up by `dotenvy` in `main` before this runs.

use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_SERVICE_CACHE_TTL_SECS: u64 = 300;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// How incoming session tokens are verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthConfig {
    /// Delegate to the external auth service
    Remote {
        url: String,
        api_key: Option<String>,
    },
    /// Single fixed token, for local development only
    DevToken(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub auth: AuthConfig,
    pub service_cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (env vars in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = parse_or(
            "BIND_ADDR",
            get("BIND_ADDR"),
            SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
        )?;

        let database_max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            get("DATABASE_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS,
        )?;

        let cache_ttl_secs = parse_or(
            "SERVICE_CACHE_TTL_SECS",
            get("SERVICE_CACHE_TTL_SECS"),
            DEFAULT_SERVICE_CACHE_TTL_SECS,
        )?;

        let auth = match (get("AUTH_SERVICE_URL"), get("DEV_API_TOKEN")) {
            (Some(url), _) => AuthConfig::Remote {
                url,
                api_key: get("AUTH_SERVICE_API_KEY"),
            },
            (None, Some(token)) => AuthConfig::DevToken(token),
            (None, None) => return Err(ConfigError::Missing("AUTH_SERVICE_URL")),
        };

        Ok(Self {
            database_url,
            database_max_connections,
            bind_addr,
            auth,
            service_cache_ttl: Duration::from_secs(cache_ttl_secs),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|_| ConfigError::Invalid { name, value })
        }
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_remote_auth() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/gas"),
            ("AUTH_SERVICE_URL", "https://auth.example.com"),
            ("AUTH_SERVICE_API_KEY", "anon-key"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "postgres://localhost/gas");
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.service_cache_ttl, Duration::from_secs(300));
        assert_eq!(
            config.auth,
            AuthConfig::Remote {
                url: "https://auth.example.com".to_string(),
                api_key: Some("anon-key".to_string()),
            }
        );
    }

    #[test]
    fn test_dev_token_when_no_auth_url() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/gas"),
            ("DEV_API_TOKEN", "dev-secret"),
        ]))
        .unwrap();

        assert_eq!(config.auth, AuthConfig::DevToken("dev-secret".to_string()));
    }

    #[test]
    fn test_missing_database_url() {
        let err = Config::from_lookup(lookup(&[("DEV_API_TOKEN", "x")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_missing_auth() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("AUTH_SERVICE_URL")));
    }

    #[test]
    fn test_invalid_number() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("DEV_API_TOKEN", "x"),
            ("DATABASE_MAX_CONNECTIONS", "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "DATABASE_MAX_CONNECTIONS",
                ..
            }
        ));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("AUTH_SERVICE_URL", "  "),
            ("DEV_API_TOKEN", "dev"),
            ("BIND_ADDR", "127.0.0.1:3000"),
        ]))
        .unwrap();
        assert_eq!(config.auth, AuthConfig::DevToken("dev".to_string()));
        assert_eq!(config.bind_addr.port(), 3000);
    }
}
