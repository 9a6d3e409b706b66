//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `SHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOP_PORT` - Listen port (default: 3001)
//! - `SHOP_TOKEN_TTL_HOURS` - Bearer token lifetime in hours (default: 24, max: 720)
//! - `SHOP_CORS_ORIGINS` - Comma-separated origins allowed to call the API
//! - `SHOP_DB_MAX_CONNECTIONS` - Connection pool size (default: 10)
//! - `SHOP_AUTH_RATE_LIMIT_BURST` - Login/register attempts allowed at once per IP (default: 5)
//! - `SHOP_AUTH_RATE_LIMIT_PERIOD_SECS` - Seconds to earn back one attempt (default: 6)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_TOKEN_TTL_HOURS: u64 = 24;
const MAX_TOKEN_TTL_HOURS: u64 = 24 * 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Per-IP limits for the credential routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthRateLimit {
    /// Requests allowed back to back
    pub burst: u32,
    /// Seconds to replenish one request
    pub period_secs: u64,
}

impl Default for AuthRateLimit {
    fn default() -> Self {
        Self {
            burst: 5,
            period_secs: 6,
        }
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Maximum number of pooled database connections
    pub db_max_connections: u32,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// How long an issued bearer token stays valid
    pub token_ttl: Duration,
    /// Origins allowed by the CORS layer (empty disables cross-origin access)
    pub cors_origins: Vec<String>,
    /// Rate limit for `/auth/login` and `/auth/register`
    pub auth_rate_limit: AuthRateLimit,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required keys are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("SHOP_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("SHOP_DATABASE_URL".to_string()))?;

        let host = parse_or_default::<IpAddr>(&lookup, "SHOP_HOST", "127.0.0.1")?;
        let port = parse_or_default::<u16>(&lookup, "SHOP_PORT", "3001")?;
        let db_max_connections = parse_or_default::<u32>(&lookup, "SHOP_DB_MAX_CONNECTIONS", "10")?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOP_DB_MAX_CONNECTIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let ttl_hours = parse_or_default::<u64>(
            &lookup,
            "SHOP_TOKEN_TTL_HOURS",
            &DEFAULT_TOKEN_TTL_HOURS.to_string(),
        )?;
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&ttl_hours) {
            return Err(ConfigError::InvalidEnvVar(
                "SHOP_TOKEN_TTL_HOURS".to_string(),
                format!("must be between 1 and {MAX_TOKEN_TTL_HOURS}"),
            ));
        }

        let defaults = AuthRateLimit::default();
        let auth_rate_limit = AuthRateLimit {
            burst: parse_or_default::<u32>(
                &lookup,
                "SHOP_AUTH_RATE_LIMIT_BURST",
                &defaults.burst.to_string(),
            )?,
            period_secs: parse_or_default::<u64>(
                &lookup,
                "SHOP_AUTH_RATE_LIMIT_PERIOD_SECS",
                &defaults.period_secs.to_string(),
            )?,
        };
        for (key, value) in [
            ("SHOP_AUTH_RATE_LIMIT_BURST", u64::from(auth_rate_limit.burst)),
            ("SHOP_AUTH_RATE_LIMIT_PERIOD_SECS", auth_rate_limit.period_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidEnvVar(
                    key.to_string(),
                    "must be at least 1".to_string(),
                ));
            }
        }

        let cors_origins = lookup("SHOP_CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            db_max_connections,
            host,
            port,
            token_ttl: Duration::from_secs(ttl_hours * 3600),
            cors_origins,
            auth_rate_limit,
            sentry_dsn: lookup("SENTRY_DSN").filter(|s| !s.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Parse a variable, falling back to a default when unset.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            ApiConfig::from_lookup(lookup_from(&[("SHOP_DATABASE_URL", "postgres://db/shop")]))
                .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3001");
        assert_eq!(config.token_ttl, Duration::from_secs(24 * 3600));
        assert_eq!(config.db_max_connections, 10);
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.auth_rate_limit, AuthRateLimit::default());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_database_url_fallback() {
        let config =
            ApiConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://fly/shop")]))
                .unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fly/shop");
    }

    #[test]
    fn test_missing_database_url() {
        let err = ApiConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "SHOP_DATABASE_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let err = ApiConfig::from_lookup(lookup_from(&[
            ("SHOP_DATABASE_URL", "postgres://db/shop"),
            ("SHOP_PORT", "not-a-port"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "SHOP_PORT"));
    }

    #[test]
    fn test_token_ttl_bounds() {
        let err = ApiConfig::from_lookup(lookup_from(&[
            ("SHOP_DATABASE_URL", "postgres://db/shop"),
            ("SHOP_TOKEN_TTL_HOURS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_auth_rate_limit_overrides() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("SHOP_DATABASE_URL", "postgres://db/shop"),
            ("SHOP_AUTH_RATE_LIMIT_BURST", "50"),
            ("SHOP_AUTH_RATE_LIMIT_PERIOD_SECS", "1"),
        ]))
        .unwrap();
        assert_eq!(
            config.auth_rate_limit,
            AuthRateLimit {
                burst: 50,
                period_secs: 1
            }
        );
    }

    #[test]
    fn test_auth_rate_limit_rejects_zero_and_garbage() {
        for (key, value) in [
            ("SHOP_AUTH_RATE_LIMIT_BURST", "0"),
            ("SHOP_AUTH_RATE_LIMIT_PERIOD_SECS", "0"),
            ("SHOP_AUTH_RATE_LIMIT_BURST", "lots"),
        ] {
            let err = ApiConfig::from_lookup(lookup_from(&[
                ("SHOP_DATABASE_URL", "postgres://db/shop"),
                (key, value),
            ]))
            .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == key),
                "{key}={value}"
            );
        }
    }

    #[test]
    fn test_cors_origins_split() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("SHOP_DATABASE_URL", "postgres://db/shop"),
            (
                "SHOP_CORS_ORIGINS",
                "http://localhost:5173, http://localhost:3000,,",
            ),
        ]))
        .unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:5173", "http://localhost:3000"]
        );
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = ApiConfig::from_lookup(lookup_from(&[(
            "SHOP_DATABASE_URL",
            "postgres://shop:hunter2@db/shop",
        )]))
        .unwrap();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("hunter2"));
    }
}
