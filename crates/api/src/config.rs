//! Application configuration loaded from environment variables.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use secrecy::SecretString;
use thiserror::Error;

/// Configuration values that cannot be used as given.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("TOKEN_SECRET is set but empty")]
    EmptyTokenSecret,

    #[error("ADMIN_EMAIL and ADMIN_PASSWORD must be set together")]
    IncompleteAdmin,
}

/// Account granted the admin role at startup.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: SecretString,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `DATABASE_URL` — PostgreSQL URL; the in-memory repository is used when unset
/// - `DATABASE_MAX_CONNECTIONS` — pool size (default: `5`)
/// - `TOKEN_SECRET` — token signing secret; a random one is generated when unset
/// - `ADMIN_EMAIL` / `ADMIN_PASSWORD` — optional bootstrap admin account
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub token_secret: Option<SecretString>,
    pub admin: Option<AdminBootstrap>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let token_secret = match lookup("TOKEN_SECRET") {
            Some(secret) if secret.is_empty() => return Err(ConfigError::EmptyTokenSecret),
            Some(secret) => Some(SecretString::from(secret)),
            None => None,
        };

        let admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap {
                email,
                password: SecretString::from(password),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteAdmin),
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.database_max_connections),
            token_secret,
            admin,
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the configured signing secret, or a fresh random one.
    ///
    /// Tokens signed with a generated secret stop verifying once the process
    /// exits.
    pub fn signing_secret(&self) -> SecretString {
        match &self.token_secret {
            Some(secret) => secret.clone(),
            None => {
                tracing::warn!(
                    "TOKEN_SECRET not set, generating a random secret; tokens will not survive a restart"
                );
                let bytes: [u8; 32] = rand::random();
                SecretString::from(URL_SAFE_NO_PAD.encode(bytes))
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            database_max_connections: 5,
            token_secret: None,
            admin: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.database_max_connections, 5);
        assert!(config.database_url.is_none());
        assert!(config.token_secret.is_none());
        assert!(config.admin.is_none());
    }

    #[test]
    fn test_empty_environment_gives_defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_reads_variables() {
        let config = from_pairs(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("TOKEN_SECRET", "s3cret"),
            ("ADMIN_EMAIL", "root@x.com"),
            ("ADMIN_PASSWORD", "pw"),
        ])
        .unwrap();

        assert_eq!(config.addr(), "127.0.0.1:8080");
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/shop")
        );
        assert_eq!(config.database_max_connections, 12);
        assert_eq!(config.signing_secret().expose_secret(), "s3cret");

        let admin = config.admin.unwrap();
        assert_eq!(admin.email, "root@x.com");
        assert_eq!(admin.password.expose_secret(), "pw");
    }

    #[test]
    fn test_unparseable_port_falls_back() {
        let config = from_pairs(&[("PORT", "not-a-port")]).unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_empty_token_secret_is_rejected() {
        let err = from_pairs(&[("TOKEN_SECRET", "")]).unwrap_err();
        assert_eq!(err, ConfigError::EmptyTokenSecret);
    }

    #[test]
    fn test_admin_needs_both_variables() {
        let err = from_pairs(&[("ADMIN_EMAIL", "root@x.com")]).unwrap_err();
        assert_eq!(err, ConfigError::IncompleteAdmin);
    }

    #[test]
    fn test_generated_secret_is_random() {
        let config = Config::default();
        let a = config.signing_secret();
        let b = config.signing_secret();
        assert!(!a.expose_secret().is_empty());
        assert_ne!(a.expose_secret(), b.expose_secret());
    }
}
