//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;

use sqlx::postgres::PgConnectOptions;

/// Signing key used when `JWT_SECRET` is not set; tokens issued by earlier
/// deployments were signed with it
pub const DEFAULT_JWT_SECRET: &str = "OWENMURCIADANIELBARRUETOANDRESAVILA";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database host
    pub db_host: String,

    /// Database port
    pub db_port: u16,

    /// Database user
    pub db_user: String,

    /// Database password (may be empty)
    pub db_password: String,

    /// Database name
    pub db_name: String,

    /// Schema placed on the connection `search_path`
    pub db_schema: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// HS256 signing key for bearer tokens
    pub jwt_secret: String,

    /// Record every gated request in the audit table
    pub audit_request_log: bool,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingEnv(key))
        };

        let port = required("PORT")?
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let db_host = required("DB_HOST")?;
        let db_user = required("DB_USER")?;
        let db_name = required("DB_NAME")?;
        let db_schema = required("DB_SCHEMA")?;

        let db_port = lookup("DB_PORT")
            .unwrap_or_else(|| "5432".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DB_PORT"))?;

        let db_password = lookup("DB_PASSWORD").unwrap_or_default();

        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());

        let audit_request_log = match lookup("AUDIT_REQUEST_LOG").as_deref() {
            None | Some("") => false,
            Some(value) => parse_bool(value).ok_or(ConfigError::InvalidValue("AUDIT_REQUEST_LOG"))?,
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(_) => return Err(ConfigError::InvalidValue("LOG_FORMAT")),
        };

        Ok(Self {
            db_host,
            db_port,
            db_user,
            db_password,
            db_name,
            db_schema,
            database_max_connections,
            host,
            port,
            environment,
            jwt_secret,
            audit_request_log,
            log_format,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Whether the built-in signing key is in use
    pub fn uses_default_jwt_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    /// Connection options with the schema set as `search_path`
    pub fn connect_options(&self) -> PgConnectOptions {
        let mut options = PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_user)
            .database(&self.db_name)
            .options([("search_path", self.db_schema.as_str())]);

        if !self.db_password.is_empty() {
            options = options.password(&self.db_password);
        }

        options
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("PORT", "4000"),
        ("DB_HOST", "localhost"),
        ("DB_USER", "foodloop"),
        ("DB_NAME", "donaciones"),
        ("DB_SCHEMA", "ods"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(MINIMAL)).unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.db_port, 5432);
        assert_eq!(config.db_password, "");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.database_max_connections, 10);
        assert!(!config.audit_request_log);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.uses_default_jwt_secret());
        assert_eq!(config.jwt_secret, "OWENMURCIADANIELBARRUETOANDRESAVILA");
        assert!(!config.is_production());
    }

    #[test]
    fn test_missing_required() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "4000")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv("DB_HOST")));
    }

    #[test]
    fn test_invalid_port() {
        let mut pairs = MINIMAL.to_vec();
        pairs[0] = ("PORT", "not-a-port");
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("PORT")));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = MINIMAL.to_vec();
        pairs.extend_from_slice(&[
            ("DB_PORT", "6543"),
            ("JWT_SECRET", "s3cret"),
            ("AUDIT_REQUEST_LOG", "true"),
            ("LOG_FORMAT", "json"),
            ("ENVIRONMENT", "production"),
        ]);
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.db_port, 6543);
        assert_eq!(config.jwt_secret, "s3cret");
        assert!(!config.uses_default_jwt_secret());
        assert!(config.audit_request_log);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.is_production());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("LOG_FORMAT", "xml"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("LOG_FORMAT")));
    }
}
