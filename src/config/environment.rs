// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Environment-based configuration management for production deployment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::warn;

use crate::constants::{defaults, env_names, limits};

/// Environment type for security and logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// SQLite database with file path
    SQLite {
        /// Path to the database file
        path: PathBuf,
    },
    /// In-memory SQLite (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from a connection string
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        let path_str = s.strip_prefix("sqlite:").unwrap_or(s);
        if path_str == ":memory:" {
            Self::Memory
        } else {
            Self::SQLite {
                path: PathBuf::from(path_str),
            }
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        DatabaseUrl::parse_url(defaults::DATABASE_URL)
    }
}

impl std::fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session token signing secret
    pub session_secret: Vec<u8>,
    /// Session token expiry in hours
    pub token_expiry_hours: i64,
    /// Pre-shared key required to create ROOT users; `None` disables the
    /// endpoint
    pub root_setup_key: Option<String>,
}

/// Tenancy / hostname-resolution configuration
#[derive(Debug, Clone)]
pub struct TenancyConfig {
    /// Base domain below which tenant subdomains live (e.g. `medmap.app`)
    pub base_domain: String,
    /// Reserved apex label treated as "no tenant" (e.g. `www`)
    pub apex_label: String,
}

/// Server configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Database location
    pub database_url: DatabaseUrl,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Tenancy configuration
    pub tenancy: TenancyConfig,
    /// Deployment environment
    pub environment: Environment,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable fails to parse. A missing session
    /// secret is generated on the fly outside production and rejected in
    /// production.
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_str_or_default(
            &env::var(env_names::ENVIRONMENT).unwrap_or_default(),
        );

        let http_port = match env::var(env_names::HTTP_PORT) {
            Ok(v) => v
                .parse()
                .with_context(|| format!("invalid {}: {v}", env_names::HTTP_PORT))?,
            Err(_) => defaults::HTTP_PORT,
        };

        let database_url = env::var(env_names::DATABASE_URL)
            .map_or_else(|_| DatabaseUrl::default(), |s| DatabaseUrl::parse_url(&s));

        let session_secret = Self::session_secret_from_env(&environment)?;

        let token_expiry_hours = match env::var(env_names::TOKEN_EXPIRY_HOURS) {
            Ok(v) => v
                .parse()
                .with_context(|| format!("invalid {}: {v}", env_names::TOKEN_EXPIRY_HOURS))?,
            Err(_) => limits::DEFAULT_SESSION_HOURS,
        };

        let base_domain = env::var(env_names::BASE_DOMAIN)
            .unwrap_or_else(|_| defaults::BASE_DOMAIN.to_owned());
        let apex_label =
            env::var(env_names::APEX_LABEL).unwrap_or_else(|_| defaults::APEX_LABEL.to_owned());

        Ok(Self {
            http_port,
            database_url,
            auth: AuthConfig {
                session_secret,
                token_expiry_hours,
                root_setup_key: env::var(env_names::ROOT_SETUP_KEY).ok(),
            },
            tenancy: TenancyConfig {
                base_domain,
                apex_label,
            },
            environment,
        })
    }

    fn session_secret_from_env(environment: &Environment) -> Result<Vec<u8>> {
        if let Ok(hex) = env::var(env_names::SESSION_SECRET) {
            return decode_hex(&hex)
                .with_context(|| format!("{} must be hex-encoded", env_names::SESSION_SECRET));
        }
        if environment.is_production() {
            anyhow::bail!(
                "{} must be set in production; sessions would not survive a restart otherwise",
                env_names::SESSION_SECRET
            );
        }
        warn!(
            "{} not set; generating an ephemeral session secret",
            env_names::SESSION_SECRET
        );
        Ok(crate::auth::generate_session_secret().to_vec())
    }

    /// One-line configuration summary for startup logging. Never includes
    /// secrets.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "http_port={} database={} base_domain={} apex={} environment={}",
            self.http_port,
            self.database_url,
            self.tenancy.base_domain,
            self.tenancy.apex_label,
            self.environment
        )
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    if s.len() % 2 != 0 {
        anyhow::bail!("odd-length hex string");
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16).map_err(|e| anyhow::anyhow!("bad hex byte: {e}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_parsing() {
        assert!(DatabaseUrl::parse_url("sqlite::memory:").is_memory());
        let file = DatabaseUrl::parse_url("sqlite:./data/medmap.db");
        assert_eq!(file.to_connection_string(), "sqlite:./data/medmap.db");
        // Bare paths are treated as SQLite files.
        let bare = DatabaseUrl::parse_url("./medmap.db");
        assert_eq!(bare.to_connection_string(), "sqlite:./medmap.db");
    }

    #[test]
    fn test_environment_parsing() {
        assert!(Environment::from_str_or_default("prod").is_production());
        assert_eq!(
            Environment::from_str_or_default("anything-else"),
            Environment::Development
        );
    }

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex("00ff10").unwrap(), vec![0x00, 0xff, 0x10]);
        assert!(decode_hex("0g").is_err());
        assert!(decode_hex("abc").is_err());
    }
}
