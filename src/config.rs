use std::path::PathBuf;

use anyhow::Context;

use crate::db;

/// Server configuration loaded from environment variables.
///
/// Command-line flags override these values in `main`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `127.0.0.1`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// SQLite file (default: under the platform data directory).
    pub database_path: PathBuf,
    /// Allowed CORS origins from the comma-separated `CORS_ORIGINS`.
    /// `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_path: db::default_path(),
            cors_origins: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment, falling back to defaults.
    ///
    /// | Env Var         | Default                      |
    /// |-----------------|------------------------------|
    /// | `HOST`          | `127.0.0.1`                  |
    /// | `PORT`          | `3000`                       |
    /// | `DATABASE_PATH` | platform data dir            |
    /// | `CORS_ORIGINS`  | unset (any origin)           |
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);

        let port = match lookup("PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got {port:?}"))?,
            None => defaults.port,
        };

        let database_path = lookup("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty());

        Ok(Self {
            host,
            port,
            database_path,
            cors_origins,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
