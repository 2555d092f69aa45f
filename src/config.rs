//! Service configuration loaded from environment variables.
//!
//! `main` calls `dotenvy::dotenv()` first, so a `.env` file can provide any of these.
//!
//! - `HOST` - Bind address (default: `0.0.0.0`)
//! - `PORT` - Server port number (default: `8080`)
//! - `DATABASE_URL` - Path to the store file (default: `data.db`)
//! - `RUST_LOG` - Log filter (default: `snaplink=debug,tower_http=debug`)

use std::env;

use anyhow::{Context, Result};

const DEFAULT_LOG_FILTER: &str = "snaplink=debug,tower_http=debug";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub log_filter: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but is not a valid port number.
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("PORT must be a port number, got `{raw}`"))?,
            Err(_) => 8080,
        };

        let database_path = env::var("DATABASE_URL").unwrap_or_else(|_| "data.db".to_string());
        let log_filter = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            host,
            port,
            database_path,
            log_filter,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
