//! Application configuration loaded from environment variables.

use std::net::SocketAddr;

use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Database ===
    /// PostgreSQL connection string.
    pub database_url: String,

    /// Upper bound on open pool connections.
    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    /// Connections the pool keeps open while idle.
    #[serde(default = "default_min_connections")]
    pub db_min_connections: u32,

    // === Server Configuration ===
    /// Address the HTTP server binds to. `:3000` binds all interfaces.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    5
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.is_empty() {
            return Err("DATABASE_URL is required".to_string());
        }

        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err("DATABASE_URL must be a postgres:// URL".to_string());
        }

        if self.db_max_connections == 0 {
            return Err("DB_MAX_CONNECTIONS must be at least 1".to_string());
        }

        if self.db_min_connections > self.db_max_connections {
            return Err("DB_MIN_CONNECTIONS must not exceed DB_MAX_CONNECTIONS".to_string());
        }

        self.socket_addr()?;

        Ok(())
    }

    /// Parse the listen address.
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        parse_listen_addr(&self.listen_addr)
    }

    /// Database URL without its password, for logging.
    pub fn redacted_database_url(&self) -> String {
        redact_password(&self.database_url)
    }
}

/// Parse a listen address, accepting the port-only `:PORT` form.
pub fn parse_listen_addr(raw: &str) -> Result<SocketAddr, String> {
    let candidate = if raw.starts_with(':') {
        format!("0.0.0.0{raw}")
    } else {
        raw.to_string()
    };

    candidate
        .parse()
        .map_err(|e| format!("LISTEN_ADDR {raw:?} is not a valid socket address: {e}"))
}

fn redact_password(url: &str) -> String {
    let Ok(options) = url.parse::<PgConnectOptions>() else {
        return "<unparsable database url>".to_string();
    };
    let scheme = url.split_once("://").map_or("postgres", |(scheme, _)| scheme);

    format!(
        "{scheme}://{}@{}:{}/{}",
        options.get_username(),
        options.get_host(),
        options.get_port(),
        options.get_database().unwrap_or_default()
    )
}
