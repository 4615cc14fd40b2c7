//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_DATABASE_URL, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, DEFAULT_SESSION_TTL_HOURS, MIN_JWT_SECRET_LENGTH,
};
use crate::errors::{AppError, AppResult};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    jwt_secret: String,
    pub session_ttl_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub allowed_origins: Vec<String>,
    /// Production mode: session cookies are `Secure` and `SameSite=None`
    pub secure_cookies: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("database_max_connections", &self.database_max_connections)
            .field("jwt_secret", &"[REDACTED]")
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("allowed_origins", &self.allowed_origins)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Fails if `JWT_SECRET` is not set or is too short; the server refuses to
    /// start without a signing secret.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::internal("JWT_SECRET environment variable must be set"))?;

        let mut config = Self::new(
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
        )?;

        if let Some(max) = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.database_max_connections = max;
        }
        if let Some(hours) = env::var("SESSION_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|h| *h > 0)
        {
            config.session_ttl_hours = hours;
        }
        if let Ok(host) = env::var("SERVER_HOST") {
            config.server_host = host;
        }
        if let Some(port) = env::var("SERVER_PORT").ok().and_then(|v| v.parse().ok()) {
            config.server_port = port;
        }
        if let Ok(origins) = env::var("ALLOWED_ORIGINS") {
            config.allowed_origins = parse_origins(&origins);
        }
        config.secure_cookies = env::var("ENV")
            .map(|v| v.eq_ignore_ascii_case("prod"))
            .unwrap_or(false);

        Ok(config)
    }

    /// Build a configuration with defaults for everything but the database URL
    /// and the signing secret.
    pub fn new(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> AppResult<Self> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::internal(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        Ok(Self {
            database_url: database_url.into(),
            database_max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            jwt_secret,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            allowed_origins: Vec::new(),
            secure_cookies: false,
        })
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}
