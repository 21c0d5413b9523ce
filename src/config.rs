//! Configuration loader for the `aquafield` backend service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// TCP port the HTTP server binds.
    pub port: u32,

    /// Secret used to sign and verify access tokens.
    pub jwt_secret: String,

    /// Issued-token lifetime in hours.
    pub token_ttl_hours: u32,

    /// bcrypt work factor for password hashing.
    pub bcrypt_cost: u32,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – PostgreSQL connection string
/// - `JWT_SECRET` – token signing secret
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `PORT` – HTTP listen port (default: 8080)
/// - `TOKEN_TTL_HOURS` – token lifetime (default: 720)
/// - `BCRYPT_COST` – bcrypt work factor (default: 10)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DATABASE_URL");
    let jwt_secret = require_env!("JWT_SECRET");
    let db_pool_max = parse_env_u32!("DB_POOL_MAX", 5);
    let port = parse_env_u32!("PORT", 8080);
    let token_ttl_hours = parse_env_u32!("TOKEN_TTL_HOURS", 720);
    let bcrypt_cost = parse_env_u32!("BCRYPT_COST", 10);

    Ok(Config {
        db_url,
        db_pool_max,
        port,
        jwt_secret,
        token_ttl_hours,
        bcrypt_cost,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks sensitive information like database passwords and the token
    /// secret while showing all configuration values that were loaded.
    pub fn log_config(&self) {
        // ---
        // Mask the password in the database URL for security
        let masked_db_url = if let Some(at_pos) = self.db_url.rfind('@') {
            if let Some(colon_pos) = self.db_url[..at_pos].rfind(':') {
                format!(
                    "{}:****{}",
                    &self.db_url[..colon_pos],
                    &self.db_url[at_pos..]
                )
            } else {
                self.db_url.clone()
            }
        } else {
            self.db_url.clone()
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL    : {}", masked_db_url);
        tracing::info!("  DB_POOL_MAX     : {}", self.db_pool_max);
        tracing::info!("  PORT            : {}", self.port);
        tracing::info!("  JWT_SECRET      : ****");
        tracing::info!("  TOKEN_TTL_HOURS : {}", self.token_ttl_hours);
        tracing::info!("  BCRYPT_COST     : {}", self.bcrypt_cost);
    }
}
