use anyhow::{Context, Result};
use std::env;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ERROR_LOG_CAPACITY: usize = 10_000;

/// Configuration for the telemetry API
/// Loads settings from environment variables with defaults matching the public contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address to bind the HTTP server to (default: "0.0.0.0")
    pub bind_address: String,
    /// HTTP port (default: 8080)
    pub port: u16,
    /// Maximum number of rejected payloads kept in memory, `None` for no limit
    pub error_log_capacity: Option<NonZeroUsize>,
}

impl Config {
    /// Reads `BIND_ADDRESS`, `PORT` and `ERROR_LOG_CAPACITY` from the process
    /// environment, see [`load_env_file`] for seeding it from a file.
    /// `ERROR_LOG_CAPACITY=0` turns the cap off.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_address = read("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let port: u16 = match read("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("PORT must be a port number, got {raw:?}"))?,
            None => DEFAULT_PORT,
        };

        let capacity: usize = match read("ERROR_LOG_CAPACITY") {
            Some(raw) => raw.parse().with_context(|| {
                format!("ERROR_LOG_CAPACITY must be a non-negative integer, got {raw:?}")
            })?,
            None => DEFAULT_ERROR_LOG_CAPACITY,
        };

        Ok(Self {
            bind_address,
            port,
            error_log_capacity: NonZeroUsize::new(capacity),
        })
    }
}

/// Seeds the environment from `env_file` when it exists. Without it, outside
/// of `DEPLOYMENT=PROD`, a `.env` found in the working directory or its parents
/// is used instead. Variables already set are left alone. Returns the file that
/// was applied, if any.
pub fn load_env_file(env_file: &Path) -> Result<Option<PathBuf>> {
    if env_file.exists() {
        dotenvy::from_path(env_file)
            .with_context(|| format!("Failed to read env file {}", env_file.display()))?;
        return Ok(Some(env_file.to_path_buf()));
    }
    if env::var("DEPLOYMENT").is_ok_and(|deployment| deployment == "PROD") {
        return Ok(None);
    }
    Ok(dotenvy::dotenv().ok())
}
