use anyhow::{Context, Result};

/// Largest source accepted by the compile endpoint, in bytes.
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 256 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_source_bytes: usize,
    pub cors_permissive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
            cors_permissive: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: parse_env("PORT", defaults.port).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            max_source_bytes: parse_env("MAX_SOURCE_BYTES", defaults.max_source_bytes)
                .context("MAX_SOURCE_BYTES must be a non-negative integer")?,
            cors_permissive: parse_env("CORS_PERMISSIVE", defaults.cors_permissive)
                .context("CORS_PERMISSIVE must be true or false")?,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value '{raw}' for environment variable '{key}'")),
        Err(_) => Ok(default),
    }
}
