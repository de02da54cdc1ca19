use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Everything has a sane default; nothing is required at startup, since the
/// model credential arrives per-request rather than from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub rate_limit_ceiling: u32,
    pub rate_limit_window: Duration,
    pub rate_limit_sweep_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            rate_limit_ceiling: env_or("RATE_LIMIT_CEILING", "5")
                .parse::<u32>()
                .context("RATE_LIMIT_CEILING must be a positive integer")?,
            rate_limit_window: Duration::from_secs(
                env_or("RATE_LIMIT_WINDOW_SECS", "60")
                    .parse::<u64>()
                    .context("RATE_LIMIT_WINDOW_SECS must be a number of seconds")?,
            ),
            rate_limit_sweep_interval: Duration::from_secs(
                env_or("RATE_LIMIT_SWEEP_SECS", "600")
                    .parse::<u64>()
                    .context("RATE_LIMIT_SWEEP_SECS must be a number of seconds")?,
            ),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
