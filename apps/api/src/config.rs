use anyhow::{Context, Result};

const DEFAULT_MATCHMAKING_URL: &str = "http://127.0.0.1:8000/run-live-matchmaking";
const DEFAULT_MATCHMAKING_TIMEOUT_SECS: u64 = 120;
const DEFAULT_INTAKE_SESSION_TTL_SECS: u64 = 60 * 60;

/// Application configuration loaded from environment variables.
/// Fails at startup if a present variable cannot be parsed.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL record store. When unset, records live in process memory.
    pub database_url: Option<String>,
    pub matchmaking_url: String,
    pub matchmaking_timeout_secs: u64,
    /// Idle time after which an intake session is discarded.
    pub intake_session_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            matchmaking_url: optional_env("MATCHMAKING_URL")
                .unwrap_or_else(|| DEFAULT_MATCHMAKING_URL.to_string()),
            matchmaking_timeout_secs: match optional_env("MATCHMAKING_TIMEOUT_SECS") {
                Some(raw) => raw
                    .parse::<u64>()
                    .context("MATCHMAKING_TIMEOUT_SECS must be a whole number of seconds")?,
                None => DEFAULT_MATCHMAKING_TIMEOUT_SECS,
            },
            intake_session_ttl_secs: match optional_env("INTAKE_SESSION_TTL_SECS") {
                Some(raw) => raw
                    .parse::<u64>()
                    .context("INTAKE_SESSION_TTL_SECS must be a whole number of seconds")?,
                None => DEFAULT_INTAKE_SESSION_TTL_SECS,
            },
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads a variable, treating blank values the same as missing ones.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
