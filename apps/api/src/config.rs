use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_API_URL;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub groq_api_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Seconds a generation error banner stays up before the page returns to idle.
    pub error_display_secs: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            groq_api_key: require_env("GROQ_API_KEY")?,
            groq_api_url: std::env::var("GROQ_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            error_display_secs: std::env::var("ERROR_DISPLAY_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse::<u32>()
                .context("ERROR_DISPLAY_SECS must be a non-negative number of seconds")?
                .into(),
        })
    }

    pub fn error_display(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.error_display_secs)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
