use std::fmt;

use anyhow::{Context, Result};

pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Application configuration loaded from environment variables.
/// Fails at startup if `OPENAI_API_KEY` is missing.
#[derive(Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_api_url: String,
    pub port: u16,
    /// Request body limit applied to the upload routes.
    pub max_upload_bytes: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_API_URL.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            max_upload_bytes: parse_upload_limit(
                &std::env::var("MAX_UPLOAD_MB").unwrap_or_else(|_| "200".to_string()),
            )?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

// The API key never reaches the logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("openai_api_key", &"<redacted>")
            .field("openai_api_url", &self.openai_api_url)
            .field("port", &self.port)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

/// Converts a megabyte count into bytes, rejecting values that overflow `usize`.
fn parse_upload_limit(megabytes: &str) -> Result<usize> {
    megabytes
        .trim()
        .parse::<usize>()
        .context("MAX_UPLOAD_MB must be a whole number of megabytes")?
        .checked_mul(1024 * 1024)
        .context("MAX_UPLOAD_MB is too large")
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            openai_api_key: "sk-secret-value".to_string(),
            openai_api_url: DEFAULT_OPENAI_API_URL.to_string(),
            port: 8080,
            max_upload_bytes: 2 * 1024 * 1024,
            rust_log: "info".to_string(),
        }
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let rendered = format!("{:?}", sample());
        assert!(!rendered.contains("sk-secret-value"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_upload_limit_in_bytes() {
        assert_eq!(parse_upload_limit("200").unwrap(), 200 * 1024 * 1024);
        assert_eq!(parse_upload_limit(" 1 ").unwrap(), 1024 * 1024);
    }

    #[test]
    fn test_upload_limit_overflow_is_an_error() {
        let err = parse_upload_limit(&usize::MAX.to_string()).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_upload_limit_rejects_non_numbers() {
        assert!(parse_upload_limit("lots").is_err());
    }

    #[test]
    fn test_require_env_names_missing_variable() {
        let err = require_env("AUTOGRADER_TEST_SURELY_UNSET_VAR").unwrap_err();
        assert!(err.to_string().contains("AUTOGRADER_TEST_SURELY_UNSET_VAR"));
    }
}
