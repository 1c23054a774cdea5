//! Application configuration.
//!
//! Everything is environment-supplied, loaded once at startup into an
//! immutable struct that gets passed into the components that need it.
//! Missing credentials fail startup rather than the first request.

use std::env;

use anyhow::bail;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// API key for the completion gateway. Required.
    pub api_key: String,
    pub model: String,
    pub api_base_url: String,
    /// Secret for signing bearer tokens. Required.
    pub token_secret: String,
    pub token_expire_minutes: u64,
    /// Bound on the outbound gateway round trip.
    pub upstream_timeout_secs: u64,
    pub context_max_turns: usize,
    pub context_max_tokens: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_path() -> String {
    "banter.db".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

impl AppConfig {
    /// Load and validate configuration from the environment.
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::from_env();
        config.validate()?;
        Ok(config)
    }

    fn from_env() -> Self {
        let host = env::var("BANTER_SERVER_HOST").unwrap_or_else(|_| default_host());
        let port = env::var("BANTER_SERVER_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or_else(default_port);
        let database_path =
            env::var("BANTER_DATABASE_PATH").unwrap_or_else(|_| default_database_path());
        let api_key = env::var("BANTER_API_KEY").unwrap_or_default();
        let model = env::var("BANTER_MODEL").unwrap_or_else(|_| default_model());
        let api_base_url =
            env::var("BANTER_API_BASE_URL").unwrap_or_else(|_| default_api_base_url());
        let token_secret = env::var("BANTER_TOKEN_SECRET").unwrap_or_default();
        let token_expire_minutes = env::var("BANTER_TOKEN_EXPIRE_MINUTES")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(30);
        let upstream_timeout_secs = env::var("BANTER_UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(60);
        let context_max_turns = env::var("BANTER_CONTEXT_MAX_TURNS")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(10);
        let context_max_tokens = env::var("BANTER_CONTEXT_MAX_TOKENS")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(3_000);

        Self {
            host,
            port,
            database_path,
            api_key,
            model,
            api_base_url,
            token_secret,
            token_expire_minutes,
            upstream_timeout_secs,
            context_max_turns,
            context_max_tokens,
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.api_key.trim().is_empty() {
            bail!("BANTER_API_KEY must be set");
        }
        if self.token_secret.trim().is_empty() {
            bail!("BANTER_TOKEN_SECRET must be set");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            host: default_host(),
            port: default_port(),
            database_path: default_database_path(),
            api_key: "sk-test".to_string(),
            model: default_model(),
            api_base_url: default_api_base_url(),
            token_secret: "secret".to_string(),
            token_expire_minutes: 30,
            upstream_timeout_secs: 60,
            context_max_turns: 10,
            context_max_tokens: 3_000,
        }
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_api_key() {
        let mut config = valid_config();
        config.api_key = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_token_secret() {
        let mut config = valid_config();
        config.token_secret = String::new();
        assert!(config.validate().is_err());
    }
}
