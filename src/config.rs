use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::openai::DEFAULT_BASE_URL;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 300;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_BODY_LIMIT: usize = 20 * 1024 * 1024;

/// Bounded exponential backoff applied to rate-limited provider calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts allowed after the first one.
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (zero-based): initial, 2x, 4x, ...
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(retry))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` leaves the server running but every caption request fails.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub retry: RetryPolicy,
    pub bind_addr: SocketAddr,
    pub body_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let retry = RetryPolicy {
            max_retries: parse_or(&var, "CAPTION_MAX_RETRIES", 2)?,
            initial_backoff: Duration::from_millis(parse_or(&var, "CAPTION_INITIAL_BACKOFF_MS", 1000)?),
        };

        Ok(Self {
            openai_api_key: var("OPENAI_API_KEY").map(|k| k.trim().to_string()),
            openai_base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: var("CAPTION_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: parse_or(&var, "CAPTION_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            retry,
            bind_addr: parse_or(&var, "CAPTION_BIND_ADDR", DEFAULT_BIND_ADDR.parse()?)?,
            body_limit: parse_or(&var, "CAPTION_BODY_LIMIT", DEFAULT_BODY_LIMIT)?,
        })
    }
}

fn parse_or<T>(var: impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.openai_api_key, None);
        assert_eq!(config.openai_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_tokens, 300);
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.body_limit, DEFAULT_BODY_LIMIT);
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = config_from(&[("OPENAI_API_KEY", "   ")]).unwrap();
        assert_eq!(config.openai_api_key, None);
    }

    #[test]
    fn overrides() {
        let config = config_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("CAPTION_MODEL", "gpt-4o"),
            ("CAPTION_MAX_RETRIES", "5"),
            ("CAPTION_INITIAL_BACKOFF_MS", "250"),
            ("CAPTION_BIND_ADDR", "127.0.0.1:8080"),
        ])
        .unwrap();
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.initial_backoff, Duration::from_millis(250));
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn malformed_values_are_errors() {
        let err = config_from(&[("CAPTION_MAX_TOKENS", "lots")]).unwrap_err();
        assert!(err.to_string().contains("CAPTION_MAX_TOKENS"));
        assert!(config_from(&[("CAPTION_BIND_ADDR", "nowhere")]).is_err());
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    }
}
