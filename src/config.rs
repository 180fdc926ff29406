//! Runtime configuration
//!
//! Read from the process environment (after `.env` is loaded by the binaries).
//! Credentials are optional at startup; the clients reject calls when the
//! value they need is missing.

use crate::error::NexusError;
use crate::Result;
use std::env;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_CLASSIFIER_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_SIENGE_BASE_URL: &str = "https://api.sienge.com.br";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub chat_model: String,
    pub classifier_model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SiengeConfig {
    pub base_url: String,
    pub user: Option<String>,
    pub pass: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub openai: OpenAiConfig,
    pub sienge: SiengeConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT").or_else(|| get("API_PORT")) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| NexusError::ConfigError(format!("invalid PORT '{}': {}", raw, e)))?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match get("OPENAI_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                NexusError::ConfigError(format!("invalid OPENAI_TIMEOUT_SECS '{}': {}", raw, e))
            })?,
            None => DEFAULT_OPENAI_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(NexusError::ConfigError(
                "OPENAI_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        let openai = OpenAiConfig {
            api_key: get("OPENAI_API_KEY"),
            base_url: normalize_base_url(
                get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            ),
            chat_model: get("OPENAI_CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            classifier_model: get("OPENAI_CLASSIFIER_MODEL")
                .unwrap_or_else(|| DEFAULT_CLASSIFIER_MODEL.to_string()),
            timeout_secs,
        };

        let sienge = SiengeConfig {
            base_url: normalize_base_url(
                get("SIENGE_BASE_URL").unwrap_or_else(|| DEFAULT_SIENGE_BASE_URL.to_string()),
            ),
            user: get("SIENGE_USER"),
            pass: get("SIENGE_PASS"),
        };

        Ok(Self {
            port,
            openai,
            sienge,
        })
    }
}

pub(crate) fn normalize_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.openai.api_key.is_none());
        assert_eq!(config.openai.base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(config.openai.chat_model, "gpt-3.5-turbo");
        assert_eq!(config.openai.classifier_model, "gpt-4o-mini");
        assert_eq!(config.sienge.base_url, DEFAULT_SIENGE_BASE_URL);
        assert!(config.sienge.user.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("API_PORT", "9000"),
            ("OPENAI_API_KEY", "sk-test"),
            ("SIENGE_BASE_URL", "https://erp.example.com/api/"),
            ("SIENGE_USER", "alice"),
            ("SIENGE_PASS", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.sienge.base_url, "https://erp.example.com/api");
        assert_eq!(config.sienge.user.as_deref(), Some("alice"));
    }

    #[test]
    fn test_port_takes_precedence_over_api_port() {
        let config =
            Config::from_lookup(lookup_from(&[("PORT", "3000"), ("API_PORT", "9000")])).unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "   ")])).unwrap();
        assert!(config.openai.api_key.is_none());
    }

    #[test]
    fn test_invalid_port() {
        let result = Config::from_lookup(lookup_from(&[("PORT", "eighty")]));
        assert!(matches!(result, Err(NexusError::ConfigError(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Config::from_lookup(lookup_from(&[("OPENAI_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, NexusError::ConfigError(_)));
        assert!(err.to_string().contains("greater than zero"));

        let config = Config::from_lookup(lookup_from(&[("OPENAI_TIMEOUT_SECS", "5")])).unwrap();
        assert_eq!(config.openai.timeout_secs, 5);
    }
}
