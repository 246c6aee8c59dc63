//! Startup configuration, read once from the environment.

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

pub const PLATFORM_DOMAIN_VAR: &str = "BOOKACUT_PLATFORM_DOMAIN";
pub const API_BASE_URL_VAR: &str = "BOOKACUT_API_BASE_URL";
pub const SOCKET_URL_VAR: &str = "BOOKACUT_SOCKET_URL";
pub const HTTP_TIMEOUT_VAR: &str = "BOOKACUT_HTTP_TIMEOUT_SECS";
pub const LEGACY_ALIASES_VAR: &str = "BOOKACUT_LEGACY_ALIASES";

pub const DEFAULT_PLATFORM_DOMAIN: &str = "platform.bookacut.local";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Read-only client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Host of the operator application; everything else is a client domain.
    pub platform_domain: String,
    /// Base URL all REST paths are appended to (no trailing slash).
    pub api_base_url: String,
    /// Realtime transport base URL. Consumed by the event-stream hookup only.
    pub socket_url: String,
    pub http_timeout: Duration,
    /// Serve redirects for renamed path prefixes.
    pub legacy_aliases: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            platform_domain: DEFAULT_PLATFORM_DOMAIN.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            socket_url: "http://localhost:5000".to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            legacy_aliases: true,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let platform_domain = var(PLATFORM_DOMAIN_VAR).unwrap_or_else(|| DEFAULT_PLATFORM_DOMAIN.to_string());

        let api_base_url = var(API_BASE_URL_VAR).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_url = Url::parse(&api_base_url)
            .map_err(|e| ConfigError::invalid(API_BASE_URL_VAR, &api_base_url, e.to_string()))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(API_BASE_URL_VAR, &api_base_url, "expected http(s)"));
        }

        let socket_url = match var(SOCKET_URL_VAR) {
            Some(url) => {
                Url::parse(&url).map_err(|e| ConfigError::invalid(SOCKET_URL_VAR, &url, e.to_string()))?;
                url
            }
            None => api_url.origin().ascii_serialization(),
        };

        let http_timeout = match var(HTTP_TIMEOUT_VAR) {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .map_err(|_| ConfigError::invalid(HTTP_TIMEOUT_VAR, &raw, "expected whole seconds"))?;
                if secs == 0 {
                    return Err(ConfigError::invalid(HTTP_TIMEOUT_VAR, &raw, "must be positive"));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let legacy_aliases = match var(LEGACY_ALIASES_VAR) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::invalid(LEGACY_ALIASES_VAR, &raw, "expected true/false"))?,
            None => true,
        };

        Ok(Self {
            platform_domain,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            socket_url,
            http_timeout,
            legacy_aliases,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ClientConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = from(&[]).unwrap();
        assert_eq!(config.platform_domain, DEFAULT_PLATFORM_DOMAIN);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.socket_url, "http://localhost:5000");
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert!(config.legacy_aliases);
    }

    #[test]
    fn socket_url_defaults_to_api_origin() {
        let config = from(&[(API_BASE_URL_VAR, "https://abcsalon.com/api/")]).unwrap();
        assert_eq!(config.api_base_url, "https://abcsalon.com/api");
        assert_eq!(config.socket_url, "https://abcsalon.com");
    }

    #[test]
    fn explicit_values_win() {
        let config = from(&[
            (PLATFORM_DOMAIN_VAR, "platform.example.com"),
            (SOCKET_URL_VAR, "wss://rt.example.com"),
            (HTTP_TIMEOUT_VAR, "3"),
            (LEGACY_ALIASES_VAR, "off"),
        ])
        .unwrap();
        assert_eq!(config.platform_domain, "platform.example.com");
        assert_eq!(config.socket_url, "wss://rt.example.com");
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert!(!config.legacy_aliases);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            from(&[(HTTP_TIMEOUT_VAR, "soon")]),
            Err(ConfigError::Invalid { key: HTTP_TIMEOUT_VAR, .. })
        ));
        assert!(from(&[(HTTP_TIMEOUT_VAR, "0")]).is_err());
        assert!(from(&[(API_BASE_URL_VAR, "/api")]).is_err());
        assert!(from(&[(API_BASE_URL_VAR, "ftp://x.example")]).is_err());
        assert!(from(&[(LEGACY_ALIASES_VAR, "maybe")]).is_err());
    }
}
