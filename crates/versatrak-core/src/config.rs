//! Client configuration.
//!
//! `ClientConfig` is populated by the caller. The library never reads the
//! process environment itself; front ends decide where values come from.

use std::fmt;
use std::time::Duration;

use reqwest::Url;

use crate::api::ApiError;
use crate::auth::{mask_token, TokenPair};

/// Base URL used when the caller does not supply one.
pub const DEFAULT_BASE_URL: &str = "http://versatrak.example.com/vtwebapi2/api/";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for transient server errors on GET requests.
pub const MAX_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds, doubled after each retry.
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub instance_id: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Pre-existing token pair; the client starts logged on when set.
    pub tokens: Option<TokenPair>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            instance_id: None,
            username: None,
            password: None,
            tokens: None,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            max_retries: MAX_RETRIES,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        }
    }
}

/// Treat empty strings the same as absent values.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_instance(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = non_empty(Some(instance_id.into()));
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = non_empty(Some(username.into()));
        self.password = non_empty(Some(password.into()));
        self
    }

    pub fn with_tokens(
        mut self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        let tokens = TokenPair::new(access_token, refresh_token);
        self.tokens = (!tokens.access_token.is_empty()).then_some(tokens);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Both username and password, if both are present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some((u, p)),
            _ => None,
        }
    }

    /// Parse the base URL, adding a trailing slash so relative paths join
    /// beneath it instead of replacing its last segment.
    pub fn parsed_base_url(&self) -> Result<Url, ApiError> {
        let raw = self.base_url.trim();
        if raw.is_empty() {
            return Err(ApiError::Configuration("base URL is empty".to_string()));
        }
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{}/", raw)
        };
        let url = Url::parse(&normalized)
            .map_err(|e| ApiError::Configuration(format!("invalid base URL '{}': {}", raw, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ApiError::Configuration(format!(
                "unsupported URL scheme '{}' in base URL",
                other
            ))),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("instance_id", &self.instance_id)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|p| mask_token(p)))
            .field("tokens", &self.tokens)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("initial_backoff", &self.initial_backoff)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert!(config.credentials().is_none());
        assert!(config.tokens.is_none());
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = ClientConfig::new("https://vt.example.org/vtwebapi2/api");
        let url = config.parsed_base_url().unwrap();
        assert_eq!(url.as_str(), "https://vt.example.org/vtwebapi2/api/");
        assert_eq!(
            url.join("department").unwrap().as_str(),
            "https://vt.example.org/vtwebapi2/api/department"
        );
    }

    #[test]
    fn test_base_url_rejects_garbage() {
        assert!(matches!(
            ClientConfig::new("").parsed_base_url(),
            Err(ApiError::Configuration(_))
        ));
        assert!(matches!(
            ClientConfig::new("not a url").parsed_base_url(),
            Err(ApiError::Configuration(_))
        ));
        assert!(matches!(
            ClientConfig::new("ftp://vt.example.org/").parsed_base_url(),
            Err(ApiError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let config = ClientConfig::default()
            .with_instance("")
            .with_credentials("operator", "")
            .with_tokens("", "refresh");
        assert!(config.instance_id.is_none());
        assert!(config.credentials().is_none());
        assert!(config.tokens.is_none());
    }

    #[test]
    fn test_debug_hides_password() {
        let config = ClientConfig::default().with_credentials("operator", "hunter2-secret");
        let debug = format!("{:?}", config);
        assert!(debug.contains("operator"));
        assert!(!debug.contains("hunter2-secret"));
    }
}
