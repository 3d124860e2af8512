//! Client configuration.

use crate::error::PetfinderError;
use crate::retry::RetryPolicy;

pub const DEFAULT_BASE_URL: &str = "http://api.petfinder.com/";
pub const DEFAULT_FORMAT: &str = "json";

pub const API_KEY_ENV: &str = "PETFINDER_API_KEY";
pub const BASE_URL_ENV: &str = "PETFINDER_BASE_URL";

/// Settings fixed at construction and shared read-only by every call.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub(crate) api_key: String,
    pub base_url: String,
    pub format: String,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Defaults for everything but the key, which must be non-empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self, PetfinderError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(PetfinderError::Config("API key must not be empty".to_string()));
        }
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            format: DEFAULT_FORMAT.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// Read `PETFINDER_API_KEY` and, if set, `PETFINDER_BASE_URL`.
    pub fn from_env() -> Result<Self, PetfinderError> {
        let key = std::env::var(API_KEY_ENV)
            .map_err(|_| PetfinderError::Config(format!("{API_KEY_ENV} is not set")))?;
        let mut config = Self::new(key)?;
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            if !base_url.is_empty() {
                config.base_url = base_url;
            }
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("format", &self.format)
            .field("retry", &self.retry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(ClientConfig::new(""), Err(PetfinderError::Config(_))));
    }

    #[test]
    fn key_is_kept_verbatim() {
        let config = ClientConfig::new(" k ").unwrap();
        assert_eq!(config.api_key(), " k ");
    }

    #[test]
    fn defaults_point_at_json_api() {
        let config = ClientConfig::new("abc").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.format, "json");
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn debug_hides_key() {
        let config = ClientConfig::new("super-secret").unwrap();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
