//! Client configuration
//!
//! A [`Config`] is normally resolved from a `ProviderConfig` and the secret it
//! references; it can also be built directly for tests and tooling.
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// The public Civo API endpoint
pub const DEFAULT_API_URL: &str = "https://api.civo.com";

/// Errors from validating a [`Config`]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The API key is empty
    #[error("api key is empty")]
    EmptyApiKey,

    /// The API key contains characters a token never has
    #[error("api key is malformed")]
    MalformedApiKey,

    /// No region was given
    #[error("region is empty")]
    EmptyRegion,

    /// The API url does not parse
    #[error("invalid api url {url:?}: {source}")]
    InvalidUrl {
        /// The url as given
        url: String,
        /// Parse failure
        #[source]
        source: http::uri::InvalidUri,
    },
}

/// Configuration object detailing things like the API endpoint and credentials
#[derive(Debug, Clone)]
pub struct Config {
    /// The configured API url
    pub api_url: http::Uri,
    /// The API token sent as a bearer credential
    pub api_key: SecretString,
    /// The region every request is scoped to
    pub region: String,
    /// Timeout for establishing a connection
    pub connect_timeout: Option<Duration>,
    /// Timeout for reading a response
    pub read_timeout: Option<Duration>,
    /// Timeout for writing a request
    pub write_timeout: Option<Duration>,
}

impl Config {
    /// Validate credentials and construct a configuration against the public API
    ///
    /// A trailing newline, as left by `kubectl create secret --from-file`, is trimmed.
    pub fn new(api_key: &str, region: &str) -> Result<Self, ConfigError> {
        let api_key = api_key.trim_end_matches(['\n', '\r']);
        if api_key.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        if api_key.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ConfigError::MalformedApiKey);
        }
        let region = region.trim();
        if region.is_empty() {
            return Err(ConfigError::EmptyRegion);
        }
        Ok(Self {
            api_url: http::Uri::from_static(DEFAULT_API_URL),
            api_key: SecretString::from(api_key.to_string()),
            region: region.to_string(),
            connect_timeout: Some(Duration::from_secs(30)),
            read_timeout: Some(Duration::from_secs(60)),
            write_timeout: Some(Duration::from_secs(60)),
        })
    }

    /// Point the client at a different API endpoint
    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_url = url.parse().map_err(|source| ConfigError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        Ok(self)
    }

    /// The value of the `Authorization` header
    pub(crate) fn bearer(&self) -> Result<http::HeaderValue, ConfigError> {
        let mut value = http::HeaderValue::try_from(format!("bearer {}", self.api_key.expose_secret()))
            .map_err(|_| ConfigError::MalformedApiKey)?;
        value.set_sensitive(true);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_newline() {
        let config = Config::new("abc123\n", "LON1").unwrap();
        assert_eq!(config.api_key.expose_secret(), "abc123");
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn rejects_empty_and_malformed_keys() {
        assert!(matches!(Config::new("", "LON1"), Err(ConfigError::EmptyApiKey)));
        assert!(matches!(Config::new("\n", "LON1"), Err(ConfigError::EmptyApiKey)));
        assert!(matches!(Config::new("ab cd", "LON1"), Err(ConfigError::MalformedApiKey)));
        assert!(matches!(Config::new("abc", " "), Err(ConfigError::EmptyRegion)));
    }

    #[test]
    fn bearer_header_is_sensitive() {
        let config = Config::new("abc123", "LON1").unwrap();
        let header = config.bearer().unwrap();
        assert_eq!(header, "bearer abc123");
        assert!(header.is_sensitive());
    }

    #[test]
    fn api_url_override() {
        let config = Config::new("abc", "LON1").unwrap().with_api_url("http://localhost:8080").unwrap();
        assert_eq!(config.api_url.authority().unwrap(), "localhost:8080");
        assert!(Config::new("abc", "LON1").unwrap().with_api_url("http://[::1").is_err());
    }
}
