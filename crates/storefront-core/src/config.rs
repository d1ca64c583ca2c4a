//! Store credentials and endpoint configuration.

use serde::{Deserialize, Serialize};

/// Environment variable holding the store domain (e.g. "my-shop.example.com").
pub const ENV_STORE_DOMAIN: &str = "STOREFRONT_DOMAIN";
/// Environment variable holding the catalog API access token.
pub const ENV_ACCESS_TOKEN: &str = "STOREFRONT_ACCESS_TOKEN";
/// Environment variable overriding the catalog API version segment.
pub const ENV_API_VERSION: &str = "STOREFRONT_API_VERSION";

const DEFAULT_API_VERSION: &str = "2024-07";

/// Connection settings for the upstream product-catalog GraphQL service.
///
/// Read once from the process environment at construction. Missing
/// credentials are not an error: an unconfigured store degrades every
/// transport call to an empty-shaped success.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store domain, without scheme.
    pub domain: Option<String>,
    /// Access token sent as a bearer header on every request.
    pub access_token: Option<String>,
    /// API version segment of the endpoint path.
    pub api_version: String,
}

impl StoreConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            domain: read_env(ENV_STORE_DOMAIN),
            access_token: read_env(ENV_ACCESS_TOKEN),
            api_version: read_env(ENV_API_VERSION)
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
        }
    }

    /// Build a configuration from explicit values.
    pub fn new(domain: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
            access_token: Some(access_token.into()),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Override the API version segment.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Whether both domain and token are present.
    pub fn is_configured(&self) -> bool {
        self.domain.as_deref().is_some_and(|d| !d.is_empty())
            && self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// The GraphQL endpoint URL, or `None` when unconfigured.
    pub fn endpoint(&self) -> Option<String> {
        if !self.is_configured() {
            return None;
        }
        let domain = self.domain.as_deref()?;
        Some(format!(
            "https://{}/api/{}/graphql.json",
            domain.trim_end_matches('/'),
            self.api_version
        ))
    }

    /// The access token, or `None` when unconfigured.
    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_has_no_endpoint() {
        let config = StoreConfig::default();
        assert!(!config.is_configured());
        assert!(config.endpoint().is_none());
        assert!(config.token().is_none());
    }

    #[test]
    fn test_endpoint_format() {
        let config = StoreConfig::new("my-shop.example.com", "tok");
        assert_eq!(
            config.endpoint().unwrap(),
            "https://my-shop.example.com/api/2024-07/graphql.json"
        );
    }

    #[test]
    fn test_api_version_override() {
        let config = StoreConfig::new("shop.example.com", "tok").with_api_version("2025-01");
        assert!(config.endpoint().unwrap().contains("/api/2025-01/"));
    }

    #[test]
    fn test_empty_token_is_unconfigured() {
        let config = StoreConfig {
            domain: Some("shop.example.com".to_string()),
            access_token: Some(String::new()),
            api_version: "2024-07".to_string(),
        };
        assert!(!config.is_configured());
    }
}
