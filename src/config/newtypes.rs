//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated Azure AD application (client) id.
///
/// # Example
///
/// ```rust
/// use dynamics_connector::ApplicationId;
///
/// let id = ApplicationId::new("4f1c1bbd-0000-0000-0000-000000000000").unwrap();
/// assert_eq!(id.as_ref(), "4f1c1bbd-0000-0000-0000-000000000000");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplicationId(String);

impl ApplicationId {
    /// Creates a new validated application id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApplicationId`] if the id is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(ConfigError::EmptyApplicationId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for ApplicationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated application client secret.
///
/// The `Debug` implementation masks the secret value, displaying only
/// `ApplicationSecret(*****)`.
///
/// ```rust
/// use dynamics_connector::ApplicationSecret;
///
/// let secret = ApplicationSecret::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "ApplicationSecret(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApplicationSecret(String);

impl ApplicationSecret {
    /// Creates a new validated application secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApplicationSecret`] if the secret is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptyApplicationSecret);
        }
        Ok(Self(secret))
    }
}

impl AsRef<str> for ApplicationSecret {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApplicationSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApplicationSecret(*****)")
    }
}

/// A validated Azure AD tenant id (GUID or verified domain).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a new validated tenant id.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyTenantId`] if the id is empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ConfigError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(ConfigError::EmptyTenantId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated organization URL, such as `https://contoso.crm4.dynamics.com`.
///
/// Trailing slashes are removed so the value can be used both as the OAuth
/// scope prefix (`<url>/.default`) and as the Web API root.
///
/// # Example
///
/// ```rust
/// use dynamics_connector::BaseUrl;
///
/// let url = BaseUrl::new("https://contoso.crm4.dynamics.com/").unwrap();
/// assert_eq!(url.as_ref(), "https://contoso.crm4.dynamics.com");
/// assert_eq!(url.scheme(), "https");
/// assert_eq!(url.host_name(), "contoso.crm4.dynamics.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl {
    url: String,
    scheme_end: usize,
    host_start: usize,
    host_end: usize,
}

impl BaseUrl {
    /// Creates a new validated base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL has no scheme or host.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let url = url.trim().trim_end_matches('/').to_string();

        let scheme_end = url
            .find("://")
            .ok_or_else(|| ConfigError::InvalidBaseUrl { url: url.clone() })?;

        let scheme = &url[..scheme_end];
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::InvalidBaseUrl { url });
        }

        let host_start = scheme_end + 3;
        let remainder = &url[host_start..];
        let host_end = remainder
            .find([':', '/', '?', '#'])
            .map_or(url.len(), |i| host_start + i);

        if host_end <= host_start {
            return Err(ConfigError::InvalidBaseUrl { url });
        }

        Ok(Self {
            url,
            scheme_end,
            host_start,
            host_end,
        })
    }

    /// Returns the URL scheme (e.g., "https").
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.url[..self.scheme_end]
    }

    /// Returns the host name portion of the URL.
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.url[self.host_start..self.host_end]
    }

    /// Returns the OAuth scope requested for this organization.
    #[must_use]
    pub fn default_scope(&self) -> String {
        format!("{}/.default", self.url)
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl Serialize for BaseUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.url)
    }
}

impl<'de> Deserialize<'de> for BaseUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_id_rejects_empty_string() {
        assert!(matches!(
            ApplicationId::new("  "),
            Err(ConfigError::EmptyApplicationId)
        ));
    }

    #[test]
    fn test_tenant_id_rejects_empty_string() {
        assert!(matches!(TenantId::new(""), Err(ConfigError::EmptyTenantId)));
    }

    #[test]
    fn test_application_secret_masks_value_in_debug() {
        let secret = ApplicationSecret::new("super-secret-value").unwrap();
        let debug_output = format!("{secret:?}");
        assert_eq!(debug_output, "ApplicationSecret(*****)");
        assert!(!debug_output.contains("super-secret-value"));
    }

    #[test]
    fn test_base_url_strips_trailing_slashes() {
        let url = BaseUrl::new("https://contoso.crm.dynamics.com//").unwrap();
        assert_eq!(url.as_ref(), "https://contoso.crm.dynamics.com");
        assert_eq!(
            url.default_scope(),
            "https://contoso.crm.dynamics.com/.default"
        );
    }

    #[test]
    fn test_base_url_accepts_port() {
        let url = BaseUrl::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_name(), "127.0.0.1");
    }

    #[test]
    fn test_base_url_rejects_invalid() {
        assert!(BaseUrl::new("contoso.crm.dynamics.com").is_err());
        assert!(BaseUrl::new("https://").is_err());
        assert!(BaseUrl::new("://contoso.crm.dynamics.com").is_err());
    }

    #[test]
    fn test_base_url_deserializes_from_string() {
        let url: BaseUrl = serde_json::from_str(r#""https://contoso.crm.dynamics.com/""#).unwrap();
        assert_eq!(url.as_ref(), "https://contoso.crm.dynamics.com");

        let result: Result<BaseUrl, _> = serde_json::from_str(r#""not a url""#);
        assert!(result.is_err());
    }
}
