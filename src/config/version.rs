//! Dataverse Web API version definitions.
//!
//! This module provides the [`ApiVersion`] enum selecting the versioned
//! service root (`/api/data/v9.2/`) every request is resolved against.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Dataverse Web API version.
///
/// # Example
///
/// ```rust
/// use dynamics_connector::ApiVersion;
///
/// let version = ApiVersion::latest();
/// assert_eq!(version.base_path(), "/api/data/v9.2/");
///
/// let version: ApiVersion = "9.1".parse().unwrap();
/// assert_eq!(version, ApiVersion::V9_1);
/// assert_eq!(version.to_string(), "v9.1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    /// Web API v9.0
    V9_0,
    /// Web API v9.1
    V9_1,
    /// Web API v9.2
    V9_2,
    /// Custom version string (`major.minor`) for versions not listed here.
    Custom(String),
}

impl ApiVersion {
    /// Returns the version used when none is configured.
    #[must_use]
    pub const fn latest() -> Self {
        Self::V9_2
    }

    /// Returns the service root path, e.g. `/api/data/v9.2/`.
    #[must_use]
    pub fn base_path(&self) -> String {
        format!("/api/data/{self}/")
    }

    fn is_valid_version_format(s: &str) -> bool {
        let mut parts = s.split('.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(major), Some(minor), None) => {
                !major.is_empty()
                    && !minor.is_empty()
                    && major.chars().all(|c| c.is_ascii_digit())
                    && minor.chars().all(|c| c.is_ascii_digit())
            }
            _ => false,
        }
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::latest()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V9_0 => f.write_str("v9.0"),
            Self::V9_1 => f.write_str("v9.1"),
            Self::V9_2 => f.write_str("v9.2"),
            Self::Custom(s) => write!(f, "v{s}"),
        }
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let bare = normalized.strip_prefix('v').unwrap_or(&normalized);

        match bare {
            "9.0" => Ok(Self::V9_0),
            "9.1" => Ok(Self::V9_1),
            "9.2" => Ok(Self::V9_2),
            other if Self::is_valid_version_format(other) => Ok(Self::Custom(other.to_string())),
            _ => Err(ConfigError::InvalidApiVersion {
                version: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_version_parses_known_versions() {
        assert_eq!("v9.2".parse::<ApiVersion>().unwrap(), ApiVersion::V9_2);
        assert_eq!("9.0".parse::<ApiVersion>().unwrap(), ApiVersion::V9_0);
        assert_eq!(" V9.1 ".parse::<ApiVersion>().unwrap(), ApiVersion::V9_1);
    }

    #[test]
    fn test_api_version_accepts_custom_versions() {
        let version: ApiVersion = "v9.3".parse().unwrap();
        assert_eq!(version, ApiVersion::Custom("9.3".to_string()));
        assert_eq!(version.base_path(), "/api/data/v9.3/");
    }

    #[test]
    fn test_api_version_rejects_malformed_versions() {
        assert!("latest".parse::<ApiVersion>().is_err());
        assert!("9".parse::<ApiVersion>().is_err());
        assert!("9.2.1".parse::<ApiVersion>().is_err());
        assert!("v.2".parse::<ApiVersion>().is_err());
    }

    #[test]
    fn test_latest_is_default_base_path() {
        assert_eq!(ApiVersion::default(), ApiVersion::V9_2);
        assert_eq!(ApiVersion::latest().base_path(), "/api/data/v9.2/");
    }
}
