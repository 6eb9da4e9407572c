//! Configuration error types for the Dynamics connector.
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use dynamics_connector::{ApplicationId, ConfigError};
//!
//! let result = ApplicationId::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApplicationId)));
//! ```

use thiserror::Error;

/// Errors that can occur while building a connector configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Application (client) id cannot be empty.
    #[error("Application id cannot be empty. Please provide the Azure AD application (client) id.")]
    EmptyApplicationId,

    /// Application secret cannot be empty.
    #[error("Application secret cannot be empty. Please provide a valid client secret.")]
    EmptyApplicationSecret,

    /// Tenant id cannot be empty.
    #[error("Tenant id cannot be empty. Please provide the Azure AD tenant id.")]
    EmptyTenantId,

    /// The organization URL is invalid.
    #[error("Invalid base URL '{url}'. Please provide a URL with scheme (e.g., 'https://org.crm4.dynamics.com').")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// The Web API version is invalid.
    #[error("Invalid API version '{version}'. Expected format: 'v9.2' or '9.2'.")]
    InvalidApiVersion {
        /// The invalid version string that was provided.
        version: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}
