//! Error types for Web API exchanges.
//!
//! # Error Handling
//!
//! Every connector operation returns [`ConnectorError`]. Its variants map
//! one-to-one onto the failure classes of an exchange:
//!
//! - [`ConnectorError::Transport`]: network, TLS or timeout failures
//! - [`ConnectorError::Auth`]: the bearer token could not be acquired
//! - [`ConnectorError::Api`]: the service answered with a non-success status
//! - [`ConnectorError::ProtocolInvariant`]: success status but the response lacks a required part
//! - [`ConnectorError::BinaryDownload`]: a binary download failed
//! - [`ConnectorError::Deserialize`]: a success body did not match the requested type
//!
//! # Example
//!
//! ```rust,ignore
//! use dynamics_connector::ConnectorError;
//!
//! match connector.delete("account", id).await {
//!     Ok(()) => {}
//!     Err(ConnectorError::Api(e)) if e.status == 404 => println!("already gone"),
//!     Err(ConnectorError::Api(e)) => {
//!         println!("{} {} -> {}: {}", e.method, e.path, e.status, e.response_body);
//!     }
//!     Err(e) => return Err(e.into()),
//! }
//! ```

use std::fmt;

use thiserror::Error;

use crate::auth::AuthError;
use crate::clients::http_request::HttpMethod;
use crate::error::ConfigError;

/// A failed exchange with the Web API, kept as structured fields.
///
/// # Example
///
/// ```rust
/// use dynamics_connector::clients::{ApiError, HttpMethod};
///
/// let error = ApiError {
///     method: HttpMethod::Patch,
///     path: "accounts(00000000-0000-0000-0000-000000000001)".to_string(),
///     status: 412,
///     reason: "Precondition Failed".to_string(),
///     response_body: r#"{"error":{"code":"0x80060882"}}"#.to_string(),
///     request_payload: Some(r#"{"name":"Contoso"}"#.to_string()),
///     context: None,
/// };
///
/// assert!(error.to_string().contains("412"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiError {
    /// The HTTP method of the request.
    pub method: HttpMethod,
    /// The request path, relative to the service root unless absolute.
    pub path: String,
    /// The HTTP status code of the response.
    pub status: u16,
    /// The reason phrase of the status code.
    pub reason: String,
    /// The raw response body.
    pub response_body: String,
    /// The body that was sent, if any.
    pub request_payload: Option<String>,
    /// Explanation of a protocol violation.
    pub context: Option<String>,
}

impl ApiError {
    /// Attaches an explanatory context message.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} returned {} {}",
            self.method, self.path, self.status, self.reason
        )?;
        if let Some(context) = &self.context {
            write!(f, " ({context})")?;
        }
        if !self.response_body.is_empty() {
            write!(f, ": {}", self.response_body)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Error returned when a request fails validation before it is sent.
///
/// # Example
///
/// ```rust
/// use dynamics_connector::clients::InvalidHttpRequestError;
///
/// let error = InvalidHttpRequestError::MissingBody {
///     method: "PATCH".to_string(),
/// };
///
/// assert_eq!(error.to_string(), "Cannot use PATCH without specifying data.");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A request body was provided without specifying the body type.
    #[error("Cannot set a body without also setting body_type.")]
    MissingBodyType,

    /// A POST or PATCH request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },
}

/// Unified error type for all connector operations.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Network, TLS or timeout failure.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Token acquisition failed; the request was not sent.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Non-success response.
    #[error(transparent)]
    Api(ApiError),

    /// Success response that violates the protocol, e.g. a create without
    /// an `OData-EntityId` header.
    #[error("Protocol violation: {0}")]
    ProtocolInvariant(ApiError),

    /// A binary download failed.
    #[error("Binary download of {path} failed with status {status}")]
    BinaryDownload {
        /// The requested path.
        path: String,
        /// The HTTP status code of the response.
        status: u16,
    },

    /// A success body could not be deserialized into the requested type.
    #[error("Failed to deserialize response of {path}: {source}")]
    Deserialize {
        /// The request path.
        path: String,
        /// The underlying serde error.
        source: serde_json::Error,
    },

    /// A payload could not be serialized.
    #[error("Failed to serialize payload: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ConnectorError {
    /// Returns the structured API failure, if this is one.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) | Self::ProtocolInvariant(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the HTTP status code of the response that caused the failure.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api(e) | Self::ProtocolInvariant(e) => Some(e.status),
            Self::BinaryDownload { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// Verify error types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiError>();
    assert_send_sync::<ConnectorError>();
};
