//! Authentication error types.

use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur while acquiring a bearer token.
///
/// These are never retried by the connector; the request that needed the
/// token is not sent. Callers that waited on the same failed acquisition
/// all receive a clone of its error.
///
/// # Example
///
/// ```rust
/// use dynamics_connector::AuthError;
///
/// let error = AuthError::ClientCredentialsFailed {
///     status: 401,
///     message: "AADSTS7000215: Invalid client secret provided.".to_string(),
/// };
/// assert!(error.to_string().contains("401"));
/// ```
#[derive(Clone, Debug, Error)]
pub enum AuthError {
    /// The identity provider rejected the client-credentials request.
    #[error("Client credentials token request failed with status {status}: {message}")]
    ClientCredentialsFailed {
        /// The HTTP status code returned by the token endpoint.
        status: u16,
        /// The response body.
        message: String,
    },

    /// The token endpoint answered with a body that is not a token response.
    #[error("Invalid token response: {reason}")]
    InvalidTokenResponse {
        /// What could not be parsed.
        reason: String,
    },

    /// The token endpoint could not be reached.
    #[error("Token request network error: {0}")]
    Network(#[source] Arc<reqwest::Error>),
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(Arc::new(error))
    }
}

// Verify AuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuthError>();
};
