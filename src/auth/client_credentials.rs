//! OAuth 2.0 Client Credentials Grant against Azure AD.
//!
//! Server-to-server authentication for an application user: the connector
//! exchanges its application id and secret for a bearer token scoped to the
//! organization (`<BaseUrl>/.default`).
//!
//! # Example
//!
//! ```rust,ignore
//! use dynamics_connector::auth::ClientCredentials;
//!
//! let credentials = ClientCredentials::from_config(&config);
//! let token = credentials.acquire(&reqwest::Client::new()).await?;
//! println!("expires at {}", token.expires_at());
//! ```

use chrono::Utc;
use serde::Serialize;

use crate::auth::{AuthError, CachedToken, TokenResponse};
use crate::config::{ApplicationId, ApplicationSecret, ConnectorConfig};

/// Grant type for client credentials.
const CLIENT_CREDENTIALS_GRANT_TYPE: &str = "client_credentials";

/// Form body of the token request.
#[derive(Debug, Serialize)]
struct ClientCredentialsRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    scope: &'a str,
}

/// Everything needed to request a token for one organization.
#[derive(Clone, Debug)]
pub struct ClientCredentials {
    token_endpoint: String,
    application_id: ApplicationId,
    application_secret: ApplicationSecret,
    scope: String,
}

impl ClientCredentials {
    /// Derives the token endpoint, client credentials and scope from `config`.
    #[must_use]
    pub fn from_config(config: &ConnectorConfig) -> Self {
        Self {
            token_endpoint: config.token_endpoint(),
            application_id: config.application_id().clone(),
            application_secret: config.application_secret().clone(),
            scope: config.base_url().default_scope(),
        }
    }

    /// The OAuth2 token endpoint.
    #[must_use]
    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    /// The requested scope.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Requests a new access token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Network`] if the token endpoint cannot be reached
    /// - [`AuthError::ClientCredentialsFailed`] if the identity provider rejects the request
    /// - [`AuthError::InvalidTokenResponse`] if the success body is not a token response
    pub async fn acquire(&self, http: &reqwest::Client) -> Result<CachedToken, AuthError> {
        let request_body = ClientCredentialsRequest {
            grant_type: CLIENT_CREDENTIALS_GRANT_TYPE,
            client_id: self.application_id.as_ref(),
            client_secret: self.application_secret.as_ref(),
            scope: &self.scope,
        };

        let issued_at = Utc::now();
        let response = http
            .post(&self.token_endpoint)
            .form(&request_body)
            .send()
            .await?;

        let status = response.status().as_u16();

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status, "Token request rejected by identity provider");
            return Err(AuthError::ClientCredentialsFailed {
                status,
                message: error_body,
            });
        }

        let body = response.text().await?;
        let token_response: TokenResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::InvalidTokenResponse {
                reason: e.to_string(),
            })?;

        let expires_in = token_response.expires_in;
        let token = token_response.into_cached(issued_at).ok_or_else(|| {
            AuthError::InvalidTokenResponse {
                reason: format!("expires_in {expires_in} is out of range"),
            }
        })?;
        tracing::debug!(expires_at = %token.expires_at(), "Acquired access token");

        Ok(token)
    }
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientCredentialsRequest<'_>>();
    assert_send_sync::<ClientCredentials>();
};
