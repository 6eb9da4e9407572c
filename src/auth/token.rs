//! Bearer token types.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Seconds before expiry at which a token is treated as expired.
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 2;

/// An access token together with its absolute expiry.
///
/// The `Debug` implementation masks the token value.
///
/// # Example
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use dynamics_connector::auth::CachedToken;
///
/// let expires_at = Utc::now() + Duration::minutes(30);
/// let token = CachedToken::new("eyJ0eXAi...", expires_at);
///
/// assert!(token.is_valid());
/// assert!(!token.is_valid_at(expires_at - Duration::seconds(1)));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Creates a token expiring at `expires_at`.
    #[must_use]
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// The raw bearer token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// When the token stops being accepted.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns `true` if the token is still usable at `now`, i.e. it expires
    /// strictly after `now` plus the safety margin.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now + Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS)
    }

    /// Returns `true` if the token is usable right now.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &"*****")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Response body of the OAuth2 token endpoint.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    /// The bearer token.
    pub access_token: String,
    /// Token type, normally `Bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds from issuance.
    pub expires_in: i64,
}

impl TokenResponse {
    /// Converts the relative lifetime into an absolute expiry.
    ///
    /// Returns `None` if `issued_at + expires_in` is not a representable
    /// instant.
    #[must_use]
    pub fn into_cached(self, issued_at: DateTime<Utc>) -> Option<CachedToken> {
        let expires_at = Duration::try_seconds(self.expires_in)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))?;
        Some(CachedToken::new(self.access_token, expires_at))
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"*****")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

// Verify token types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CachedToken>();
    assert_send_sync::<TokenResponse>();
};
