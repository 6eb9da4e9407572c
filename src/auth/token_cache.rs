//! Lazily refreshed, single-flight bearer token cache.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::Mutex;

use crate::auth::{AuthError, CachedToken, ClientCredentials};

/// Holds the current bearer token for one connector.
///
/// [`get_valid_token`](Self::get_valid_token) returns the cached token while
/// it is valid and otherwise acquires a new one. The cache lock is held
/// across the acquisition, so concurrent callers racing past expiry wait for
/// the single in-flight refresh instead of each requesting a token.
///
/// Callers that queued behind an acquisition share its outcome, failure
/// included. A failed acquisition leaves the cache empty and is not retried;
/// the next call that starts after it completes tries again.
#[derive(Debug)]
pub struct TokenCache {
    credentials: ClientCredentials,
    http: reqwest::Client,
    /// Number of completed acquisitions, readable without the lock.
    acquisitions: AtomicU64,
    state: Mutex<TokenState>,
}

#[derive(Debug, Default)]
struct TokenState {
    token: Option<CachedToken>,
    /// Error of the most recent acquisition, cleared on success.
    last_failure: Option<AuthError>,
}

// Verify TokenCache is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TokenCache>();
};

impl TokenCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(credentials: ClientCredentials, http: reqwest::Client) -> Self {
        Self {
            credentials,
            http,
            acquisitions: AtomicU64::new(0),
            state: Mutex::new(TokenState::default()),
        }
    }

    /// Creates a cache seeded with an existing token.
    #[must_use]
    pub fn with_token(
        credentials: ClientCredentials,
        http: reqwest::Client,
        token: CachedToken,
    ) -> Self {
        Self {
            credentials,
            http,
            acquisitions: AtomicU64::new(0),
            state: Mutex::new(TokenState {
                token: Some(token),
                last_failure: None,
            }),
        }
    }

    /// Returns a bearer token valid for at least the safety margin,
    /// refreshing it first if needed.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] of the failed acquisition unchanged. Callers
    /// that were waiting on that acquisition receive a clone of the same
    /// error without contacting the identity provider.
    pub async fn get_valid_token(&self) -> Result<String, AuthError> {
        let observed = self.acquisitions.load(Ordering::Acquire);
        let mut state = self.state.lock().await;

        if let Some(token) = state.token.as_ref().filter(|t| t.is_valid_at(Utc::now())) {
            return Ok(token.access_token().to_string());
        }

        // An acquisition finished while this caller was queued.
        if self.acquisitions.load(Ordering::Acquire) != observed {
            if let Some(error) = &state.last_failure {
                return Err(error.clone());
            }
        }

        tracing::debug!(
            endpoint = self.credentials.token_endpoint(),
            "Access token missing or expiring, refreshing"
        );

        // Drop the stale token before awaiting so a cancelled or failed
        // refresh leaves the cache empty.
        state.token = None;
        let outcome = self.credentials.acquire(&self.http).await;
        self.acquisitions.fetch_add(1, Ordering::AcqRel);

        match outcome {
            Ok(token) => {
                let access_token = token.access_token().to_string();
                state.token = Some(token);
                state.last_failure = None;
                Ok(access_token)
            }
            Err(error) => {
                state.last_failure = Some(error.clone());
                Err(error)
            }
        }
    }

    /// Returns a copy of the cached token, valid or not.
    pub async fn current_token(&self) -> Option<CachedToken> {
        self.state.lock().await.token.clone()
    }

    /// Forgets the cached token so the next request acquires a new one.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.token = None;
        state.last_failure = None;
    }
}
