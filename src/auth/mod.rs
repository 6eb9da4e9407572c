//! Authentication for the Dataverse Web API.
//!
//! The connector authenticates as an application user with the OAuth 2.0
//! client-credentials grant and keeps the resulting bearer token in a
//! [`TokenCache`] that refreshes it lazily.
//!
//! # Overview
//!
//! - [`ClientCredentials`]: token endpoint, client id/secret and scope for one organization
//! - [`CachedToken`]: an access token and its absolute expiry
//! - [`TokenCache`]: single-flight cache returning a valid token on demand
//! - [`AuthError`]: token acquisition failures
//!
//! # Example
//!
//! ```rust,ignore
//! use dynamics_connector::auth::{ClientCredentials, TokenCache};
//!
//! let cache = TokenCache::new(ClientCredentials::from_config(&config), reqwest::Client::new());
//! let bearer = cache.get_valid_token().await?;
//! ```

mod client_credentials;
mod error;
mod token;
mod token_cache;

pub use client_credentials::ClientCredentials;
pub use error::AuthError;
pub use token::{CachedToken, TokenResponse, TOKEN_EXPIRY_MARGIN_SECS};
pub use token_cache::TokenCache;
