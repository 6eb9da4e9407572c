//! HTTP client for Web API communication.
//!
//! This module provides the [`HttpClient`] type, which attaches the bearer
//! token and the OData headers to every request and turns non-success
//! responses into [`ApiError`]s.

use std::collections::HashMap;

use crate::auth::{ClientCredentials, TokenCache};
use crate::clients::errors::{ApiError, ConnectorError};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::ConnectorConfig;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// `Prefer` value asking for all annotations (formatted values, lookup names).
pub const PREFER_ANNOTATIONS: &str = "odata.include-annotations=\"*\"";

/// Returns the `Prefer` header value for a request, with server-side paging
/// when `page_size` is set.
///
/// ```rust
/// use dynamics_connector::clients::prefer_header;
///
/// assert_eq!(prefer_header(None), r#"odata.include-annotations="*""#);
/// assert_eq!(
///     prefer_header(Some(50)),
///     r#"odata.maxpagesize=50,odata.include-annotations="*""#
/// );
/// ```
#[must_use]
pub fn prefer_header(page_size: Option<u32>) -> String {
    page_size.map_or_else(
        || PREFER_ANNOTATIONS.to_string(),
        |size| format!("odata.maxpagesize={size},{PREFER_ANNOTATIONS}"),
    )
}

/// HTTP client for making authenticated requests to the Web API.
///
/// The client handles:
/// - URL resolution against the service root (absolute continuation links pass through)
/// - Default headers: `Accept`, `Accept-Charset`, `OData-MaxVersion`, `OData-Version`,
///   `Prefer`, `User-Agent`; per-request headers replace them by case-insensitive name
/// - Bearer authorization from the [`TokenCache`], refreshed before it expires
/// - Mapping of non-2xx responses to [`ConnectorError::Api`]
///
/// Requests are never retried.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use dynamics_connector::clients::{HttpClient, HttpMethod, HttpRequest};
///
/// let client = HttpClient::new(&config)?;
///
/// let request = HttpRequest::builder(HttpMethod::Get, "WhoAmI").build()?;
/// let response = client.request(request).await?;
/// println!("{}", response.body);
/// ```
#[derive(Debug)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Service root, e.g. `https://org.crm.dynamics.com/api/data/v9.2/`.
    api_url: String,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
    /// Bearer token source.
    tokens: TokenCache,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client for the organization in `config`.
    ///
    /// The configured timeout applies to every request, token requests
    /// included.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Transport`] if the TLS backend cannot be
    /// initialized.
    pub fn new(config: &ConnectorConfig) -> Result<Self, ConnectorError> {
        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let tokens = TokenCache::new(ClientCredentials::from_config(config), client.clone());
        Ok(Self::with_parts(config, client, tokens))
    }

    /// Creates a client around an existing reqwest client and token cache.
    #[must_use]
    pub fn with_parts(
        config: &ConnectorConfig,
        client: reqwest::Client,
        tokens: TokenCache,
    ) -> Self {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}Dynamics Connector v{SDK_VERSION} | Rust {rust_version}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        default_headers.insert("Accept-Charset".to_string(), "utf-8".to_string());
        default_headers.insert("OData-MaxVersion".to_string(), "4.0".to_string());
        default_headers.insert("OData-Version".to_string(), "4.0".to_string());

        Self {
            client,
            api_url: config.api_url(),
            default_headers,
            tokens,
        }
    }

    /// Returns the service root all relative paths are resolved against.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns the token cache used for authorization.
    #[must_use]
    pub const fn token_cache(&self) -> &TokenCache {
        &self.tokens
    }

    /// Resolves a request path to an absolute URL.
    #[must_use]
    pub fn url_for(&self, request: &HttpRequest) -> String {
        if request.is_absolute() {
            request.path.clone()
        } else {
            format!("{}{}", self.api_url, request.path.trim_start_matches('/'))
        }
    }

    /// Sends a request to the Web API.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - No token can be acquired (`Auth`)
    /// - A network error occurs (`Transport`)
    /// - A non-2xx response is received (`Api`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, ConnectorError> {
        let response = self.send(&request).await?;

        let code = response.status().as_u16();
        let reason = response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string();
        let headers = Self::parse_response_headers(response.headers());
        let body = response.text().await?;

        let response = HttpResponse::new(code, reason, headers, body);

        if response.is_ok() {
            return Ok(response);
        }

        tracing::warn!(
            method = %request.http_method,
            path = %request.path,
            status = code,
            "Web API request failed"
        );

        Err(ConnectorError::Api(ApiError {
            method: request.http_method,
            path: request.path,
            status: response.code,
            reason: response.reason,
            response_body: response.body,
            request_payload: request.body,
            context: None,
        }))
    }

    /// Downloads `path` fully into memory.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::BinaryDownload`] for a non-2xx response;
    /// the response body is not inspected.
    pub async fn request_bytes(&self, path: &str) -> Result<Vec<u8>, ConnectorError> {
        let request = HttpRequest::builder(HttpMethod::Get, path).build()?;
        let response = self.send(&request).await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(path, status = status.as_u16(), "Binary download failed");
            return Err(ConnectorError::BinaryDownload {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn send(&self, request: &HttpRequest) -> Result<reqwest::Response, ConnectorError> {
        request.verify()?;

        let url = self.url_for(request);
        let token = self.tokens.get_valid_token().await?;

        // Header names are case-insensitive; keys are lowercased so caller
        // headers replace defaults instead of duplicating them.
        let mut headers: HashMap<String, String> = self
            .default_headers
            .iter()
            .map(|(key, value)| (key.to_ascii_lowercase(), value.clone()))
            .collect();
        headers.insert("prefer".to_string(), prefer_header(request.page_size));
        if let Some(body_type) = &request.body_type {
            headers.insert("content-type".to_string(), body_type.as_content_type());
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                headers.insert(key.to_ascii_lowercase(), value.clone());
            }
        }

        let mut req_builder = self
            .client
            .request(request.http_method.into(), &url)
            .bearer_auth(token);

        for (key, value) in &headers {
            req_builder = req_builder.header(key, value);
        }

        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.clone());
        }

        tracing::debug!(method = %request.http_method, %url, "Sending Web API request");

        Ok(req_builder.send().await?)
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}
