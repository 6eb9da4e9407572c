//! HTTP request types for the Web API.
//!
//! This module provides the [`HttpRequest`] type and its builder for
//! describing one exchange before the client attaches authentication and the
//! OData headers.

use std::collections::HashMap;
use std::fmt;

use crate::clients::errors::InvalidHttpRequestError;

/// HTTP methods used by the Web API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Retrieve records, functions and `$ref` collections.
    Get,
    /// Create records, associate via `$ref`, send `$batch`.
    Post,
    /// Update records.
    Patch,
    /// Delete records and disassociate via `$ref`.
    Delete,
}

impl HttpMethod {
    /// Returns the method as written on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Patch => Self::PATCH,
            HttpMethod::Delete => Self::DELETE,
        }
    }
}

/// Content type for HTTP request bodies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataType {
    /// JSON content type (`application/json`).
    Json,
    /// A `$batch` body delimited by `boundary`.
    MultipartMixed {
        /// The multipart boundary, without the leading `--`.
        boundary: String,
    },
}

impl DataType {
    /// Returns the `Content-Type` header value for this data type.
    #[must_use]
    pub fn as_content_type(&self) -> String {
        match self {
            Self::Json => "application/json".to_string(),
            Self::MultipartMixed { boundary } => format!("multipart/mixed;boundary={boundary}"),
        }
    }
}

/// An HTTP request to be sent to the Web API.
///
/// `path` is relative to the service root unless it is an absolute URL, as
/// continuation links are.
///
/// # Example
///
/// ```rust
/// use dynamics_connector::clients::{DataType, HttpMethod, HttpRequest};
///
/// let page = HttpRequest::builder(HttpMethod::Get, "accounts?$select=name")
///     .page_size(50)
///     .build()
///     .unwrap();
/// assert_eq!(page.page_size, Some(50));
///
/// let create = HttpRequest::builder(HttpMethod::Post, "accounts")
///     .body(r#"{"name":"Contoso"}"#)
///     .body_type(DataType::Json)
///     .build()
///     .unwrap();
/// assert_eq!(create.body.as_deref(), Some(r#"{"name":"Contoso"}"#));
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// The path for this request.
    pub path: String,
    /// The serialized request body, if any.
    pub body: Option<String>,
    /// The content type of the body.
    pub body_type: Option<DataType>,
    /// Requested page size, sent as `odata.maxpagesize`.
    pub page_size: Option<u32>,
    /// Additional headers to include in the request.
    pub extra_headers: Option<HashMap<String, String>>,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, path)
    }

    /// Validates the request, ensuring it meets all requirements.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if:
    /// - `body` is `Some` but `body_type` is `None`
    /// - `http_method` is `Post` or `Patch` but `body` is `None`
    pub fn verify(&self) -> Result<(), InvalidHttpRequestError> {
        if self.body.is_some() && self.body_type.is_none() {
            return Err(InvalidHttpRequestError::MissingBodyType);
        }

        if matches!(self.http_method, HttpMethod::Post | HttpMethod::Patch) && self.body.is_none() {
            return Err(InvalidHttpRequestError::MissingBody {
                method: self.http_method.to_string(),
            });
        }

        Ok(())
    }

    /// Returns `true` if `path` is an absolute URL rather than a path below
    /// the service root.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.path.starts_with("https://") || self.path.starts_with("http://")
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    http_method: HttpMethod,
    path: String,
    body: Option<String>,
    body_type: Option<DataType>,
    page_size: Option<u32>,
    extra_headers: Option<HashMap<String, String>>,
}

impl HttpRequestBuilder {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            http_method: method,
            path: path.into(),
            body: None,
            body_type: None,
            page_size: None,
            extra_headers: None,
        }
    }

    /// Sets the serialized request body.
    ///
    /// When setting a body, you must also set the body type via [`body_type`](Self::body_type).
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the content type of the request body.
    #[must_use]
    pub fn body_type(mut self, body_type: DataType) -> Self {
        self.body_type = Some(body_type);
        self
    }

    /// Requests server-side paging with at most `page_size` records per page.
    #[must_use]
    pub const fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Adds a single extra header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Builds the [`HttpRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHttpRequestError`] if the request fails validation.
    pub fn build(self) -> Result<HttpRequest, InvalidHttpRequestError> {
        let request = HttpRequest {
            http_method: self.http_method,
            path: self.path,
            body: self.body,
            body_type: self.body_type,
            page_size: self.page_size,
            extra_headers: self.extra_headers,
        };
        request.verify()?;
        Ok(request)
    }
}
