//! HTTP client types for Web API communication.
//!
//! This module provides the transport layer beneath the
//! [`DynamicsConnector`](crate::DynamicsConnector) facade: authenticated
//! request/response processing and OData header handling.
//!
//! # Overview
//!
//! - [`HttpClient`]: The async HTTP client for API communication
//! - [`HttpRequest`]: A request to be sent to the API
//! - [`HttpResponse`]: A response from the API
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PATCH, DELETE)
//! - [`DataType`]: Content types for request bodies
//! - [`ConnectorError`] / [`ApiError`]: Failure types
//!
//! # Example
//!
//! ```rust,ignore
//! use dynamics_connector::clients::{HttpClient, HttpMethod, HttpRequest};
//!
//! let client = HttpClient::new(&config)?;
//!
//! let request = HttpRequest::builder(HttpMethod::Get, "accounts?$select=name")
//!     .page_size(100)
//!     .build()?;
//!
//! let response = client.request(request).await?;
//! ```
//!
//! # Retry Behavior
//!
//! None. Every failure is returned to the caller on the first attempt.

mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{ApiError, ConnectorError, InvalidHttpRequestError};
pub use http_client::{prefer_header, HttpClient, PREFER_ANNOTATIONS, SDK_VERSION};
pub use http_request::{DataType, HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::{parse_entity_id, HttpResponse, ODATA_ENTITY_ID_HEADER};
