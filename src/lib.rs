//! # Dynamics Connector
//!
//! An async client for the Dataverse (Dynamics 365) Web API: typed record
//! operations over OData v4 with application-user authentication.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ConnectorConfig`] and [`ConnectorConfigBuilder`]
//! - Validated newtypes for the organization URL and Azure AD credentials
//! - OAuth 2.0 client credentials with a lazily refreshed, single-flight token cache
//! - Record CRUD, paged and exhaustive queries, binary downloads
//! - Relationship association via `$ref`, `InitializeFrom`, and `$batch` requests
//! - Entity set name pluralization with per-table overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use dynamics_connector::{
//!     ApplicationId, ApplicationSecret, BaseUrl, ConnectorConfig, DynamicsConnector, TenantId,
//! };
//!
//! let config = ConnectorConfig::builder()
//!     .base_url(BaseUrl::new("https://contoso.crm4.dynamics.com").unwrap())
//!     .tenant_id(TenantId::new("00000000-0000-0000-0000-000000000000").unwrap())
//!     .application_id(ApplicationId::new("your-app-id").unwrap())
//!     .application_secret(ApplicationSecret::new("your-secret").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let connector = DynamicsConnector::new(&config).unwrap();
//! assert_eq!(connector.pluralize("opportunity"), "opportunities");
//! ```
//!
//! ## Working With Records
//!
//! ```rust,ignore
//! use dynamics_connector::{EntityReference, PagedResult};
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct Account {
//!     accountid: uuid::Uuid,
//!     name: String,
//! }
//!
//! let id = connector.create("account", &json!({"name": "Contoso"})).await?;
//! let account: Account = connector.retrieve("account", id, "?$select=name").await?;
//!
//! let page: PagedResult<Account> = connector
//!     .retrieve_multiple("account", "?$select=name&$orderby=name", 100)
//!     .await?;
//! let everything: Vec<Account> = connector.retrieve_all("account", "?$select=name", 5000).await?;
//!
//! connector.delete("account", id).await?;
//! ```
//!
//! ## Relationships
//!
//! ```rust,ignore
//! use dynamics_connector::EntityReference;
//!
//! let team = EntityReference::new(team_id, "team");
//! let users = vec![EntityReference::new(user_id, "systemuser")];
//!
//! connector.add_relationship(&team, &users, "teammembership_association").await?;
//! connector.remove_relationship(&team, "teammembership_association", user_id).await?;
//! ```
//!
//! ## Batches
//!
//! ```rust,ignore
//! use dynamics_connector::{BatchCommand, BatchInstruction};
//! use serde_json::json;
//!
//! let instructions = vec![
//!     BatchInstruction::new(BatchCommand::Post, "accounts", json!({"name": "A"})),
//!     BatchInstruction::new(BatchCommand::Patch, format!("accounts({id})"), json!({"name": "B"})),
//! ];
//! let multipart_response = connector.execute_batch(&instructions).await?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: All newtypes validate on construction
//! - **Thread-safe**: All types are `Send + Sync`
//! - **No hidden retries**: Every failure reaches the caller as a [`ConnectorError`]

pub mod auth;
pub mod clients;
pub mod config;
pub mod connector;
pub mod error;
pub mod odata;

// Re-export public types at crate root for convenience
pub use auth::{AuthError, CachedToken, TokenCache};
pub use config::{
    ApiVersion, ApplicationId, ApplicationSecret, BaseUrl, ConnectionSettings, ConnectorConfig,
    ConnectorConfigBuilder, TenantId,
};
pub use connector::{DynamicsConnector, DEFAULT_PAGE_SIZE};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    ApiError, ConnectorError, DataType, HttpClient, HttpMethod, HttpRequest, HttpRequestBuilder,
    HttpResponse, InvalidHttpRequestError,
};

// Re-export OData types
pub use odata::{
    BatchCommand, BatchInstruction, BatchRequest, EntityReference, PagedResult, Pluralizer,
};
