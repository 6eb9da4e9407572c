//! Configuration types for the Dynamics connector.
//!
//! # Overview
//!
//! - [`ConnectorConfig`]: The connection settings for one organization
//! - [`ConnectorConfigBuilder`]: A builder for constructing [`ConnectorConfig`] instances
//! - [`ConnectionSettings`]: A serde-deserializable mirror for configuration loaders
//! - [`BaseUrl`], [`TenantId`], [`ApplicationId`], [`ApplicationSecret`]: validated newtypes
//! - [`ApiVersion`]: The Web API version to target
//!
//! # Example
//!
//! ```rust
//! use dynamics_connector::{ApplicationId, ApplicationSecret, BaseUrl, ConnectorConfig, TenantId};
//!
//! let config = ConnectorConfig::builder()
//!     .base_url(BaseUrl::new("https://contoso.crm4.dynamics.com").unwrap())
//!     .tenant_id(TenantId::new("contoso.onmicrosoft.com").unwrap())
//!     .application_id(ApplicationId::new("app-id").unwrap())
//!     .application_secret(ApplicationSecret::new("secret").unwrap())
//!     .plural_override("person", "people")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.api_url(), "https://contoso.crm4.dynamics.com/api/data/v9.2/");
//! ```

mod newtypes;
mod version;

pub use newtypes::{ApplicationId, ApplicationSecret, BaseUrl, TenantId};
pub use version::ApiVersion;

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Identity authority used when none is configured.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Connection settings for a Dataverse organization.
///
/// Read-only after construction. `ConnectorConfig` is `Clone`, `Send`, and
/// `Sync`.
#[derive(Clone, Debug)]
pub struct ConnectorConfig {
    base_url: BaseUrl,
    tenant_id: TenantId,
    application_id: ApplicationId,
    application_secret: ApplicationSecret,
    plural_overrides: HashMap<String, String>,
    api_version: ApiVersion,
    authority_host: String,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
}

impl ConnectorConfig {
    /// Creates a new builder for constructing a `ConnectorConfig`.
    #[must_use]
    pub fn builder() -> ConnectorConfigBuilder {
        ConnectorConfigBuilder::new()
    }

    /// Returns the organization URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the Azure AD tenant id.
    #[must_use]
    pub const fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Returns the application (client) id.
    #[must_use]
    pub const fn application_id(&self) -> &ApplicationId {
        &self.application_id
    }

    /// Returns the application secret.
    #[must_use]
    pub const fn application_secret(&self) -> &ApplicationSecret {
        &self.application_secret
    }

    /// Returns the singular to plural entity set overrides.
    #[must_use]
    pub const fn plural_overrides(&self) -> &HashMap<String, String> {
        &self.plural_overrides
    }

    /// Returns the Web API version.
    #[must_use]
    pub const fn api_version(&self) -> &ApiVersion {
        &self.api_version
    }

    /// Returns the identity authority host (without tenant).
    #[must_use]
    pub fn authority_host(&self) -> &str {
        &self.authority_host
    }

    /// Returns the authority for this tenant, `<host>/<tenantId>`.
    #[must_use]
    pub fn authority(&self) -> String {
        format!("{}/{}", self.authority_host, self.tenant_id.as_ref())
    }

    /// Returns the OAuth2 token endpoint for the client-credentials grant.
    #[must_use]
    pub fn token_endpoint(&self) -> String {
        format!("{}/oauth2/v2.0/token", self.authority())
    }

    /// Returns the full service root, e.g. `https://org.crm.dynamics.com/api/data/v9.2/`.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("{}{}", self.base_url.as_ref(), self.api_version.base_path())
    }

    /// Returns the per-request timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify ConnectorConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ConnectorConfig>();
};

/// Builder for constructing [`ConnectorConfig`] instances.
///
/// Required fields are `base_url`, `tenant_id`, `application_id` and
/// `application_secret`.
///
/// # Defaults
///
/// - `api_version`: [`ApiVersion::latest`]
/// - `authority_host`: [`DEFAULT_AUTHORITY_HOST`]
/// - `plural_overrides`: empty
/// - `timeout`: `None`
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct ConnectorConfigBuilder {
    base_url: Option<BaseUrl>,
    tenant_id: Option<TenantId>,
    application_id: Option<ApplicationId>,
    application_secret: Option<ApplicationSecret>,
    plural_overrides: HashMap<String, String>,
    api_version: Option<ApiVersion>,
    authority_host: Option<String>,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
}

impl ConnectorConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the organization URL (required).
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the tenant id (required).
    #[must_use]
    pub fn tenant_id(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    /// Sets the application (client) id (required).
    #[must_use]
    pub fn application_id(mut self, id: ApplicationId) -> Self {
        self.application_id = Some(id);
        self
    }

    /// Sets the application secret (required).
    #[must_use]
    pub fn application_secret(mut self, secret: ApplicationSecret) -> Self {
        self.application_secret = Some(secret);
        self
    }

    /// Adds a single plural override, e.g. `("person", "people")`.
    #[must_use]
    pub fn plural_override(
        mut self,
        singular: impl Into<String>,
        plural: impl Into<String>,
    ) -> Self {
        self.plural_overrides.insert(singular.into(), plural.into());
        self
    }

    /// Replaces all plural overrides at once.
    #[must_use]
    pub fn plural_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.plural_overrides = overrides;
        self
    }

    /// Sets the Web API version.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sets the identity authority host (sovereign clouds, test servers).
    #[must_use]
    pub fn authority_host(mut self, host: impl Into<String>) -> Self {
        self.authority_host = Some(host.into());
        self
    }

    /// Sets a timeout applied to every HTTP exchange, token requests included.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`ConnectorConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if a required field is not set.
    pub fn build(self) -> Result<ConnectorConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingRequiredField { field: "base_url" })?;
        let tenant_id = self
            .tenant_id
            .ok_or(ConfigError::MissingRequiredField { field: "tenant_id" })?;
        let application_id = self
            .application_id
            .ok_or(ConfigError::MissingRequiredField {
                field: "application_id",
            })?;
        let application_secret =
            self.application_secret
                .ok_or(ConfigError::MissingRequiredField {
                    field: "application_secret",
                })?;

        let authority_host = self
            .authority_host
            .map_or_else(
                || DEFAULT_AUTHORITY_HOST.to_string(),
                |host| host.trim_end_matches('/').to_string(),
            );

        Ok(ConnectorConfig {
            base_url,
            tenant_id,
            application_id,
            application_secret,
            plural_overrides: self.plural_overrides,
            api_version: self.api_version.unwrap_or_default(),
            authority_host,
            timeout: self.timeout,
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

/// Raw connection settings as they appear in application configuration files.
///
/// Keys use the PascalCase names common in hosted app settings:
///
/// ```rust
/// use dynamics_connector::{ConnectionSettings, ConnectorConfig};
///
/// let settings: ConnectionSettings = serde_json::from_str(r#"{
///     "CrmUrl": "https://contoso.crm4.dynamics.com",
///     "TenantId": "tenant",
///     "ApplicationId": "app",
///     "ApplicationSecret": "secret",
///     "CustomTablePluralMapping": { "person": "people" }
/// }"#).unwrap();
///
/// let config = ConnectorConfig::try_from(settings).unwrap();
/// assert_eq!(config.plural_overrides()["person"], "people");
/// ```
#[derive(Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConnectionSettings {
    /// Organization URL.
    pub crm_url: String,
    /// Azure AD tenant id.
    pub tenant_id: String,
    /// Application (client) id.
    pub application_id: String,
    /// Client secret.
    pub application_secret: String,
    /// Singular to plural entity set overrides.
    #[serde(default)]
    pub custom_table_plural_mapping: HashMap<String, String>,
    /// Optional Web API version, e.g. `v9.2`.
    #[serde(default)]
    pub api_version: Option<String>,
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("crm_url", &self.crm_url)
            .field("tenant_id", &self.tenant_id)
            .field("application_id", &self.application_id)
            .field("application_secret", &"*****")
            .field("custom_table_plural_mapping", &self.custom_table_plural_mapping)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl TryFrom<ConnectionSettings> for ConnectorConfig {
    type Error = ConfigError;

    fn try_from(settings: ConnectionSettings) -> Result<Self, Self::Error> {
        let mut builder = Self::builder()
            .base_url(BaseUrl::new(settings.crm_url)?)
            .tenant_id(TenantId::new(settings.tenant_id)?)
            .application_id(ApplicationId::new(settings.application_id)?)
            .application_secret(ApplicationSecret::new(settings.application_secret)?)
            .plural_overrides(settings.custom_table_plural_mapping);

        if let Some(version) = settings.api_version {
            builder = builder.api_version(version.parse()?);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_builder() -> ConnectorConfigBuilder {
        ConnectorConfig::builder()
            .base_url(BaseUrl::new("https://contoso.crm.dynamics.com").unwrap())
            .tenant_id(TenantId::new("tenant-id").unwrap())
            .application_id(ApplicationId::new("app-id").unwrap())
            .application_secret(ApplicationSecret::new("secret").unwrap())
    }

    #[test]
    fn test_builder_requires_base_url() {
        let result = ConnectorConfigBuilder::new()
            .tenant_id(TenantId::new("tenant").unwrap())
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "base_url" })
        ));
    }

    #[test]
    fn test_builder_requires_application_secret() {
        let result = ConnectorConfig::builder()
            .base_url(BaseUrl::new("https://contoso.crm.dynamics.com").unwrap())
            .tenant_id(TenantId::new("tenant").unwrap())
            .application_id(ApplicationId::new("app").unwrap())
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField {
                field: "application_secret"
            })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = complete_builder().build().unwrap();

        assert_eq!(config.api_version(), &ApiVersion::V9_2);
        assert_eq!(config.authority_host(), DEFAULT_AUTHORITY_HOST);
        assert!(config.plural_overrides().is_empty());
        assert!(config.timeout().is_none());
        assert!(config.user_agent_prefix().is_none());
    }

    #[test]
    fn test_derived_urls() {
        let config = complete_builder()
            .authority_host("https://login.example.test/")
            .build()
            .unwrap();

        assert_eq!(
            config.api_url(),
            "https://contoso.crm.dynamics.com/api/data/v9.2/"
        );
        assert_eq!(config.authority(), "https://login.example.test/tenant-id");
        assert_eq!(
            config.token_endpoint(),
            "https://login.example.test/tenant-id/oauth2/v2.0/token"
        );
    }

    #[test]
    fn test_config_debug_masks_secret() {
        let config = complete_builder().build().unwrap();
        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("ConnectorConfig"));
        assert!(debug_str.contains("ApplicationSecret(*****)"));
    }

    #[test]
    fn test_settings_conversion_rejects_invalid_url() {
        let settings = ConnectionSettings {
            crm_url: "contoso".to_string(),
            tenant_id: "tenant".to_string(),
            application_id: "app".to_string(),
            application_secret: "secret".to_string(),
            custom_table_plural_mapping: HashMap::new(),
            api_version: None,
        };

        assert!(matches!(
            ConnectorConfig::try_from(settings),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_settings_debug_masks_secret() {
        let settings: ConnectionSettings = serde_json::from_str(
            r#"{"CrmUrl":"https://x.crm.dynamics.com","TenantId":"t","ApplicationId":"a",
                "ApplicationSecret":"hunter2","ApiVersion":"9.1"}"#,
        )
        .unwrap();
        assert!(!format!("{settings:?}").contains("hunter2"));

        let config = ConnectorConfig::try_from(settings).unwrap();
        assert_eq!(config.api_version(), &ApiVersion::V9_1);
    }
}
