//! The record-level facade over the Web API.
//!
//! [`DynamicsConnector`] turns entity-level intents (create an `account`,
//! list the `contact`s of a parent, associate two records) into requests
//! against the service root, using the [`Pluralizer`] to derive entity set
//! names and the [`HttpClient`] for authentication and transport.
//!
//! # Example
//!
//! ```rust,ignore
//! use dynamics_connector::{ConnectorConfig, DynamicsConnector, EntityReference};
//! use serde_json::json;
//!
//! let connector = DynamicsConnector::new(&config)?;
//!
//! let id = connector.create("account", &json!({"name": "Contoso"})).await?;
//! connector.update("account", id, &json!({"telephone1": "555-0100"})).await?;
//!
//! let contacts: Vec<serde_json::Value> = connector
//!     .get_children_by_foreign_key("contact", "_parentcustomerid_value", id, Some(&["fullname"]))
//!     .await?;
//! ```

mod pagination;

pub use pagination::drain_pages;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::clients::{
    ApiError, ConnectorError, DataType, HttpClient, HttpMethod, HttpRequest, HttpResponse,
};
use crate::config::ConnectorConfig;
use crate::odata::{
    to_compact_json, BatchInstruction, BatchRequest, EntityReference, PagedResult, Pluralizer,
};

/// Page size requested when the caller does not choose one.
pub const DEFAULT_PAGE_SIZE: u32 = 5000;

/// Client for one Dataverse organization.
///
/// All operations share one [`HttpClient`] and therefore one token cache.
/// The connector is `Send + Sync`; wrap it in an `Arc` to share it across
/// tasks. Operations are cancelled by dropping their future.
#[derive(Debug)]
pub struct DynamicsConnector {
    http: HttpClient,
    pluralizer: Pluralizer,
}

// Verify DynamicsConnector is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DynamicsConnector>();
};

impl DynamicsConnector {
    /// Creates a connector for the organization in `config`.
    ///
    /// No request is sent until the first operation; the first operation
    /// acquires the bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &ConnectorConfig) -> Result<Self, ConnectorError> {
        Ok(Self::with_http_client(config, HttpClient::new(config)?))
    }

    /// Creates a connector around an existing [`HttpClient`].
    #[must_use]
    pub fn with_http_client(config: &ConnectorConfig, http: HttpClient) -> Self {
        Self {
            http,
            pluralizer: Pluralizer::with_overrides(config.plural_overrides().clone()),
        }
    }

    /// The underlying HTTP client.
    #[must_use]
    pub const fn http_client(&self) -> &HttpClient {
        &self.http
    }

    /// The entity set name resolver, including configured overrides.
    #[must_use]
    pub const fn pluralizer(&self) -> &Pluralizer {
        &self.pluralizer
    }

    /// Returns the entity set name for `entity_name`.
    #[must_use]
    pub fn pluralize(&self, entity_name: &str) -> String {
        self.pluralizer.pluralize(entity_name)
    }

    /// Full service root, e.g. `https://org.crm.dynamics.com/api/data/v9.2/`.
    #[must_use]
    pub fn api_url(&self) -> &str {
        self.http.api_url()
    }

    /// Returns `<entity set>(<id>)`.
    #[must_use]
    pub fn record_path(&self, entity_name: &str, id: Uuid) -> String {
        format!("{}({id})", self.pluralize(entity_name))
    }

    /// Creates a record and returns its id.
    ///
    /// # Errors
    ///
    /// - [`ConnectorError::Api`] if the service rejects the record
    /// - [`ConnectorError::ProtocolInvariant`] if the success response carries
    ///   no parseable `OData-EntityId` header
    pub async fn create<P: Serialize + ?Sized>(
        &self,
        entity_name: &str,
        payload: &P,
    ) -> Result<Uuid, ConnectorError> {
        let path = self.pluralize(entity_name);
        let body = to_compact_json(payload).map_err(ConnectorError::Serialize)?;
        let response = self
            .send_body(HttpMethod::Post, path.clone(), body.clone())
            .await?;

        if let Some(id) = response.entity_id() {
            tracing::debug!(entity = entity_name, %id, "Created record");
            return Ok(id);
        }

        tracing::warn!(
            path = %path,
            status = response.code,
            "Create response has no OData-EntityId header"
        );
        Err(ConnectorError::ProtocolInvariant(
            ApiError {
                method: HttpMethod::Post,
                path,
                status: response.code,
                reason: response.reason,
                response_body: response.body,
                request_payload: Some(body),
                context: None,
            }
            .with_context("response is missing the OData-EntityId header"),
        ))
    }

    /// Updates the given columns of a record.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Api`] if the service rejects the update.
    pub async fn update<P: Serialize + ?Sized>(
        &self,
        entity_name: &str,
        id: Uuid,
        payload: &P,
    ) -> Result<(), ConnectorError> {
        let body = to_compact_json(payload).map_err(ConnectorError::Serialize)?;
        self.send_body(HttpMethod::Patch, self.record_path(entity_name, id), body)
            .await?;
        Ok(())
    }

    /// Deletes a record.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Api`] if the service rejects the delete.
    pub async fn delete(&self, entity_name: &str, id: Uuid) -> Result<(), ConnectorError> {
        let request =
            HttpRequest::builder(HttpMethod::Delete, self.record_path(entity_name, id)).build()?;
        self.http.request(request).await?;
        Ok(())
    }

    /// Retrieves one record. `options` is appended verbatim, e.g.
    /// `?$select=name,telephone1`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Api`] for a non-success response and
    /// [`ConnectorError::Deserialize`] if the record does not match `T`.
    pub async fn retrieve<T: DeserializeOwned>(
        &self,
        entity_name: &str,
        id: Uuid,
        options: &str,
    ) -> Result<T, ConnectorError> {
        let path = format!("{}{options}", self.record_path(entity_name, id));
        self.get(&path).await
    }

    /// Retrieves the first page of a collection query.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Api`] for a non-success response and
    /// [`ConnectorError::Deserialize`] if the page does not match `T`.
    pub async fn retrieve_multiple<T: DeserializeOwned>(
        &self,
        entity_name: &str,
        options: &str,
        page_size: u32,
    ) -> Result<PagedResult<T>, ConnectorError> {
        let path = format!("{}{options}", self.pluralize(entity_name));
        self.get_paged(&path, page_size).await
    }

    /// Retrieves every record of a collection query, following continuation links.
    ///
    /// # Errors
    ///
    /// The first failing page aborts the whole retrieval.
    pub async fn retrieve_all<T: DeserializeOwned>(
        &self,
        entity_name: &str,
        options: &str,
        page_size: u32,
    ) -> Result<Vec<T>, ConnectorError> {
        let path = format!("{}{options}", self.pluralize(entity_name));
        self.get_all(&path, page_size).await
    }

    /// Sends a GET to `path` (relative to the service root, or absolute) and
    /// deserializes the body.
    ///
    /// An empty body deserializes as `null`, so `T` may be an `Option`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Api`] for a non-success response and
    /// [`ConnectorError::Deserialize`] if the body does not match `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConnectorError> {
        let request = HttpRequest::builder(HttpMethod::Get, path).build()?;
        let response = self.http.request(request).await?;
        parse_body(path, &response)
    }

    /// Sends a paged GET to `path` and returns one page.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub async fn get_paged<T: DeserializeOwned>(
        &self,
        path: &str,
        page_size: u32,
    ) -> Result<PagedResult<T>, ConnectorError> {
        let request = HttpRequest::builder(HttpMethod::Get, path)
            .page_size(page_size)
            .build()?;
        let response = self.http.request(request).await?;
        let page: Option<PagedResult<T>> = parse_body(path, &response)?;
        Ok(page.unwrap_or_default())
    }

    /// Fetches `path` and all following pages.
    ///
    /// # Errors
    ///
    /// The first failing page aborts the whole retrieval.
    pub async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        page_size: u32,
    ) -> Result<Vec<T>, ConnectorError> {
        drain_pages(path.to_string(), |next| async move {
            self.get_paged::<T>(&next, page_size).await
        })
        .await
    }

    /// POSTs `payload` to `path` and deserializes the response body.
    ///
    /// An empty body (`204 No Content`) deserializes as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Api`] for a non-success response and
    /// [`ConnectorError::Deserialize`] if the body does not match `T`.
    pub async fn post<T, P>(&self, path: &str, payload: &P) -> Result<T, ConnectorError>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let body = to_compact_json(payload).map_err(ConnectorError::Serialize)?;
        let response = self.send_body(HttpMethod::Post, path.to_string(), body).await?;
        parse_body(path, &response)
    }

    /// Downloads a file or image column, e.g.
    /// `annotations(<id>)/documentbody/$value`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::BinaryDownload`] for a non-success response.
    pub async fn get_binary(&self, path: &str) -> Result<Vec<u8>, ConnectorError> {
        self.http.request_bytes(path).await
    }

    /// Returns the records related to `parent` through a collection-valued
    /// navigation property, optionally limited to `columns`.
    ///
    /// A parent that does not exist, or whose response lacks the property,
    /// yields an empty list.
    ///
    /// # Errors
    ///
    /// Any failure other than a missing parent is returned.
    pub async fn get_related_collection<T: DeserializeOwned>(
        &self,
        parent: &EntityReference,
        relation_field: &str,
        columns: Option<&[&str]>,
    ) -> Result<Vec<T>, ConnectorError> {
        let select = columns.map_or_else(String::new, |c| format!("($select={})", c.join(",")));
        let options = format!("?$expand={relation_field}{select}");

        let record: Option<Value> = match self
            .retrieve(parent.logical_name(), parent.id(), &options)
            .await
        {
            Ok(record) => record,
            Err(ConnectorError::Api(error)) if error.status == 404 => {
                tracing::debug!(
                    parent = %parent.id(),
                    "Parent record not found, no related records"
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        match record.as_ref().and_then(|r| r.get(relation_field)) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(related) => {
                serde_json::from_value(related.clone()).map_err(|source| {
                    ConnectorError::Deserialize {
                        path: parent.bind_path(&self.pluralizer),
                        source,
                    }
                })
            }
        }
    }

    /// Returns every `entity_name` record whose lookup `relation_field`
    /// points at `parent_id`.
    ///
    /// # Errors
    ///
    /// The first failing page aborts the whole retrieval.
    pub async fn get_children_by_foreign_key<T: DeserializeOwned>(
        &self,
        entity_name: &str,
        relation_field: &str,
        parent_id: Uuid,
        columns: Option<&[&str]>,
    ) -> Result<Vec<T>, ConnectorError> {
        let select = columns.map_or_else(String::new, |c| format!("&$select={}", c.join(",")));
        let options = format!("?$filter={relation_field} eq {parent_id}{select}");
        self.retrieve_all(entity_name, &options, DEFAULT_PAGE_SIZE)
            .await
    }

    /// Associates each of `children` with `parent` through the
    /// collection-valued navigation property `field_name`.
    ///
    /// Sends one request per child, in order; the first failure stops the
    /// sequence and earlier associations stay in place. An empty `children`
    /// sends nothing.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing association.
    pub async fn add_relationship(
        &self,
        parent: &EntityReference,
        children: &[EntityReference],
        field_name: &str,
    ) -> Result<(), ConnectorError> {
        if children.is_empty() {
            return Ok(());
        }

        let path = format!("{}/{field_name}/$ref", parent.bind_path(&self.pluralizer));
        let context = format!("{}$metadata#$ref", self.api_url());

        for child in children {
            let payload = json!({
                "@odata.id": child.absolute_url(self.api_url(), &self.pluralizer),
                "@odata.context": context,
            });
            let _: Value = self.post(&path, &payload).await?;
        }

        Ok(())
    }

    /// Removes the association between `parent` and `child_id` through
    /// `relation_field`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Api`] if the service rejects the request.
    pub async fn remove_relationship(
        &self,
        parent: &EntityReference,
        relation_field: &str,
        child_id: Uuid,
    ) -> Result<(), ConnectorError> {
        let path = format!(
            "{}/{relation_field}({child_id})/$ref",
            parent.bind_path(&self.pluralizer)
        );
        let request = HttpRequest::builder(HttpMethod::Delete, path).build()?;
        self.http.request(request).await?;
        Ok(())
    }

    /// Calls the `InitializeFrom` function: a new, unsaved
    /// `target_logical_name` record pre-filled from `moniker` through the
    /// configured column mappings.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Api`] for a non-success response and
    /// [`ConnectorError::Deserialize`] if the body does not match `T`.
    pub async fn initialize_from<T: DeserializeOwned>(
        &self,
        moniker: &EntityReference,
        target_logical_name: &str,
    ) -> Result<T, ConnectorError> {
        let path = format!(
            "InitializeFrom(EntityMoniker=@p1,TargetEntityName=@p2,TargetFieldType=@p3)\
             ?@p1={}&@p2='{target_logical_name}'\
             &@p3=Microsoft.Dynamics.CRM.TargetFieldType'ValidForCreate'",
            moniker.odata_id_stamp(&self.pluralizer)
        );
        self.get(&path).await
    }

    /// Sends `instructions` as one `$batch` request and returns the raw
    /// multipart response body.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::Serialize`] if a payload cannot be encoded
    /// and [`ConnectorError::Api`] if the batch as a whole is rejected.
    /// Failures of individual operations are reported inside the body.
    pub async fn execute_batch(
        &self,
        instructions: &[BatchInstruction],
    ) -> Result<String, ConnectorError> {
        let batch = BatchRequest::encode(instructions).map_err(ConnectorError::Serialize)?;
        tracing::debug!(
            boundary = %batch.boundary,
            operations = instructions.len(),
            "Sending batch"
        );

        let request = HttpRequest::builder(HttpMethod::Post, "$batch")
            .body(batch.body)
            .body_type(DataType::MultipartMixed {
                boundary: batch.boundary,
            })
            .build()?;

        Ok(self.http.request(request).await?.body)
    }

    async fn send_body(
        &self,
        method: HttpMethod,
        path: String,
        body: String,
    ) -> Result<HttpResponse, ConnectorError> {
        let request = HttpRequest::builder(method, path)
            .body(body)
            .body_type(DataType::Json)
            .build()?;
        self.http.request(request).await
    }
}

fn parse_body<T: DeserializeOwned>(
    path: &str,
    response: &HttpResponse,
) -> Result<T, ConnectorError> {
    let body = if response.body.trim().is_empty() {
        "null"
    } else {
        response.body.as_str()
    };
    serde_json::from_str(body).map_err(|source| ConnectorError::Deserialize {
        path: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApplicationId, ApplicationSecret, BaseUrl, TenantId};
    use std::collections::HashMap;

    fn create_connector() -> DynamicsConnector {
        let config = ConnectorConfig::builder()
            .base_url(BaseUrl::new("https://contoso.crm.dynamics.com").unwrap())
            .tenant_id(TenantId::new("tenant").unwrap())
            .application_id(ApplicationId::new("app").unwrap())
            .application_secret(ApplicationSecret::new("secret").unwrap())
            .plural_override("person", "people")
            .build()
            .unwrap();
        DynamicsConnector::new(&config).unwrap()
    }

    #[test]
    fn test_pluralize_uses_configured_overrides() {
        let connector = create_connector();
        assert_eq!(connector.pluralize("person"), "people");
        assert_eq!(connector.pluralize("account"), "accounts");
    }

    #[test]
    fn test_record_path_matches_reference_bind_path() {
        let connector = create_connector();
        let id = Uuid::new_v4();
        let reference = EntityReference::new(id, "opportunity");

        assert_eq!(
            connector.record_path("opportunity", id),
            reference.bind_path(connector.pluralizer())
        );
    }

    #[test]
    fn test_api_url() {
        assert_eq!(
            create_connector().api_url(),
            "https://contoso.crm.dynamics.com/api/data/v9.2/"
        );
    }

    #[test]
    fn test_parse_body_treats_empty_as_null() {
        let response = HttpResponse::new(204, "No Content", HashMap::new(), "");
        let parsed: Option<Value> = parse_body("accounts", &response).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn test_parse_body_reports_path_on_mismatch() {
        let response = HttpResponse::new(200, "OK", HashMap::new(), r#"{"name":1}"#);
        let result: Result<Vec<String>, _> = parse_body("accounts(1)", &response);
        assert!(matches!(
            result,
            Err(ConnectorError::Deserialize { path, .. }) if path == "accounts(1)"
        ));
    }
}
