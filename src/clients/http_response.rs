//! HTTP response types for the Web API.
//!
//! This module provides the [`HttpResponse`] type and the parsing of the
//! OData headers the connector relies on.

use std::collections::HashMap;

use uuid::Uuid;

/// Name of the header carrying the URL of a newly created record.
pub const ODATA_ENTITY_ID_HEADER: &str = "odata-entityid";

/// Extracts the record id from an `OData-EntityId` header value.
///
/// The value has the form `<service root><collection>(<id>)`; the id is the
/// text between the last `(` and the following `)`.
///
/// # Example
///
/// ```rust
/// use dynamics_connector::clients::parse_entity_id;
///
/// let id = parse_entity_id(
///     "https://org.crm.dynamics.com/api/data/v9.2/accounts(7d577253-3ef0-4a0a-bb7f-8335c2596e70)",
/// );
/// assert_eq!(id.unwrap().to_string(), "7d577253-3ef0-4a0a-bb7f-8335c2596e70");
///
/// assert!(parse_entity_id("https://org.crm.dynamics.com/api/data/v9.2/accounts").is_none());
/// ```
#[must_use]
pub fn parse_entity_id(header_value: &str) -> Option<Uuid> {
    let (_, after_open) = header_value.rsplit_once('(')?;
    let (id, _) = after_open.split_once(')')?;
    Uuid::parse_str(id.trim()).ok()
}

/// A response from the Web API.
///
/// Header names are stored lowercase. The body is kept as raw text; callers
/// deserialize it into the type they expect.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// The canonical reason phrase of the status code.
    pub reason: String,
    /// Response headers, keyed by lowercase name.
    pub headers: HashMap<String, Vec<String>>,
    /// The raw response body.
    pub body: String,
}

impl HttpResponse {
    /// Creates a response from its parts.
    #[must_use]
    pub fn new(
        code: u16,
        reason: impl Into<String>,
        headers: HashMap<String, Vec<String>>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            code,
            reason: reason.into(),
            headers,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx status codes.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code < 300
    }

    /// Returns the first value of the named header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the id of the record named by the `OData-EntityId` header.
    ///
    /// `None` when the header is absent or its value has no parseable id.
    #[must_use]
    pub fn entity_id(&self) -> Option<Uuid> {
        self.header(ODATA_ENTITY_ID_HEADER).and_then(parse_entity_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_headers(code: u16, headers: &[(&str, &str)]) -> HttpResponse {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            map.entry(name.to_lowercase())
                .or_default()
                .push((*value).to_string());
        }
        HttpResponse::new(code, "No Content", map, "")
    }

    #[test]
    fn test_is_ok_for_2xx_status_codes() {
        assert!(response_with_headers(200, &[]).is_ok());
        assert!(response_with_headers(204, &[]).is_ok());
        assert!(!response_with_headers(304, &[]).is_ok());
        assert!(!response_with_headers(404, &[]).is_ok());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = response_with_headers(204, &[("OData-Version", "4.0")]);
        assert_eq!(response.header("OData-Version"), Some("4.0"));
        assert_eq!(response.header("odata-version"), Some("4.0"));
    }

    #[test]
    fn test_entity_id_from_header() {
        let id = Uuid::new_v4();
        let response = response_with_headers(
            204,
            &[(
                "OData-EntityId",
                &format!("https://org.crm.dynamics.com/api/data/v9.2/contacts({id})"),
            )],
        );
        assert_eq!(response.entity_id(), Some(id));
    }

    #[test]
    fn test_entity_id_missing_header() {
        assert_eq!(response_with_headers(201, &[]).entity_id(), None);
    }

    #[test]
    fn test_parse_entity_id_rejects_non_uuid() {
        assert!(parse_entity_id("accounts(not-a-guid)").is_none());
        assert!(parse_entity_id("accounts(").is_none());
        assert!(parse_entity_id("").is_none());
    }

    #[test]
    fn test_parse_entity_id_uses_last_parenthesis() {
        let id = Uuid::new_v4();
        let value = format!("https://org.crm.dynamics.com/api/data/v9.2/x(y)/accounts({id})");
        assert_eq!(parse_entity_id(&value), Some(id));
    }
}
