//! One page of an OData collection response.

use serde::Deserialize;

/// A page of records plus the continuation link, if the server has more.
///
/// Deserialized from the collection envelope:
///
/// ```rust
/// use dynamics_connector::PagedResult;
/// use serde_json::Value;
///
/// let page: PagedResult<Value> = serde_json::from_str(r#"{
///     "@odata.context": "...",
///     "value": [{"name": "A"}, {"name": "B"}],
///     "@odata.nextLink": "https://org.crm.dynamics.com/api/data/v9.2/accounts?$skiptoken=x"
/// }"#).unwrap();
///
/// assert_eq!(page.entities.len(), 2);
/// assert!(page.has_next_page());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PagedResult<T> {
    /// Records in server order.
    #[serde(rename = "value", default = "Vec::new")]
    pub entities: Vec<T>,
    /// Absolute URL of the next page.
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

impl<T> PagedResult<T> {
    /// Returns the continuation link when it is present and non-empty.
    #[must_use]
    pub fn next_link(&self) -> Option<&str> {
        self.next_link.as_deref().filter(|link| !link.is_empty())
    }

    /// Returns `true` if another page should be fetched.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.next_link().is_some()
    }

    /// Splits the page into its records and continuation link.
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, Option<String>) {
        let next = self.next_link.filter(|link| !link.is_empty());
        (self.entities, next)
    }
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            next_link: None,
        }
    }
}
