//! Entity references and their OData renderings.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::odata::Pluralizer;

/// A pointer to a record: table logical name plus record id.
///
/// Equality and hashing use only the id, so two references with the same
/// id but different logical or display names compare equal.
///
/// # Example
///
/// ```rust
/// use dynamics_connector::{EntityReference, Pluralizer};
/// use uuid::Uuid;
///
/// let id = Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap();
/// let account = EntityReference::new(id, "account");
/// let pluralizer = Pluralizer::new();
///
/// assert_eq!(
///     account.bind_path(&pluralizer),
///     "accounts(00000000-0000-0000-0000-000000000001)"
/// );
/// assert_eq!(
///     account.odata_id_stamp(&pluralizer),
///     "{'@odata.id':'accounts(00000000-0000-0000-0000-000000000001)'}"
/// );
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntityReference {
    id: Uuid,
    logical_name: String,
    name: Option<String>,
}

impl EntityReference {
    /// Creates a reference without a display name.
    #[must_use]
    pub fn new(id: Uuid, logical_name: impl Into<String>) -> Self {
        Self {
            id,
            logical_name: logical_name.into(),
            name: None,
        }
    }

    /// Creates a reference carrying a display name.
    #[must_use]
    pub fn with_name(id: Uuid, logical_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            logical_name: logical_name.into(),
            name: Some(name.into()),
        }
    }

    /// Record id.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Table logical name.
    #[must_use]
    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    /// Display name, if known.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Relative resource path: `<entityset>(<id>)`.
    #[must_use]
    pub fn bind_path(&self, pluralizer: &Pluralizer) -> String {
        format!("{}({})", pluralizer.pluralize(&self.logical_name), self.id)
    }

    /// Inline moniker for function parameters: `{'@odata.id':'<entityset>(<id>)'}`.
    #[must_use]
    pub fn odata_id_stamp(&self, pluralizer: &Pluralizer) -> String {
        format!("{{'@odata.id':'{}'}}", self.bind_path(pluralizer))
    }

    /// Absolute record URL used as an `@odata.id` / `@odata.bind` value.
    ///
    /// `api_url` is the service root ending in `/`.
    #[must_use]
    pub fn absolute_url(&self, api_url: &str, pluralizer: &Pluralizer) -> String {
        format!("{api_url}{}", self.bind_path(pluralizer))
    }
}

impl PartialEq for EntityReference {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EntityReference {}

impl Hash for EntityReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_equality_uses_only_id() {
        let a = EntityReference::with_name(id(7), "account", "Contoso");
        let b = EntityReference::new(id(7), "contact");
        let c = EntityReference::new(id(8), "account");

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_bind_path_matches_pluralizer() {
        let pluralizer = Pluralizer::new().with_override("cr0_box", "cr0_boxset");
        for logical_name in ["account", "category", "leaf", "branch", "cr0_box"] {
            let reference = EntityReference::new(id(42), logical_name);
            assert_eq!(
                reference.bind_path(&pluralizer),
                format!("{}({})", pluralizer.pluralize(logical_name), id(42))
            );
        }
    }

    #[test]
    fn test_absolute_url_prefixes_api_root() {
        let reference = EntityReference::new(id(1), "contact");
        let api_url = "https://org.crm.dynamics.com/api/data/v9.2/";
        assert_eq!(
            reference.absolute_url(api_url, &Pluralizer::new()),
            format!("https://org.crm.dynamics.com/api/data/v9.2/contacts({})", id(1))
        );
    }

    #[test]
    fn test_accessors() {
        let reference = EntityReference::with_name(id(3), "account", "Fabrikam");
        assert_eq!(reference.id(), id(3));
        assert_eq!(reference.logical_name(), "account");
        assert_eq!(reference.name(), Some("Fabrikam"));
    }
}
