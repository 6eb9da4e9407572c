//! Entity set name resolution.
//!
//! The Web API addresses tables by their entity set name, which for most
//! tables is the English plural of the logical name. Custom tables whose
//! entity set name does not follow the rules below must be listed in the
//! override table.

use std::collections::HashMap;

/// Maps singular logical names to entity set (plural) URL segments.
///
/// Overrides are matched exactly and case-sensitively before any rule is
/// applied.
///
/// # Example
///
/// ```rust
/// use dynamics_connector::Pluralizer;
///
/// let pluralizer = Pluralizer::new().with_override("person", "people");
///
/// assert_eq!(pluralizer.pluralize("account"), "accounts");
/// assert_eq!(pluralizer.pluralize("opportunity"), "opportunities");
/// assert_eq!(pluralizer.pluralize("person"), "people");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pluralizer {
    overrides: HashMap<String, String>,
}

impl Pluralizer {
    /// Creates a pluralizer without overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pluralizer from an override table.
    #[must_use]
    pub const fn with_overrides(overrides: HashMap<String, String>) -> Self {
        Self { overrides }
    }

    /// Adds a single override.
    #[must_use]
    pub fn with_override(mut self, singular: impl Into<String>, plural: impl Into<String>) -> Self {
        self.overrides.insert(singular.into(), plural.into());
        self
    }

    /// Returns the override table.
    #[must_use]
    pub const fn overrides(&self) -> &HashMap<String, String> {
        &self.overrides
    }

    /// Returns the entity set name for `logical_name`.
    #[must_use]
    pub fn pluralize(&self, logical_name: &str) -> String {
        self.overrides
            .get(logical_name)
            .cloned()
            .unwrap_or_else(|| pluralize_english(logical_name))
    }
}

/// Applies the surface pluralization rules, ignoring any overrides.
///
/// Rules, first match wins:
/// 1. `ch`, `s`, `sh`, `x`, `z` endings take `es`
/// 2. a trailing `y` becomes `ies`
/// 3. a trailing `f` becomes `ves`
/// 4. everything else takes `s`
#[must_use]
pub fn pluralize_english(name: &str) -> String {
    if ["ch", "s", "sh", "x", "z"]
        .iter()
        .any(|suffix| name.ends_with(suffix))
    {
        return format!("{name}es");
    }

    if let Some(stem) = name.strip_suffix('y') {
        return format!("{stem}ies");
    }

    if let Some(stem) = name.strip_suffix('f') {
        return format!("{stem}ves");
    }

    format!("{name}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibilant_endings_take_es() {
        assert_eq!(pluralize_english("branch"), "branches");
        assert_eq!(pluralize_english("address"), "addresses");
        assert_eq!(pluralize_english("wish"), "wishes");
        assert_eq!(pluralize_english("fax"), "faxes");
        assert_eq!(pluralize_english("quiz"), "quizes");
        assert_eq!(pluralize_english("status"), "statuses");
    }

    #[test]
    fn test_trailing_y_becomes_ies() {
        assert_eq!(pluralize_english("category"), "categories");
        assert_eq!(pluralize_english("opportunity"), "opportunities");
        // No vowel exception
        assert_eq!(pluralize_english("survey"), "surveies");
    }

    #[test]
    fn test_trailing_f_becomes_ves() {
        assert_eq!(pluralize_english("leaf"), "leaves");
        assert_eq!(pluralize_english("shelf"), "shelves");
    }

    #[test]
    fn test_default_appends_s() {
        assert_eq!(pluralize_english("account"), "accounts");
        assert_eq!(pluralize_english("contact"), "contacts");
        assert_eq!(pluralize_english("new_project"), "new_projects");
    }

    #[test]
    fn test_rules_are_case_sensitive() {
        assert_eq!(pluralize_english("BRANCH"), "BRANCHs");
        assert_eq!(pluralize_english("Y"), "Ys");
    }

    #[test]
    fn test_override_wins_regardless_of_surface_form() {
        let pluralizer = Pluralizer::new()
            .with_override("branch", "branchset")
            .with_override("cr123_leaf", "cr123_leafs");

        assert_eq!(pluralizer.pluralize("branch"), "branchset");
        assert_eq!(pluralizer.pluralize("cr123_leaf"), "cr123_leafs");
        assert_eq!(pluralizer.pluralize("leaf"), "leaves");
    }

    #[test]
    fn test_override_lookup_is_exact() {
        let pluralizer = Pluralizer::new().with_override("Person", "people");
        assert_eq!(pluralizer.pluralize("person"), "persons");
        assert_eq!(pluralizer.pluralize("Person"), "people");
    }
}
