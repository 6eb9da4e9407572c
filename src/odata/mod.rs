//! OData building blocks for the Dataverse Web API.
//!
//! - [`Pluralizer`]: logical name to entity set name, with overrides
//! - [`EntityReference`]: record pointer with bind-path and moniker renderings
//! - [`PagedResult`]: one page of a collection response
//! - [`BatchInstruction`] / [`BatchRequest`]: `$batch` multipart encoding
//! - payload helpers for compact JSON bodies and `@odata.bind` properties
//!
//! Everything here is pure; nothing performs I/O.

mod batch;
mod page;
mod payload;
mod pluralize;
mod reference;

pub use batch::{generate_boundary, BatchCommand, BatchInstruction, BatchRequest};
pub use page::PagedResult;
pub use payload::{
    add_single_reference, remove_direct_references, to_compact_json, to_compact_value,
};
pub use pluralize::{pluralize_english, Pluralizer};
pub use reference::EntityReference;
