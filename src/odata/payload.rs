//! Request body helpers.
//!
//! Record payloads are sent as compact JSON with null-valued properties
//! removed. An omitted property leaves the stored column untouched, so a
//! field explicitly set to `null` is omitted as well and does NOT clear the
//! column. Callers that need to clear a value must use a dedicated request.

use serde::Serialize;
use serde_json::{Map, Value};

/// Serializes `payload` to a JSON value with null object members removed
/// at every depth. Nulls inside arrays are kept.
///
/// # Errors
///
/// Returns the serializer error if `payload` cannot be represented as JSON.
///
/// # Example
///
/// ```rust
/// use dynamics_connector::odata::to_compact_value;
/// use serde_json::json;
///
/// let value = to_compact_value(&json!({"name": "Contoso", "telephone1": null})).unwrap();
/// assert_eq!(value, json!({"name": "Contoso"}));
/// ```
pub fn to_compact_value<P: Serialize + ?Sized>(payload: &P) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(payload)?;
    strip_nulls(&mut value);
    Ok(value)
}

/// Serializes `payload` to a compact JSON string, omitting null members.
///
/// # Errors
///
/// Returns the serializer error if `payload` cannot be represented as JSON.
pub fn to_compact_json<P: Serialize + ?Sized>(payload: &P) -> Result<String, serde_json::Error> {
    serde_json::to_string(&to_compact_value(payload)?)
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

/// Sets a single-valued navigation property: `<field>@odata.bind = "/<table>(<id>)"`.
///
/// An empty `id` stores `null`, which the compact serializer then omits.
pub fn add_single_reference(payload: &mut Map<String, Value>, field: &str, table: &str, id: &str) {
    let value = if id.is_empty() {
        Value::Null
    } else {
        Value::String(format!("/{table}({id})"))
    };
    payload.insert(format!("{field}@odata.bind"), value);
}

/// Returns a copy of `payload` without read-only lookup value properties
/// (`_<name>_value`), which the service rejects on write.
#[must_use]
pub fn remove_direct_references(payload: &Map<String, Value>) -> Map<String, Value> {
    payload
        .iter()
        .filter(|(key, _)| !(key.starts_with('_') && key.ends_with("_value")))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
