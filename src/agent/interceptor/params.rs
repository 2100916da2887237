//! Parameter normalization and hook merges.

use serde_json::{Map, Value};

/// Normalize raw call parameters to a mapping.
///
/// Anything that is not a JSON object becomes an empty mapping.
#[must_use]
pub fn normalize_params(raw: &Value) -> Map<String, Value> {
    match raw {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    }
}

/// Merge hook-provided parameters over the normalized ones; hook keys win.
#[must_use]
pub fn merge_params(mut base: Map<String, Value>, overrides: Map<String, Value>) -> Map<String, Value> {
    base.extend(overrides);
    base
}
