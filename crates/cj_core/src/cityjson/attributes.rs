//! Attribute projection.
//!
//! Hosts store custom properties as a flat key/value table, so nested
//! attribute maps are flattened into dotted paths:
//! `{"attributes": {"roofType": "gable"}}` becomes `attributes.roofType`.

use serde_json::{Map, Value};

use crate::scene::PropertyMap;

/// Keys describing structure rather than attributes; skipped at every depth.
pub const STRUCTURAL_KEYS: [&str; 3] = ["geometry", "children", "parents"];

/// Result of projecting one attribute map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Projection {
    /// Dotted path -> scalar or array value
    pub properties: PropertyMap,

    /// Values with no property representation (JSON `null`)
    pub skipped: usize,
}

/// Flatten `map` into dotted-path properties.
pub fn project_attributes(map: &Map<String, Value>) -> Projection {
    let mut projection = Projection::default();
    let mut prefix = Vec::new();
    project_into(map, &mut prefix, &mut projection);
    projection
}

fn project_into<'a>(map: &'a Map<String, Value>, prefix: &mut Vec<&'a str>, out: &mut Projection) {
    for (key, value) in map {
        if STRUCTURAL_KEYS.contains(&key.as_str()) {
            continue;
        }

        prefix.push(key);
        match value {
            Value::Object(nested) => project_into(nested, prefix, out),
            Value::Null => {
                log::debug!("Skipping null attribute '{}'", prefix.join("."));
                out.skipped += 1;
            }
            scalar => {
                out.properties.insert(prefix.join("."), scalar.clone());
            }
        }
        prefix.pop();
    }
}
