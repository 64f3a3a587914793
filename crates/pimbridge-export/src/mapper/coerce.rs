//! Lenient decoding of mapping payloads sent by the configuration UI.
//!
//! Accepted shapes:
//!
//! - an array of entries;
//! - a single entry object (`{"source": "...", ...}`);
//! - an object keyed by source whose values are entries, or bare targets;
//! - any other JSON value, treated as a one-element list.
//!
//! Elements that do not describe an entry are dropped with a warning.
//! Only text that is not JSON at all is an error.

use serde_json::{Map, Value};
use tracing::warn;

use pimbridge_connector::mapping::{MappingCollection, MappingEntry};

use crate::error::{ExportError, ExportResult};

/// Decode a mapping payload.
///
/// Well-formed collections keep their order; other shapes go through
/// [`mapping_from_value`].
pub fn mapping_from_json(json: &str) -> ExportResult<MappingCollection> {
    Ok(decode_mapping(json)?.unwrap_or_default())
}

/// Decode a mapping payload, telling an explicitly empty collection apart
/// from a payload with no usable entry.
///
/// `{}` and `[]` decode to an empty collection. A payload whose elements
/// were all dropped (a scalar, `[7]`, ...) decodes to `None`.
pub fn decode_mapping(json: &str) -> ExportResult<Option<MappingCollection>> {
    if let Ok(mapping) = serde_json::from_str::<MappingCollection>(json) {
        return Ok(Some(mapping));
    }
    let value: Value = serde_json::from_str(json)
        .map_err(|e| ExportError::invalid_mapping(format!("mapping is not valid JSON: {e}")))?;
    let mapping = mapping_from_value(value);
    Ok((!mapping.is_empty()).then_some(mapping))
}

/// Decode an already parsed mapping payload.
pub fn mapping_from_value(value: Value) -> MappingCollection {
    let mut mapping = MappingCollection::new();
    match value {
        Value::Array(elements) => {
            for element in elements {
                push_element(&mut mapping, None, element);
            }
        }
        Value::Object(fields) if is_entry(&fields) => {
            push_element(&mut mapping, None, Value::Object(fields));
        }
        Value::Object(fields) => {
            for (key, element) in fields {
                push_element(&mut mapping, Some(key), element);
            }
        }
        scalar => push_element(&mut mapping, None, scalar),
    }
    mapping
}

fn is_entry(fields: &Map<String, Value>) -> bool {
    matches!(fields.get("source"), Some(Value::String(_)))
}

fn push_element(mapping: &mut MappingCollection, key: Option<String>, element: Value) {
    match entry_from_element(key.as_deref(), &element) {
        Some(entry) => mapping.add(entry),
        None => warn!(element = %element, "Mapping element ignored"),
    }
}

fn entry_from_element(key: Option<&str>, element: &Value) -> Option<MappingEntry> {
    match element {
        Value::Object(fields) => {
            let source = match fields.get("source") {
                Some(Value::String(source)) => source.as_str(),
                None => key?,
                Some(_) => return None,
            };
            if source.trim().is_empty() {
                return None;
            }
            let target = match fields.get("target") {
                None | Some(Value::Null) => String::new(),
                Some(target) => scalar_text(target)?,
            };
            let deletable = match fields.get("deletable") {
                None | Some(Value::Null) => true,
                Some(Value::Bool(deletable)) => *deletable,
                Some(_) => return None,
            };
            Some(MappingEntry::new(source, target).with_deletable(deletable))
        }
        // {"shoes": "12"}: the key is the source, the value the target.
        scalar => {
            let source = key.filter(|k| !k.trim().is_empty())?;
            Some(MappingEntry::new(source, scalar_text(scalar)?))
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
