//! Canonical evidence checksums.
//!
//! Structurally identical evidence must hash identically regardless of input
//! ordering, so the canonical form sorts every object key recursively, sorts
//! name-keyed lists, and leaves out the axis display label (which depends on
//! which variant happened to be seen first).

use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use codeloom_common::types::ComponentEvidence;

/// Hex SHA-256 of the canonical JSON form.
pub fn compute(evidence: &ComponentEvidence) -> String {
    let canonical = canonical_value(evidence);
    hex::encode(Sha256::digest(canonical.to_string().as_bytes()))
}

fn canonical_value(evidence: &ComponentEvidence) -> Value {
    let axes: Map<String, Value> = evidence
        .variant_axes
        .iter()
        .map(|(key, axis)| {
            (
                key.clone(),
                json!({
                    "enumTokens": axis.enum_tokens,
                    "rawKeys": axis.raw_keys,
                    "values": axis.values,
                }),
            )
        })
        .collect();

    let mut properties: Vec<Value> = evidence
        .component_properties
        .iter()
        .map(|p| {
            let mut entry = Map::new();
            if let Some(default) = &p.default_value {
                entry.insert("defaultValue".to_string(), sort_keys(default));
            }
            entry.insert("kind".to_string(), json!(p.kind));
            entry.insert("name".to_string(), json!(p.name));
            Value::Object(entry)
        })
        .collect();
    properties.sort_by_key(|p| p["name"].as_str().map(str::to_string));

    let mut text_layers: Vec<Value> = evidence
        .text_layers
        .iter()
        .map(|l| {
            let mut entry = Map::new();
            entry.insert("name".to_string(), json!(l.name));
            if let Some(sample) = &l.sample_text {
                entry.insert("sampleText".to_string(), json!(sample));
            }
            Value::Object(entry)
        })
        .collect();
    text_layers.sort_by_key(|l| l["name"].as_str().map(str::to_string));

    let mut slot_layers: Vec<Value> = evidence
        .slot_layers
        .iter()
        .map(|l| json!({ "kind": l.kind, "name": l.name }))
        .collect();
    slot_layers.sort_by_key(|l| l["name"].as_str().map(str::to_string));

    json!({
        "componentProperties": properties,
        "id": evidence.id,
        "name": evidence.name,
        "slotLayers": slot_layers,
        "textLayers": text_layers,
        "variantAxes": axes,
        "variantCount": evidence.variant_count,
    })
}

/// Recursively sort object keys inside free-form values (property defaults).
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted: Vec<(&String, &Value)> = map.iter().collect();
            sorted.sort_by_key(|(k, _)| k.as_str());
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
