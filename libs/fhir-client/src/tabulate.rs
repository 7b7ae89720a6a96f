//! Observation flattening
//!
//! Takes Observation entries from a combined bundle and flattens them into a
//! table: a header row followed by one `[date, code, label, value]` row per
//! Observation. Entries wrapping other resource types are skipped.

use serde_json::{json, Value};

use crate::models::Bundle;

/// Header row emitted ahead of every flattened result set.
pub const TABLE_HEADER: [&str; 4] = ["Date", "LOINC", "Observation", "Value"];

/// Options controlling Observation flattening.
#[derive(Debug, Clone)]
pub struct FlattenOptions {
    /// Which `code.coding` slot carries the code/display pair. Data-source
    /// dependent: some profiles list the LOINC coding first, others second.
    pub coding_index: usize,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self { coding_index: 0 }
    }
}

/// Flatten a bundle's Observation entries into table rows.
pub fn flatten_observations(bundle: &Bundle, options: &FlattenOptions) -> Vec<Value> {
    let mut rows = Vec::with_capacity(bundle.entry_count() + 1);
    rows.push(json!(TABLE_HEADER));

    for entry in bundle.entries() {
        let Some(resource) = entry.resource.as_ref() else {
            continue;
        };
        if resource.get("resourceType").and_then(Value::as_str) != Some("Observation") {
            continue;
        }
        rows.push(observation_row(resource, options.coding_index));
    }

    rows
}

fn observation_row(resource: &Value, coding_index: usize) -> Value {
    let coding = resource
        .pointer("/code/coding")
        .and_then(Value::as_array)
        .map(|c| c.as_slice())
        .unwrap_or(&[]);
    let (code, label) = match coding.get(coding_index) {
        Some(slot) => (
            slot.get("code").and_then(Value::as_str).map(str::to_string),
            slot.get("display").and_then(Value::as_str).map(str::to_string),
        ),
        None => (None, None),
    };

    let value = observation_value(resource);

    // Calendar-date portion of an ISO-8601 timestamp; empty when absent.
    let date: String = resource
        .get("effectiveDateTime")
        .and_then(Value::as_str)
        .map(|s| s.chars().take(10).collect())
        .unwrap_or_default();

    json!([date, code, label, value])
}

/// Resolve the display value for one Observation.
///
/// Key presence decides, not truthiness: a quantity of zero is a valid
/// physiological value and must still render.
fn observation_value(resource: &Value) -> Option<String> {
    if let Some(quantity) = resource.get("valueQuantity") {
        if let Some(value) = quantity.get("value") {
            let unit = quantity.get("unit").and_then(Value::as_str).unwrap_or("");
            return Some(format!("{} {}", render_scalar(value), unit).trim().to_string());
        }
    }

    resource
        .pointer("/valueCodeableConcept/coding/0/code")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
