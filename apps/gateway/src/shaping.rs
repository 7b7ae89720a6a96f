//! Response shaping
//!
//! Decides between passing a combined query result through as raw JSON and
//! flattening it into table rows. Flattening keeps large Observation result
//! sets compact enough for the agent to reason over.

use serde_json::Value;

use steg_fhir_client::{flatten_observations, Bundle, FlattenOptions};

/// Resource path whose results are eligible for flattening.
const OBSERVATION_PATH: &str = "/Observation";

/// Shaping policy, lifted from configuration.
#[derive(Debug, Clone)]
pub struct ShapingOptions {
    /// Bundles with more entries than this flatten to rows.
    pub flatten_threshold: usize,
    /// Which `code.coding` slot carries the code/display pair.
    pub coding_index: usize,
}

impl Default for ShapingOptions {
    fn default() -> Self {
        Self {
            flatten_threshold: 4,
            coding_index: 0,
        }
    }
}

/// Render the response body text for a combined query result.
pub fn shape_body(api_path: &str, document: &Value, options: &ShapingOptions) -> String {
    if api_path == OBSERVATION_PATH {
        if let Ok(bundle) = Bundle::from_value(document) {
            if bundle.resource_type == "Bundle" && bundle.entry_count() > options.flatten_threshold
            {
                let rows = flatten_observations(
                    &bundle,
                    &FlattenOptions {
                        coding_index: options.coding_index,
                    },
                );
                return format!("Observation results: {}", Value::Array(rows));
            }
        }
    }
    document.to_string()
}
