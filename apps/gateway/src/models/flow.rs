//! Prompt-flow relay contract

use serde::{Deserialize, Serialize};

/// Inbound relay request. The patient id key is snake_case on the wire,
/// unlike the text key.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AskRequest {
    #[serde(rename = "inputText", default)]
    pub input_text: String,
    #[serde(rename = "patient_id", default)]
    pub patient_id: Option<String>,
}

/// Successful relay response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub duration: String,
}
