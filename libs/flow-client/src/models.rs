//! Data models for flow invocation

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Input document handed to the prompt flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowRequest {
    pub document: String,
}

/// Completion reason reported by the flow runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CompletionReason {
    Success,
    Other(String),
}

impl CompletionReason {
    /// Wire value of the success sentinel.
    pub const SUCCESS: &'static str = "SUCCESS";

    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => Self::SUCCESS,
            Self::Other(reason) => reason,
        }
    }
}

impl From<String> for CompletionReason {
    fn from(value: String) -> Self {
        if value == Self::SUCCESS {
            Self::Success
        } else {
            Self::Other(value)
        }
    }
}

impl From<CompletionReason> for String {
    fn from(value: CompletionReason) -> Self {
        value.as_str().to_string()
    }
}

/// Content payload of an output event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FlowDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

/// One event from the flow's response stream.
///
/// The stream envelope keys each event by kind; anything other than a
/// completion or output event is not interesting here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum FlowEvent {
    #[serde(rename = "flowCompletionEvent", rename_all = "camelCase")]
    Completion { completion_reason: CompletionReason },

    #[serde(rename = "flowOutputEvent", rename_all = "camelCase")]
    Output {
        node_name: String,
        content: FlowDocument,
    },
}

impl FlowEvent {
    /// Decode one stream envelope, skipping event kinds we do not handle.
    pub fn from_stream_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}
