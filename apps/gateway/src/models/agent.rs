//! Agent action-group invocation contract
//!
//! The agent platform delivers invocations and expects responses in a fixed
//! envelope. Fields the gateway does not act on (session attributes, agent
//! metadata, input text) are ignored on the way in.

use serde::{Deserialize, Serialize};

/// One named invocation parameter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentParameter {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub parameter_type: Option<String>,
    pub value: String,
}

/// Inbound action-group invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInvocation {
    pub action_group: String,
    /// The resource path to query, e.g. `/Observation`.
    pub api_path: String,
    pub http_method: String,
    #[serde(default)]
    pub parameters: Vec<AgentParameter>,
    pub message_version: String,
}

/// Outbound invocation response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInvocationResponse {
    pub response: ActionResponse,
    pub message_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub action_group: String,
    pub api_path: String,
    pub http_method: String,
    pub http_status_code: u16,
    pub response_body: ResponseBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(rename = "TEXT")]
    pub text: TextBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBody {
    pub body: String,
}
