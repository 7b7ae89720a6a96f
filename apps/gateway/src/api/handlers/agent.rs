//! Agent action-group invocation handler
//!
//! Pipeline: normalize the invocation parameters, search the data store
//! (the client follows continuation links), shape the combined document,
//! and wrap it in the response envelope the agent platform expects.

use axum::{extract::State, Json};
use tracing::info;

use crate::error::Result;
use crate::models::agent::{
    ActionResponse, AgentInvocation, AgentInvocationResponse, ResponseBody, TextBody,
};
use crate::shaping::{self, ShapingOptions};
use crate::state::AppState;
use steg_fhir_client::normalize_query;

/// Run one action-group invocation against the clinical data store.
pub async fn invoke_agent(
    State(state): State<AppState>,
    Json(event): Json<AgentInvocation>,
) -> Result<Json<AgentInvocationResponse>> {
    info!(
        action_group = %event.action_group,
        api_path = %event.api_path,
        http_method = %event.http_method,
        "Received agent invocation"
    );

    let query = normalize_query(
        event
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.value.as_str())),
    );

    let document = state.data_source.search(&event.api_path, &query).await?;

    let options = ShapingOptions {
        flatten_threshold: state.config.shaping.flatten_threshold,
        coding_index: state.config.shaping.coding_index,
    };
    let body = shaping::shape_body(&event.api_path, &document, &options);

    Ok(Json(AgentInvocationResponse {
        response: ActionResponse {
            action_group: event.action_group,
            api_path: event.api_path,
            http_method: event.http_method,
            http_status_code: 200,
            response_body: ResponseBody {
                text: TextBody { body },
            },
        },
        message_version: event.message_version,
    }))
}
