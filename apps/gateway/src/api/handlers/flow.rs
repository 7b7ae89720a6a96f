//! Prompt-flow relay handler

use std::time::Instant;

use axum::{extract::State, Json};
use chrono::Utc;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::flow::{AskRequest, AskResponse};
use crate::state::AppState;
use steg_flow_client::{collect_outcome, FlowRequest};

/// Relay a question to the prompt flow and classify its completion.
pub async fn invoke_flow(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    if request.input_text.is_empty() {
        return Err(Error::InvalidInput("No text provided".to_string()));
    }
    let limit = state.config.flow.max_input_chars;
    if request.input_text.chars().count() > limit {
        return Err(Error::InvalidInput(format!(
            "Text exceeds {limit} character limit"
        )));
    }

    // Context lines the downstream flow expects alongside the question.
    let mut document = request.input_text.clone();
    if let Some(patient_id) = request.patient_id.as_deref().filter(|p| !p.is_empty()) {
        document.push_str("\n\npatient_id:");
        document.push_str(patient_id);
    }
    document.push_str("\ncurrent_date:");
    document.push_str(&Utc::now().format("%Y-%m-%d").to_string());

    let started = Instant::now();
    let events = state
        .flow
        .invoke(FlowRequest { document })
        .await
        .map_err(|e| Error::Upstream(e.to_string()))?;
    let duration = format!("{:.1} seconds", started.elapsed().as_secs_f64());

    let outcome = collect_outcome(&events);
    match outcome.answer {
        Some(answer) => {
            info!(duration = %duration, "Prompt flow invocation succeeded");
            Ok(Json(AskResponse { answer, duration }))
        }
        None => Err(Error::FlowFailed {
            reasons: outcome.completion_reasons.join(", "),
            duration,
        }),
    }
}
