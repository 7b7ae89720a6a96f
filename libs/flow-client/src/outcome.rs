//! Completion classification
//!
//! A flow invocation streams back a mix of completion and output events. The
//! outcome folds that stream into either an answer or the list of completion
//! reasons to report back to the caller.

use crate::models::{CompletionReason, FlowEvent};

/// The classified result of one flow invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowOutcome {
    /// Concatenated answer when the flow completed successfully.
    pub answer: Option<String>,
    /// Every completion reason observed, in arrival order.
    pub completion_reasons: Vec<String>,
}

/// Fold a flow's event stream into an outcome.
///
/// Each non-empty output fragment is wrapped `{node}:<p>{content}</p>` and
/// fragments are joined with `<br/>`. The invocation counts as successful
/// when any completion event reports the success sentinel and at least one
/// fragment arrived.
pub fn collect_outcome(events: &[FlowEvent]) -> FlowOutcome {
    let mut fragments = Vec::new();
    let mut reasons = Vec::new();
    let mut succeeded = false;

    for event in events {
        match event {
            FlowEvent::Completion { completion_reason } => {
                succeeded |= *completion_reason == CompletionReason::Success;
                reasons.push(completion_reason.as_str().to_string());
            }
            FlowEvent::Output { node_name, content } => {
                if let Some(document) = content.document.as_deref().filter(|d| !d.is_empty()) {
                    fragments.push(format!("{node_name}:<p>{document}</p>"));
                }
            }
        }
    }

    tracing::debug!(
        completions = reasons.len(),
        fragments = fragments.len(),
        "classified flow events"
    );

    let answer = (succeeded && !fragments.is_empty()).then(|| fragments.join("<br/>"));
    FlowOutcome {
        answer,
        completion_reasons: reasons,
    }
}
