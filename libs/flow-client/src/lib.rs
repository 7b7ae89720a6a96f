//! Prompt-Flow Client
//!
//! Boundary types for invoking a managed prompt-orchestration flow and
//! classifying its event stream: the [`FlowInvoker`] trait, the event
//! models, and [`collect_outcome`] which turns a collected stream into
//! either a concatenated answer or the completion reasons to report.

pub mod error;
pub mod invoker;
pub mod models;
pub mod outcome;

// Re-export main types
pub use error::{FlowError, Result};
pub use invoker::FlowInvoker;
pub use models::{CompletionReason, FlowDocument, FlowEvent, FlowRequest};
pub use outcome::{collect_outcome, FlowOutcome};
