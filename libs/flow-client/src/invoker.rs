//! The invocation seam

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{FlowEvent, FlowRequest};

/// Invokes a prompt flow and returns its event stream, collected.
///
/// The gateway ships an HTTP implementation; tests substitute canned events.
#[async_trait]
pub trait FlowInvoker: Send + Sync {
    async fn invoke(&self, request: FlowRequest) -> Result<Vec<FlowEvent>>;
}
