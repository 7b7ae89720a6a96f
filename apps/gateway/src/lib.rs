//! FHIR Gateway
//!
//! Bridges a conversational agent platform to a FHIR-compliant clinical-data
//! store and a managed prompt flow:
//! - Agent action-group invocations: normalize parameters, query the data
//!   store with signed requests, combine paginated bundles, and flatten
//!   large Observation result sets into table rows
//! - Prompt-flow relay: validate input, append patient and date context,
//!   invoke the flow, and classify its completion events

pub mod api;
pub mod config;
pub mod error;
pub mod flow;
pub mod logging;
pub mod models;
pub mod shaping;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
