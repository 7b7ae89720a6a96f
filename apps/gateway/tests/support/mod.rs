//! Shared helpers for gateway integration tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt as _;

use steg::api::create_router;
use steg::state::{AppState, ClinicalDataSource};
use steg::Config;
use steg_flow_client::{FlowEvent, FlowInvoker, FlowRequest};

/// Data source returning a canned document and recording observed queries.
pub struct StubDataSource {
    pub document: Value,
    pub seen: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl StubDataSource {
    pub fn new(document: Value) -> Arc<Self> {
        Arc::new(Self {
            document,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ClinicalDataSource for StubDataSource {
    async fn search(&self, path: &str, params: &[(String, String)]) -> steg::Result<Value> {
        self.seen
            .lock()
            .unwrap()
            .push((path.to_string(), params.to_vec()));
        Ok(self.document.clone())
    }
}

/// Flow invoker returning canned events and recording the documents it saw.
pub struct StubFlow {
    pub events: Vec<FlowEvent>,
    pub seen: Mutex<Vec<String>>,
}

impl StubFlow {
    pub fn new(events: Vec<FlowEvent>) -> Arc<Self> {
        Arc::new(Self {
            events,
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl FlowInvoker for StubFlow {
    async fn invoke(&self, request: FlowRequest) -> steg_flow_client::Result<Vec<FlowEvent>> {
        self.seen.lock().unwrap().push(request.document);
        Ok(self.events.clone())
    }
}

pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub fn new(data_source: Arc<StubDataSource>, flow: Arc<StubFlow>) -> Self {
        Self::with_config(Config::default(), data_source, flow)
    }

    pub fn with_config(
        config: Config,
        data_source: Arc<StubDataSource>,
        flow: Arc<StubFlow>,
    ) -> Self {
        let state = AppState::with_sources(config, data_source, flow);
        Self {
            router: create_router(state),
        }
    }

    pub async fn post(&self, path: &str, body: &Value) -> anyhow::Result<(StatusCode, Value)> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body)?))?;

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, value))
    }
}

/// A minimal agent invocation event for `path` with the given parameters.
pub fn agent_event(path: &str, parameters: Value) -> Value {
    serde_json::json!({
        "actionGroup": "action-group-fhir-agent",
        "apiPath": path,
        "httpMethod": "GET",
        "messageVersion": "1.0",
        "parameters": parameters,
    })
}

/// A searchset bundle with `count` Observation entries.
pub fn observation_bundle(count: usize) -> Value {
    let entries: Vec<Value> = (0..count)
        .map(|i| {
            serde_json::json!({
                "resource": {
                    "resourceType": "Observation",
                    "effectiveDateTime": format!("2024-08-{:02}T09:00:00Z", i + 1),
                    "code": {"coding": [{"code": "2339-0", "display": "Glucose"}]},
                    "valueQuantity": {"value": 90 + i, "unit": "mg/dL"}
                }
            })
        })
        .collect();
    serde_json::json!({"resourceType": "Bundle", "type": "searchset", "entry": entries})
}
