//! Signed prompt-flow invocation
//!
//! POSTs the flow document to the configured flow endpoint with the same
//! credential signing the data-store client uses, and decodes the collected
//! event stream from the JSON response.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use steg_fhir_client::{CredentialsProvider, RequestSigner as _, SigV4Signer};
use steg_flow_client::{FlowError, FlowEvent, FlowInvoker, FlowRequest};

use crate::config::Config;

pub struct SignedFlowInvoker {
    http: reqwest::Client,
    url: String,
    service: String,
    region: String,
    credentials: Arc<dyn CredentialsProvider>,
}

impl SignedFlowInvoker {
    pub fn new(config: &Config, credentials: Arc<dyn CredentialsProvider>) -> anyhow::Result<Self> {
        let flow = &config.flow;
        let url = format!(
            "{}/flows/{}/aliases/{}",
            flow.endpoint.trim_end_matches('/'),
            flow.flow_id,
            flow.flow_alias,
        );
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.data_store.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            url,
            service: flow.service.clone(),
            region: config.data_store.region.clone(),
            credentials,
        })
    }
}

#[async_trait]
impl FlowInvoker for SignedFlowInvoker {
    async fn invoke(&self, request: FlowRequest) -> Result<Vec<FlowEvent>, FlowError> {
        let url = Url::parse(&self.url)
            .map_err(|e| FlowError::Invoke(format!("invalid flow endpoint: {e}")))?;

        let credentials = self
            .credentials
            .credentials()
            .await
            .map_err(|e| FlowError::Invoke(e.to_string()))?;
        let signer = SigV4Signer::new(credentials, self.service.as_str(), self.region.as_str());

        let payload =
            serde_json::to_vec(&request).map_err(|e| FlowError::Invoke(e.to_string()))?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        signer
            .sign("POST", &url, &mut headers, &payload)
            .map_err(|e| FlowError::Invoke(e.to_string()))?;

        tracing::debug!(url = %url, "POST (signed) flow invocation");

        let response = self
            .http
            .post(url)
            .headers(headers)
            .body(payload)
            .send()
            .await
            .map_err(|e| FlowError::Invoke(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FlowError::Invoke(e.to_string()))?;
        if !status.is_success() {
            return Err(FlowError::Invoke(format!("status {status}: {body}")));
        }

        let values: Vec<Value> =
            serde_json::from_str(&body).map_err(|e| FlowError::Decode(e.to_string()))?;
        Ok(values.iter().filter_map(FlowEvent::from_stream_value).collect())
    }
}
