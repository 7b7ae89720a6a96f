//! Application state and the data-source seam

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::{AuthConfig, Config};
use crate::error::Result;
use crate::flow::SignedFlowInvoker;
use steg_fhir_client::{
    CachingProvider, CredentialsProvider, DataStoreClient, HttpIdentityProvider, IdentityConfig,
    StaticProvider, TemporaryCredentials,
};
use steg_flow_client::FlowInvoker;

/// Read access to the clinical data store, as the handlers see it.
///
/// The production implementation wraps [`DataStoreClient`]; tests substitute
/// a canned source.
#[async_trait]
pub trait ClinicalDataSource: Send + Sync {
    /// Search `path` with the given query, following continuation links.
    async fn search(&self, path: &str, params: &[(String, String)]) -> Result<Value>;
}

#[async_trait]
impl ClinicalDataSource for DataStoreClient {
    async fn search(&self, path: &str, params: &[(String, String)]) -> Result<Value> {
        Ok(DataStoreClient::search(self, path, params).await?)
    }
}

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub data_source: Arc<dyn ClinicalDataSource>,
    pub flow: Arc<dyn FlowInvoker>,
}

impl AppState {
    /// Wire up the production data-store client and flow invoker.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let credentials = build_credentials_provider(&config.auth)?;
        let client = DataStoreClient::new(config.data_store_config(), credentials.clone())?;
        let flow = SignedFlowInvoker::new(&config, credentials)?;

        Ok(Self {
            config: Arc::new(config),
            data_source: Arc::new(client),
            flow: Arc::new(flow),
        })
    }

    /// Assemble state from explicit collaborators (test seam).
    pub fn with_sources(
        config: Config,
        data_source: Arc<dyn ClinicalDataSource>,
        flow: Arc<dyn FlowInvoker>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            data_source,
            flow,
        }
    }
}

fn build_credentials_provider(auth: &AuthConfig) -> anyhow::Result<Arc<dyn CredentialsProvider>> {
    if !auth.token_endpoint.is_empty() {
        let provider = HttpIdentityProvider::new(IdentityConfig {
            token_endpoint: auth.token_endpoint.clone(),
            client_id: auth.client_id.clone(),
            client_secret: auth.client_secret.clone(),
            username: auth.username.clone(),
            password: auth.password.clone(),
        })?;
        return Ok(Arc::new(CachingProvider::with_margin(
            provider,
            chrono::Duration::seconds(auth.refresh_margin_seconds),
        )));
    }

    let (Some(access_key_id), Some(secret_access_key)) =
        (auth.access_key_id.clone(), auth.secret_access_key.clone())
    else {
        anyhow::bail!("auth: either token_endpoint or static access keys must be configured");
    };

    Ok(Arc::new(StaticProvider::new(TemporaryCredentials {
        access_key_id,
        secret_access_key,
        session_token: auth.session_token.clone(),
        expires_at: None,
    })))
}
