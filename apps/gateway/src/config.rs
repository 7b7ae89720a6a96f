//! Gateway configuration
//!
//! Layered sources: optional `config/default` and `config/local` files, then
//! `STEG_`-prefixed environment variables (double underscore separates
//! sections, e.g. `STEG_SERVER__PORT`).

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;

use steg_fhir_client::{DataStoreConfig, DEFAULT_MAX_PAGES};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub data_store: DataStoreSection,
    pub auth: AuthConfig,
    pub flow: FlowSection,
    pub shaping: ShapingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty means no CORS headers are emitted.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directives; `RUST_LOG` overrides when set.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "steg=info,tower_http=warn".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataStoreSection {
    /// Base endpoint including the datastore path, without a trailing slash.
    pub endpoint: String,
    pub region: String,
    pub service: String,
    pub timeout_seconds: u64,
    pub max_pages: usize,
}

impl Default for DataStoreSection {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: "us-east-1".to_string(),
            service: "healthlake".to_string(),
            timeout_seconds: 30,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Identity-provider token endpoint; empty means static credentials.
    pub token_endpoint: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub username: String,
    pub password: String,
    /// Seconds before expiry at which cached credentials refresh.
    pub refresh_margin_seconds: i64,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_endpoint: String::new(),
            client_id: String::new(),
            client_secret: None,
            username: String::new(),
            password: String::new(),
            refresh_margin_seconds: 60,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlowSection {
    /// Flow runtime endpoint.
    pub endpoint: String,
    pub flow_id: String,
    pub flow_alias: String,
    /// Signing service name for flow requests.
    pub service: String,
    /// Inbound text longer than this is rejected with a client error.
    pub max_input_chars: usize,
}

impl Default for FlowSection {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            flow_id: String::new(),
            flow_alias: String::new(),
            service: "bedrock".to_string(),
            max_input_chars: 2000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShapingConfig {
    /// Observation bundles larger than this many entries flatten to rows.
    pub flatten_threshold: usize,
    /// Which `code.coding` slot carries the code/display pair.
    pub coding_index: usize,
}

impl Default for ShapingConfig {
    fn default() -> Self {
        Self {
            flatten_threshold: 4,
            coding_index: 0,
        }
    }
}

impl Config {
    /// Load configuration from files and environment.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("STEG").separator("__"))
            .build()
            .context("Failed to read configuration sources")?;

        settings
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.data_store.endpoint.is_empty() {
            return Err("data_store.endpoint must be set".to_string());
        }
        url::Url::parse(&self.data_store.endpoint)
            .map_err(|e| format!("data_store.endpoint is not a valid URL: {e}"))?;
        if self.data_store.max_pages == 0 {
            return Err("data_store.max_pages must be positive".to_string());
        }
        if self.flow.max_input_chars == 0 {
            return Err("flow.max_input_chars must be positive".to_string());
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .context("Invalid server.host/server.port")
    }

    pub fn data_store_config(&self) -> DataStoreConfig {
        let mut config = DataStoreConfig::new(
            self.data_store.endpoint.clone(),
            self.data_store.region.clone(),
        );
        config.service = self.data_store.service.clone();
        config.timeout = Duration::from_secs(self.data_store.timeout_seconds);
        config.max_pages = self.data_store.max_pages;
        config
    }
}
