//! Signed Clinical Data Store Client
//!
//! This crate provides the pieces the gateway composes to talk to a
//! FHIR-compliant clinical-data store: credential acquisition and caching,
//! HMAC request signing, a signed HTTP client, pagination combining for
//! search bundles, invocation-parameter normalization, and Observation
//! flattening.
//!
//! # Examples
//!
//! ## Search with transparent pagination
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use steg_fhir_client::{DataStoreClient, DataStoreConfig, StaticProvider, TemporaryCredentials};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = StaticProvider::new(TemporaryCredentials {
//!     access_key_id: "AKIDEXAMPLE".to_string(),
//!     secret_access_key: "secret".to_string(),
//!     session_token: None,
//!     expires_at: None,
//! });
//! let client = DataStoreClient::new(
//!     DataStoreConfig::new(
//!         "https://healthlake.us-east-1.amazonaws.com/datastore/abc/r4",
//!         "us-east-1",
//!     ),
//!     Arc::new(credentials),
//! )?;
//! let document = client
//!     .search("/Observation", &[("code".to_string(), "2339-0".to_string())])
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
pub mod client;
pub mod credentials;
pub mod error;
pub mod models;
pub mod paginate;
pub mod params;
pub mod sign;
pub mod tabulate;

// Re-export main types
pub use client::{DataStoreClient, DataStoreConfig};
pub use credentials::{
    CachingProvider, CredentialsError, CredentialsProvider, HttpIdentityProvider, IdentityConfig,
    StaticProvider, TemporaryCredentials,
};
pub use error::{Error, Result};
pub use models::{Bundle, BundleEntry, BundleLink};
pub use paginate::{combine_pages, split_page_url, PageRequest, DEFAULT_MAX_PAGES};
pub use params::normalize_query;
pub use sign::{encode_query, RequestSigner, SigV4Signer};
pub use tabulate::{flatten_observations, FlattenOptions, TABLE_HEADER};
