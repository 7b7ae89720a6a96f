//! Credential acquisition for request signing
//!
//! The data store only accepts requests signed with temporary credentials
//! obtained from an identity provider (password grant followed by a
//! federated-identity exchange). That exchange lives behind the
//! [`CredentialsProvider`] trait; the client only needs something that can
//! produce valid [`TemporaryCredentials`] on demand.
//!
//! Caching is an explicit decorator ([`CachingProvider`]) with an expiry
//! margin rather than hidden module state.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use tokio::sync::RwLock;

type HmacSha256 = Hmac<Sha256>;

/// Temporary signing credentials produced by the identity exchange.
#[derive(Debug, Clone)]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    /// When the credentials stop being valid; `None` means they do not expire.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Failures surfaced at the identity-exchange boundary.
#[derive(Error, Debug, Clone)]
pub enum CredentialsError {
    #[error("The username or password is incorrect")]
    Unauthorized,

    #[error("User is not confirmed")]
    Unconfirmed,

    #[error("Identity exchange failed: {0}")]
    Upstream(String),
}

/// Source of temporary signing credentials.
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    async fn credentials(&self) -> Result<TemporaryCredentials, CredentialsError>;
}

/// Fixed credentials, typically from configuration or the environment.
pub struct StaticProvider {
    credentials: TemporaryCredentials,
}

impl StaticProvider {
    pub fn new(credentials: TemporaryCredentials) -> Self {
        Self { credentials }
    }

    /// Build from environment variables. Returns `None` when the key or
    /// secret variable is unset.
    pub fn from_env(key_var: &str, secret_var: &str, token_var: &str) -> Option<Self> {
        let access_key_id = std::env::var(key_var).ok()?;
        let secret_access_key = std::env::var(secret_var).ok()?;
        let session_token = std::env::var(token_var).ok();
        Some(Self::new(TemporaryCredentials {
            access_key_id,
            secret_access_key,
            session_token,
            expires_at: None,
        }))
    }
}

#[async_trait]
impl CredentialsProvider for StaticProvider {
    async fn credentials(&self) -> Result<TemporaryCredentials, CredentialsError> {
        Ok(self.credentials.clone())
    }
}

/// Caching decorator around any provider.
///
/// Cached credentials are reused until they come within `margin` of their
/// expiry, at which point the inner provider is asked for fresh ones.
/// Credentials without an expiry are cached indefinitely.
pub struct CachingProvider<P> {
    inner: P,
    margin: Duration,
    cached: RwLock<Option<TemporaryCredentials>>,
}

impl<P: CredentialsProvider> CachingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self::with_margin(inner, Duration::seconds(60))
    }

    pub fn with_margin(inner: P, margin: Duration) -> Self {
        Self {
            inner,
            margin,
            cached: RwLock::new(None),
        }
    }

    fn is_fresh(credentials: &TemporaryCredentials, margin: Duration, now: DateTime<Utc>) -> bool {
        match credentials.expires_at {
            Some(expires_at) => now + margin < expires_at,
            None => true,
        }
    }
}

#[async_trait]
impl<P: CredentialsProvider> CredentialsProvider for CachingProvider<P> {
    async fn credentials(&self) -> Result<TemporaryCredentials, CredentialsError> {
        if let Some(cached) = self.cached.read().await.as_ref() {
            if Self::is_fresh(cached, self.margin, Utc::now()) {
                return Ok(cached.clone());
            }
        }

        let fresh = self.inner.credentials().await?;
        tracing::debug!(expires_at = ?fresh.expires_at, "refreshed signing credentials");
        *self.cached.write().await = Some(fresh.clone());
        Ok(fresh)
    }
}

/// Identity-provider settings for [`HttpIdentityProvider`].
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Token endpoint performing the password grant + federated exchange.
    pub token_endpoint: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub username: String,
    pub password: String,
}

/// Password-grant credentials provider against an HTTP identity endpoint.
pub struct HttpIdentityProvider {
    http: reqwest::Client,
    config: IdentityConfig,
}

impl HttpIdentityProvider {
    pub fn new(config: IdentityConfig) -> Result<Self, CredentialsError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| CredentialsError::Upstream(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { http, config })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_key_id: String,
    secret_access_key: String,
    #[serde(default)]
    session_token: Option<String>,
    #[serde(default)]
    expiration: Option<DateTime<Utc>>,
}

#[async_trait]
impl CredentialsProvider for HttpIdentityProvider {
    async fn credentials(&self) -> Result<TemporaryCredentials, CredentialsError> {
        let mut body = serde_json::json!({
            "username": self.config.username,
            "password": self.config.password,
            "clientId": self.config.client_id,
        });
        if let Some(secret) = &self.config.client_secret {
            body["secretHash"] = serde_json::Value::String(secret_hash(
                &self.config.username,
                &self.config.client_id,
                secret,
            ));
        }

        let response = self
            .http
            .post(&self.config.token_endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| CredentialsError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &body));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CredentialsError::Upstream(format!("invalid token response: {e}")))?;

        Ok(TemporaryCredentials {
            access_key_id: token.access_key_id,
            secret_access_key: token.secret_access_key,
            session_token: token.session_token,
            expires_at: token.expiration,
        })
    }
}

/// Client secret hash required by the identity provider:
/// HMAC-SHA256 over `username + client_id`, keyed by the client secret,
/// base64-encoded.
pub fn secret_hash(username: &str, client_id: &str, client_secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Map identity-provider failures onto the enumerated error kinds.
fn classify_status(status: u16, body: &str) -> CredentialsError {
    match status {
        401 => CredentialsError::Unauthorized,
        403 => CredentialsError::Unconfirmed,
        _ => CredentialsError::Upstream(format!("status {status}: {body}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        credentials: TemporaryCredentials,
        calls: AtomicUsize,
    }

    impl CountingProvider {
        fn new(expires_at: Option<DateTime<Utc>>) -> Self {
            Self {
                credentials: TemporaryCredentials {
                    access_key_id: "AKID".to_string(),
                    secret_access_key: "secret".to_string(),
                    session_token: Some("token".to_string()),
                    expires_at,
                },
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CredentialsProvider for CountingProvider {
        async fn credentials(&self) -> Result<TemporaryCredentials, CredentialsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.credentials.clone())
        }
    }

    #[tokio::test]
    async fn caches_fresh_credentials() {
        let provider = CachingProvider::new(CountingProvider::new(Some(
            Utc::now() + Duration::hours(1),
        )));

        provider.credentials().await.unwrap();
        provider.credentials().await.unwrap();

        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refreshes_when_inside_expiry_margin() {
        // Expires in 10s with a 60s margin, so every call refreshes.
        let provider = CachingProvider::with_margin(
            CountingProvider::new(Some(Utc::now() + Duration::seconds(10))),
            Duration::seconds(60),
        );

        provider.credentials().await.unwrap();
        provider.credentials().await.unwrap();

        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn credentials_without_expiry_are_cached_indefinitely() {
        let provider = CachingProvider::new(CountingProvider::new(None));

        provider.credentials().await.unwrap();
        provider.credentials().await.unwrap();

        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn secret_hash_is_deterministic() {
        let first = secret_hash("alice", "client-1", "top-secret");
        let second = secret_hash("alice", "client-1", "top-secret");
        assert_eq!(first, second);
        // base64 of a 32-byte digest
        assert_eq!(first.len(), 44);
    }

    #[test]
    fn secret_hash_varies_with_inputs() {
        let base = secret_hash("alice", "client-1", "top-secret");
        assert_ne!(base, secret_hash("bob", "client-1", "top-secret"));
        assert_ne!(base, secret_hash("alice", "client-2", "top-secret"));
        assert_ne!(base, secret_hash("alice", "client-1", "other"));
    }

    #[test]
    fn classifies_identity_failures() {
        assert!(matches!(
            classify_status(401, ""),
            CredentialsError::Unauthorized
        ));
        assert!(matches!(
            classify_status(403, ""),
            CredentialsError::Unconfirmed
        ));
        assert!(matches!(
            classify_status(500, "boom"),
            CredentialsError::Upstream(_)
        ));
    }
}
