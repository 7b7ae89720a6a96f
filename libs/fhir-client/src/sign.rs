//! HMAC-SHA256 request signing
//!
//! The data store authenticates requests with an AWS-style signature v4
//! scheme: a canonical rendering of the request is hashed, signed with a key
//! derived from the temporary credentials, and the result attached as an
//! `authorization` header. The signer is behind a trait so the HTTP client
//! does not care which scheme a deployment uses.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use url::Url;

use crate::credentials::TemporaryCredentials;
use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Signs an outbound request by appending signature headers.
///
/// The URL carries the full, already-encoded query; implementations must not
/// reorder it on the wire (the canonical form is sorted internally).
pub trait RequestSigner: Send + Sync {
    fn sign(&self, method: &str, url: &Url, headers: &mut HeaderMap, payload: &[u8]) -> Result<()>;
}

/// Signature-v4 signer scoped to one service and region.
pub struct SigV4Signer {
    credentials: TemporaryCredentials,
    service: String,
    region: String,
}

impl SigV4Signer {
    pub fn new(
        credentials: TemporaryCredentials,
        service: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            service: service.into(),
            region: region.into(),
        }
    }

    fn sign_at(
        &self,
        method: &str,
        url: &Url,
        headers: &mut HeaderMap,
        payload: &[u8],
        now: DateTime<Utc>,
    ) -> Result<()> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let payload_hash = hex::encode(Sha256::digest(payload));

        insert_header(headers, "x-amz-date", &amz_date)?;
        insert_header(headers, "x-amz-content-sha256", &payload_hash)?;
        if let Some(token) = &self.credentials.session_token {
            insert_header(headers, "x-amz-security-token", token)?;
        }

        let host = url
            .host_str()
            .ok_or_else(|| Error::Signing("URL has no host".to_string()))?;
        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        // Canonical headers: everything present on the request plus host,
        // lowercased and sorted.
        let mut to_sign: BTreeMap<String, String> = BTreeMap::new();
        to_sign.insert("host".to_string(), host);
        for (name, value) in headers.iter() {
            let value = value.to_str().map_err(|_| {
                Error::Signing(format!("non-ASCII value for signed header {name}"))
            })?;
            to_sign.insert(name.as_str().to_ascii_lowercase(), value.trim().to_string());
        }

        let canonical_headers: String = to_sign
            .iter()
            .map(|(name, value)| format!("{name}:{value}\n"))
            .collect();
        let signed_headers = to_sign.keys().cloned().collect::<Vec<_>>().join(";");

        let canonical_request = format!(
            "{method}\n{path}\n{query}\n{canonical_headers}\n{signed_headers}\n{payload_hash}",
            path = url.path(),
            query = canonical_query(url),
        );

        let scope = format!("{date}/{}/{}/aws4_request", self.region, self.service);
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let key = signing_key(
            &self.credentials.secret_access_key,
            &date,
            &self.region,
            &self.service,
        );
        let signature = hex::encode(hmac(&key, string_to_sign.as_bytes()));

        let authorization = format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            self.credentials.access_key_id
        );
        let authorization = HeaderValue::from_str(&authorization)
            .map_err(|_| Error::Signing("invalid authorization header".to_string()))?;
        headers.insert(AUTHORIZATION, authorization);

        Ok(())
    }
}

impl RequestSigner for SigV4Signer {
    fn sign(&self, method: &str, url: &Url, headers: &mut HeaderMap, payload: &[u8]) -> Result<()> {
        self.sign_at(method, url, headers, payload, Utc::now())
    }
}

/// Build a query string suitable both for the wire and for signing: strict
/// RFC 3986 percent encoding, `key=value` pairs joined by `&`, in the order
/// given.
pub fn encode_query(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Canonical query: the URL's already-encoded pairs, sorted by key then
/// value.
fn canonical_query(url: &Url) -> String {
    let Some(query) = url.query() else {
        return String::new();
    };
    let mut pairs: Vec<(&str, &str)> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key, value),
            None => (pair, ""),
        })
        .collect();
    pairs.sort_unstable();
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac(format!("AWS4{secret}").as_bytes(), date.as_bytes());
    let k_region = hmac(&k_date, region.as_bytes());
    let k_service = hmac(&k_region, service.as_bytes());
    hmac(&k_service, b"aws4_request")
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<()> {
    let value = HeaderValue::from_str(value)
        .map_err(|_| Error::Signing(format!("invalid value for header {name}")))?;
    headers.insert(name, value);
    Ok(())
}
