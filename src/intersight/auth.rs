//! Intersight Authentication
//!
//! Requests are authenticated with HTTP signatures: every request carries a
//! `Date`, a body `Digest` and a `Signature` computed with the account's RSA
//! secret key over those headers plus the request target.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, DATE, HOST};
use reqwest::{Method, Url};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Headers covered by the signature, in signing order
const SIGNED_HEADERS: &str = "(request-target) date digest host";

/// The parts of an outgoing request a signer gets to see
#[derive(Debug, Clone, Copy)]
pub struct SigningRequest<'a> {
    pub method: &'a Method,
    pub url: &'a Url,
    pub body: &'a [u8],
}

/// Produces the authentication headers for one request.
pub trait CredentialProvider: Send + Sync {
    fn sign(&self, request: &SigningRequest<'_>) -> Result<HeaderMap>;
}

/// Credentials backed by an API key id and an RSA secret key file
#[derive(Clone)]
pub struct KeyFileCredentials {
    api_key_id: String,
    signing_key: SigningKey<Sha256>,
}

impl std::fmt::Debug for KeyFileCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyFileCredentials")
            .field("api_key_id", &self.api_key_id)
            .finish_non_exhaustive()
    }
}

impl KeyFileCredentials {
    /// Load credentials, reading the secret key once.
    pub fn from_file(api_key_id: &str, secret_key_file: &Path) -> Result<Self> {
        let pem = std::fs::read_to_string(secret_key_file).map_err(|e| {
            Error::Credentials(format!(
                "failed to read secret key file {}: {}",
                secret_key_file.display(),
                e
            ))
        })?;
        Self::from_pem(api_key_id, &pem)
    }

    /// Build credentials from PEM text (PKCS#1 or PKCS#8).
    pub fn from_pem(api_key_id: &str, pem: &str) -> Result<Self> {
        if !validate_api_key_id(api_key_id) {
            return Err(Error::Credentials(
                "API key id is empty or contains invalid characters".to_string(),
            ));
        }

        let private_key = RsaPrivateKey::from_pkcs1_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
            .map_err(|e| Error::Credentials(format!("unsupported secret key: {}", e)))?;

        tracing::debug!("Loaded RSA secret key for API key {}", api_key_id);

        Ok(Self {
            api_key_id: api_key_id.to_string(),
            signing_key: SigningKey::<Sha256>::new(private_key),
        })
    }

    pub fn api_key_id(&self) -> &str {
        &self.api_key_id
    }
}

impl CredentialProvider for KeyFileCredentials {
    fn sign(&self, request: &SigningRequest<'_>) -> Result<HeaderMap> {
        let date = http_date(chrono::Utc::now());
        let digest = body_digest(request.body);
        let host = host_header(request.url)?;
        let signing_string = signing_string(request.method, request.url, &date, &digest, &host);

        let signature = self.signing_key.sign(signing_string.as_bytes());
        let authorization = format!(
            "Signature keyId=\"{}\",algorithm=\"rsa-sha256\",headers=\"{}\",signature=\"{}\"",
            self.api_key_id,
            SIGNED_HEADERS,
            BASE64.encode(signature.to_bytes())
        );

        let mut headers = HeaderMap::new();
        headers.insert(DATE, header_value(&date)?);
        headers.insert(HeaderName::from_static("digest"), header_value(&digest)?);
        headers.insert(HOST, header_value(&host)?);
        headers.insert(AUTHORIZATION, header_value(&authorization)?);
        Ok(headers)
    }
}

/// API key ids are embedded in a quoted header parameter, so they must be
/// printable ASCII without quotes or whitespace
fn validate_api_key_id(api_key_id: &str) -> bool {
    !api_key_id.is_empty()
        && api_key_id
            .chars()
            .all(|c| c.is_ascii_graphic() && c != '"' && c != '\\')
}

/// RFC 7231 IMF-fixdate
fn http_date(now: chrono::DateTime<chrono::Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn body_digest(body: &[u8]) -> String {
    format!("SHA-256={}", BASE64.encode(Sha256::digest(body)))
}

fn host_header(url: &Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| Error::Configuration(format!("URL has no host: {}", url)))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn request_target(method: &Method, url: &Url) -> String {
    let mut target = format!("{} {}", method.as_str().to_lowercase(), url.path());
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    target
}

fn signing_string(method: &Method, url: &Url, date: &str, digest: &str, host: &str) -> String {
    format!(
        "(request-target): {}\ndate: {}\ndigest: {}\nhost: {}",
        request_target(method, url),
        date,
        digest,
        host
    )
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::Credentials(format!("invalid header value: {}", e)))
}
