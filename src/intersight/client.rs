//! Intersight Client
//!
//! Main client for interacting with the Intersight API, combining request
//! signing, the HTTP layer and the configured base URL.

use super::auth::CredentialProvider;
use super::http::{IntersightHttpClient, RawResponse};
use crate::error::{Error, Result};
use reqwest::{Method, Url};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Default Intersight REST API base URL
pub const DEFAULT_BASE_URL: &str = "https://www.intersight.com/api/v1";

/// Main Intersight client
#[derive(Clone)]
pub struct IntersightClient {
    credentials: Arc<dyn CredentialProvider>,
    http: IntersightHttpClient,
    base_url: Url,
}

impl IntersightClient {
    /// Create a new client against `base_url`
    pub fn new(base_url: &str, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let http = IntersightHttpClient::new()?;

        Ok(Self {
            credentials,
            http,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Build an API URL from a path relative to the base, e.g. `compute/Blades`
    pub fn api_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Configuration(format!("invalid API path {}: {}", path, e)))
    }

    /// Make a GET request and decode the JSON body
    pub async fn get(&self, path: &str) -> Result<Value> {
        let url = self.api_url(path)?;
        self.http
            .send(Method::GET, url, None, self.credentials.as_ref())
            .await?
            .into_json()
    }

    /// Make a POST request and decode the JSON body
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.post_raw(path, body).await?.into_json()
    }

    /// Make a POST request and hand back status and body untouched
    pub async fn post_raw<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<RawResponse> {
        let url = self.api_url(path)?;
        let payload = serde_json::to_vec(body)
            .map_err(|e| Error::Transport(format!("failed to encode request body: {}", e)))?;
        self.http
            .send(Method::POST, url, Some(payload), self.credentials.as_ref())
            .await
    }
}

/// Parse the base URL so that relative joins append to it instead of
/// replacing its last segment
fn parse_base_url(base_url: &str) -> Result<Url> {
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    };

    let url = Url::parse(&normalized)
        .map_err(|e| Error::Configuration(format!("invalid base URL {}: {}", base_url, e)))?;

    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(Error::Configuration(format!(
            "invalid base URL {}: not an absolute http(s) URL",
            base_url
        )));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joins_keep_api_prefix() {
        let base = parse_base_url(DEFAULT_BASE_URL).unwrap();
        assert_eq!(
            base.join("compute/PhysicalSummaries").unwrap().as_str(),
            "https://www.intersight.com/api/v1/compute/PhysicalSummaries"
        );
    }

    #[test]
    fn test_trailing_slash_is_accepted() {
        let base = parse_base_url("http://localhost:9000/api/v1/").unwrap();
        assert_eq!(
            base.join("ntp/Policies").unwrap().as_str(),
            "http://localhost:9000/api/v1/ntp/Policies"
        );
    }

    #[test]
    fn test_rejects_relative_base() {
        assert!(matches!(
            parse_base_url("api/v1"),
            Err(Error::Configuration(_))
        ));
    }
}
