//! HTTP utilities for Intersight REST API calls

use super::auth::{CredentialProvider, SigningRequest};
use crate::error::{Error, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode, Url};
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut cut = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Status and body of a completed request, whatever the status
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON, turning a non-success status into [`Error::Api`]
    pub fn into_json(self) -> Result<Value> {
        if !self.is_success() {
            return Err(Error::Api {
                status: self.status.as_u16(),
                body: self.body,
            });
        }

        // Handle empty response
        if self.body.is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&self.body)?)
    }
}

/// HTTP client wrapper for Intersight API calls
#[derive(Clone)]
pub struct IntersightHttpClient {
    client: Client,
}

impl IntersightHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("isctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Sign and send one request with an already encoded JSON body. Only
    /// transport problems are errors here; the caller decides what a
    /// non-success status means.
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
        credentials: &dyn CredentialProvider,
    ) -> Result<RawResponse> {
        tracing::debug!("{} {}", method, url);

        let auth_headers = credentials.sign(&SigningRequest {
            method: &method,
            url: &url,
            body: body.as_deref().unwrap_or_default(),
        })?;

        let mut request = self
            .client
            .request(method, url)
            .headers(auth_headers)
            .header(ACCEPT, "application/json");

        if let Some(payload) = body {
            request = request.header(CONTENT_TYPE, "application/json").body(payload);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(format!("failed to send request: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            // Only log sanitized/truncated error body
            tracing::warn!("API error: {} - {}", status, sanitize_for_log(&body));
        }

        Ok(RawResponse { status, body })
    }
}

/// Format an isctl error for display on the terminal
pub fn format_api_error(error: &Error) -> String {
    match error {
        Error::Api { status, .. } => match *status {
            401 => "Authentication failed. Check your API key id and secret key file.".to_string(),
            403 => "Permission denied. Check the privileges of your API key.".to_string(),
            404 => "Resource not found.".to_string(),
            409 => "Resource conflict. The resource may already exist or be in use.".to_string(),
            429 => "Rate limit exceeded. Please try again later.".to_string(),
            400 => "Invalid request. Check your parameters.".to_string(),
            500 | 502 | 503 => "Intersight service temporarily unavailable. Please try again.".to_string(),
            other => format!("Request failed with status {}.", other),
        },
        other => {
            let message = other.to_string();
            let sanitized = message
                .chars()
                .filter(|c| c.is_ascii_graphic() || *c == ' ')
                .take(160)
                .collect::<String>();

            if sanitized.len() < message.len() {
                format!("{}...", sanitized)
            } else {
                sanitized
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.ends_with("[truncated, 500 bytes total]"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("a\nb\tc d"), "abc d");
    }

    #[test]
    fn test_into_json_maps_status_to_api_error() {
        let response = RawResponse {
            status: StatusCode::FORBIDDEN,
            body: "{\"code\":\"Forbidden\"}".to_string(),
        };
        match response.into_json() {
            Err(Error::Api { status, body }) => {
                assert_eq!(status, 403);
                assert_eq!(body, "{\"code\":\"Forbidden\"}");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_into_json_empty_body_is_null() {
        let response = RawResponse {
            status: StatusCode::NO_CONTENT,
            body: String::new(),
        };
        assert_eq!(response.into_json().unwrap(), Value::Null);
    }

    #[test]
    fn test_format_api_error_by_status() {
        let err = Error::Api {
            status: 401,
            body: String::new(),
        };
        assert!(format_api_error(&err).contains("Authentication failed"));

        let err = Error::Api {
            status: 418,
            body: String::new(),
        };
        assert_eq!(format_api_error(&err), "Request failed with status 418.");
    }

    #[test]
    fn test_format_api_error_passes_configuration_message() {
        let err = Error::Configuration("--mode is required".to_string());
        assert_eq!(
            format_api_error(&err),
            "configuration error: --mode is required"
        );
    }
}
