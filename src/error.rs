//! Error types shared by the client and the bulk pipeline.

use thiserror::Error;

/// Errors that abort an isctl operation.
///
/// Per-resource mutation failures are not represented here; they are
/// recorded as [`crate::bulk::MutationOutcome::Failure`] and the batch
/// carries on.
#[derive(Debug, Error)]
pub enum Error {
    /// A required parameter is missing or invalid. Raised before any request.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The API key or secret key material could not be loaded or used.
    #[error("credentials error: {0}")]
    Credentials(String),

    /// The request could not be sent, or its response could not be decoded.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("API request failed: {status}")]
    Api { status: u16, body: String },

    /// The mutation phase ran past its deadline.
    #[error("deadline exceeded after {completed} of {total} resources")]
    DeadlineExceeded { completed: usize, total: usize },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Transport(format!("failed to decode response JSON: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::Api {
                status: 500,
                body: String::new()
            }
            .to_string(),
            "API request failed: 500"
        );
        assert_eq!(
            Error::DeadlineExceeded {
                completed: 3,
                total: 10
            }
            .to_string(),
            "deadline exceeded after 3 of 10 resources"
        );
    }

    #[test]
    fn test_decode_errors_are_transport() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Transport(_)));
    }
}
