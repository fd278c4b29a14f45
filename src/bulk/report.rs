//! Per-resource outcomes and their line-oriented encoding

use serde::{Serialize, Serializer};
use serde_json::value::RawValue;
use std::io::{self, Write};

/// Result of one resource's mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MutationOutcome {
    Success {
        #[serde(rename = "moid")]
        id: String,
        #[serde(rename = "name")]
        display_name: String,
        #[serde(rename = "obj_type")]
        declared_type: String,
        #[serde(rename = "serial")]
        serial_number: String,
        applied_value: String,
        status_code: u16,
    },
    /// The server rejected the mutation, or it never reached the server.
    /// `status_code` is absent in the latter case.
    Failure {
        #[serde(rename = "moid")]
        id: String,
        status_code: Option<u16>,
        #[serde(rename = "body", serialize_with = "raw_body")]
        raw_response_body: String,
    },
    /// The declared type has no mutation endpoint; nothing was sent.
    Skipped {
        #[serde(rename = "moid")]
        id: String,
        #[serde(rename = "obj_type")]
        declared_type: String,
    },
}

impl MutationOutcome {
    pub fn id(&self) -> &str {
        match self {
            MutationOutcome::Success { id, .. }
            | MutationOutcome::Failure { id, .. }
            | MutationOutcome::Skipped { id, .. } => id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MutationOutcome::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, MutationOutcome::Failure { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, MutationOutcome::Skipped { .. })
    }
}

/// Embed a JSON body as its exact text, anything else as a string.
/// Multi-line bodies are always strings so each record stays on one line.
fn raw_body<S: Serializer>(body: &str, serializer: S) -> Result<S::Ok, S::Error> {
    if body.contains(['\n', '\r']) {
        return serializer.serialize_str(body);
    }
    match serde_json::from_str::<&RawValue>(body) {
        Ok(raw) => raw.serialize(serializer),
        Err(_) => serializer.serialize_str(body),
    }
}

/// Receives each outcome as soon as it is produced
pub trait OutcomeReporter {
    fn report(&mut self, outcome: &MutationOutcome);
}

/// Writes one JSON object per outcome, one per line
pub struct JsonLinesReporter<W: Write> {
    writer: W,
}

impl JsonLinesReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonLinesReporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutcomeReporter for JsonLinesReporter<W> {
    fn report(&mut self, outcome: &MutationOutcome) {
        let line = match serde_json::to_string(outcome) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to encode outcome for {}: {}", outcome.id(), e);
                return;
            }
        };

        if let Err(e) = writeln!(self.writer, "{}", line).and_then(|_| self.writer.flush()) {
            tracing::warn!("Failed to write outcome for {}: {}", outcome.id(), e);
        }
    }
}
