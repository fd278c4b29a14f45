//! Bulk mutation pipeline
//!
//! - [`payload`] - Mutation kinds, their parameters and typed request bodies
//! - [`orchestrator`] - List, classify, mutate and report for every resource
//! - [`report`] - Per-resource outcomes and the JSON-lines reporter

pub mod orchestrator;
pub mod payload;
pub mod report;

pub use orchestrator::{BatchSummary, BulkMutator, DEFAULT_DEADLINE};
pub use payload::{LicenseTier, ManagementMode, Mutation, MutationKind, MutationParams};
pub use report::{JsonLinesReporter, MutationOutcome, OutcomeReporter};
