//! Bulk Mutation Orchestrator
//!
//! Lists a mixed collection once, then applies one mutation to every listed
//! resource through its type-specific endpoint. A resource that fails is
//! recorded and the batch moves on; only parameter validation, the listing
//! call and the overall deadline can stop a run.

use super::payload::{Mutation, MutationKind, MutationParams};
use super::report::{MutationOutcome, OutcomeReporter};
use crate::error::{Error, Result};
use crate::intersight::client::IntersightClient;
use crate::intersight::http::sanitize_for_log;
use crate::resource::{classify, Classification, ResourceLister, ResourceSummary};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Default bound on the mutation phase
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(600);

/// Outcomes of one completed batch, in listing order
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<MutationOutcome>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_skipped()).count()
    }
}

/// Applies a mutation to every resource of a listing
pub struct BulkMutator<'a> {
    client: &'a IntersightClient,
    lister: ResourceLister,
    concurrency: usize,
    deadline: Duration,
}

impl<'a> BulkMutator<'a> {
    /// Sequential mutator over the physical compute summaries
    pub fn new(client: &'a IntersightClient) -> Self {
        Self {
            client,
            lister: ResourceLister::physical_summaries(),
            concurrency: 1,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Number of mutation requests in flight at once (at least 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Validate `params` for `kind`, then run the batch.
    pub async fn run(
        &self,
        kind: MutationKind,
        params: MutationParams,
        reporter: &mut dyn OutcomeReporter,
    ) -> Result<BatchSummary> {
        let mutation = kind.validate(params)?;
        self.apply(mutation, reporter).await
    }

    /// Run an already validated mutation over the listing.
    pub async fn apply(
        &self,
        mutation: Mutation,
        reporter: &mut dyn OutcomeReporter,
    ) -> Result<BatchSummary> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("bulk_mutation", %run_id, kind = %mutation.kind());

        async move {
            let resources = self.lister.list(self.client).await?;
            let total = resources.len();
            tracing::info!(
                "Applying {} to {} resources (concurrency {})",
                mutation.applied_value(),
                total,
                self.concurrency
            );

            let deadline = Instant::now() + self.deadline;
            let mut outcomes = Vec::with_capacity(total);

            let pending = stream::iter(resources)
                .map(|resource| self.mutate_one(resource, mutation))
                .buffered(self.concurrency);
            let mut pending = std::pin::pin!(pending);

            loop {
                match tokio::time::timeout_at(deadline, pending.next()).await {
                    Ok(Some(outcome)) => {
                        reporter.report(&outcome);
                        outcomes.push(outcome);
                    }
                    Ok(None) => break,
                    Err(_) => {
                        tracing::error!(
                            "Deadline of {:?} exceeded after {} of {} resources",
                            self.deadline,
                            outcomes.len(),
                            total
                        );
                        return Err(Error::DeadlineExceeded {
                            completed: outcomes.len(),
                            total,
                        });
                    }
                }
            }

            let summary = BatchSummary { outcomes };
            tracing::info!(
                "Batch complete: {} succeeded, {} failed, {} skipped",
                summary.succeeded(),
                summary.failed(),
                summary.skipped()
            );
            Ok(summary)
        }
        .instrument(span)
        .await
    }

    /// Everything here derives from `resource` alone.
    async fn mutate_one(&self, resource: ResourceSummary, mutation: Mutation) -> MutationOutcome {
        let route = match classify(&resource.declared_type) {
            Classification::Route(route) => route,
            Classification::Unsupported => {
                tracing::warn!(
                    "Skipping {}: unsupported type {}",
                    resource.id,
                    resource.declared_type
                );
                return MutationOutcome::Skipped {
                    id: resource.id,
                    declared_type: resource.declared_type,
                };
            }
        };

        let path = route.resolve(&resource.id);
        let payload = mutation.payload();

        match self.client.post_raw(&path, &payload).await {
            Ok(response) if response.is_success() => {
                tracing::debug!("{} set to {} on {}", mutation.kind(), mutation.applied_value(), path);
                MutationOutcome::Success {
                    id: resource.id,
                    display_name: resource.display_name,
                    declared_type: resource.declared_type,
                    serial_number: resource.serial_number,
                    applied_value: mutation.applied_value().to_string(),
                    status_code: response.status.as_u16(),
                }
            }
            Ok(response) => {
                tracing::warn!(
                    "Mutation of {} failed with {}: {}",
                    resource.id,
                    response.status,
                    sanitize_for_log(&response.body)
                );
                MutationOutcome::Failure {
                    id: resource.id,
                    status_code: Some(response.status.as_u16()),
                    raw_response_body: response.body,
                }
            }
            Err(e) => {
                tracing::warn!("Mutation of {} was not completed: {}", resource.id, e);
                MutationOutcome::Failure {
                    id: resource.id,
                    status_code: None,
                    raw_response_body: e.to_string(),
                }
            }
        }
    }
}
