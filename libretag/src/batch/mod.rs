//! Sequential batch processing across repositories.
//!
//! Each repository goes through `Pending → Promoting → Repointing → Done`,
//! or ends in `Failed`. The first failure stops the batch: repositories after
//! it stay `Pending` and are never contacted. Work already applied to earlier
//! repositories is not rolled back.

use crate::error::Result;
use crate::reassign::{ReassignmentPlan, Step, TagReassigner};
use crate::registry::{DeleteOutcome, RegistryClient};
use serde::Serialize;


/// Progress of one repository through the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryState {
    Pending,
    Promoting,
    Repointing,
    Done,
    Failed,
}

impl RepositoryState {
    /// Returns true if no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Per-repository record kept by the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryReport {
    pub repository: String,
    pub state: RepositoryState,
    /// Digest now bound to the target and current tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// Whether the current tag existed before it was repointed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_current: Option<DeleteOutcome>,
    /// Step that failed, for a `Failed` repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<Step>,
}

impl RepositoryReport {
    fn pending(repository: &str) -> Self {
        Self {
            repository: repository.to_string(),
            state: RepositoryState::Pending,
            digest: None,
            previous_current: None,
            failed_step: None,
        }
    }
}

/// State of every repository in a batch, in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub source_tag: String,
    pub target_tag: String,
    pub current_tag: String,
    pub repositories: Vec<RepositoryReport>,
}

impl BatchReport {
    fn new(plan: &ReassignmentPlan) -> Self {
        Self {
            source_tag: plan.source_tag().to_string(),
            target_tag: plan.target_tag().to_string(),
            current_tag: plan.current_tag().to_string(),
            repositories: plan
                .repositories()
                .iter()
                .map(|r| RepositoryReport::pending(r))
                .collect(),
        }
    }

    /// Number of repositories in `state`.
    pub fn count(&self, state: RepositoryState) -> usize {
        self.repositories.iter().filter(|r| r.state == state).count()
    }

    /// Returns true if every repository reached `Done`.
    pub fn is_complete(&self) -> bool {
        self.repositories
            .iter()
            .all(|r| r.state == RepositoryState::Done)
    }
}

/// Drives a [`TagReassigner`] over a list of repositories.
#[derive(Debug)]
pub struct BatchProcessor<C> {
    reassigner: TagReassigner<C>,
}

impl<C: RegistryClient> BatchProcessor<C> {
    pub fn new(reassigner: TagReassigner<C>) -> Self {
        Self { reassigner }
    }

    pub fn reassigner(&self) -> &TagReassigner<C> {
        &self.reassigner
    }

    /// Validates the inputs, then processes every repository in order.
    ///
    /// Invalid inputs fail with a configuration error before any registry
    /// call is made.
    pub async fn process_all<S: AsRef<str>>(
        &self,
        repositories: &[S],
        source_tag: &str,
        target_tag: &str,
        current_tag: &str,
    ) -> Result<BatchReport> {
        let plan = ReassignmentPlan::new(source_tag, target_tag, current_tag, repositories)?;
        self.run(&plan).await
    }

    /// Processes a validated plan, stopping at the first failure.
    pub async fn run(&self, plan: &ReassignmentPlan) -> Result<BatchReport> {
        let (report, result) = self.run_with_report(plan).await;
        result.map(|()| report)
    }

    /// Processes a validated plan and returns the per-repository states
    /// alongside the outcome, so callers can report partial progress.
    pub async fn run_with_report(&self, plan: &ReassignmentPlan) -> (BatchReport, Result<()>) {
        let mut report = BatchReport::new(plan);

        for (index, request) in plan.requests().enumerate() {
            let entry = &mut report.repositories[index];

            entry.state = RepositoryState::Promoting;
            let promoted = self
                .reassigner
                .promote_tag(&request.repository, &request.source_tag, &request.target_tag)
                .await;
            if let Err(e) = promoted {
                entry.state = RepositoryState::Failed;
                entry.failed_step = Some(Step::Promote);
                return (report, Err(e.in_repository(&request, Step::Promote)));
            }

            entry.state = RepositoryState::Repointing;
            let repointed = self
                .reassigner
                .repoint_current(&request.repository, &request.source_tag, &request.current_tag)
                .await;
            match repointed {
                Ok(repointed) => {
                    entry.state = RepositoryState::Done;
                    entry.digest = Some(repointed.image.digest);
                    entry.previous_current = Some(repointed.previous);
                }
                Err(e) => {
                    entry.state = RepositoryState::Failed;
                    entry.failed_step = Some(Step::Repoint);
                    return (report, Err(e.in_repository(&request, Step::Repoint)));
                }
            }
        }

        tracing::info!(
            repositories = report.repositories.len(),
            "all repositories processed"
        );
        (report, Ok(()))
    }
}
