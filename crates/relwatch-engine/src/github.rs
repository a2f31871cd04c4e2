//! GitHub repository reconciliation.

use crate::obsidian::absorb;
use crate::reconcile::{
    reconcile_type, EntityBinding, MissingEntry, ReconcileOptions, ReconcileOutcome, TypeFailure,
};
use crate::source::EntitySource;
use chrono::Utc;
use relwatch_core::detector::{Change, ChangeDetectorConfig, DetectorRegistry};
use relwatch_core::domains::github::{
    repository_detector_config, GithubRepository, REPOSITORY_ENTITY_TYPE,
    REPOSITORY_ID_NORMALIZATION,
};
use relwatch_core::errors::Result;
use relwatch_core::{log_op_end, log_op_start};
use relwatch_core_types::RunContext;
use serde::Serialize;

/// Counters of one repository run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RepositorySummary {
    pub processed: usize,
    /// Non-removal changes
    pub changes: usize,
    pub removed: usize,
    pub missing: Vec<MissingEntry>,
}

/// `None` when nothing changed or the source failed.
pub type RepositoryChanges = Option<Vec<Change<GithubRepository>>>;

pub type GithubOutcome = ReconcileOutcome<RepositoryChanges, RepositorySummary>;

#[derive(Debug, Clone)]
pub struct GithubReconciler {
    config: ChangeDetectorConfig,
}

impl GithubReconciler {
    pub fn new(config: ChangeDetectorConfig) -> Self {
        Self { config }
    }

    pub fn builtin() -> Result<Self> {
        Ok(Self::new(repository_detector_config()?))
    }

    /// # Errors
    ///
    /// - `UnknownEntityType` - the registry lacks the repository type
    pub fn from_registry(registry: &DetectorRegistry) -> Result<Self> {
        Ok(Self::new(registry.get(REPOSITORY_ENTITY_TYPE)?.clone()))
    }

    pub async fn reconcile<S>(
        &self,
        old_repositories: Vec<GithubRepository>,
        source: &S,
        options: &ReconcileOptions,
    ) -> GithubOutcome
    where
        S: EntitySource<Entity = GithubRepository>,
    {
        self.reconcile_in(&RunContext::new(), old_repositories, source, options)
            .await
    }

    pub async fn reconcile_in<S>(
        &self,
        ctx: &RunContext,
        old_repositories: Vec<GithubRepository>,
        source: &S,
        options: &ReconcileOptions,
    ) -> GithubOutcome
    where
        S: EntitySource<Entity = GithubRepository>,
    {
        log_op_start!(
            "reconcile",
            run_id = ctx.run_id.as_str(),
            trace_id = ctx.trace_id.as_ref().map(|t| t.as_str()),
            domain = "github"
        );
        let start = std::time::Instant::now();

        let binding = EntityBinding {
            entity_type: REPOSITORY_ENTITY_TYPE,
            config: &self.config,
            normalization: REPOSITORY_ID_NORMALIZATION,
        };
        let result = reconcile_type(binding, old_repositories, source, options, Utc::now()).await;

        let mut summary = RepositorySummary::default();
        let mut failures = Vec::new();
        let changes = match result {
            Ok(report) => {
                let absorbed = absorb(report, &mut summary.missing);
                summary.processed = absorbed.processed;
                summary.changes = absorbed.tally.non_removal();
                summary.removed = absorbed.tally.removal;
                absorbed.changes
            }
            Err(error) => {
                failures.push(TypeFailure::in_run(ctx, REPOSITORY_ENTITY_TYPE, error));
                None
            }
        };

        log_op_end!(
            "reconcile",
            duration_ms = start.elapsed().as_millis() as u64,
            run_id = ctx.run_id.as_str(),
            domain = "github",
            missing_count = summary.missing.len(),
            failed_types = failures.len()
        );

        ReconcileOutcome {
            changes,
            summary,
            failures,
        }
    }
}
