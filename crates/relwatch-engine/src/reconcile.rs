//! Per entity type reconciliation.
//!
//! ## Pipeline (per type):
//! 1. Key the persisted collection; its identifiers are the tracked set
//! 2. Fetch, bounded by `source_timeout` (elapse or `Err` fails the type)
//! 3. Key the fetched collection
//! 4. Drop unresolved identifiers the fetched side does not hold from the
//!    old side so they surface as missing instead of removals
//! 5. Detect
//!
//! Entities without an identifier on either side are reported missing
//! under a positional placeholder id.

use crate::source::EntitySource;
use chrono::{DateTime, Utc};
use relwatch_core::detector::{
    detect_at, Change, ChangeDetectorConfig, IdNormalization, KeyedSnapshot, UnkeyedEntity,
};
use relwatch_core::errors::{ExError, ExErrorKind, RelwatchError, Result};
use relwatch_core::{log_op_end, log_op_error, log_op_start};
use relwatch_core_types::RunContext;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Caller-supplied bounds for the fetch boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Bound on a single identifier lookup
    pub fetch_timeout: Duration,
    /// Bound on a whole entity type's fetch
    pub source_timeout: Duration,
    pub max_concurrent_fetches: usize,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            source_timeout: Duration::from_secs(300),
            max_concurrent_fetches: 8,
        }
    }
}

impl ReconcileOptions {
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit;
        self
    }
}

/// How one entity type is keyed and classified.
#[derive(Debug, Clone, Copy)]
pub struct EntityBinding<'a> {
    pub entity_type: &'a str,
    pub config: &'a ChangeDetectorConfig,
    pub normalization: IdNormalization,
}

/// An identifier that was expected but could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingEntry {
    pub entity_type: String,
    pub id: String,
    /// Stable error code, e.g. `ERR_IDENTIFIER_MISSING`
    pub code: String,
    pub reason: String,
}

impl MissingEntry {
    pub fn from_error(id: impl Into<String>, error: &ExError) -> Self {
        Self {
            entity_type: error.entity_type().unwrap_or_default().to_string(),
            id: id.into(),
            code: error.code().to_string(),
            reason: error.message().to_string(),
        }
    }
}

/// Result of reconciling one entity type.
#[derive(Debug, Clone)]
pub struct TypeReport<T> {
    pub entity_type: String,
    pub changes: Vec<Change<T>>,
    /// Size of the keyed fetched collection
    pub processed: usize,
    pub missing: Vec<MissingEntry>,
}

/// An entity type whose whole source failed during a run.
#[derive(Debug, Clone)]
pub struct TypeFailure {
    pub entity_type: String,
    pub error: ExError,
}

impl TypeFailure {
    /// Failure of `entity_type`, tagged with the run that hit it.
    pub(crate) fn in_run(ctx: &RunContext, entity_type: &str, error: ExError) -> Self {
        let mut error = error.with_run_id(ctx.run_id.clone());
        if let Some(trace_id) = &ctx.trace_id {
            error = error.with_trace_id(trace_id.clone());
        }
        Self {
            entity_type: entity_type.to_string(),
            error,
        }
    }
}

/// Changes and summary of a run, plus the entity types that failed.
///
/// Failed types contribute nothing to `changes` and `summary`; the other
/// types are complete.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome<C, S> {
    pub changes: C,
    pub summary: S,
    pub failures: Vec<TypeFailure>,
}

impl<C, S> ReconcileOutcome<C, S> {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Convert a partial run into a run-level error.
    ///
    /// # Errors
    ///
    /// - `SourceUnreachable` - at least one entity type failed; the first
    ///   failure is attached as the source
    pub fn into_result(self) -> Result<(C, S)> {
        let Some(first) = self.failures.first() else {
            return Ok((self.changes, self.summary));
        };
        let failed: Vec<&str> = self
            .failures
            .iter()
            .map(|f| f.entity_type.as_str())
            .collect();
        let mut err = ExError::new(ExErrorKind::SourceUnreachable)
            .with_op("reconcile")
            .with_entity_type(first.entity_type.clone())
            .with_message(format!("entity types failed: {}", failed.join(", ")));
        if let Some(run_id) = first.error.run_id() {
            err = err.with_run_id(run_id.clone());
        }
        Err(err.with_source(first.error.clone()))
    }
}

/// Reconcile one entity type.
///
/// # Errors
///
/// - `SourceUnreachable` - the source failed or exceeded
///   `options.source_timeout`
pub async fn reconcile_type<S: EntitySource>(
    binding: EntityBinding<'_>,
    old: Vec<S::Entity>,
    source: &S,
    options: &ReconcileOptions,
    detected_at: DateTime<Utc>,
) -> Result<TypeReport<S::Entity>> {
    log_op_start!(
        "reconcile_type",
        entity_type = binding.entity_type,
        old_len = old.len()
    );
    let start = std::time::Instant::now();

    let report = reconcile_type_impl(binding, old, source, options, detected_at)
        .await
        .map_err(|e| {
            log_op_error!(
                "reconcile_type",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                entity_type = binding.entity_type
            );
            e
        })?;

    log_op_end!(
        "reconcile_type",
        duration_ms = start.elapsed().as_millis() as u64,
        entity_type = binding.entity_type,
        processed = report.processed,
        change_count = report.changes.len(),
        missing_count = report.missing.len()
    );

    Ok(report)
}

async fn reconcile_type_impl<S: EntitySource>(
    binding: EntityBinding<'_>,
    old: Vec<S::Entity>,
    source: &S,
    options: &ReconcileOptions,
    detected_at: DateTime<Utc>,
) -> Result<TypeReport<S::Entity>> {
    let entity_type = binding.entity_type;
    let id_field = binding.config.id_field();

    let old_keyed = KeyedSnapshot::key_by(old, id_field, binding.normalization);
    let mut missing = unkeyed_missing(entity_type, &old_keyed.unkeyed);
    let mut old_snapshot = old_keyed.snapshot;
    let tracked: Vec<String> = old_snapshot.ids().map(str::to_string).collect();

    let fetched = match tokio::time::timeout(options.source_timeout, source.fetch(&tracked)).await
    {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => return Err(source_unreachable(entity_type, e)),
        Err(_) => {
            let elapsed = ExError::new(ExErrorKind::Timeout)
                .with_op("fetch")
                .with_message(format!(
                    "{}s elapsed",
                    options.source_timeout.as_secs_f64()
                ));
            return Err(source_unreachable(entity_type, elapsed));
        }
    };

    let new_keyed = KeyedSnapshot::key_by(fetched.entities, id_field, binding.normalization);
    let new_snapshot = new_keyed.snapshot;

    for unresolved in &fetched.unresolved {
        let id = binding.normalization.apply(&unresolved.id);
        // A sibling entry resolved the same id.
        if new_snapshot.contains_id(&id) {
            continue;
        }
        old_snapshot.remove(&id);
        missing.push(MissingEntry::from_error(id, &unresolved.to_error(entity_type)));
    }
    missing.extend(unkeyed_missing(entity_type, &new_keyed.unkeyed));

    for entry in &missing {
        tracing::warn!(
            entity_type = entity_type,
            entity_id = %entry.id,
            code = %entry.code,
            reason = %entry.reason,
            "identifier missing"
        );
    }

    let changes = detect_at(
        binding.config,
        entity_type,
        &old_snapshot,
        &new_snapshot,
        detected_at,
    );

    Ok(TypeReport {
        entity_type: entity_type.to_string(),
        changes,
        processed: new_snapshot.len(),
        missing,
    })
}

fn unkeyed_missing(entity_type: &str, unkeyed: &[UnkeyedEntity]) -> Vec<MissingEntry> {
    unkeyed
        .iter()
        .map(|u| {
            let error = ExError::from(u.to_error(entity_type));
            MissingEntry::from_error(format!("{}#{}", entity_type, u.position), &error)
        })
        .collect()
}

fn source_unreachable(entity_type: &str, cause: ExError) -> ExError {
    if cause.kind() == ExErrorKind::SourceUnreachable {
        return cause;
    }
    ExError::from(RelwatchError::SourceUnreachable {
        entity_type: entity_type.to_string(),
        reason: cause.message().to_string(),
    })
    .with_source(cause)
}
