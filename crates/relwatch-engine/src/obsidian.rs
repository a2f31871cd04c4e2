//! Obsidian release reconciliation (community plugins + themes).
//!
//! Plugins and themes are fetched and detected concurrently. A failing
//! source isolates to its own type: the other type's changes are still
//! returned and the failure is listed in [`ReconcileOutcome::failures`].

use crate::reconcile::{
    reconcile_type, EntityBinding, MissingEntry, ReconcileOptions, ReconcileOutcome, TypeFailure,
    TypeReport,
};
use crate::source::EntitySource;
use chrono::Utc;
use relwatch_core::detector::{Change, ChangeDetectorConfig, ChangeTally, DetectorRegistry};
use relwatch_core::domains::obsidian::{
    plugin_detector_config, theme_detector_config, ObsidianPlugin, ObsidianTheme,
    PLUGIN_ENTITY_TYPE, PLUGIN_ID_NORMALIZATION, THEME_ENTITY_TYPE, THEME_ID_NORMALIZATION,
};
use relwatch_core::errors::Result;
use relwatch_core::{log_op_end, log_op_start};
use relwatch_core_types::RunContext;
use serde::Serialize;

/// Changes of one run grouped by entity type; `None` when a type produced
/// no changes or failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessableChanges {
    pub plugins: Option<Vec<Change<ObsidianPlugin>>>,
    pub themes: Option<Vec<Change<ObsidianTheme>>>,
}

impl ProcessableChanges {
    pub fn is_empty(&self) -> bool {
        self.plugins.is_none() && self.themes.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessedCounts {
    pub plugins: usize,
    pub themes: usize,
}

/// Non-removal change counts per type, removals across both types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeCounts {
    pub plugins: usize,
    pub themes: usize,
    pub removed: usize,
}

/// Aggregate counters of one run. Rebuilt on every run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessingSummary {
    pub processed: ProcessedCounts,
    pub changes: ChangeCounts,
    pub missing: Vec<MissingEntry>,
}

pub type ObsidianOutcome = ReconcileOutcome<ProcessableChanges, ProcessingSummary>;

/// Runs the detector over Obsidian plugins and themes.
#[derive(Debug, Clone)]
pub struct ObsidianReconciler {
    plugin_config: ChangeDetectorConfig,
    theme_config: ChangeDetectorConfig,
}

impl ObsidianReconciler {
    pub fn new(plugin_config: ChangeDetectorConfig, theme_config: ChangeDetectorConfig) -> Self {
        Self {
            plugin_config,
            theme_config,
        }
    }

    /// Reconciler using the built-in plugin and theme configs.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(plugin_detector_config()?, theme_detector_config()?))
    }

    /// # Errors
    ///
    /// - `UnknownEntityType` - the registry lacks the plugin or theme type
    pub fn from_registry(registry: &DetectorRegistry) -> Result<Self> {
        Ok(Self::new(
            registry.get(PLUGIN_ENTITY_TYPE)?.clone(),
            registry.get(THEME_ENTITY_TYPE)?.clone(),
        ))
    }

    /// Reconcile both types against freshly fetched state under a new run.
    pub async fn reconcile<P, T>(
        &self,
        old_plugins: Vec<ObsidianPlugin>,
        old_themes: Vec<ObsidianTheme>,
        plugin_source: &P,
        theme_source: &T,
        options: &ReconcileOptions,
    ) -> ObsidianOutcome
    where
        P: EntitySource<Entity = ObsidianPlugin>,
        T: EntitySource<Entity = ObsidianTheme>,
    {
        let ctx = RunContext::new();
        self.reconcile_in(&ctx, old_plugins, old_themes, plugin_source, theme_source, options)
            .await
    }

    /// Same as [`Self::reconcile`], logged and tagged with the caller's run.
    pub async fn reconcile_in<P, T>(
        &self,
        ctx: &RunContext,
        old_plugins: Vec<ObsidianPlugin>,
        old_themes: Vec<ObsidianTheme>,
        plugin_source: &P,
        theme_source: &T,
        options: &ReconcileOptions,
    ) -> ObsidianOutcome
    where
        P: EntitySource<Entity = ObsidianPlugin>,
        T: EntitySource<Entity = ObsidianTheme>,
    {
        log_op_start!(
            "reconcile",
            run_id = ctx.run_id.as_str(),
            trace_id = ctx.trace_id.as_ref().map(|t| t.as_str()),
            domain = "obsidian"
        );
        let start = std::time::Instant::now();
        let detected_at = Utc::now();

        let plugin_binding = EntityBinding {
            entity_type: PLUGIN_ENTITY_TYPE,
            config: &self.plugin_config,
            normalization: PLUGIN_ID_NORMALIZATION,
        };
        let theme_binding = EntityBinding {
            entity_type: THEME_ENTITY_TYPE,
            config: &self.theme_config,
            normalization: THEME_ID_NORMALIZATION,
        };

        let (plugins, themes) = tokio::join!(
            reconcile_type(plugin_binding, old_plugins, plugin_source, options, detected_at),
            reconcile_type(theme_binding, old_themes, theme_source, options, detected_at),
        );

        let mut changes = ProcessableChanges::default();
        let mut summary = ProcessingSummary::default();
        let mut failures = Vec::new();

        match plugins {
            Ok(report) => {
                let absorbed = absorb(report, &mut summary.missing);
                summary.processed.plugins = absorbed.processed;
                summary.changes.plugins = absorbed.tally.non_removal();
                summary.changes.removed += absorbed.tally.removal;
                changes.plugins = absorbed.changes;
            }
            Err(error) => failures.push(TypeFailure::in_run(ctx, PLUGIN_ENTITY_TYPE, error)),
        }

        match themes {
            Ok(report) => {
                let absorbed = absorb(report, &mut summary.missing);
                summary.processed.themes = absorbed.processed;
                summary.changes.themes = absorbed.tally.non_removal();
                summary.changes.removed += absorbed.tally.removal;
                changes.themes = absorbed.changes;
            }
            Err(error) => failures.push(TypeFailure::in_run(ctx, THEME_ENTITY_TYPE, error)),
        }

        log_op_end!(
            "reconcile",
            duration_ms = start.elapsed().as_millis() as u64,
            run_id = ctx.run_id.as_str(),
            domain = "obsidian",
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

pub(crate) struct Absorbed<E> {
    /// `None` when the type produced no changes
    pub changes: Option<Vec<Change<E>>>,
    pub processed: usize,
    pub tally: ChangeTally,
}

/// Take a type report apart, moving its missing entries into `missing`.
pub(crate) fn absorb<E>(report: TypeReport<E>, missing: &mut Vec<MissingEntry>) -> Absorbed<E> {
    missing.extend(report.missing);
    let tally = ChangeTally::from_changes(&report.changes);
    Absorbed {
        changes: (!report.changes.is_empty()).then_some(report.changes),
        processed: report.processed,
        tally,
    }
}
