//! Relwatch Engine - snapshot reconciliation
//!
//! Applies the `relwatch-core` detector to freshly fetched state:
//! - `EntitySource` fetch boundary and a bounded per-identifier fetch helper
//! - Per entity type reconciliation with missing-identifier tracking
//! - Obsidian (plugins + themes) and GitHub repository reconcilers
//! - File-backed sources

pub mod github;
pub mod obsidian;
pub mod reconcile;
pub mod source;
pub mod sources;

pub use github::{GithubOutcome, GithubReconciler, RepositorySummary};
pub use obsidian::{ObsidianOutcome, ObsidianReconciler, ProcessableChanges, ProcessingSummary};
pub use reconcile::{
    reconcile_type, EntityBinding, MissingEntry, ReconcileOptions, ReconcileOutcome,
    TypeFailure, TypeReport,
};
pub use source::{fetch_each, EntitySource, FetchOutcome, UnresolvedId};
pub use sources::JsonFileSource;
