//! Relwatch Core - change detection over entity snapshots
//!
//! This crate provides the synchronous, I/O-free part of relwatch:
//! - Dotted field path resolution with an explicit absent sentinel
//! - Deep field comparison (order-insensitive arrays, null == absent)
//! - Config-driven change classification (tracked > update > soft)
//! - Old/new snapshot detection producing ordered `Change<T>` records
//! - Detector registry loaded from built-ins and YAML
//! - Built-in Obsidian and GitHub entity types
//! - Error and logging facilities shared by the other crates

pub mod compare;
pub mod detector;
pub mod domains;
pub mod errors;
pub mod human_summary;
pub mod logging_facility;
pub mod path;

// Re-export commonly used types
pub use detector::{
    classify, detect, detect_at, Change, ChangeDetectorConfig, ChangeTally, ChangeType,
    DetectorRegistry, IdNormalization, KeyedSnapshot,
};
pub use errors::{ExError, ExErrorKind, RelwatchError, Result};
pub use human_summary::render_change_summary;
pub use path::{FieldPath, Resolved};
