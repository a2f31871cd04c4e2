//! Configuration-driven change detection.
//!
//! A [`ChangeDetectorConfig`] names an identifier field and three prioritised
//! field groups. [`detect`] matches two [`KeyedSnapshot`]s by identifier and
//! emits one [`Change`] per added, removed or meaningfully changed entity.

pub mod classify;
pub mod config;
pub mod engine;
pub mod keyed;
pub mod model;
pub mod registry;

pub use classify::{classify, classify_entities, first_difference, Difference};
pub use config::{ChangeDetectorConfig, FieldGroup, RawDetectorConfig};
pub use engine::{detect, detect_at};
pub use keyed::{
    entity_view, identifier_of, IdNormalization, KeyedSnapshot, KeyingOutcome, UnkeyedEntity,
};
pub use model::{Change, ChangeTally, ChangeType};
pub use registry::DetectorRegistry;
