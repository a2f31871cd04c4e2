//! Detector configuration.
//!
//! One [`ChangeDetectorConfig`] exists per entity type. It is built and
//! validated once at startup and passed by reference into every detector and
//! integrator call; nothing mutates it afterwards.

use crate::detector::model::ChangeType;
use crate::errors::{ExError, RelwatchError, Result};
use crate::path::FieldPath;
use serde::{Deserialize, Serialize};

/// The three prioritised field groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldGroup {
    Tracked,
    Update,
    Soft,
}

impl FieldGroup {
    /// Evaluation order: the first group with a differing path wins.
    pub const PRECEDENCE: [FieldGroup; 3] =
        [FieldGroup::Tracked, FieldGroup::Update, FieldGroup::Soft];

    /// Category emitted when this group is the first to differ.
    pub fn change_type(&self) -> ChangeType {
        match self {
            FieldGroup::Tracked => ChangeType::Full,
            FieldGroup::Update => ChangeType::Update,
            FieldGroup::Soft => ChangeType::Soft,
        }
    }
}

/// Identifier field plus the prioritised field groups for one entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDetectorConfig", into = "RawDetectorConfig")]
pub struct ChangeDetectorConfig {
    id_field: FieldPath,
    tracked_fields: Vec<FieldPath>,
    update_fields: Vec<FieldPath>,
    soft_update_fields: Vec<FieldPath>,
}

impl ChangeDetectorConfig {
    /// Build and validate a config.
    ///
    /// Duplicate paths inside one group are dropped, keeping the first.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` - `id_field` is empty
    /// - `MalformedPath` - `id_field` or any field path has an empty segment
    pub fn new<S: AsRef<str>>(
        id_field: &str,
        tracked_fields: &[S],
        update_fields: &[S],
        soft_update_fields: &[S],
    ) -> Result<Self> {
        if id_field.trim().is_empty() {
            return Err(RelwatchError::EmptyIdField.into());
        }
        Ok(Self {
            id_field: FieldPath::parse(id_field)?,
            tracked_fields: parse_group(tracked_fields)?,
            update_fields: parse_group(update_fields)?,
            soft_update_fields: parse_group(soft_update_fields)?,
        })
    }

    pub fn id_field(&self) -> &FieldPath {
        &self.id_field
    }

    pub fn tracked_fields(&self) -> &[FieldPath] {
        &self.tracked_fields
    }

    pub fn update_fields(&self) -> &[FieldPath] {
        &self.update_fields
    }

    pub fn soft_update_fields(&self) -> &[FieldPath] {
        &self.soft_update_fields
    }

    /// Paths belonging to `group`.
    pub fn group(&self, group: FieldGroup) -> &[FieldPath] {
        match group {
            FieldGroup::Tracked => &self.tracked_fields,
            FieldGroup::Update => &self.update_fields,
            FieldGroup::Soft => &self.soft_update_fields,
        }
    }
}

fn parse_group<S: AsRef<str>>(raw: &[S]) -> Result<Vec<FieldPath>> {
    let mut paths: Vec<FieldPath> = Vec::with_capacity(raw.len());
    for entry in raw {
        let path = FieldPath::parse(entry.as_ref())?;
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    Ok(paths)
}

/// Serialized shape of a detector config (YAML / JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDetectorConfig {
    pub id_field: String,
    #[serde(default)]
    pub tracked_fields: Vec<String>,
    #[serde(default)]
    pub update_fields: Vec<String>,
    #[serde(default)]
    pub soft_update_fields: Vec<String>,
}

impl TryFrom<RawDetectorConfig> for ChangeDetectorConfig {
    type Error = ExError;

    fn try_from(raw: RawDetectorConfig) -> Result<Self> {
        ChangeDetectorConfig::new(
            &raw.id_field,
            &raw.tracked_fields,
            &raw.update_fields,
            &raw.soft_update_fields,
        )
    }
}

impl From<ChangeDetectorConfig> for RawDetectorConfig {
    fn from(config: ChangeDetectorConfig) -> Self {
        let strings = |paths: &[FieldPath]| -> Vec<String> {
            paths.iter().map(|p| p.to_string()).collect()
        };
        Self {
            id_field: config.id_field.to_string(),
            tracked_fields: strings(&config.tracked_fields),
            update_fields: strings(&config.update_fields),
            soft_update_fields: strings(&config.soft_update_fields),
        }
    }
}
