//! Change records emitted by the detector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity category of a detected change.
///
/// Declaration order is the emission order of [`crate::detector::detect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// A tracked (structural) field changed, or the entity is new
    Full,
    /// A state-significant field changed
    Update,
    /// Only cosmetic / metric fields changed
    Soft,
    /// The entity disappeared from the collection
    Removal,
}

impl ChangeType {
    pub const ORDER: [ChangeType; 4] = [
        ChangeType::Full,
        ChangeType::Update,
        ChangeType::Soft,
        ChangeType::Removal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Full => "full",
            ChangeType::Update => "update",
            ChangeType::Soft => "soft",
            ChangeType::Removal => "removal",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected difference for one entity.
///
/// `data` is the new payload, except for [`ChangeType::Removal`] where it is
/// the last known old payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change<T> {
    /// Snapshot key: the `id_field` value after id normalisation. For
    /// case-insensitive types this is lower-cased and may differ from the
    /// raw value inside `data` (repo `Kepano/Minimal` has id
    /// `kepano/minimal`), so match persisted state on this key.
    pub id: String,
    /// Detection time, not the time the source mutated
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub entity_type: String,
    pub data: T,
}

impl<T> Change<T> {
    pub fn is_removal(&self) -> bool {
        self.change_type == ChangeType::Removal
    }
}

/// Per-category counts over a change list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeTally {
    pub full: usize,
    pub update: usize,
    pub soft: usize,
    pub removal: usize,
}

impl ChangeTally {
    pub fn from_changes<T>(changes: &[Change<T>]) -> Self {
        let mut tally = Self::default();
        for change in changes {
            match change.change_type {
                ChangeType::Full => tally.full += 1,
                ChangeType::Update => tally.update += 1,
                ChangeType::Soft => tally.soft += 1,
                ChangeType::Removal => tally.removal += 1,
            }
        }
        tally
    }

    pub fn get(&self, change_type: ChangeType) -> usize {
        match change_type {
            ChangeType::Full => self.full,
            ChangeType::Update => self.update,
            ChangeType::Soft => self.soft,
            ChangeType::Removal => self.removal,
        }
    }

    /// Changes excluding removals
    pub fn non_removal(&self) -> usize {
        self.full + self.update + self.soft
    }

    pub fn total(&self) -> usize {
        self.non_removal() + self.removal
    }
}
