//! Identifier-keyed snapshots.
//!
//! The detector only ever sees pre-keyed collections. Keying resolves the
//! configured `id_field` on each entity's JSON view, optionally folds case,
//! and sets aside entities without a usable identifier.

use crate::errors::RelwatchError;
use crate::path::FieldPath;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// How raw identifier values are normalised before keying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdNormalization {
    #[default]
    Exact,
    /// Lower-case identifiers (GitHub `owner/repo` is case-insensitive)
    CaseInsensitive,
}

impl IdNormalization {
    pub fn apply(&self, raw: &str) -> String {
        match self {
            IdNormalization::Exact => raw.to_string(),
            IdNormalization::CaseInsensitive => raw.to_lowercase(),
        }
    }
}

/// Read the identifier at `id_field` from an entity view.
///
/// Strings are used as-is, numbers and booleans by their JSON text.
/// Null, absent, empty-string, object and array values are not identifiers.
pub fn identifier_of(view: &Value, id_field: &FieldPath) -> Option<String> {
    match id_field.resolve(view).value()? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// JSON view of an entity used for path resolution.
///
/// A value that cannot be represented as JSON is viewed as `null`, so every
/// path on it resolves to absent.
pub fn entity_view<T: Serialize>(entity: &T) -> Value {
    serde_json::to_value(entity).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "entity has no JSON view; treating every field as absent");
        Value::Null
    })
}

/// An entity that could not be keyed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnkeyedEntity {
    /// Position in the input sequence
    pub position: usize,
    /// The identifier field that had no usable value
    pub id_field: String,
}

impl UnkeyedEntity {
    /// The `IdentifierMissing` condition for this entity.
    pub fn to_error(&self, entity_type: &str) -> RelwatchError {
        RelwatchError::IdentifierMissing {
            entity_type: entity_type.to_string(),
            id_field: self.id_field.clone(),
            position: self.position,
        }
    }
}

/// Result of keying a sequence of entities.
#[derive(Debug, Clone)]
pub struct KeyingOutcome<T> {
    pub snapshot: KeyedSnapshot<T>,
    pub unkeyed: Vec<UnkeyedEntity>,
    /// Identifiers seen more than once (first occurrence kept)
    pub duplicates: Vec<String>,
}

/// Insertion-ordered map from identifier to entity.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedSnapshot<T> {
    entries: IndexMap<String, T>,
}

impl<T> Default for KeyedSnapshot<T> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<T> KeyedSnapshot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under `id`. Returns `false` and keeps the existing entry if
    /// `id` is already present.
    pub fn insert(&mut self, id: impl Into<String>, entity: T) -> bool {
        match self.entries.entry(id.into()) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(entity);
                true
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Remove `id`, preserving the order of the remaining entries.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        self.entries.shift_remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<T: Serialize> KeyedSnapshot<T> {
    /// Key `entities` by the value at `id_field`.
    ///
    /// Never fails: entities without an identifier are reported in
    /// [`KeyingOutcome::unkeyed`], repeated identifiers in
    /// [`KeyingOutcome::duplicates`].
    pub fn key_by(
        entities: impl IntoIterator<Item = T>,
        id_field: &FieldPath,
        normalization: IdNormalization,
    ) -> KeyingOutcome<T> {
        let mut snapshot = KeyedSnapshot::new();
        let mut unkeyed = Vec::new();
        let mut duplicates = Vec::new();

        for (position, entity) in entities.into_iter().enumerate() {
            let view = entity_view(&entity);
            match identifier_of(&view, id_field) {
                Some(raw) => {
                    let id = normalization.apply(&raw);
                    if !snapshot.insert(id.clone(), entity) {
                        tracing::warn!(
                            entity_id = %id,
                            position,
                            "duplicate identifier; keeping first occurrence"
                        );
                        duplicates.push(id);
                    }
                }
                None => unkeyed.push(UnkeyedEntity {
                    position,
                    id_field: id_field.to_string(),
                }),
            }
        }

        KeyingOutcome {
            snapshot,
            unkeyed,
            duplicates,
        }
    }
}

impl<T> FromIterator<(String, T)> for KeyedSnapshot<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        let mut snapshot = KeyedSnapshot::new();
        for (id, entity) in iter {
            snapshot.insert(id, entity);
        }
        snapshot
    }
}
