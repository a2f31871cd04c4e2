//! Dotted field path resolution.
//!
//! A [`FieldPath`] such as `stats.stars` is validated once, when a detector
//! config is built, and then resolved against the JSON view of each entity.
//! Resolution never fails: a missing key, an out-of-range index or a
//! primitive/null encountered before the last segment all yield
//! [`Resolved::Absent`], which is distinct from a present `null`.

use crate::errors::{RelwatchError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A validated, pre-split dotted field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse and validate a dotted path.
    ///
    /// # Errors
    ///
    /// - `MalformedPath` - the path is empty or has an empty/blank segment
    ///   (`""`, `"a..b"`, `".a"`, `"a."`, `"a. .b"`)
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(RelwatchError::MalformedPath {
                path: raw.to_string(),
                reason: "path is empty".to_string(),
            }
            .into());
        }

        let mut segments = Vec::new();
        for (index, segment) in raw.split('.').enumerate() {
            if segment.trim().is_empty() {
                return Err(RelwatchError::MalformedPath {
                    path: raw.to_string(),
                    reason: format!("segment {} is empty", index),
                }
                .into());
            }
            segments.push(segment.to_string());
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolve this path against a JSON value.
    ///
    /// Objects are traversed by key, arrays by a numeric segment.
    pub fn resolve<'a>(&self, root: &'a Value) -> Resolved<'a> {
        let mut current = root;
        for segment in &self.segments {
            let next = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index)),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return Resolved::Absent,
            }
        }
        Resolved::Present(current)
    }
}

/// Parse `path` and resolve it in one step.
///
/// # Errors
///
/// - `MalformedPath` - see [`FieldPath::parse`]
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Result<Resolved<'a>> {
    Ok(FieldPath::parse(path)?.resolve(root))
}

impl FromStr for FieldPath {
    type Err = crate::errors::ExError;

    fn from_str(s: &str) -> Result<Self> {
        FieldPath::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        FieldPath::parse(&raw).map_err(|e| serde::de::Error::custom(e.message().to_string()))
    }
}

/// Outcome of resolving a [`FieldPath`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved<'a> {
    /// Some segment was missing or not traversable
    Absent,
    /// The value at the path (may itself be `null`)
    Present(&'a Value),
}

impl<'a> Resolved<'a> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Resolved::Absent)
    }

    pub fn value(&self) -> Option<&'a Value> {
        match self {
            Resolved::Absent => None,
            Resolved::Present(value) => Some(value),
        }
    }

    /// Absent and present-`null` are interchangeable for comparison.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Resolved::Absent | Resolved::Present(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use serde_json::json;

    #[test]
    fn test_resolves_nested_object_path() {
        let entity = json!({"metadata": {"tags": ["a", "b"], "views": 10}});
        let path = FieldPath::parse("metadata.views").unwrap();
        assert_eq!(path.resolve(&entity), Resolved::Present(&json!(10)));
    }

    #[test]
    fn test_missing_segment_is_absent() {
        let entity = json!({"metadata": {}});
        let path = FieldPath::parse("metadata.views").unwrap();
        assert!(path.resolve(&entity).is_absent());
    }

    #[test]
    fn test_traversal_through_primitive_is_absent() {
        let entity = json!({"name": "x", "license": null});
        assert!(FieldPath::parse("name.length")
            .unwrap()
            .resolve(&entity)
            .is_absent());
        assert!(FieldPath::parse("license.spdx_id")
            .unwrap()
            .resolve(&entity)
            .is_absent());
    }

    #[test]
    fn test_present_null_is_not_absent() {
        let entity = json!({"license": null});
        let resolved = FieldPath::parse("license").unwrap().resolve(&entity);
        assert_eq!(resolved, Resolved::Present(&Value::Null));
        assert!(resolved.is_nullish());
    }

    #[test]
    fn test_numeric_segment_indexes_arrays() {
        let entity = json!({"releases": [{"tag": "v1"}, {"tag": "v2"}]});
        let path = FieldPath::parse("releases.1.tag").unwrap();
        assert_eq!(path.resolve(&entity).value(), Some(&json!("v2")));
        let out_of_range = FieldPath::parse("releases.5.tag").unwrap();
        assert!(out_of_range.resolve(&entity).is_absent());
    }

    #[test]
    fn test_empty_segments_are_malformed() {
        for raw in ["", "a..b", ".a", "a.", "a. .b"] {
            let err = FieldPath::parse(raw).unwrap_err();
            assert_eq!(err.kind(), ExErrorKind::MalformedPath, "path {:?}", raw);
        }
    }

    #[test]
    fn test_deserialize_rejects_malformed_path() {
        let ok: FieldPath = serde_json::from_str("\"stats.stars\"").unwrap();
        assert_eq!(ok.segments(), &["stats".to_string(), "stars".to_string()]);
        assert!(serde_json::from_str::<FieldPath>("\"stats..stars\"").is_err());
    }
}
