//! Entity type → detector config registry
//!
//! Built once at startup from the built-in domains and/or a YAML file:
//!
//! ```yaml
//! detectors:
//!   issue:
//!     id_field: id
//!     tracked_fields: [name]
//!     update_fields: [status]
//!     soft_update_fields: [metadata.views]
//! ```

use crate::detector::config::{ChangeDetectorConfig, RawDetectorConfig};
use crate::domains::{github, obsidian};
use crate::errors::{ExError, ExErrorKind, RelwatchError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawRegistryFile {
    #[serde(default)]
    detectors: BTreeMap<String, RawDetectorConfig>,
}

fn registry_load(reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidConfig)
        .with_op("registry_load")
        .with_message(reason.to_string())
}

/// Immutable map from entity type tag to its detector config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectorRegistry {
    configs: BTreeMap<String, ChangeDetectorConfig>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the Obsidian plugin/theme and GitHub repository
    /// configs.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new()
            .with(obsidian::PLUGIN_ENTITY_TYPE, obsidian::plugin_detector_config()?)
            .with(obsidian::THEME_ENTITY_TYPE, obsidian::theme_detector_config()?)
            .with(github::REPOSITORY_ENTITY_TYPE, github::repository_detector_config()?))
    }

    /// Add or replace the config for `entity_type`.
    pub fn with(mut self, entity_type: impl Into<String>, config: ChangeDetectorConfig) -> Self {
        self.configs.insert(entity_type.into(), config);
        self
    }

    /// Parse a YAML registry document.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` - the document is not valid YAML of the expected shape,
    ///   or an entry has an empty `id_field`
    /// - `MalformedPath` - an entry has a malformed field path
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let raw: RawRegistryFile = serde_yaml::from_str(content)
            .map_err(|e| registry_load(&format!("YAML parse error: {}", e)))?;

        let mut registry = Self::new();
        for (entity_type, raw_config) in raw.detectors {
            let config = ChangeDetectorConfig::try_from(raw_config)
                .map_err(|e| e.with_entity_type(entity_type.as_str()))?;
            registry.configs.insert(entity_type, config);
        }
        Ok(registry)
    }

    /// Read and parse a YAML registry file.
    ///
    /// # Errors
    ///
    /// - `Io` - the file cannot be read
    /// - see [`DetectorRegistry::from_yaml_str`]
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("registry_load")
                .with_path(path.display().to_string())
                .with_message(format!("Failed to read detector config: {}", e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Overlay `other` on top of `self`; entries in `other` win.
    pub fn merge(mut self, other: DetectorRegistry) -> Self {
        self.configs.extend(other.configs);
        self
    }

    /// # Errors
    ///
    /// - `UnknownEntityType` - nothing is registered for `entity_type`
    pub fn get(&self, entity_type: &str) -> Result<&ChangeDetectorConfig> {
        self.configs.get(entity_type).ok_or_else(|| {
            RelwatchError::UnknownEntityType {
                entity_type: entity_type.to_string(),
            }
            .into()
        })
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUES: &str = r#"
detectors:
  issue:
    id_field: id
    tracked_fields: [name]
    update_fields: [status]
    soft_update_fields: [metadata.views]
"#;

    #[test]
    fn test_builtin_registers_all_domains() {
        let registry = DetectorRegistry::builtin().unwrap();
        let types: Vec<&str> = registry.entity_types().collect();
        assert_eq!(
            types,
            vec!["github-repository", "obsidian-plugin", "obsidian-theme"]
        );
    }

    #[test]
    fn test_from_yaml_str_parses_groups() {
        let registry = DetectorRegistry::from_yaml_str(ISSUES).unwrap();
        let config = registry.get("issue").unwrap();
        assert_eq!(config.id_field().as_str(), "id");
        assert_eq!(config.soft_update_fields()[0].as_str(), "metadata.views");
    }

    #[test]
    fn test_malformed_path_carries_entity_type() {
        let err = DetectorRegistry::from_yaml_str(
            "detectors:\n  issue:\n    id_field: id\n    tracked_fields: [\"a..b\"]\n",
        )
        .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::MalformedPath);
        assert_eq!(err.entity_type(), Some("issue"));
    }

    #[test]
    fn test_invalid_yaml_is_invalid_config() {
        let err = DetectorRegistry::from_yaml_str("detectors: [1, 2").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidConfig);
    }

    #[test]
    fn test_unknown_entity_type() {
        let err = DetectorRegistry::new().get("nope").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::UnknownEntityType);
        assert_eq!(err.entity_type(), Some("nope"));
    }

    #[test]
    fn test_merge_overrides_builtin() {
        let overlay = DetectorRegistry::from_yaml_str(
            "detectors:\n  obsidian-theme:\n    id_field: name\n",
        )
        .unwrap();
        let registry = DetectorRegistry::builtin().unwrap().merge(overlay);
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.get("obsidian-theme").unwrap().id_field().as_str(),
            "name"
        );
    }
}
