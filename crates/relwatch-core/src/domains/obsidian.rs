//! Obsidian community plugins and themes.
//!
//! Shapes follow the community release lists: plugins are keyed by their
//! manifest `id`, themes by their GitHub `repo` (case-insensitive).

use crate::detector::{ChangeDetectorConfig, IdNormalization};
use crate::errors::Result;
use serde::{Deserialize, Serialize};

pub const PLUGIN_ENTITY_TYPE: &str = "obsidian-plugin";
pub const THEME_ENTITY_TYPE: &str = "obsidian-theme";

pub const PLUGIN_ID_NORMALIZATION: IdNormalization = IdNormalization::Exact;
pub const THEME_ID_NORMALIZATION: IdNormalization = IdNormalization::CaseInsensitive;

/// A community plugin as listed in the release feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObsidianPlugin {
    pub id: String,
    pub name: String,
    pub author: String,
    pub description: String,
    pub repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downloads: Option<u64>,
    /// Last update, epoch millis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A community theme as listed in the release feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObsidianTheme {
    pub name: String,
    pub author: String,
    pub repo: String,
    pub screenshot: String,
    #[serde(default)]
    pub modes: Vec<String>,
}

pub fn plugin_detector_config() -> Result<ChangeDetectorConfig> {
    ChangeDetectorConfig::new(
        "id",
        &["name", "author", "repo"],
        &["description", "version", "tags"],
        &["downloads", "updated"],
    )
}

/// Themes carry no metrics, so the soft group is empty.
pub fn theme_detector_config() -> Result<ChangeDetectorConfig> {
    ChangeDetectorConfig::new::<&str>(
        "repo",
        &["name", "author"],
        &["screenshot", "modes"],
        &[],
    )
}
