//! GitHub repositories.

use crate::detector::{ChangeDetectorConfig, IdNormalization};
use crate::errors::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const REPOSITORY_ENTITY_TYPE: &str = "github-repository";

/// `owner/name` is case-insensitive on GitHub.
pub const REPOSITORY_ID_NORMALIZATION: IdNormalization = IdNormalization::CaseInsensitive;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryLicense {
    pub spdx_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryStats {
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub watchers: u64,
}

/// A tracked repository, already transformed from the API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubRepository {
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub default_branch: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub license: Option<RepositoryLicense>,
    #[serde(default)]
    pub stats: RepositoryStats,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
}

pub fn repository_detector_config() -> Result<ChangeDetectorConfig> {
    ChangeDetectorConfig::new(
        "full_name",
        &["full_name", "default_branch", "archived"],
        &["description", "topics", "license.spdx_id", "pushed_at"],
        &[
            "stats.stars",
            "stats.forks",
            "stats.open_issues",
            "stats.watchers",
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::{classify_entities, ChangeType};

    fn repository() -> GithubRepository {
        GithubRepository {
            full_name: "tokio-rs/tokio".to_string(),
            description: Some("A runtime".to_string()),
            default_branch: "master".to_string(),
            archived: false,
            topics: vec!["async".to_string(), "rust".to_string()],
            license: Some(RepositoryLicense {
                spdx_id: "MIT".to_string(),
            }),
            stats: RepositoryStats {
                stars: 100,
                forks: 10,
                open_issues: 5,
                watchers: 100,
            },
            pushed_at: None,
        }
    }

    #[test]
    fn test_star_count_is_soft() {
        let config = repository_detector_config().unwrap();
        let mut starred = repository();
        starred.stats.stars += 1;
        assert_eq!(
            classify_entities(&config, &repository(), &starred),
            Some(ChangeType::Soft)
        );
    }

    #[test]
    fn test_license_removal_is_update() {
        let config = repository_detector_config().unwrap();
        let mut unlicensed = repository();
        unlicensed.license = None;
        assert_eq!(
            classify_entities(&config, &repository(), &unlicensed),
            Some(ChangeType::Update)
        );
    }

    #[test]
    fn test_archiving_beats_star_changes() {
        let config = repository_detector_config().unwrap();
        let mut archived = repository();
        archived.archived = true;
        archived.stats.stars = 0;
        assert_eq!(
            classify_entities(&config, &repository(), &archived),
            Some(ChangeType::Full)
        );
    }
}
