#![allow(dead_code)]

use async_trait::async_trait;
use relwatch_core::domains::obsidian::{ObsidianPlugin, ObsidianTheme};
use relwatch_core::errors::{RelwatchError, Result};
use relwatch_engine::{EntitySource, FetchOutcome, UnresolvedId};
use serde::Serialize;
use std::time::Duration;

/// In-memory source returning a fixed outcome
pub struct StaticSource<T> {
    pub entity_type: &'static str,
    pub entities: Vec<T>,
    pub unresolved: Vec<UnresolvedId>,
}

#[async_trait]
impl<T> EntitySource for StaticSource<T>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    type Entity = T;

    fn entity_type(&self) -> &str {
        self.entity_type
    }

    async fn fetch(&self, _tracked: &[String]) -> Result<FetchOutcome<T>> {
        Ok(FetchOutcome::new(self.entities.clone()).with_unresolved(self.unresolved.clone()))
    }
}

/// Source whose upstream is gone
pub struct UnreachableSource<T> {
    pub entity_type: &'static str,
    pub _entity: std::marker::PhantomData<fn() -> T>,
}

pub fn unreachable<T>(entity_type: &'static str) -> UnreachableSource<T> {
    UnreachableSource {
        entity_type,
        _entity: std::marker::PhantomData,
    }
}

#[async_trait]
impl<T> EntitySource for UnreachableSource<T>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    type Entity = T;

    fn entity_type(&self) -> &str {
        self.entity_type
    }

    async fn fetch(&self, _tracked: &[String]) -> Result<FetchOutcome<T>> {
        Err(RelwatchError::SourceUnreachable {
            entity_type: self.entity_type.to_string(),
            reason: "themes.json unavailable".to_string(),
        }
        .into())
    }
}

/// Source that never answers within a test timeout
pub struct StalledSource<T> {
    pub entity_type: &'static str,
    pub entities: Vec<T>,
}

#[async_trait]
impl<T> EntitySource for StalledSource<T>
where
    T: Serialize + Clone + Send + Sync + 'static,
{
    type Entity = T;

    fn entity_type(&self) -> &str {
        self.entity_type
    }

    async fn fetch(&self, _tracked: &[String]) -> Result<FetchOutcome<T>> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        Ok(FetchOutcome::new(self.entities.clone()))
    }
}

pub fn plugin(id: &str, downloads: u64) -> ObsidianPlugin {
    ObsidianPlugin {
        id: id.to_string(),
        name: format!("Plugin {}", id),
        author: "author".to_string(),
        description: "does things".to_string(),
        repo: format!("author/{}", id),
        version: Some("1.0.0".to_string()),
        downloads: Some(downloads),
        updated: None,
        tags: vec![],
    }
}

pub fn theme(repo: &str, name: &str) -> ObsidianTheme {
    ObsidianTheme {
        name: name.to_string(),
        author: "author".to_string(),
        repo: repo.to_string(),
        screenshot: "screenshot.png".to_string(),
        modes: vec!["dark".to_string(), "light".to_string()],
    }
}
