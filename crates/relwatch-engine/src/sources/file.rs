//! File-backed entity source.
//!
//! Reads a JSON array of entities, e.g. a community release list dumped by
//! an upstream job. Entries that are not objects of the expected shape, or
//! that lack an identifier, are reported unresolved.

use crate::source::{EntitySource, FetchOutcome, UnresolvedId};
use async_trait::async_trait;
use relwatch_core::detector::identifier_of;
use relwatch_core::errors::{RelwatchError, Result};
use relwatch_core::FieldPath;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

pub struct JsonFileSource<T> {
    entity_type: String,
    path: PathBuf,
    id_field: FieldPath,
    _entity: PhantomData<fn() -> T>,
}

impl<T> JsonFileSource<T> {
    pub fn new(
        entity_type: impl Into<String>,
        path: impl Into<PathBuf>,
        id_field: FieldPath,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            path: path.into(),
            id_field,
            _entity: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unreachable(&self, reason: String) -> relwatch_core::ExError {
        RelwatchError::SourceUnreachable {
            entity_type: self.entity_type.clone(),
            reason,
        }
        .into()
    }
}

#[async_trait]
impl<T> EntitySource for JsonFileSource<T>
where
    T: DeserializeOwned + Serialize + Clone + Send + Sync + 'static,
{
    type Entity = T;

    fn entity_type(&self) -> &str {
        &self.entity_type
    }

    async fn fetch(&self, _tracked: &[String]) -> Result<FetchOutcome<T>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.unreachable(format!("{}: {}", self.path.display(), e)))?;
        let items: Vec<Value> = serde_json::from_str(&content).map_err(|e| {
            let reason = format!("{}: not a JSON array: {}", self.path.display(), e);
            self.unreachable(reason).with_source(e.into())
        })?;

        let mut outcome = FetchOutcome::default();
        for (position, item) in items.into_iter().enumerate() {
            let Some(id) = identifier_of(&item, &self.id_field) else {
                outcome.unresolved.push(UnresolvedId::without_identifier(
                    format!("{}#{}", self.entity_type, position),
                    format!("entry has no identifier at '{}'", self.id_field),
                ));
                continue;
            };
            match serde_json::from_value::<T>(item) {
                Ok(entity) => outcome.entities.push(entity),
                Err(e) => outcome
                    .unresolved
                    .push(UnresolvedId::new(id, format!("invalid entry: {}", e))),
            }
        }

        tracing::debug!(
            entity_type = %self.entity_type,
            path = %self.path.display(),
            fetched = outcome.entities.len(),
            unresolved = outcome.unresolved.len(),
            "read entity file"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relwatch_core::errors::ExErrorKind;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        size: u32,
    }

    fn source(path: &Path) -> JsonFileSource<Item> {
        JsonFileSource::new("item", path, FieldPath::parse("id").unwrap())
    }

    #[tokio::test]
    async fn test_reads_entities_and_flags_bad_entries() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "a", "size": 1}}, {{"size": 2}}, {{"id": "c", "size": "big"}}]"#
        )
        .unwrap();

        let outcome = source(file.path()).fetch(&[]).await.unwrap();

        assert_eq!(
            outcome.entities,
            vec![Item {
                id: "a".to_string(),
                size: 1
            }]
        );
        let unresolved: Vec<(&str, ExErrorKind)> = outcome
            .unresolved
            .iter()
            .map(|u| (u.id.as_str(), u.kind))
            .collect();
        assert_eq!(
            unresolved,
            vec![
                ("item#1", ExErrorKind::IdentifierMissing),
                ("c", ExErrorKind::IndividualFetchFailure),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_source_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let err = source(&dir.path().join("nope.json"))
            .fetch(&[])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::SourceUnreachable);
        assert_eq!(err.entity_type(), Some("item"));
    }

    #[tokio::test]
    async fn test_non_array_is_source_unreachable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"id": "a"}}"#).unwrap();
        let err = source(file.path()).fetch(&[]).await.unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::SourceUnreachable);
        assert_eq!(err.source_error().map(|e| e.code()), Some("ERR_SERIALIZATION"));
    }
}
