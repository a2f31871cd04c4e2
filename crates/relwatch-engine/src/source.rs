//! Fetch boundary.
//!
//! A source returns `Err` only when the whole entity type is unavailable.
//! Identifiers it could not resolve individually are reported in
//! [`FetchOutcome::unresolved`] and never abort the fetch.

use crate::reconcile::ReconcileOptions;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use relwatch_core::errors::{ExError, ExErrorKind, RelwatchError, Result};
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

/// An identifier the source could not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedId {
    pub id: String,
    /// `IndividualFetchFailure`, `Timeout` or `IdentifierMissing`
    pub kind: ExErrorKind,
    pub reason: String,
}

impl UnresolvedId {
    /// A lookup of `id` that failed.
    pub fn new(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ExErrorKind::IndividualFetchFailure,
            reason: reason.into(),
        }
    }

    /// A lookup of `id` that did not finish within `after`.
    pub fn timed_out(id: impl Into<String>, after: Duration) -> Self {
        Self {
            id: id.into(),
            kind: ExErrorKind::Timeout,
            reason: format!("timed out after {}ms", after.as_millis()),
        }
    }

    /// An entry returned without a usable identifier, reported under a
    /// placeholder id.
    pub fn without_identifier(placeholder: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: placeholder.into(),
            kind: ExErrorKind::IdentifierMissing,
            reason: reason.into(),
        }
    }

    pub fn to_error(&self, entity_type: &str) -> ExError {
        match self.kind {
            ExErrorKind::IndividualFetchFailure => RelwatchError::IndividualFetchFailure {
                entity_type: entity_type.to_string(),
                id: self.id.clone(),
                reason: self.reason.clone(),
            }
            .into(),
            kind => ExError::new(kind)
                .with_op("fetch")
                .with_entity_type(entity_type)
                .with_entity_id(self.id.clone())
                .with_message(self.reason.clone()),
        }
    }
}

/// Entities returned by one fetch plus the identifiers that failed.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome<T> {
    pub entities: Vec<T>,
    pub unresolved: Vec<UnresolvedId>,
}

impl<T> Default for FetchOutcome<T> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            unresolved: Vec::new(),
        }
    }
}

impl<T> FetchOutcome<T> {
    pub fn new(entities: Vec<T>) -> Self {
        Self {
            entities,
            unresolved: Vec::new(),
        }
    }

    pub fn with_unresolved(mut self, unresolved: Vec<UnresolvedId>) -> Self {
        self.unresolved = unresolved;
        self
    }
}

/// Supplier of the freshly fetched collection for one entity type.
#[async_trait]
pub trait EntitySource: Send + Sync {
    type Entity: Serialize + Clone + Send + Sync + 'static;

    /// Entity type tag, e.g. `obsidian-plugin`
    fn entity_type(&self) -> &str;

    /// Fetch the current state. `tracked` holds the identifiers known from
    /// the previous snapshot; list-style sources may ignore it.
    ///
    /// # Errors
    ///
    /// - `SourceUnreachable` - nothing could be fetched for this type
    async fn fetch(&self, tracked: &[String]) -> Result<FetchOutcome<Self::Entity>>;
}

/// Run `fetch_one` for every identifier, at most
/// `options.max_concurrent_fetches` at a time, each bounded by
/// `options.fetch_timeout`.
///
/// Entities come back in `ids` order. Errors and timeouts become
/// [`UnresolvedId`]s.
pub async fn fetch_each<T, F, Fut>(
    ids: &[String],
    options: &ReconcileOptions,
    fetch_one: F,
) -> FetchOutcome<T>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let timeout = options.fetch_timeout;
    let results: Vec<_> = stream::iter(ids.iter().cloned())
        .map(|id| {
            let lookup = fetch_one(id.clone());
            async move { (id, tokio::time::timeout(timeout, lookup).await) }
        })
        .buffered(options.max_concurrent_fetches.max(1))
        .collect()
        .await;

    let mut outcome = FetchOutcome::default();
    for (id, result) in results {
        match result {
            Ok(Ok(entity)) => outcome.entities.push(entity),
            Ok(Err(e)) => outcome.unresolved.push(UnresolvedId::new(id, e.to_string())),
            Err(_) => outcome.unresolved.push(UnresolvedId::timed_out(id, timeout)),
        }
    }
    outcome
}
