//! Change classification for one matched old/new pair.

use crate::compare::resolved_equal;
use crate::detector::config::{ChangeDetectorConfig, FieldGroup};
use crate::detector::keyed::entity_view;
use crate::detector::model::ChangeType;
use crate::path::FieldPath;
use serde::Serialize;
use serde_json::Value;

/// The first differing path found while classifying.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difference<'c> {
    pub group: FieldGroup,
    pub path: &'c FieldPath,
}

impl Difference<'_> {
    pub fn change_type(&self) -> ChangeType {
        self.group.change_type()
    }
}

/// Find the first differing path, walking groups in precedence order.
///
/// Short-circuits: once a tracked path differs, update and soft paths are
/// never compared. Empty groups are skipped; a path absent on both sides is
/// unchanged.
pub fn first_difference<'c>(
    config: &'c ChangeDetectorConfig,
    old: &Value,
    new: &Value,
) -> Option<Difference<'c>> {
    FieldGroup::PRECEDENCE.iter().find_map(|group| {
        config
            .group(*group)
            .iter()
            .find(|path| !resolved_equal(path.resolve(old), path.resolve(new)))
            .map(|path| Difference {
                group: *group,
                path,
            })
    })
}

/// Most severe change category between two views, or `None` if unchanged.
pub fn classify(config: &ChangeDetectorConfig, old: &Value, new: &Value) -> Option<ChangeType> {
    first_difference(config, old, new).map(|d| d.change_type())
}

/// [`classify`] over typed entities.
pub fn classify_entities<T: Serialize>(
    config: &ChangeDetectorConfig,
    old: &T,
    new: &T,
) -> Option<ChangeType> {
    classify(config, &entity_view(old), &entity_view(new))
}
