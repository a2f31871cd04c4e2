//! Change detection over two keyed snapshots.
//!
//! ## Output order
//! 1. `full` (matched pairs with a tracked change, then additions), in new
//!    snapshot order
//! 2. `update`, in new snapshot order
//! 3. `soft`, in new snapshot order
//! 4. `removal`, in old snapshot order
//!
//! Detection is pure and never fails. Entities whose JSON view cannot be
//! built are compared as if every path were absent.

use crate::detector::classify::first_difference;
use crate::detector::config::{ChangeDetectorConfig, FieldGroup};
use crate::detector::keyed::{entity_view, KeyedSnapshot};
use crate::detector::model::{Change, ChangeTally, ChangeType};
use crate::{log_op_end, log_op_start};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Detect changes between `old` and `new`, stamped with the current time.
pub fn detect<T: Serialize + Clone>(
    config: &ChangeDetectorConfig,
    entity_type: &str,
    old: &KeyedSnapshot<T>,
    new: &KeyedSnapshot<T>,
) -> Vec<Change<T>> {
    detect_at(config, entity_type, old, new, Utc::now())
}

/// Detect changes between `old` and `new`, stamping every change with
/// `timestamp`.
pub fn detect_at<T: Serialize + Clone>(
    config: &ChangeDetectorConfig,
    entity_type: &str,
    old: &KeyedSnapshot<T>,
    new: &KeyedSnapshot<T>,
    timestamp: DateTime<Utc>,
) -> Vec<Change<T>> {
    log_op_start!(
        "detect",
        entity_type = entity_type,
        old_len = old.len(),
        new_len = new.len()
    );
    let start = std::time::Instant::now();

    let mut full = Vec::new();
    let mut update = Vec::new();
    let mut soft = Vec::new();

    for (id, new_entity) in new.iter() {
        let (bucket, change_type) = match old.get(id) {
            None => (&mut full, ChangeType::Full),
            Some(old_entity) => {
                let old_view = entity_view(old_entity);
                let new_view = entity_view(new_entity);
                let Some(diff) = first_difference(config, &old_view, &new_view) else {
                    continue;
                };
                tracing::debug!(
                    entity_type = entity_type,
                    entity_id = id,
                    field_path = diff.path.as_str(),
                    change_type = diff.change_type().as_str(),
                    "field changed"
                );
                let bucket = match diff.group {
                    FieldGroup::Tracked => &mut full,
                    FieldGroup::Update => &mut update,
                    FieldGroup::Soft => &mut soft,
                };
                (bucket, diff.change_type())
            }
        };
        bucket.push(record(id, timestamp, change_type, entity_type, new_entity));
    }

    let removals = old
        .iter()
        .filter(|(id, _)| !new.contains_id(id))
        .map(|(id, old_entity)| {
            record(id, timestamp, ChangeType::Removal, entity_type, old_entity)
        });

    let mut changes = full;
    changes.append(&mut update);
    changes.append(&mut soft);
    changes.extend(removals);

    let tally = ChangeTally::from_changes(&changes);
    log_op_end!(
        "detect",
        duration_ms = start.elapsed().as_millis() as u64,
        entity_type = entity_type,
        change_count = changes.len(),
        full = tally.full,
        update = tally.update,
        soft = tally.soft,
        removal = tally.removal
    );

    changes
}

fn record<T: Clone>(
    id: &str,
    timestamp: DateTime<Utc>,
    change_type: ChangeType,
    entity_type: &str,
    data: &T,
) -> Change<T> {
    Change {
        id: id.to_string(),
        timestamp,
        change_type,
        entity_type: entity_type.to_string(),
        data: data.clone(),
    }
}
