//! Human-readable summary renderer for detected changes.

use crate::detector::{Change, ChangeTally, ChangeType};

/// Render a Markdown/text summary of one entity type's change list.
///
/// Informational only; the structured change list is authoritative.
pub fn render_change_summary<T>(entity_type: &str, changes: &[Change<T>]) -> String {
    let mut out = String::new();

    out.push_str(&format!("## Changes: {}\n\n", entity_type));

    let tally = ChangeTally::from_changes(changes);
    out.push_str(&format!(
        "**Full**: {}  \n**Update**: {}  \n**Soft**: {}  \n**Removal**: {}\n\n",
        tally.full, tally.update, tally.soft, tally.removal
    ));

    if changes.is_empty() {
        out.push_str("_No changes detected._\n");
        return out;
    }

    for change_type in ChangeType::ORDER {
        let ids: Vec<&str> = changes
            .iter()
            .filter(|c| c.change_type == change_type)
            .map(|c| c.id.as_str())
            .collect();
        if ids.is_empty() {
            continue;
        }
        out.push_str(&format!("### {} ({})\n\n", heading(change_type), ids.len()));
        for id in ids {
            out.push_str(&format!("- `{}`\n", id));
        }
        out.push('\n');
    }

    out
}

fn heading(change_type: ChangeType) -> &'static str {
    match change_type {
        ChangeType::Full => "Full",
        ChangeType::Update => "Update",
        ChangeType::Soft => "Soft",
        ChangeType::Removal => "Removed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn change(id: &str, change_type: ChangeType) -> Change<()> {
        Change {
            id: id.to_string(),
            timestamp: Utc::now(),
            change_type,
            entity_type: "obsidian-plugin".to_string(),
            data: (),
        }
    }

    #[test]
    fn test_empty_list_says_so() {
        let text = render_change_summary::<()>("obsidian-plugin", &[]);
        assert!(text.starts_with("## Changes: obsidian-plugin"));
        assert!(text.contains("_No changes detected._"));
    }

    #[test]
    fn test_sections_follow_category_order() {
        let changes = vec![
            change("a", ChangeType::Full),
            change("b", ChangeType::Soft),
            change("c", ChangeType::Removal),
        ];
        let text = render_change_summary("obsidian-plugin", &changes);
        let full = text.find("### Full (1)").unwrap();
        let soft = text.find("### Soft (1)").unwrap();
        let removed = text.find("### Removed (1)").unwrap();
        assert!(full < soft && soft < removed);
        assert!(!text.contains("### Update"));
        assert!(text.contains("- `c`"));
    }
}
