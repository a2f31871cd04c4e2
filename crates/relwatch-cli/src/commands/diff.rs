//! Diff command

use clap::Args;
use relwatch_core::detector::{detect, KeyedSnapshot};
use relwatch_core::domains::id_normalization;
use relwatch_core::render_change_summary;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Entity type tag, e.g. obsidian-plugin
    #[arg(long)]
    pub entity_type: String,

    /// Previous snapshot (JSON array)
    #[arg(long)]
    pub old: PathBuf,

    /// Current snapshot (JSON array)
    #[arg(long)]
    pub new: PathBuf,

    /// YAML detector config overriding or extending the built-ins
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the change list as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: DiffArgs) -> Result<(), Box<dyn std::error::Error>> {
    let registry = super::load_registry(args.config.as_deref())?;
    let config = registry.get(&args.entity_type)?;
    let normalization = id_normalization(&args.entity_type);

    let mut keyed = Vec::with_capacity(2);
    for (label, path) in [("old", &args.old), ("new", &args.new)] {
        let outcome = KeyedSnapshot::key_by(read_array(path)?, config.id_field(), normalization);
        for unkeyed in &outcome.unkeyed {
            eprintln!(
                "Warning: {} snapshot entry skipped: {}",
                label,
                unkeyed.to_error(&args.entity_type)
            );
        }
        keyed.push(outcome.snapshot);
    }

    let changes = detect(config, &args.entity_type, &keyed[0], &keyed[1]);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&changes)?);
    } else {
        print!("{}", render_change_summary(&args.entity_type, &changes));
    }

    Ok(())
}

fn read_array(path: &Path) -> Result<Vec<Value>, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let items: Vec<Value> = serde_json::from_str(&content)
        .map_err(|e| format!("{} is not a JSON array: {}", path.display(), e))?;
    Ok(items)
}
