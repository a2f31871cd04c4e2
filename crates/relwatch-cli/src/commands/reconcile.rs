//! Reconcile command
//!
//! Reads `plugins.json` / `themes.json` from the persisted and the fetched
//! directory. A missing persisted file is an empty collection (first run);
//! a missing fetched file fails that entity type.

use clap::Args;
use relwatch_core::domains::obsidian::{
    ObsidianPlugin, ObsidianTheme, PLUGIN_ENTITY_TYPE, THEME_ENTITY_TYPE,
};
use relwatch_core::render_change_summary;
use relwatch_engine::{
    JsonFileSource, ObsidianOutcome, ObsidianReconciler, ReconcileOptions,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const PLUGINS_FILE: &str = "plugins.json";
const THEMES_FILE: &str = "themes.json";

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Directory holding the persisted state
    #[arg(long)]
    pub old_dir: PathBuf,

    /// Directory holding the freshly fetched lists
    #[arg(long)]
    pub fetched_dir: PathBuf,

    /// YAML detector config overriding the built-ins
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print changes, summary and failures as JSON
    #[arg(long)]
    pub json: bool,

    /// Fetch timeout per entity type, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Maximum concurrent identifier lookups
    #[arg(long, default_value_t = 8)]
    pub concurrency: usize,
}

pub fn execute(args: ReconcileArgs) -> Result<(), Box<dyn std::error::Error>> {
    let registry = super::load_registry(args.config.as_deref())?;
    let reconciler = ObsidianReconciler::from_registry(&registry)?;
    let plugin_config = registry.get(PLUGIN_ENTITY_TYPE)?;
    let theme_config = registry.get(THEME_ENTITY_TYPE)?;

    let old_plugins: Vec<ObsidianPlugin> = read_persisted(&args.old_dir.join(PLUGINS_FILE))?;
    let old_themes: Vec<ObsidianTheme> = read_persisted(&args.old_dir.join(THEMES_FILE))?;

    let plugin_source = JsonFileSource::<ObsidianPlugin>::new(
        PLUGIN_ENTITY_TYPE,
        args.fetched_dir.join(PLUGINS_FILE),
        plugin_config.id_field().clone(),
    );
    let theme_source = JsonFileSource::<ObsidianTheme>::new(
        THEME_ENTITY_TYPE,
        args.fetched_dir.join(THEMES_FILE),
        theme_config.id_field().clone(),
    );

    let timeout = Duration::from_secs(args.timeout_secs);
    let options = ReconcileOptions::default()
        .with_fetch_timeout(timeout)
        .with_source_timeout(timeout)
        .with_max_concurrent_fetches(args.concurrency);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(reconciler.reconcile(
        old_plugins,
        old_themes,
        &plugin_source,
        &theme_source,
        &options,
    ));

    if args.json {
        print_json(&outcome)?;
    } else {
        print_text(&outcome);
    }

    for missing in &outcome.summary.missing {
        eprintln!(
            "Warning: missing {} '{}' [{}]: {}",
            missing.entity_type, missing.id, missing.code, missing.reason
        );
    }

    outcome.into_result()?;
    Ok(())
}

fn read_persisted<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let items = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid persisted state in {}: {}", path.display(), e))?;
    Ok(items)
}

fn print_json(outcome: &ObsidianOutcome) -> Result<(), Box<dyn std::error::Error>> {
    let failures: Vec<_> = outcome
        .failures
        .iter()
        .map(|f| {
            json!({
                "entity_type": f.entity_type,
                "code": f.error.code(),
                "error": f.error.to_string(),
            })
        })
        .collect();
    let report = json!({
        "changes": outcome.changes,
        "summary": outcome.summary,
        "failures": failures,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_text(outcome: &ObsidianOutcome) {
    let summary = &outcome.summary;
    println!("## Reconcile Summary\n");
    println!(
        "**Processed**: {} plugins, {} themes  ",
        summary.processed.plugins, summary.processed.themes
    );
    println!(
        "**Changes**: {} plugins, {} themes, {} removed  ",
        summary.changes.plugins, summary.changes.themes, summary.changes.removed
    );
    println!("**Missing**: {}\n", summary.missing.len());

    print!(
        "{}",
        render_change_summary(
            PLUGIN_ENTITY_TYPE,
            outcome.changes.plugins.as_deref().unwrap_or_default()
        )
    );
    print!(
        "{}",
        render_change_summary(
            THEME_ENTITY_TYPE,
            outcome.changes.themes.as_deref().unwrap_or_default()
        )
    );

    for failure in &outcome.failures {
        eprintln!("Error: {} failed: {}", failure.entity_type, failure.error);
    }
}
