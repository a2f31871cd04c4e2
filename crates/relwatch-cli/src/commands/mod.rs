pub mod diff;
pub mod reconcile;

use relwatch_core::detector::DetectorRegistry;
use std::path::Path;

/// Built-in detectors, overlaid with `config` when given.
pub fn load_registry(
    config: Option<&Path>,
) -> Result<DetectorRegistry, Box<dyn std::error::Error>> {
    let registry = DetectorRegistry::builtin()?;
    match config {
        Some(path) => Ok(registry.merge(DetectorRegistry::from_yaml_file(path)?)),
        None => Ok(registry),
    }
}
