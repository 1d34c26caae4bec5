use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::JSON_RESULTS_DIR;

/// Write a scan payload to `<base>/_axe-results-json/<run_id>/<uuid>-axe-result.json`.
///
/// The directory is created if absent. The random UUID keeps repeated scans
/// within the same run from overwriting each other. I/O failures are returned
/// to the caller, which logs and continues; persistence is best-effort and
/// must not block teardown.
pub fn persist(base_dir: &Path, run_id: &str, payload: &Value) -> Result<PathBuf> {
    let dir = base_dir.join(JSON_RESULTS_DIR).join(run_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create results directory {}", dir.display()))?;

    let file_path = dir.join(format!("{}-axe-result.json", Uuid::new_v4()));
    let json = serde_json::to_string(payload).context("Failed to serialize scan result")?;
    std::fs::write(&file_path, json)
        .with_context(|| format!("Failed to write scan result to {}", file_path.display()))?;

    Ok(file_path)
}
