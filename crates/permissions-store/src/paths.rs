//! Path utilities and atomic file writes.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};

/// Ledger document for a network: `{root}/ledger/{network}-ledger.json`.
pub fn ledger_path(root: &Path, network: &str) -> PathBuf {
    root.join("ledger").join(format!("{}-ledger.json", network))
}

/// Permission document for a network: `{root}/permissions/{network}-permissions.json`.
pub fn permissions_path(root: &Path, network: &str) -> PathBuf {
    root.join("permissions")
        .join(format!("{}-permissions.json", network))
}

/// Ensure all parent directories exist for a path.
pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| anyhow!("Failed to create directory {}: {}", parent.display(), e))?;
    }
    Ok(())
}

/// Write a file atomically (write to .tmp, then rename).
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    ensure_parent_dirs(path)?;
    let tmp_path = path.with_extension(format!(
        "{}.tmp",
        path.extension().and_then(|s| s.to_str()).unwrap_or("tmp")
    ));
    std::fs::write(&tmp_path, contents)
        .map_err(|e| anyhow!("Failed to write temp file {}: {}", tmp_path.display(), e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        anyhow!(
            "Failed to rename {} to {}: {}",
            tmp_path.display(),
            path.display(),
            e
        )
    })?;
    Ok(())
}

/// Write a JSON file atomically (pretty-printed).
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| anyhow!("Failed to serialize JSON for {}: {}", path.display(), e))?;
    atomic_write(path, &json)
}

/// Read and parse a JSON file; `Ok(None)` when it does not exist.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;
    let value = serde_json::from_str(&json)
        .map_err(|e| anyhow!("Failed to parse JSON {}: {}", path.display(), e))?;
    Ok(Some(value))
}
