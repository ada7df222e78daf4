//! Per-network permission documents.

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::paths::{atomic_write_json, permissions_path, read_json};

/// Writes `{root}/permissions/{network}-permissions.json`.
#[derive(Clone)]
pub struct FsOutputStore {
    root: Arc<Path>,
}

impl FsOutputStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)
            .map_err(|e| anyhow!("Failed to create output root {}: {}", root.display(), e))?;
        Ok(Self {
            root: Arc::from(root),
        })
    }

    pub fn path_for(&self, network: &str) -> PathBuf {
        permissions_path(&self.root, network)
    }

    /// Replace a network's document. Returns the written path.
    pub fn write<T: Serialize>(&self, network: &str, document: &T) -> Result<PathBuf> {
        let path = self.path_for(network);
        atomic_write_json(&path, document)?;
        Ok(path)
    }

    /// The previously written document, if any.
    pub fn read<T: DeserializeOwned>(&self, network: &str) -> Result<Option<T>> {
        read_json(&self.path_for(network))
    }
}
