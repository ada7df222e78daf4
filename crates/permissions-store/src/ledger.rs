//! Ledger state persistence.
//!
//! Checkpoint and snapshot of a pool are written together in one atomic document write,
//! so a checkpoint can never run ahead of the memberships it describes. Pools of one
//! network share a document keyed by pool name.

use anyhow::Result;
use parking_lot::{Mutex, RwLock};
use permissions_book_types::{IndexCheckpoint, LedgerState};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use crate::paths::{atomic_write_json, ledger_path, read_json};

/// Trait for ledger state stores keyed by `(network, pool)`.
///
/// Absence of prior state is not an error: loads return `Ok(None)`.
pub trait LedgerStore: Send + Sync {
    fn load_state(&self, network: &str, pool: &str) -> Result<Option<LedgerState>>;

    fn save_state(&self, network: &str, pool: &str, state: &LedgerState) -> Result<()>;

    fn load_checkpoint(&self, network: &str, pool: &str) -> Result<Option<IndexCheckpoint>> {
        Ok(self.load_state(network, pool)?.map(|state| state.checkpoint))
    }

    /// Replace only the checkpoint, keeping any stored snapshot.
    fn save_checkpoint(&self, network: &str, pool: &str, checkpoint: &IndexCheckpoint) -> Result<()> {
        let mut state = self.load_state(network, pool)?.unwrap_or_default();
        state.checkpoint = checkpoint.clone();
        self.save_state(network, pool, &state)
    }
}

type NetworkDocument = BTreeMap<String, LedgerState>;

/// Filesystem ledger store: `{root}/ledger/{network}-ledger.json`.
pub struct FsLedgerStore {
    root: Arc<Path>,
    write_lock: Mutex<()>,
}

impl FsLedgerStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|e| {
            anyhow::anyhow!("Failed to create store root {}: {}", root.display(), e)
        })?;
        Ok(Self {
            root: Arc::from(root),
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn load_document(&self, network: &str) -> Result<NetworkDocument> {
        Ok(read_json(&ledger_path(&self.root, network))?.unwrap_or_default())
    }
}

impl LedgerStore for FsLedgerStore {
    fn load_state(&self, network: &str, pool: &str) -> Result<Option<LedgerState>> {
        Ok(self.load_document(network)?.remove(pool))
    }

    fn save_state(&self, network: &str, pool: &str, state: &LedgerState) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut document = self.load_document(network)?;
        document.insert(pool.to_string(), state.clone());
        atomic_write_json(&ledger_path(&self.root, network), &document)?;
        tracing::debug!(
            network,
            pool,
            latest_block = state.checkpoint.latest_block,
            sets = state.snapshot.len(),
            "saved ledger state"
        );
        Ok(())
    }
}

/// In-memory ledger store.
#[derive(Default)]
pub struct MemoryLedgerStore {
    states: RwLock<HashMap<(String, String), LedgerState>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load_state(&self, network: &str, pool: &str) -> Result<Option<LedgerState>> {
        Ok(self
            .states
            .read()
            .get(&(network.to_string(), pool.to_string()))
            .cloned())
    }

    fn save_state(&self, network: &str, pool: &str, state: &LedgerState) -> Result<()> {
        self.states
            .write()
            .insert((network.to_string(), pool.to_string()), state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permissions_book_types::{Address, RoleSet, SetSnapshot};
    use tempfile::TempDir;

    fn sample_state(latest_block: u64) -> LedgerState {
        let mut state = LedgerState::default();
        state.checkpoint.record("ACL_MANAGER", Address::repeat_byte(1), 10);
        state.checkpoint.advance(latest_block);
        let mut roles = RoleSet::with_roles(["POOL_ADMIN"]);
        roles.grant("POOL_ADMIN", Address::repeat_byte(2));
        state.snapshot.insert("ACL_MANAGER", SetSnapshot::Roles(roles));
        state
    }

    #[test]
    fn test_missing_state_is_none() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = FsLedgerStore::new(temp_dir.path())?;
        assert!(store.load_state("1", "AAVE_V3")?.is_none());
        assert!(store.load_checkpoint("1", "AAVE_V3")?.is_none());
        Ok(())
    }

    #[test]
    fn test_pools_share_a_document_without_clobbering() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = FsLedgerStore::new(temp_dir.path())?;

        store.save_state("1", "AAVE_V3", &sample_state(100))?;
        store.save_state("1", "AAVE_V3_FORK", &sample_state(150))?;

        assert_eq!(store.load_state("1", "AAVE_V3")?, Some(sample_state(100)));
        assert_eq!(
            store.load_checkpoint("1", "AAVE_V3_FORK")?.map(|c| c.latest_block),
            Some(150)
        );
        assert!(store.load_state("137", "AAVE_V3")?.is_none());
        Ok(())
    }

    #[test]
    fn test_save_checkpoint_keeps_snapshot() -> Result<()> {
        let store = MemoryLedgerStore::new();
        store.save_state("1", "AAVE_V3", &sample_state(100))?;

        let mut checkpoint = store.load_checkpoint("1", "AAVE_V3")?.unwrap_or_default();
        checkpoint.advance(200);
        store.save_checkpoint("1", "AAVE_V3", &checkpoint)?;

        let state = store.load_state("1", "AAVE_V3")?.unwrap_or_default();
        assert_eq!(state.checkpoint.latest_block, 200);
        assert_eq!(state.snapshot, sample_state(100).snapshot);
        Ok(())
    }
}
