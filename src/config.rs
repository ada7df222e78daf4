//! Declarative network and pool configuration.
//!
//! Everything the indexer needs to know about a deployment is read from JSON under the
//! config directory at startup:
//!
//! ```text
//! statics/
//!   networks.json          # networks, pools, tracked sets, contract manifests
//!   decentralization.json  # resolver modifier sets, exceptions, steward indicators
//!   actions.json           # action → functions
//!   functions/*.json       # per-contract function → modifier tables
//! ```
//!
//! RPC endpoints are never embedded: a network names the environment variable holding
//! its URL.

use anyhow::{anyhow, Result};
use permissions_book_types::{AddressBook, AddressRef};
use permissions_core::fork::DEFAULT_FORK_WINDOW;
use permissions_core::ledger::DEFAULT_BLOCK_WINDOW;
use permissions_core::{ActionsConfig, DecentralizationConfig, ForkSpec, SetKind, TrackedSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub const NETWORKS_FILE: &str = "networks.json";
pub const DECENTRALIZATION_FILE: &str = "decentralization.json";
pub const ACTIONS_FILE: &str = "actions.json";

fn default_block_window() -> u64 {
    DEFAULT_BLOCK_WINDOW
}

fn default_fork_window() -> u64 {
    DEFAULT_FORK_WINDOW
}

/// A membership set to index, with its contract given by address book key or literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedSetConfig {
    pub id: String,
    pub address: AddressRef,
    pub deployment_block: u64,
    #[serde(flatten)]
    pub kind: SetKind,
}

impl TrackedSetConfig {
    /// `None` when the pool's address book has no (non-zero) address for the set.
    pub fn resolve(&self, book: &AddressBook) -> Option<TrackedSet> {
        let address = book.resolve(&self.address)?;
        Some(TrackedSet {
            id: self.id.clone(),
            address,
            deployment_block: self.deployment_block,
            kind: self.kind.clone(),
        })
    }
}

/// Where a modifier's controllers come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "from", rename_all = "camelCase")]
pub enum ControllerSource {
    /// A no-argument getter returning an address, e.g. `owner()`.
    /// Called on the contract itself unless `target` is given.
    Getter {
        call: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<AddressRef>,
    },
    /// Current holders of `role` in the tracked role set `set`.
    Role { set: String, role: String },
    /// Current members of the tracked allow-list `set`.
    Members { set: String },
    /// A fixed address, optionally living on another chain.
    Address {
        address: AddressRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chain: Option<String>,
    },
    /// The contract's EIP-1967 proxy admin.
    ProxyAdmin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierConfig {
    pub name: String,
    pub controllers: Vec<ControllerSource>,
}

/// One contract of a pool's manifest. Modifier order is significant: resolution picks
/// the first modifier its mode allows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    pub name: String,
    pub address: AddressRef,
    #[serde(default)]
    pub modifiers: Vec<ModifierConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForkConfig {
    pub base_pool: String,
    pub activation_block: u64,
    pub rpc_url_env: String,
    #[serde(default = "default_fork_window")]
    pub window: u64,
}

impl ForkConfig {
    pub fn spec(&self) -> ForkSpec {
        ForkSpec {
            base_pool: self.base_pool.clone(),
            activation_block: self.activation_block,
            window: self.window,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolConfig {
    pub key: String,
    #[serde(default)]
    pub address_book: AddressBook,
    #[serde(default)]
    pub tracked: Vec<TrackedSetConfig>,
    #[serde(default)]
    pub contracts: Vec<ContractConfig>,
    /// Function → modifier table, relative to the config directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PathBuf>,
    /// Permission-limited deployment governed by its own committee.
    #[serde(default)]
    pub restricted: bool,
    /// Pools whose contracts form this pool's governance graph.
    #[serde(default)]
    pub governance_pools: Vec<String>,
    /// Pools whose contracts are visible to resolution and actions here but are not
    /// walked as governance.
    #[serde(default)]
    pub context_pools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fork: Option<ForkConfig>,
}

impl PoolConfig {
    pub fn is_fork(&self) -> bool {
        self.fork.is_some()
    }

    /// Tracked sets whose contracts are present in the address book.
    pub fn tracked_sets(&self) -> Vec<TrackedSet> {
        self.tracked
            .iter()
            .filter_map(|set| {
                let resolved = set.resolve(&self.address_book);
                if resolved.is_none() {
                    tracing::debug!(pool = %self.key, set = %set.id, "tracked set has no address; skipping");
                }
                resolved
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url_env: String,
    #[serde(default = "default_block_window")]
    pub block_window: u64,
    /// Address → human name, used for steward detection.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Processed in this order.
    pub pools: Vec<PoolConfig>,
}

impl NetworkConfig {
    pub fn pool(&self, key: &str) -> Option<&PoolConfig> {
        self.pools.iter().find(|pool| pool.key == key)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for pool in &self.pools {
            if !seen.insert(pool.key.as_str()) {
                return Err(anyhow!(
                    "Duplicate pool {} in network {}",
                    pool.key,
                    self.chain_id
                ));
            }
        }

        for pool in &self.pools {
            let referenced = pool
                .governance_pools
                .iter()
                .map(|key| ("governance", key))
                .chain(pool.context_pools.iter().map(|key| ("context", key)));
            for (role, key) in referenced {
                if key == &pool.key {
                    return Err(anyhow!("Pool {} cannot name itself as {} pool", pool.key, role));
                }
                if self.pool(key).is_none() {
                    return Err(anyhow!(
                        "Pool {} in network {} names unknown {} pool {}",
                        pool.key,
                        self.chain_id,
                        role,
                        key
                    ));
                }
            }
            let Some(fork) = &pool.fork else {
                continue;
            };
            if fork.base_pool == pool.key {
                return Err(anyhow!("Fork pool {} cannot use itself as base pool", pool.key));
            }
            match self.pool(&fork.base_pool) {
                None => {
                    return Err(anyhow!(
                        "Fork pool {} in network {} names unknown base pool {}",
                        pool.key,
                        self.chain_id,
                        fork.base_pool
                    ))
                }
                Some(base) if base.is_fork() => {
                    return Err(anyhow!(
                        "Fork pool {} cannot be based on fork pool {}",
                        pool.key,
                        base.key
                    ))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Fork pools replay their base pool's deployment: anything they leave unset is
    /// taken from the base, and the base address book underlies their own.
    fn inherit_fork_bases(&mut self) {
        let bases: BTreeMap<String, PoolConfig> = self
            .pools
            .iter()
            .filter(|pool| !pool.is_fork())
            .map(|pool| (pool.key.clone(), pool.clone()))
            .collect();

        for pool in &mut self.pools {
            let Some(base) = pool.fork.as_ref().and_then(|fork| bases.get(&fork.base_pool)) else {
                continue;
            };
            let mut book = base.address_book.clone();
            book.merge(&pool.address_book);
            pool.address_book = book;
            if pool.tracked.is_empty() {
                pool.tracked = base.tracked.clone();
            }
            if pool.contracts.is_empty() {
                pool.contracts = base.contracts.clone();
            }
            if pool.permissions.is_none() {
                pool.permissions = base.permissions.clone();
            }
            if pool.governance_pools.is_empty() {
                pool.governance_pools = base.governance_pools.clone();
            }
            if pool.context_pools.is_empty() {
                pool.context_pools = base.context_pools.clone();
            }
            pool.restricted |= base.restricted;
        }
    }
}

/// All static configuration for a run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub root: PathBuf,
    pub networks: BTreeMap<u64, NetworkConfig>,
    pub decentralization: DecentralizationConfig,
    pub actions: ActionsConfig,
}

impl AppConfig {
    /// Load and validate the configuration under `root`.
    pub fn load(root: &Path) -> Result<Self> {
        let networks_path = root.join(NETWORKS_FILE);
        let json = std::fs::read_to_string(&networks_path)
            .map_err(|e| anyhow!("Failed to read {}: {}", networks_path.display(), e))?;
        let networks = parse_networks(&json)
            .map_err(|e| anyhow!("Failed to load {}: {}", networks_path.display(), e))?;

        let decentralization_path = root.join(DECENTRALIZATION_FILE);
        let decentralization = if decentralization_path.exists() {
            DecentralizationConfig::load(&decentralization_path)?
        } else {
            tracing::warn!(path = %decentralization_path.display(), "no decentralization config; using defaults");
            DecentralizationConfig::default()
        };

        let actions_path = root.join(ACTIONS_FILE);
        let actions = if actions_path.exists() {
            ActionsConfig::load(&actions_path)?
        } else {
            ActionsConfig::default()
        };

        Ok(Self {
            root: root.to_path_buf(),
            networks,
            decentralization,
            actions,
        })
    }

    pub fn network(&self, chain_id: u64) -> Option<&NetworkConfig> {
        self.networks.get(&chain_id)
    }

    pub fn resolve_path(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }
}

/// Parse `networks.json` (an array of networks) into a chain-id keyed map.
pub fn parse_networks(json: &str) -> Result<BTreeMap<u64, NetworkConfig>> {
    let list: Vec<NetworkConfig> =
        serde_json::from_str(json).map_err(|e| anyhow!("Invalid network config: {}", e))?;
    let mut networks = BTreeMap::new();
    for mut network in list {
        for pool in &mut network.pools {
            pool.key = pool.key.to_uppercase();
            if let Some(fork) = &mut pool.fork {
                fork.base_pool = fork.base_pool.to_uppercase();
            }
            for key in pool.governance_pools.iter_mut().chain(pool.context_pools.iter_mut()) {
                *key = key.to_uppercase();
            }
        }
        network.validate()?;
        network.inherit_fork_bases();
        let chain_id = network.chain_id;
        if networks.insert(chain_id, network).is_some() {
            return Err(anyhow!("Duplicate network {}", chain_id));
        }
    }
    Ok(networks)
}
