//! Per-network permission documents handed to report builders.

use chrono::{DateTime, Utc};
use permissions_book_types::{ContractSet, LedgerSnapshot};
use permissions_core::{ActionControllers, Decentralization};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{NetworkConfig, PoolConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolReport {
    /// Last block covered by the pool's ledger.
    pub indexed_block: u64,
    pub contracts: ContractSet,
    pub ledger: LedgerSnapshot,
    /// Contract name → upgradeability and owner.
    pub decentralization: BTreeMap<String, Decentralization>,
    pub actions: ActionControllers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkReport {
    pub chain_id: u64,
    pub name: String,
    pub generated_at: DateTime<Utc>,
    pub pools: BTreeMap<String, PoolReport>,
}

impl NetworkReport {
    pub fn new(network: &NetworkConfig) -> Self {
        Self {
            chain_id: network.chain_id,
            name: network.name.clone(),
            generated_at: Utc::now(),
            pools: BTreeMap::new(),
        }
    }

    /// Governance contracts for `pool`: the union of its governance pools' records,
    /// from this run when already indexed, otherwise from the previous document.
    pub fn governance_for(&self, pool: &PoolConfig) -> ContractSet {
        self.contracts_of(&pool.governance_pools)
    }

    /// Records of `pool`'s context pools, resolved the same way as [`Self::governance_for`].
    pub fn context_for(&self, pool: &PoolConfig) -> ContractSet {
        self.contracts_of(&pool.context_pools)
    }

    fn contracts_of(&self, keys: &[String]) -> ContractSet {
        keys.iter()
            .filter_map(|key| self.pools.get(key))
            .flat_map(|report| report.contracts.iter().cloned())
            .collect()
    }

    pub fn record(&mut self, pool: &str, report: PoolReport) {
        self.pools.insert(pool.to_string(), report);
        self.generated_at = Utc::now();
    }
}
