//! Role/membership snapshots and indexing checkpoints.
//!
//! The ledger state for one pool is the pair ([`IndexCheckpoint`], [`LedgerSnapshot`]).
//! Both are persisted together so a reader never observes a checkpoint that is ahead of
//! the memberships it describes.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Role name → member addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet {
    roles: BTreeMap<String, BTreeSet<Address>>,
}

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A role set with every declared role present and empty.
    pub fn with_roles<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        set.declare(names);
        set
    }

    /// Ensure each name is present, leaving existing members untouched.
    pub fn declare<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.roles.entry(name.into()).or_default();
        }
    }

    pub fn grant(&mut self, role: &str, account: Address) {
        self.roles.entry(role.to_string()).or_default().insert(account);
    }

    pub fn revoke(&mut self, role: &str, account: &Address) {
        if let Some(members) = self.roles.get_mut(role) {
            members.remove(account);
        }
    }

    pub fn members(&self, role: &str) -> Option<&BTreeSet<Address>> {
        self.roles.get(role)
    }

    pub fn contains_role(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<Address>)> {
        self.roles.iter()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Boolean membership: an address is either in the set or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MembershipSet(pub BTreeSet<Address>);

impl MembershipSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.0.contains(address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Address> for MembershipSet {
    fn from_iter<T: IntoIterator<Item = Address>>(iter: T) -> Self {
        MembershipSet(iter.into_iter().collect())
    }
}

/// Reconstructed state of one tracked set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "state", rename_all = "camelCase")]
pub enum SetSnapshot {
    Roles(RoleSet),
    Members(MembershipSet),
}

/// Tracked-set id → reconstructed state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerSnapshot {
    sets: BTreeMap<String, SetSnapshot>,
}

impl LedgerSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&SetSnapshot> {
        self.sets.get(id)
    }

    pub fn insert(&mut self, id: impl Into<String>, set: SetSnapshot) {
        self.sets.insert(id.into(), set);
    }

    pub fn roles(&self, id: &str) -> Option<&RoleSet> {
        match self.sets.get(id) {
            Some(SetSnapshot::Roles(roles)) => Some(roles),
            _ => None,
        }
    }

    pub fn members(&self, id: &str) -> Option<&MembershipSet> {
        match self.sets.get(id) {
            Some(SetSnapshot::Members(members)) => Some(members),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SetSnapshot)> {
        self.sets.iter()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedContract {
    pub address: Address,
    pub deployment_block: u64,
    pub first_indexed_at: u64,
}

/// Indexing progress for one pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexCheckpoint {
    pub latest_block: u64,
    #[serde(default)]
    pub indexed_contracts: BTreeMap<String, IndexedContract>,
}

impl IndexCheckpoint {
    pub fn is_indexed(&self, id: &str) -> bool {
        self.indexed_contracts.contains_key(id)
    }

    /// Block a tracked set resumes from: its deployment block when never indexed,
    /// otherwise the checkpoint's latest block.
    pub fn resume_block(&self, id: &str, deployment_block: u64) -> u64 {
        if self.is_indexed(id) {
            self.latest_block
        } else {
            deployment_block
        }
    }

    /// Record a tracked set if it is new. Existing entries are kept as-is.
    pub fn record(&mut self, id: &str, address: Address, deployment_block: u64) {
        self.indexed_contracts
            .entry(id.to_string())
            .or_insert(IndexedContract {
                address,
                deployment_block,
                first_indexed_at: deployment_block,
            });
    }

    /// Move `latest_block` forward; it never decreases.
    pub fn advance(&mut self, head: u64) {
        self.latest_block = self.latest_block.max(head);
    }
}

/// Persisted ledger state of one pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub checkpoint: IndexCheckpoint,
    pub snapshot: LedgerSnapshot,
}
