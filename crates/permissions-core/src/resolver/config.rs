//! Static resolution inputs: modifier sets, exceptions, steward indicators and
//! governance allow-lists.

use anyhow::{anyhow, Result};
use permissions_book_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::OwnershipMode;

/// An address known to be governance-owned whose controller lives on another chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownGovernanceAddress {
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn default_walk_modifiers() -> BTreeSet<String> {
    ["onlyOwner", "onlyEthereumGovernanceExecutor"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecentralizationConfig {
    #[serde(default)]
    pub known_governance_owned_addresses: Vec<KnownGovernanceAddress>,
    /// Contract name → modifiers that are functional roles there, not ownership.
    #[serde(default)]
    pub modifier_exceptions: BTreeMap<String, BTreeSet<String>>,
    /// Case-insensitive substrings identifying steward contracts and accounts.
    #[serde(default)]
    pub steward_indicators: Vec<String>,
    /// Actions pinned to governance regardless of modifier analysis.
    #[serde(default)]
    pub governance_only_actions: BTreeSet<String>,
    pub strict_modifiers: BTreeSet<String>,
    pub administered_modifiers: BTreeSet<String>,
    /// Modifiers followed by the governance walk.
    #[serde(default = "default_walk_modifiers")]
    pub walk_modifiers: BTreeSet<String>,
}

impl Default for DecentralizationConfig {
    fn default() -> Self {
        Self {
            known_governance_owned_addresses: Vec::new(),
            modifier_exceptions: BTreeMap::new(),
            steward_indicators: Vec::new(),
            governance_only_actions: BTreeSet::new(),
            strict_modifiers: ["onlyOwner".to_string()].into_iter().collect(),
            administered_modifiers: ["onlyOwner".to_string()].into_iter().collect(),
            walk_modifiers: default_walk_modifiers(),
        }
    }
}

impl DecentralizationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)
            .map_err(|e| anyhow!("Failed to parse decentralization config: {}", e))?;
        config.normalize();
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;
        Self::from_json_str(&json)
    }

    fn normalize(&mut self) {
        for indicator in &mut self.steward_indicators {
            *indicator = indicator.to_lowercase();
        }
        self.steward_indicators.retain(|i| !i.is_empty());
    }

    pub fn is_steward(&self, name: Option<&str>) -> bool {
        let Some(name) = name else {
            return false;
        };
        let lower = name.to_lowercase();
        self.steward_indicators
            .iter()
            .any(|indicator| lower.contains(&indicator.to_lowercase()))
    }

    pub fn is_known_governance(&self, address: &Address) -> bool {
        self.known_governance_owned_addresses
            .iter()
            .any(|known| &known.address == address)
    }

    pub fn is_excepted(&self, contract: &str, modifier: &str) -> bool {
        self.modifier_exceptions
            .get(contract)
            .is_some_and(|modifiers| modifiers.contains(modifier))
    }

    pub fn allows(&self, mode: OwnershipMode, modifier: &str) -> bool {
        match mode {
            OwnershipMode::Strict => self.strict_modifiers.contains(modifier),
            OwnershipMode::Administered => self.administered_modifiers.contains(modifier),
        }
    }

    pub fn is_governance_only(&self, action: &str) -> bool {
        self.governance_only_actions.contains(action)
    }
}

/// Action name → contract functions that perform it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionsConfig {
    actions: BTreeMap<String, Vec<String>>,
}

impl ActionsConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| anyhow!("Failed to parse actions config: {}", e))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;
        Self::from_json_str(&json)
    }

    pub fn insert<I, S>(&mut self, action: impl Into<String>, functions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions
            .insert(action.into(), functions.into_iter().map(Into::into).collect());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
