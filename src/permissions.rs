//! Contract record assembly.
//!
//! A pool's [`ContractRecord`]s are rebuilt every run from three inputs:
//!
//! - the static function table (`functions/*.json`): which functions each modifier gates
//!   and whether the contract sits behind a proxy admin
//! - the contract manifest in the pool config: where each modifier's controllers come from
//! - live data: ledger memberships, getter calls, proxy-admin slots, Safe signers

use anyhow::{anyhow, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use permissions_book_types::{
    Address, AddressBook, AccessModifier, ContractRecord, ContractSet, ControllerRef,
    LedgerSnapshot,
};
use permissions_transport::ChainReader;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::config::{ContractConfig, ControllerSource};
use crate::signers::SignerCache;

/// Signer lookups in flight per modifier source.
const SIGNER_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionPermission {
    pub name: String,
    /// Modifiers gating the function.
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractPermissions {
    pub contract: String,
    #[serde(default)]
    pub proxy_admin: bool,
    pub functions: Vec<FunctionPermission>,
}

/// Function → modifier tables for one pool, indexed by contract then modifier.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissions {
    functions: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    proxied: BTreeSet<String>,
}

impl StaticPermissions {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<ContractPermissions> = serde_json::from_str(json)
            .map_err(|e| anyhow!("Failed to parse permissions table: {}", e))?;
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<ContractPermissions>) -> Self {
        let mut permissions = Self::default();
        for entry in entries {
            if entry.proxy_admin {
                permissions.proxied.insert(entry.contract.clone());
            }
            let by_modifier = permissions.functions.entry(entry.contract).or_default();
            for function in entry.functions {
                for role in function.roles {
                    by_modifier.entry(role).or_default().push(function.name.clone());
                }
            }
        }
        permissions
    }

    /// Load a permissions table. A missing or malformed file is logged and yields an
    /// empty table so the rest of the pool still resolves.
    pub fn load(path: &Path) -> Self {
        let parsed = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))
            .and_then(|json| Self::from_json_str(&json));
        match parsed {
            Ok(permissions) => permissions,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "unable to load permissions table");
                Self::default()
            }
        }
    }

    pub fn functions(&self, contract: &str, modifier: &str) -> Vec<String> {
        self.functions
            .get(contract)
            .and_then(|modifiers| modifiers.get(modifier))
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_proxy_admin(&self, contract: &str) -> bool {
        self.proxied.contains(contract)
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Builds [`ContractRecord`]s for one pool.
pub struct RecordBuilder<'a> {
    pub reader: &'a dyn ChainReader,
    pub signers: &'a SignerCache,
    pub book: &'a AddressBook,
    pub snapshot: &'a LedgerSnapshot,
    pub permissions: &'a StaticPermissions,
}

impl RecordBuilder<'_> {
    pub async fn build(&self, contracts: &[ContractConfig]) -> Result<ContractSet> {
        let mut records = ContractSet::new();
        for contract in contracts {
            if let Some(record) = self.build_one(contract).await? {
                records.insert(record);
            }
        }
        Ok(records)
    }

    /// `None` when the contract has no address in this pool.
    pub async fn build_one(&self, contract: &ContractConfig) -> Result<Option<ContractRecord>> {
        let Some(address) = self.book.resolve(&contract.address) else {
            tracing::debug!(contract = %contract.name, reference = %contract.address, "no address; skipping");
            return Ok(None);
        };

        let mut record = ContractRecord::new(contract.name.clone(), address);
        if self.permissions.has_proxy_admin(&contract.name) {
            if let Some(admin) = self.reader.proxy_admin(address).await? {
                record = record.with_proxy_admin(admin);
            }
        }

        for modifier in &contract.modifiers {
            let mut controllers: Vec<ControllerRef> = Vec::new();
            for source in &modifier.controllers {
                for controller in self.controllers(source, address).await? {
                    if !controllers.iter().any(|c| c.address == controller.address) {
                        controllers.push(controller);
                    }
                }
            }
            let functions = self.permissions.functions(&contract.name, &modifier.name);
            record = record.with_modifier(
                AccessModifier::new(modifier.name.clone(), controllers).with_functions(functions),
            );
        }

        Ok(Some(record))
    }

    async fn controllers(
        &self,
        source: &ControllerSource,
        contract: Address,
    ) -> Result<Vec<ControllerRef>> {
        let (addresses, remote_chain) = match source {
            ControllerSource::Getter { call, target } => {
                let target = match target {
                    Some(reference) => match self.book.resolve(reference) {
                        Some(address) => address,
                        None => return Ok(Vec::new()),
                    },
                    None => contract,
                };
                let address = self
                    .reader
                    .call_address(target, call)
                    .await
                    .map_err(|e| anyhow!("Failed to call {} on {}: {}", call, target, e))?;
                (vec![address], None)
            }
            ControllerSource::Role { set, role } => {
                let members = self
                    .snapshot
                    .roles(set)
                    .and_then(|roles| roles.members(role))
                    .map(|members| members.iter().copied().collect::<Vec<_>>())
                    .unwrap_or_default();
                (members, None)
            }
            ControllerSource::Members { set } => {
                let members = self
                    .snapshot
                    .members(set)
                    .map(|members| members.iter().copied().collect::<Vec<_>>())
                    .unwrap_or_default();
                (members, None)
            }
            ControllerSource::Address { address, chain } => {
                (self.book.resolve(address).into_iter().collect::<Vec<_>>(), chain.clone())
            }
            ControllerSource::ProxyAdmin => {
                (self.reader.proxy_admin(contract).await?.into_iter().collect::<Vec<_>>(), None)
            }
        };

        stream::iter(addresses.into_iter().filter(|a: &Address| !a.is_zero()))
            .map(|address| {
                self.signers
                    .controller(self.reader, address, remote_chain.clone())
            })
            .buffered(SIGNER_CONCURRENCY)
            .try_collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TABLE: &str = r#"[
      {
        "contract": "Collector",
        "proxyAdmin": true,
        "functions": [
          { "name": "transfer", "roles": ["onlyFundsAdmin"] },
          { "name": "approve", "roles": ["onlyFundsAdmin", "onlyAdminOrRecipient"] }
        ]
      }
    ]"#;

    #[test]
    fn test_functions_grouped_by_modifier() -> Result<()> {
        let permissions = StaticPermissions::from_json_str(TABLE)?;
        assert_eq!(
            permissions.functions("Collector", "onlyFundsAdmin"),
            vec!["transfer".to_string(), "approve".to_string()]
        );
        assert_eq!(
            permissions.functions("Collector", "onlyAdminOrRecipient"),
            vec!["approve".to_string()]
        );
        assert!(permissions.functions("Collector", "onlyOwner").is_empty());
        assert!(permissions.has_proxy_admin("Collector"));
        assert!(!permissions.has_proxy_admin("Pool"));
        Ok(())
    }

    #[test]
    fn test_missing_table_loads_empty() -> Result<()> {
        let dir = TempDir::new()?;
        let permissions = StaticPermissions::load(&dir.path().join("absent.json"));
        assert!(permissions.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_table_from_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("collector.json");
        std::fs::write(&path, TABLE)?;
        let permissions = StaticPermissions::load(&path);
        assert!(!permissions.is_empty());
        Ok(())
    }
}
