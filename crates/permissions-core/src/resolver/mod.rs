//! Controller resolution.
//!
//! Given a pool's resolved [`ContractSet`] and the network's governance contracts, the
//! resolver answers who ultimately controls an address:
//!
//! - [`ControllerResolver::resolve`]: ownership through proxy admins and modifiers
//! - [`governance`]: the walk that decides whether a controller is governance
//! - [`ControllerResolver::classify`]: steward-aware classification of one controller
//! - [`aggregate`]: per-action controller classes over the whole contract set

pub mod actions;
pub mod classify;
pub mod config;
pub mod governance;

pub use actions::{aggregate, ActionControllers};
pub use config::{ActionsConfig, DecentralizationConfig, KnownGovernanceAddress};
pub use governance::WalkOutcome;

use permissions_book_types::{Address, AddressLabels, ContractRecord, ContractSet, ControllerClassification};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which modifiers count as control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnershipMode {
    /// Direct ownership only.
    Strict,
    /// Ownership plus admin-style modifiers, minus per-contract exceptions.
    Administered,
}

/// Everything resolution reads for one pool.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionScope<'a> {
    pub contracts: &'a ContractSet,
    /// Governance contracts of the network; the only graph the walk follows.
    pub governance: &'a ContractSet,
    pub labels: &'a AddressLabels,
    /// Permission-limited deployment: governance control reports as restricted multisig.
    pub restricted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ownership {
    pub owned: bool,
    pub controller: ControllerClassification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller_address: Option<Address>,
}

impl Ownership {
    pub fn not_owned() -> Self {
        Self {
            owned: false,
            controller: ControllerClassification::External,
            controller_address: None,
        }
    }

    fn owned_by(controller: ControllerClassification) -> Self {
        Self {
            owned: true,
            controller,
            controller_address: None,
        }
    }
}

/// Upgradeability and owner of a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decentralization {
    pub upgradeable: bool,
    pub owned_by: ControllerClassification,
}

pub struct ControllerResolver<'a> {
    scope: ResolutionScope<'a>,
    config: &'a DecentralizationConfig,
}

impl<'a> ControllerResolver<'a> {
    pub fn new(scope: ResolutionScope<'a>, config: &'a DecentralizationConfig) -> Self {
        Self { scope, config }
    }

    pub fn scope(&self) -> &ResolutionScope<'a> {
        &self.scope
    }

    pub fn config(&self) -> &DecentralizationConfig {
        self.config
    }

    /// Resolve who controls `address` under `mode`.
    pub fn resolve(&self, address: Address, mode: OwnershipMode) -> Ownership {
        let mut visited = HashSet::new();
        self.resolve_with(address, mode, &mut visited)
    }

    fn resolve_with(
        &self,
        address: Address,
        mode: OwnershipMode,
        visited: &mut HashSet<Address>,
    ) -> Ownership {
        if self.config.is_known_governance(&address) {
            return Ownership::owned_by(ControllerClassification::Governance);
        }
        if !visited.insert(address) {
            tracing::debug!(address = %address, "proxy admin cycle; treating as not owned");
            return Ownership::not_owned();
        }

        for record in self.scope.contracts.by_address(&address) {
            if let Some(admin) = record.proxy_admin {
                // Upgrade rights decide control once a proxy exists.
                return self.resolve_with(admin, OwnershipMode::Strict, visited);
            }

            for modifier in &record.modifiers {
                if self.config.is_excepted(&record.name, &modifier.name)
                    || !self.config.allows(mode, &modifier.name)
                {
                    continue;
                }
                let Some(primary) = modifier.primary() else {
                    continue;
                };

                if primary.is_multisig() {
                    return Ownership::owned_by(ControllerClassification::MultiSig);
                }
                let walk = self.is_governed_by(primary.address, primary.address);
                if walk.governed {
                    return Ownership::owned_by(ControllerClassification::governance(
                        self.scope.restricted,
                    ));
                }
                return Ownership {
                    owned: true,
                    controller: ControllerClassification::External,
                    controller_address: Some(primary.address),
                };
            }
        }

        Ownership::not_owned()
    }

    /// Governance walk over the network's governance contracts.
    pub fn is_governed_by(&self, address: Address, origin: Address) -> WalkOutcome {
        governance::walk(self.scope.governance, &self.config.walk_modifiers, address, origin)
    }

    /// Upgradeability and strict owner of `record`.
    pub fn decentralization(&self, record: &ContractRecord) -> Decentralization {
        let target = record.proxy_admin.unwrap_or(record.address);
        let ownership = self.resolve(target, OwnershipMode::Strict);
        Decentralization {
            upgradeable: record.proxy_admin.is_some(),
            owned_by: if ownership.owned {
                ownership.controller
            } else {
                ControllerClassification::Unowned
            },
        }
    }
}
