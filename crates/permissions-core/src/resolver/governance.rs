//! Governance walk.
//!
//! Follows proxy admins and ownership-style modifiers through the governance contracts.
//! The walk succeeds when a controller points back at the address one level up (the
//! executor / payloads-controller mutual pair), fails on multisigs and dead ends, and
//! fails on any other cycle: each `(address, origin)` pair is visited at most once.

use permissions_book_types::{Address, ContractSet};
use std::collections::{BTreeSet, HashSet};

/// Result of a governance walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOutcome {
    pub governed: bool,
    /// Distinct `(address, origin)` pairs examined.
    pub steps: usize,
}

struct Walk<'a> {
    governance: &'a ContractSet,
    modifiers: &'a BTreeSet<String>,
    visited: HashSet<(Address, Address)>,
}

impl Walk<'_> {
    fn step(&mut self, address: Address, origin: Address) -> bool {
        if !self.visited.insert((address, origin)) {
            return false;
        }

        let (governance, modifiers) = (self.governance, self.modifiers);
        for record in governance.by_address(&address) {
            if let Some(admin) = record.proxy_admin {
                if self.step(admin, origin) {
                    return true;
                }
            }

            let walked = record
                .modifiers
                .iter()
                .filter(|m| modifiers.contains(&m.name))
                .find_map(|m| m.primary());
            if let Some(controller) = walked {
                if controller.is_multisig() {
                    return false;
                }
                if controller.address == origin {
                    return true;
                }
                return self.step(controller.address, address);
            }
        }

        false
    }
}

/// Walk from `address`, where `origin` is the address the walk was entered from.
///
/// Callers starting a fresh walk pass the controller itself as `origin`.
pub fn walk(
    governance: &ContractSet,
    modifiers: &BTreeSet<String>,
    address: Address,
    origin: Address,
) -> WalkOutcome {
    let mut state = Walk {
        governance,
        modifiers,
        visited: HashSet::new(),
    };
    let governed = state.step(address, origin);
    WalkOutcome {
        governed,
        steps: state.visited.len(),
    }
}
