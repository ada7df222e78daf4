//! Ordered replay of role grant/revoke events.

use alloy_primitives::{b256, keccak256, B256};
use permissions_book_types::{EventLog, LedgerEvent, RoleSet};
use std::collections::HashMap;

/// Label of the all-zero role identifier.
pub const DEFAULT_ADMIN: &str = "DEFAULT_ADMIN";

/// Extra role recognized on fund-custodian contracts.
pub const FUNDS_ADMIN_ROLE: &str = "FUNDS_ADMIN_ROLE";

/// `bytes32("FUNDS_ADMIN")`, the custodian's admin role identifier.
pub const FUNDS_ADMIN_ROLE_ID: B256 =
    b256!("46554e44535f41444d494e000000000000000000000000000000000000000000");

/// Role identifier → role name for a tracked contract.
pub fn role_lookup(role_names: &[String], custodian: bool) -> HashMap<B256, String> {
    let mut lookup = HashMap::with_capacity(role_names.len() + 2);
    lookup.insert(B256::ZERO, DEFAULT_ADMIN.to_string());
    for name in role_names {
        lookup.insert(keccak256(name.as_bytes()), name.clone());
    }
    if custodian {
        lookup.insert(FUNDS_ADMIN_ROLE_ID, FUNDS_ADMIN_ROLE.to_string());
    }
    lookup
}

/// Replay `events` in order on top of `prior`.
///
/// Unmapped role identifiers are ignored. Every declared role is present in the
/// result, empty if nothing was ever granted.
pub fn replay_roles(
    prior: &RoleSet,
    role_names: &[String],
    custodian: bool,
    events: &[EventLog],
) -> RoleSet {
    let lookup = role_lookup(role_names, custodian);
    let mut roles = prior.clone();

    for log in events {
        match &log.event {
            LedgerEvent::RoleGranted { role, account } => {
                if let Some(name) = lookup.get(role) {
                    roles.grant(name, *account);
                }
            }
            LedgerEvent::RoleRevoked { role, account } => {
                if let Some(name) = lookup.get(role) {
                    roles.revoke(name, account);
                }
            }
            _ => {}
        }
    }

    roles.declare(role_names.iter().cloned());
    roles
}
