//! Order-independent reconstruction of boolean membership sets.
//!
//! Events may arrive merged from two chains with no cross-stream order, so each address
//! is decided by its net delta: members start at 1 (0 otherwise) and stay iff
//! `start + adds - removes > 0`.

use permissions_book_types::{Address, EventLog, MembershipSet};
use std::collections::BTreeMap;

pub fn replay_toggles(prior: &MembershipSet, events: &[EventLog]) -> MembershipSet {
    let mut deltas: BTreeMap<Address, i64> = BTreeMap::new();
    for log in events {
        if let Some((address, delta)) = log.event.membership_delta() {
            *deltas.entry(address).or_default() += delta;
        }
    }

    let candidates = prior.iter().copied().chain(deltas.keys().copied());
    candidates
        .filter(|address| {
            let start = i64::from(prior.contains(address));
            start + deltas.get(address).copied().unwrap_or_default() > 0
        })
        .collect()
}
