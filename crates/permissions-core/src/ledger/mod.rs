//! Event-sourced role ledger.
//!
//! A pool tracks a list of membership sets ([`TrackedSet`]). Each run fetches the logs
//! emitted since the pool's checkpoint and replays them onto the previous snapshot:
//!
//! - role sets replay grant/revoke events in chain order ([`roles`])
//! - boolean allow-lists use order-independent net deltas ([`toggles`])
//!
//! Fetching is paginated in fixed block windows ([`window`]) against a chain head that
//! is read once per call.

pub mod roles;
pub mod toggles;
pub mod window;

use anyhow::Result;
use permissions_book_types::{
    Address, EventKind, EventLog, IndexCheckpoint, LedgerSnapshot, LedgerState, SetSnapshot,
};
use permissions_transport::LogSource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default block window for log requests.
pub const DEFAULT_BLOCK_WINDOW: u64 = 9_999;

/// How a tracked set's events are interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SetKind {
    /// `RoleGranted` / `RoleRevoked`, replayed in order.
    #[serde(rename_all = "camelCase")]
    Roles {
        role_names: Vec<String>,
        /// Fund-custodian contracts also recognize the `FUNDS_ADMIN` role id.
        #[serde(default)]
        custodian: bool,
    },
    /// `SenderUpdated(sender, isApproved)`, counted as net deltas.
    SenderApprovals,
    /// `AuthorizedSenderAdded` / `AuthorizedSenderRemoved`, counted as net deltas.
    AuthorizedSenders,
}

impl SetKind {
    pub fn events(&self) -> &'static [EventKind] {
        match self {
            SetKind::Roles { .. } => &[EventKind::RoleGranted, EventKind::RoleRevoked],
            SetKind::SenderApprovals => &[EventKind::SenderUpdated],
            SetKind::AuthorizedSenders => &[
                EventKind::AuthorizedSenderAdded,
                EventKind::AuthorizedSenderRemoved,
            ],
        }
    }
}

/// A membership set indexed from one contract's events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedSet {
    /// Stable id, e.g. `ACL_MANAGER` or `CROSS_CHAIN_CONTROLLER`.
    pub id: String,
    pub address: Address,
    pub deployment_block: u64,
    pub kind: SetKind,
}

impl TrackedSet {
    fn accepts(&self, log: &EventLog) -> bool {
        log.address == self.address && self.kind.events().contains(&log.event.kind())
    }
}

/// Where each set's fetch starts.
#[derive(Debug, Clone, Copy)]
pub enum StartBlock<'a> {
    /// Resume from a checkpoint: deployment block for new sets, `latest_block` otherwise.
    Resume(&'a IndexCheckpoint),
    /// Every set starts at this block.
    At(u64),
}

impl StartBlock<'_> {
    fn for_set(&self, set: &TrackedSet) -> u64 {
        match self {
            StartBlock::Resume(checkpoint) => checkpoint.resume_block(&set.id, set.deployment_block),
            StartBlock::At(block) => *block,
        }
    }
}

/// Logs fetched for one reconstruct call.
#[derive(Debug, Clone, Default)]
pub struct FetchedEvents {
    /// Set id → logs in fetch order. Every requested set has an entry.
    pub by_set: BTreeMap<String, Vec<EventLog>>,
    /// Head the fetch ran up to (exclusive).
    pub head: u64,
}

impl FetchedEvents {
    /// Append `other`'s logs after this stream's, per set. Heads combine by max.
    pub fn chain(mut self, other: FetchedEvents) -> FetchedEvents {
        for (id, logs) in other.by_set {
            self.by_set.entry(id).or_default().extend(logs);
        }
        self.head = self.head.max(other.head);
        self
    }

    pub fn total(&self) -> usize {
        self.by_set.values().map(Vec::len).sum()
    }
}

/// Fetches and replays tracked sets against one log source.
pub struct RoleLedger<'a> {
    source: &'a dyn LogSource,
    window: u64,
}

impl<'a> RoleLedger<'a> {
    pub fn new(source: &'a dyn LogSource, window: u64) -> Self {
        Self { source, window }
    }

    /// Fetch logs for `sets` from their start blocks up to the chain head, or up to
    /// `cap` when given (the head is then not queried).
    ///
    /// Sets sharing a start block are fetched together, one request per window.
    pub async fn fetch(
        &self,
        sets: &[TrackedSet],
        start: StartBlock<'_>,
        cap: Option<u64>,
    ) -> Result<FetchedEvents> {
        let head = match cap {
            Some(cap) => cap,
            None => self.source.chain_head().await?,
        };

        let mut by_set: BTreeMap<String, Vec<EventLog>> =
            sets.iter().map(|s| (s.id.clone(), Vec::new())).collect();

        let mut groups: BTreeMap<u64, Vec<&TrackedSet>> = BTreeMap::new();
        for set in sets {
            groups.entry(start.for_set(set)).or_default().push(set);
        }

        for (from, group) in groups {
            if from >= head {
                continue;
            }
            let mut addresses: Vec<Address> = group.iter().map(|s| s.address).collect();
            addresses.sort();
            addresses.dedup();
            let mut kinds: Vec<EventKind> = group.iter().flat_map(|s| s.kind.events()).copied().collect();
            kinds.sort();
            kinds.dedup();

            for (window_from, window_to) in window::block_windows(from, head, self.window) {
                let logs = self
                    .source
                    .fetch_logs(&addresses, &kinds, window_from, window_to)
                    .await?;
                tracing::debug!(
                    from = window_from,
                    to = window_to,
                    head,
                    contracts = addresses.len(),
                    logs = logs.len(),
                    "fetched window"
                );
                for log in logs {
                    for set in group.iter().filter(|s| s.accepts(&log)) {
                        if let Some(bucket) = by_set.get_mut(&set.id) {
                            bucket.push(log.clone());
                        }
                    }
                }
            }
        }

        Ok(FetchedEvents { by_set, head })
    }

    /// Advance `prior` to the current chain head.
    pub async fn reconstruct(&self, sets: &[TrackedSet], prior: &LedgerState) -> Result<LedgerState> {
        if sets.is_empty() {
            return Ok(prior.clone());
        }
        let fetched = self
            .fetch(sets, StartBlock::Resume(&prior.checkpoint), None)
            .await?;
        Ok(apply(sets, prior, &fetched))
    }
}

/// Replay fetched logs onto `prior` and advance its checkpoint to the fetch head.
pub fn apply(sets: &[TrackedSet], prior: &LedgerState, fetched: &FetchedEvents) -> LedgerState {
    let snapshot = replay(sets, &prior.snapshot, &fetched.by_set);
    let mut checkpoint = prior.checkpoint.clone();
    for set in sets {
        checkpoint.record(&set.id, set.address, set.deployment_block);
    }
    checkpoint.advance(fetched.head);
    LedgerState {
        checkpoint,
        snapshot,
    }
}

/// Pure replay of per-set logs onto a prior snapshot.
///
/// Sets missing from `prior` (or stored with a different shape) start empty. Prior
/// entries for sets no longer tracked are carried over unchanged.
pub fn replay(
    sets: &[TrackedSet],
    prior: &LedgerSnapshot,
    events: &BTreeMap<String, Vec<EventLog>>,
) -> LedgerSnapshot {
    let mut snapshot = prior.clone();
    for set in sets {
        let logs = events.get(&set.id).map(Vec::as_slice).unwrap_or_default();
        let next = match &set.kind {
            SetKind::Roles {
                role_names,
                custodian,
            } => {
                let start = prior.roles(&set.id).cloned().unwrap_or_default();
                SetSnapshot::Roles(roles::replay_roles(&start, role_names, *custodian, logs))
            }
            SetKind::SenderApprovals | SetKind::AuthorizedSenders => {
                let start = prior.members(&set.id).cloned().unwrap_or_default();
                SetSnapshot::Members(toggles::replay_toggles(&start, logs))
            }
        };
        snapshot.insert(set.id.clone(), next);
    }
    snapshot
}
