//! Decoded event logs consumed by the role ledger.

use alloy_primitives::{keccak256, Address, B256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event families the ledger understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    RoleGranted,
    RoleRevoked,
    SenderUpdated,
    AuthorizedSenderAdded,
    AuthorizedSenderRemoved,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::RoleGranted,
        EventKind::RoleRevoked,
        EventKind::SenderUpdated,
        EventKind::AuthorizedSenderAdded,
        EventKind::AuthorizedSenderRemoved,
    ];

    /// Canonical Solidity event signature.
    pub fn signature(&self) -> &'static str {
        match self {
            EventKind::RoleGranted => "RoleGranted(bytes32,address,address)",
            EventKind::RoleRevoked => "RoleRevoked(bytes32,address,address)",
            EventKind::SenderUpdated => "SenderUpdated(address,bool)",
            EventKind::AuthorizedSenderAdded => "AuthorizedSenderAdded(address)",
            EventKind::AuthorizedSenderRemoved => "AuthorizedSenderRemoved(address)",
        }
    }

    /// `topic0` of logs emitted for this event.
    pub fn topic0(&self) -> B256 {
        keccak256(self.signature().as_bytes())
    }

    pub fn from_topic0(topic: &B256) -> Option<EventKind> {
        Self::ALL.into_iter().find(|kind| &kind.topic0() == topic)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::RoleGranted => "RoleGranted",
            EventKind::RoleRevoked => "RoleRevoked",
            EventKind::SenderUpdated => "SenderUpdated",
            EventKind::AuthorizedSenderAdded => "AuthorizedSenderAdded",
            EventKind::AuthorizedSenderRemoved => "AuthorizedSenderRemoved",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum LedgerEvent {
    RoleGranted { role: B256, account: Address },
    RoleRevoked { role: B256, account: Address },
    SenderUpdated { sender: Address, approved: bool },
    AuthorizedSenderAdded { sender: Address },
    AuthorizedSenderRemoved { sender: Address },
}

impl LedgerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            LedgerEvent::RoleGranted { .. } => EventKind::RoleGranted,
            LedgerEvent::RoleRevoked { .. } => EventKind::RoleRevoked,
            LedgerEvent::SenderUpdated { .. } => EventKind::SenderUpdated,
            LedgerEvent::AuthorizedSenderAdded { .. } => EventKind::AuthorizedSenderAdded,
            LedgerEvent::AuthorizedSenderRemoved { .. } => EventKind::AuthorizedSenderRemoved,
        }
    }

    /// Signed membership change for boolean allow-list events; `None` for role events.
    pub fn membership_delta(&self) -> Option<(Address, i64)> {
        match self {
            LedgerEvent::SenderUpdated { sender, approved } => {
                Some((*sender, if *approved { 1 } else { -1 }))
            }
            LedgerEvent::AuthorizedSenderAdded { sender } => Some((*sender, 1)),
            LedgerEvent::AuthorizedSenderRemoved { sender } => Some((*sender, -1)),
            LedgerEvent::RoleGranted { .. } | LedgerEvent::RoleRevoked { .. } => None,
        }
    }
}

/// A decoded log positioned on its chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLog {
    /// Emitting contract.
    pub address: Address,
    pub block_number: u64,
    pub log_index: u64,
    pub event: LedgerEvent,
}
