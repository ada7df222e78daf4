//! Shared types for the permissions-book workspace.
//!
//! This crate provides the data model used by every other crate in the workspace:
//! - [`address`]: address parsing and the typed [`AddressBook`]
//! - [`contract`]: resolved contracts, their access modifiers and controllers
//! - [`ledger`]: role/membership snapshots and indexing checkpoints
//! - [`events`]: decoded event logs consumed by the role ledger
//! - [`classification`]: the controller taxonomy

pub mod address;
pub mod classification;
pub mod contract;
pub mod events;
pub mod ledger;

pub use address::{address_key, parse_address, AddressBook, AddressLabels, AddressRef};
pub use alloy_primitives::{Address, B256};
pub use classification::ControllerClassification;
pub use contract::{AccessModifier, ContractRecord, ContractSet, ControllerRef};
pub use events::{EventKind, EventLog, LedgerEvent};
pub use ledger::{
    IndexCheckpoint, IndexedContract, LedgerSnapshot, LedgerState, MembershipSet, RoleSet,
    SetSnapshot,
};
