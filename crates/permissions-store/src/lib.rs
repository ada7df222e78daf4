//! Filesystem-backed persistence for the permission indexer.
//!
//! This crate provides:
//! - `LedgerStore`: per `(network, pool)` ledger state (checkpoint + snapshot)
//! - `FsLedgerStore`: one JSON document per network under `{root}/ledger/`
//! - `MemoryLedgerStore`: in-process store for tests and dry runs
//! - `FsOutputStore`: per-network permission documents under `{root}/permissions/`

pub mod ledger;
pub mod output;
pub mod paths;

pub use ledger::{FsLedgerStore, LedgerStore, MemoryLedgerStore};
pub use output::FsOutputStore;
