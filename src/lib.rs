//! Permission indexer for multi-network EVM deployments.
//!
//! Each run indexes role and allow-list events into a checkpointed ledger, assembles the
//! pools' contract records and resolves who ultimately controls every guarded action:
//!
//! - [`config`]: declarative networks, pools and contract manifests
//! - [`permissions`]: contract record assembly from static tables and live reads
//! - [`signers`]: per-network Safe signer cache
//! - [`pool`]: one pool's ledger sync and resolution
//! - [`runner`]: concurrent per-network execution and the run summary
//! - [`output`]: the per-network permission document
//!
//! The ledger, fork overlay and resolver themselves live in `permissions-core`.

pub mod args;
pub mod config;
pub mod output;
pub mod permissions;
pub mod pool;
pub mod runner;
pub mod signers;
