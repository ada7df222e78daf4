//! Permission indexing core.
//!
//! This crate provides:
//! - [`ledger`]: event-sourced reconstruction of role and membership sets
//! - [`fork`]: the fork overlay and the per-pool sync entry point
//! - [`resolver`]: controller resolution, classification and action aggregation

pub mod fork;
pub mod ledger;
pub mod resolver;

pub use fork::{sync_pool, ForkOverlay, ForkSpec, PoolSources};
pub use ledger::{FetchedEvents, RoleLedger, SetKind, StartBlock, TrackedSet};
pub use resolver::{
    aggregate, ActionControllers, ActionsConfig, ControllerResolver, Decentralization,
    DecentralizationConfig, Ownership, OwnershipMode, ResolutionScope, WalkOutcome,
};
