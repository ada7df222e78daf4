//! Fork overlay and per-pool ledger sync.
//!
//! A fork pool simulates a timeline that diverges from a base pool at an activation
//! block. Its state is rebuilt on every run:
//!
//! 1. seed from the base pool's persisted snapshot and checkpoint
//! 2. index the origin chain from the base checkpoint, capped at the activation block
//! 3. index the fork chain from the activation block to its head
//! 4. replay origin logs followed by fork logs
//!
//! The result is stored under the fork pool's own key. The base pool's state is read,
//! never written.

use anyhow::{anyhow, Result};
use permissions_book_types::LedgerState;
use permissions_store::LedgerStore;
use permissions_transport::LogSource;

use crate::ledger::{apply, RoleLedger, StartBlock, TrackedSet};

/// Default block window for fork endpoints.
pub const DEFAULT_FORK_WINDOW: u64 = 50_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkSpec {
    pub base_pool: String,
    pub activation_block: u64,
    pub window: u64,
}

pub struct ForkOverlay<'a> {
    origin: RoleLedger<'a>,
    fork: RoleLedger<'a>,
    spec: &'a ForkSpec,
}

impl<'a> ForkOverlay<'a> {
    pub fn new(
        origin: &'a dyn LogSource,
        origin_window: u64,
        fork: &'a dyn LogSource,
        spec: &'a ForkSpec,
    ) -> Self {
        Self {
            origin: RoleLedger::new(origin, origin_window),
            fork: RoleLedger::new(fork, spec.window),
            spec,
        }
    }

    /// Rebuild a fork pool's state on top of the base pool's persisted state.
    ///
    /// With no base state yet, the fork starts from an empty snapshot and every set
    /// is indexed from its deployment block on the origin chain.
    pub async fn reconstruct(
        &self,
        sets: &[TrackedSet],
        base: Option<&LedgerState>,
    ) -> Result<LedgerState> {
        let seed = base.cloned().unwrap_or_default();
        if sets.is_empty() {
            return Ok(seed);
        }

        let activation = self.spec.activation_block;
        let origin = self
            .origin
            .fetch(sets, StartBlock::Resume(&seed.checkpoint), Some(activation))
            .await?;
        let fork = self.fork.fetch(sets, StartBlock::At(activation), None).await?;

        tracing::debug!(
            base_pool = %self.spec.base_pool,
            activation,
            origin_logs = origin.total(),
            fork_logs = fork.total(),
            fork_head = fork.head,
            "merged fork streams"
        );

        let merged = origin.chain(fork);
        let mut state = apply(sets, &seed, &merged);
        state.checkpoint.latest_block = merged.head;
        Ok(state)
    }
}

/// Log sources for one pool.
pub enum PoolSources<'a> {
    Direct {
        source: &'a dyn LogSource,
        window: u64,
    },
    Forked {
        origin: &'a dyn LogSource,
        origin_window: u64,
        fork: &'a dyn LogSource,
        spec: &'a ForkSpec,
    },
}

/// Bring one pool's ledger up to date and persist it under `(network, pool)`.
pub async fn sync_pool(
    store: &dyn LedgerStore,
    network: &str,
    pool: &str,
    sets: &[TrackedSet],
    sources: PoolSources<'_>,
) -> Result<LedgerState> {
    let state = match sources {
        PoolSources::Direct { source, window } => {
            let prior = store.load_state(network, pool)?.unwrap_or_default();
            RoleLedger::new(source, window).reconstruct(sets, &prior).await?
        }
        PoolSources::Forked {
            origin,
            origin_window,
            fork,
            spec,
        } => {
            if spec.base_pool == pool {
                return Err(anyhow!("Fork pool {} cannot use itself as base pool", pool));
            }
            let base = store.load_state(network, &spec.base_pool)?;
            if base.is_none() {
                tracing::warn!(
                    network,
                    pool,
                    base_pool = %spec.base_pool,
                    "base pool has no ledger state; forking from deployment blocks"
                );
            }
            ForkOverlay::new(origin, origin_window, fork, spec)
                .reconstruct(sets, base.as_ref())
                .await?
        }
    };

    store.save_state(network, pool, &state)?;
    tracing::info!(
        network,
        pool,
        latest_block = state.checkpoint.latest_block,
        sets = state.snapshot.len(),
        "ledger synced"
    );
    Ok(state)
}
