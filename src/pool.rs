//! One pool's pass: ledger sync, record assembly, resolution.

use anyhow::{anyhow, Result};
use permissions_book_types::{AddressLabels, ContractSet};
use permissions_core::{
    aggregate, sync_pool, ControllerResolver, PoolSources, ResolutionScope,
};
use permissions_store::LedgerStore;
use permissions_transport::{ChainReader, LogSource};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{AppConfig, NetworkConfig, PoolConfig};
use crate::output::PoolReport;
use crate::permissions::{RecordBuilder, StaticPermissions};
use crate::signers::SignerCache;

/// An endpoint's log and state interfaces.
#[derive(Clone)]
pub struct Chain {
    pub logs: Arc<dyn LogSource>,
    pub reader: Arc<dyn ChainReader>,
}

/// Everything a pool pass reads besides the chain.
pub struct PoolInputs<'a> {
    pub app: &'a AppConfig,
    pub network: &'a NetworkConfig,
    pub pool: &'a PoolConfig,
    pub store: &'a dyn LedgerStore,
    pub governance: &'a ContractSet,
    /// Context pool records: looked up during resolution, never walked as governance.
    pub context: &'a ContractSet,
}

/// Index and resolve one pool.
///
/// `fork` is the fork endpoint for fork pools. Contract state of a fork pool is read
/// from the fork, so `signers` must be the fork endpoint's cache.
pub async fn index_pool(
    inputs: &PoolInputs<'_>,
    chain: &Chain,
    fork: Option<&Chain>,
    signers: &SignerCache,
) -> Result<PoolReport> {
    let PoolInputs {
        app,
        network,
        pool,
        store,
        governance,
        context,
    } = *inputs;
    let network_key = network.chain_id.to_string();
    let sets = pool.tracked_sets();

    let fork_spec = pool.fork.as_ref().map(|fork| fork.spec());
    let sources = match (&fork_spec, fork) {
        (Some(spec), Some(fork)) => PoolSources::Forked {
            origin: chain.logs.as_ref(),
            origin_window: network.block_window,
            fork: fork.logs.as_ref(),
            spec,
        },
        (Some(_), None) => {
            return Err(anyhow!("Fork pool {} requires a fork endpoint", pool.key));
        }
        (None, _) => PoolSources::Direct {
            source: chain.logs.as_ref(),
            window: network.block_window,
        },
    };
    let state = sync_pool(store, &network_key, &pool.key, &sets, sources).await?;

    let permissions = pool
        .permissions
        .as_deref()
        .map(|path| StaticPermissions::load(&app.resolve_path(path)))
        .unwrap_or_default();
    let reader = fork.unwrap_or(chain).reader.as_ref();
    let contracts = RecordBuilder {
        reader,
        signers,
        book: &pool.address_book,
        snapshot: &state.snapshot,
        permissions: &permissions,
    }
    .build(&pool.contracts)
    .await?;

    let mut scope_contracts = governance.clone();
    scope_contracts.extend(context.iter().cloned());
    scope_contracts.extend(contracts.iter().cloned());

    let mut labels = AddressLabels::from_strings(&network.labels)?;
    for record in scope_contracts.iter() {
        labels.insert_if_absent(record.address, record.name.clone());
    }

    let resolver = ControllerResolver::new(
        ResolutionScope {
            contracts: &scope_contracts,
            governance,
            labels: &labels,
            restricted: pool.restricted,
        },
        &app.decentralization,
    );
    let decentralization: BTreeMap<_, _> = contracts
        .iter()
        .map(|record| (record.name.clone(), resolver.decentralization(record)))
        .collect();
    let actions = aggregate(&app.actions, &resolver);

    tracing::info!(
        network = network.chain_id,
        pool = %pool.key,
        contracts = contracts.len(),
        actions = actions.len(),
        indexed_block = state.checkpoint.latest_block,
        "pool resolved"
    );

    Ok(PoolReport {
        indexed_block: state.checkpoint.latest_block,
        contracts,
        ledger: state.snapshot,
        decentralization,
        actions,
    })
}
