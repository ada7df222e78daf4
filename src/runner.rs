//! Network runner.
//!
//! Each selected network runs as its own Tokio task; pools within a network run
//! sequentially in configuration order, so a pool can use the governance records of
//! pools indexed before it. A failing network is logged and reported in the
//! [`RunSummary`] without affecting the others.

use anyhow::{anyhow, Result};
use permissions_store::{FsLedgerStore, FsOutputStore, LedgerStore};
use permissions_transport::{endpoint_from_env, JsonRpcClient};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::config::{AppConfig, NetworkConfig};
use crate::output::NetworkReport;
use crate::pool::{index_pool, Chain, PoolInputs};
use crate::signers::SignerCache;

/// Opens endpoints by the environment variable naming their URL.
pub trait Connector: Send + Sync {
    fn connect(&self, rpc_url_env: &str) -> Result<Chain>;
}

/// JSON-RPC endpoints over HTTP.
pub struct RpcConnector {
    timeout: Duration,
}

impl RpcConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Connector for RpcConnector {
    fn connect(&self, rpc_url_env: &str) -> Result<Chain> {
        let endpoint = endpoint_from_env(rpc_url_env)?;
        let client = Arc::new(JsonRpcClient::with_timeout(&endpoint, self.timeout));
        Ok(Chain {
            logs: client.clone(),
            reader: client,
        })
    }
}

/// Which networks and pools a run covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Empty means every configured network.
    pub networks: Vec<u64>,
    /// Empty means every pool of the selected networks.
    pub pools: Vec<String>,
    /// Fork mode is exclusive: a run covers either fork pools or regular pools.
    pub fork: bool,
}

impl Selection {
    pub fn validate(&self, config: &AppConfig) -> Result<()> {
        for chain_id in &self.networks {
            if config.network(*chain_id).is_none() {
                let available: Vec<String> = config.networks.keys().map(u64::to_string).collect();
                return Err(anyhow!(
                    "Unknown network {} (available: {})",
                    chain_id,
                    available.join(", ")
                ));
            }
        }

        if self.pools.is_empty() {
            return Ok(());
        }
        if self.networks.is_empty() {
            return Err(anyhow!("--pool requires --network"));
        }
        for chain_id in &self.networks {
            let Some(network) = config.network(*chain_id) else {
                continue;
            };
            for pool in &self.pools {
                if network.pool(pool).is_none() {
                    return Err(anyhow!("Unknown pool {} for network {}", pool, chain_id));
                }
            }
        }
        Ok(())
    }

    pub fn network_ids(&self, config: &AppConfig) -> Vec<u64> {
        if self.networks.is_empty() {
            config.networks.keys().copied().collect()
        } else {
            self.networks.clone()
        }
    }

    /// Selected pool keys of `network`, in configuration order.
    pub fn pools_for(&self, network: &NetworkConfig) -> Vec<String> {
        network
            .pools
            .iter()
            .filter(|pool| self.pools.is_empty() || self.pools.contains(&pool.key))
            .filter(|pool| pool.is_fork() == self.fork)
            .map(|pool| pool.key.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkOutcome {
    pub chain_id: u64,
    pub pools: usize,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkFailure {
    /// `None` when the task itself panicked or was cancelled.
    pub chain_id: Option<u64>,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub succeeded: Vec<NetworkOutcome>,
    pub failed: Vec<NetworkFailure>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn log(&self) {
        for outcome in &self.succeeded {
            tracing::info!(
                network = outcome.chain_id,
                pools = outcome.pools,
                path = %outcome.path.display(),
                "network written"
            );
        }
        for failure in &self.failed {
            tracing::error!(network = ?failure.chain_id, error = %failure.error, "network failed");
        }
        tracing::info!(
            succeeded = self.succeeded.len(),
            failed = self.failed.len(),
            "run complete"
        );
    }
}

/// Index every selected pool of `network` and write the network's document.
///
/// Pools not selected keep their entries from the previous document.
pub async fn index_network(
    app: &AppConfig,
    network: &NetworkConfig,
    pools: &[String],
    connector: &dyn Connector,
    store: &dyn LedgerStore,
    output: &FsOutputStore,
) -> Result<(NetworkReport, PathBuf)> {
    let network_key = network.chain_id.to_string();
    let chain = connector.connect(&network.rpc_url_env)?;
    let signers = SignerCache::new();

    let mut report = output
        .read::<NetworkReport>(&network_key)?
        .unwrap_or_else(|| NetworkReport::new(network));
    report.name = network.name.clone();

    for key in pools {
        let pool = network
            .pool(key)
            .ok_or_else(|| anyhow!("Unknown pool {} for network {}", key, network.chain_id))?;
        let governance = report.governance_for(pool);
        let context = report.context_for(pool);
        let inputs = PoolInputs {
            app,
            network,
            pool,
            store,
            governance: &governance,
            context: &context,
        };

        let pool_report = match &pool.fork {
            Some(fork) => {
                let fork_chain = connector.connect(&fork.rpc_url_env)?;
                let fork_signers = SignerCache::new();
                index_pool(&inputs, &chain, Some(&fork_chain), &fork_signers).await?
            }
            None => index_pool(&inputs, &chain, None, &signers).await?,
        };
        report.record(&pool.key, pool_report);
    }

    let path = output.write(&network_key, &report)?;
    tracing::debug!(network = network.chain_id, signers = signers.len(), "signer cache");
    Ok((report, path))
}

async fn run_network(
    app: &AppConfig,
    chain_id: u64,
    pools: &[String],
    connector: &dyn Connector,
    out_dir: &Path,
) -> Result<NetworkOutcome> {
    let network = app
        .network(chain_id)
        .ok_or_else(|| anyhow!("Unknown network {}", chain_id))?;
    let store = FsLedgerStore::new(out_dir)?;
    let output = FsOutputStore::new(out_dir)?;

    tracing::info!(network = chain_id, name = %network.name, pools = ?pools, "indexing network");
    let (_, path) = index_network(app, network, pools, connector, &store, &output).await?;
    Ok(NetworkOutcome {
        chain_id,
        pools: pools.len(),
        path,
    })
}

/// Run every selected network concurrently.
pub async fn run(
    app: Arc<AppConfig>,
    selection: &Selection,
    connector: Arc<dyn Connector>,
    out_dir: &Path,
) -> RunSummary {
    let mut tasks = JoinSet::new();
    for chain_id in selection.network_ids(&app) {
        let Some(network) = app.network(chain_id) else {
            continue;
        };
        let pools = selection.pools_for(network);
        if pools.is_empty() {
            tracing::debug!(network = chain_id, fork = selection.fork, "no pools selected");
            continue;
        }

        let app = Arc::clone(&app);
        let connector = Arc::clone(&connector);
        let out_dir = out_dir.to_path_buf();
        tasks.spawn(async move {
            let result = run_network(&app, chain_id, &pools, connector.as_ref(), &out_dir).await;
            (chain_id, result)
        });
    }

    let mut summary = RunSummary::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(outcome))) => summary.succeeded.push(outcome),
            Ok((chain_id, Err(e))) => {
                tracing::error!(network = chain_id, error = %e, "network failed");
                summary.failed.push(NetworkFailure {
                    chain_id: Some(chain_id),
                    error: e.to_string(),
                });
            }
            Err(e) => summary.failed.push(NetworkFailure {
                chain_id: None,
                error: format!("network task failed: {}", e),
            }),
        }
    }
    summary.succeeded.sort_by_key(|outcome| outcome.chain_id);
    summary
}
