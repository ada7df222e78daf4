//! `permissions-book` CLI.
//!
//! Indexes the selected networks and writes `{out-dir}/permissions/{chain_id}-permissions.json`
//! for each. Ledger checkpoints live under `{out-dir}/ledger/` and make reruns
//! incremental. Log verbosity follows `RUST_LOG` (default `info`).
use anyhow::{anyhow, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use permissions_book::args::Args;
use permissions_book::config::AppConfig;
use permissions_book::runner::{self, RpcConnector};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = AppConfig::load(&args.config_dir)?;
    let selection = args.selection();
    selection.validate(&config)?;

    let mode = if selection.fork { "fork" } else { "regular" };
    tracing::info!(
        mode,
        networks = ?selection.networks,
        pools = ?selection.pools,
        "starting run"
    );

    let connector = Arc::new(RpcConnector::new(Duration::from_secs(args.rpc_timeout_secs)));
    let summary = runner::run(Arc::new(config), &selection, connector, &args.out_dir).await;
    summary.log();

    if !summary.is_success() {
        return Err(anyhow!("{} network(s) failed", summary.failed.len()));
    }
    Ok(())
}
