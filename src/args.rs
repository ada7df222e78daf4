use clap::Parser;
use permissions_transport::JsonRpcClient;
use std::path::PathBuf;

use crate::runner::Selection;

fn parse_pool_key(value: &str) -> Result<String, String> {
    let key = value.trim();
    if key.is_empty() {
        return Err("pool key must not be empty".to_string());
    }
    Ok(key.to_uppercase())
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Chain id of a network to index. Repeatable; defaults to every configured network.
    #[arg(long = "network", short = 'n', value_name = "CHAIN_ID")]
    pub networks: Vec<u64>,

    /// Pool key to index (case-insensitive). Repeatable; requires --network.
    #[arg(long = "pool", short = 'p', value_name = "POOL", value_parser = parse_pool_key)]
    pub pools: Vec<String>,

    /// Index fork pools only. Regular pools are skipped in this mode.
    #[arg(long, short = 't')]
    pub fork: bool,

    /// Directory holding networks.json and the other static inputs.
    #[arg(long, value_name = "PATH", default_value = "statics")]
    pub config_dir: PathBuf,

    /// Root for ledger state and permission documents.
    #[arg(long, value_name = "PATH", default_value = "out")]
    pub out_dir: PathBuf,

    /// Per-request RPC timeout in seconds.
    #[arg(long, default_value_t = JsonRpcClient::DEFAULT_TIMEOUT_SECS)]
    pub rpc_timeout_secs: u64,
}

impl Args {
    pub fn selection(&self) -> Selection {
        Selection {
            networks: self.networks.clone(),
            pools: self.pools.clone(),
            fork: self.fork,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pools_are_upper_cased() {
        let args = Args::parse_from(["permissions-book", "-n", "1", "--pool", "v3", "-p", "Gho"]);
        assert_eq!(args.pools, vec!["V3".to_string(), "GHO".to_string()]);
        assert_eq!(args.networks, vec![1]);
        assert!(!args.fork);
    }

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["permissions-book"]);
        assert_eq!(args.config_dir, PathBuf::from("statics"));
        assert_eq!(args.out_dir, PathBuf::from("out"));
        assert_eq!(args.rpc_timeout_secs, 30);
        assert_eq!(args.selection(), Selection::default());
    }

    #[test]
    fn test_fork_flag() {
        let args = Args::parse_from(["permissions-book", "--fork", "-n", "1"]);
        assert!(args.selection().fork);
    }
}
