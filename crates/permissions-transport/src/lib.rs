//! EVM Transport Layer
//!
//! Network transport for permission indexing over Ethereum JSON-RPC.
//!
//! This crate provides:
//! - [`rpc`]: blocking JSON-RPC client (`eth_blockNumber`, `eth_getLogs`, `eth_call`,
//!   `eth_getStorageAt`)
//! - [`logs`]: raw log parsing and decoding into [`EventLog`](permissions_book_types::EventLog)
//! - [`abi`]: the handful of ABI word decoders the indexer needs
//! - [`source`]: the async [`LogSource`] and [`ChainReader`] seams the core consumes
//!
//! # Example
//!
//! ```ignore
//! use permissions_transport::{JsonRpcClient, LogSource};
//!
//! let client = JsonRpcClient::new("https://eth.llamarpc.com");
//! let head = client.chain_head().await?;
//! ```

pub mod abi;
pub mod logs;
pub mod rpc;
pub mod source;

pub use rpc::JsonRpcClient;
pub use source::{ChainReader, LogSource};

use anyhow::{anyhow, Result};

/// Read an RPC endpoint URL from the environment variable `var`.
///
/// Used by network configuration, which names variables instead of embedding URLs
/// (provider URLs usually carry API keys).
pub fn endpoint_from_env(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(url) if !url.trim().is_empty() => Ok(url.trim().to_string()),
        Ok(_) => Err(anyhow!("RPC endpoint variable {} is empty", var)),
        Err(_) => Err(anyhow!("RPC endpoint variable {} is not set", var)),
    }
}
