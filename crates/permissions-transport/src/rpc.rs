//! Blocking JSON-RPC client for EVM nodes.
//!
//! ## Usage
//!
//! ```ignore
//! let client = JsonRpcClient::new("https://eth.llamarpc.com");
//! let head = client.block_number()?;
//! let owner = client.call(&address, "owner()")?;
//! ```
//!
//! Log ranges a provider refuses as too wide or too full are bisected by
//! [`fetch_split`] until they are served.

use crate::abi::{decode_hex, encode_call};
use crate::logs::{format_quantity, parse_quantity, RawLog};
use alloy_primitives::{Address, B256};
use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// JSON-RPC error codes nodes use for reverted calls.
const REVERT_CODES: [i64; 2] = [3, -32015];

/// Provider messages refusing an `eth_getLogs` range as too wide or too full.
const RANGE_REJECTIONS: [&str; 8] = [
    "query returned more than",
    "response size exceeded",
    "block range",
    "range is too",
    "range too large",
    "is limited to",
    "too many logs",
    "too many results",
];

/// Whether `error` is a provider refusing a log range rather than a failure.
pub fn is_range_rejection(error: &anyhow::Error) -> bool {
    let s = format!("{:#}", error).to_ascii_lowercase();
    RANGE_REJECTIONS.iter().any(|needle| s.contains(needle))
}

/// Collect `[from_block, to_block]` through `fetch`, halving any range the provider
/// rejects. Sub-ranges are fetched in block order; any other error, or a rejected
/// single block, is returned as is.
pub fn fetch_split<T, F>(from_block: u64, to_block: u64, fetch: &mut F) -> Result<Vec<T>>
where
    F: FnMut(u64, u64) -> Result<Vec<T>>,
{
    match fetch(from_block, to_block) {
        Ok(items) => Ok(items),
        Err(e) if from_block < to_block && is_range_rejection(&e) => {
            let mid = from_block + (to_block - from_block) / 2;
            tracing::debug!(from_block, to_block, mid, error = %e, "log range rejected; splitting");
            let mut items = fetch_split(from_block, mid, fetch)?;
            items.extend(fetch_split(mid + 1, to_block, fetch)?);
            Ok(items)
        }
        Err(e) => Err(e),
    }
}

/// JSON-RPC client over a shared `ureq` agent. Cheap to clone.
#[derive(Clone)]
pub struct JsonRpcClient {
    endpoint: String,
    agent: ureq::Agent,
    next_id: Arc<AtomicU64>,
}

/// Outcome of `eth_call`: return data, or a revert reported by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Returned(Vec<u8>),
    Reverted(String),
}

impl JsonRpcClient {
    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Default connect timeout in seconds.
    const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

    fn build_agent(timeout: Duration, connect_timeout: Duration) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(connect_timeout)
            .build()
    }

    /// Create a client with the default timeouts.
    pub fn new(endpoint: &str) -> Self {
        Self::with_timeout(endpoint, Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            agent: Self::build_agent(
                timeout,
                Duration::from_secs(Self::DEFAULT_CONNECT_TIMEOUT_SECS).min(timeout),
            ),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, method: &str, params: Value) -> Result<std::result::Result<Value, Value>> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });

        let response: Value = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .send_json(&body)
            .map_err(|e| anyhow!("{} request failed: {}", method, e))?
            .into_json()
            .map_err(|e| anyhow!("Failed to parse {} response: {}", method, e))?;

        if let Some(error) = response.get("error") {
            return Ok(Err(error.clone()));
        }
        response
            .get("result")
            .cloned()
            .map(Ok)
            .ok_or_else(|| anyhow!("No result in {} response", method))
    }

    /// Execute a JSON-RPC method, turning error objects into errors.
    pub fn call_method(&self, method: &str, params: Value) -> Result<Value> {
        self.request(method, params)?.map_err(|error| {
            let msg = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error");
            anyhow!("{} error: {}", method, msg)
        })
    }

    /// `eth_blockNumber`.
    pub fn block_number(&self) -> Result<u64> {
        let value = self.call_method("eth_blockNumber", json!([]))?;
        let quantity = value
            .as_str()
            .ok_or_else(|| anyhow!("eth_blockNumber returned non-string {}", value))?;
        parse_quantity(quantity)
    }

    /// `eth_getLogs` over an inclusive block range for several emitters and any of
    /// the given `topic0` values.
    pub fn get_logs(
        &self,
        addresses: &[Address],
        topics: &[B256],
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawLog>> {
        let filter = json!({
            "address": addresses,
            "topics": [topics],
            "fromBlock": format_quantity(from_block),
            "toBlock": format_quantity(to_block),
        });
        let value = self.call_method("eth_getLogs", json!([filter]))?;
        serde_json::from_value(value).map_err(|e| anyhow!("Failed to decode eth_getLogs result: {}", e))
    }

    /// [`Self::get_logs`], bisecting ranges the provider refuses to serve whole.
    pub fn get_logs_split(
        &self,
        addresses: &[Address],
        topics: &[B256],
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<RawLog>> {
        fetch_split(from_block, to_block, &mut |from, to| {
            self.get_logs(addresses, topics, from, to)
        })
    }

    /// `eth_call` of a no-argument function at the latest block.
    pub fn call(&self, to: &Address, signature: &str) -> Result<CallOutcome> {
        let tx = json!({ "to": to, "data": encode_call(signature) });
        match self.request("eth_call", json!([tx, "latest"]))? {
            Ok(value) => {
                let data = value
                    .as_str()
                    .ok_or_else(|| anyhow!("eth_call returned non-string {}", value))?;
                Ok(CallOutcome::Returned(decode_hex(data)?))
            }
            Err(error) => {
                let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or_default();
                let msg = error
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("unknown error")
                    .to_string();
                if REVERT_CODES.contains(&code) || msg.to_lowercase().contains("revert") {
                    Ok(CallOutcome::Reverted(msg))
                } else {
                    Err(anyhow!("eth_call {} on {:#x} error: {}", signature, to, msg))
                }
            }
        }
    }

    /// `eth_getStorageAt` at the latest block.
    pub fn storage_at(&self, address: &Address, slot: &B256) -> Result<B256> {
        let value = self.call_method("eth_getStorageAt", json!([address, slot, "latest"]))?;
        let hex_word = value
            .as_str()
            .ok_or_else(|| anyhow!("eth_getStorageAt returned non-string {}", value))?;
        let bytes = decode_hex(hex_word)?;
        if bytes.len() > 32 {
            return Err(anyhow!("Storage word longer than 32 bytes: {}", hex_word));
        }
        let mut word = [0u8; 32];
        word[32 - bytes.len()..].copy_from_slice(&bytes);
        Ok(B256::from(word))
    }
}
