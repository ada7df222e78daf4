//! Async seams between the indexer core and the chain.
//!
//! The core depends only on [`LogSource`] and [`ChainReader`]; [`JsonRpcClient`] implements
//! both by running its blocking calls on the Tokio blocking pool. Tests substitute
//! in-memory implementations.

use crate::abi::{decode_address, decode_address_array, decode_u64, slot_to_address};
use crate::logs::decode_logs;
use crate::rpc::{CallOutcome, JsonRpcClient};
use alloy_primitives::{b256, Address, B256};
use anyhow::{anyhow, Result};
use permissions_book_types::{EventKind, EventLog};

/// EIP-1967 admin slot: `bytes32(uint256(keccak256("eip1967.proxy.admin")) - 1)`.
pub const EIP1967_ADMIN_SLOT: B256 =
    b256!("b53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103");

/// Paginated event source.
#[async_trait::async_trait]
pub trait LogSource: Send + Sync {
    /// Current chain head block number.
    async fn chain_head(&self) -> Result<u64>;

    /// Decoded logs of `kinds` emitted by `addresses` in the inclusive range
    /// `[from_block, to_block]`, ordered by block and log index.
    async fn fetch_logs(
        &self,
        addresses: &[Address],
        kinds: &[EventKind],
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<EventLog>>;
}

/// Direct contract reads used while assembling contract records.
#[async_trait::async_trait]
pub trait ChainReader: Send + Sync {
    /// Call a no-argument getter returning an `address`.
    async fn call_address(&self, target: Address, signature: &str) -> Result<Address>;

    /// Safe signers of `address`; empty when it is not a Safe.
    async fn safe_owners(&self, address: Address) -> Result<Vec<Address>>;

    /// Safe approval threshold of `address`; `None` when it is not a Safe.
    async fn safe_threshold(&self, address: Address) -> Result<Option<u64>>;

    /// Proxy admin from the EIP-1967 admin slot; `None` when the slot is empty.
    async fn proxy_admin(&self, address: Address) -> Result<Option<Address>>;
}

async fn blocking<T, F>(client: &JsonRpcClient, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(JsonRpcClient) -> Result<T> + Send + 'static,
{
    let client = client.clone();
    tokio::task::spawn_blocking(move || f(client))
        .await
        .map_err(|e| anyhow!("RPC task failed: {}", e))?
}

#[async_trait::async_trait]
impl LogSource for JsonRpcClient {
    async fn chain_head(&self) -> Result<u64> {
        blocking(self, |client| client.block_number()).await
    }

    async fn fetch_logs(
        &self,
        addresses: &[Address],
        kinds: &[EventKind],
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<EventLog>> {
        let addresses = addresses.to_vec();
        let topics: Vec<B256> = kinds.iter().map(EventKind::topic0).collect();
        let raw = blocking(self, move |client| {
            client.get_logs_split(&addresses, &topics, from_block, to_block)
        })
        .await?;
        let logs = decode_logs(&raw);
        tracing::debug!(
            endpoint = self.endpoint(),
            from_block,
            to_block,
            raw = raw.len(),
            decoded = logs.len(),
            "fetched logs"
        );
        Ok(logs)
    }
}

#[async_trait::async_trait]
impl ChainReader for JsonRpcClient {
    async fn call_address(&self, target: Address, signature: &str) -> Result<Address> {
        let sig = signature.to_string();
        let outcome = blocking(self, move |client| client.call(&target, &sig)).await?;
        match outcome {
            CallOutcome::Returned(data) => decode_address(&data)
                .map_err(|e| anyhow!("{} on {:#x} returned bad data: {}", signature, target, e)),
            CallOutcome::Reverted(msg) => {
                Err(anyhow!("{} on {:#x} reverted: {}", signature, target, msg))
            }
        }
    }

    async fn safe_owners(&self, address: Address) -> Result<Vec<Address>> {
        let outcome = blocking(self, move |client| client.call(&address, "getOwners()")).await?;
        match outcome {
            CallOutcome::Returned(data) if data.is_empty() => Ok(Vec::new()),
            CallOutcome::Returned(data) => Ok(decode_address_array(&data).unwrap_or_default()),
            CallOutcome::Reverted(_) => Ok(Vec::new()),
        }
    }

    async fn safe_threshold(&self, address: Address) -> Result<Option<u64>> {
        let outcome =
            blocking(self, move |client| client.call(&address, "getThreshold()")).await?;
        match outcome {
            CallOutcome::Returned(data) if data.is_empty() => Ok(None),
            CallOutcome::Returned(data) => Ok(decode_u64(&data).ok()),
            CallOutcome::Reverted(_) => Ok(None),
        }
    }

    async fn proxy_admin(&self, address: Address) -> Result<Option<Address>> {
        let slot = blocking(self, move |client| {
            client.storage_at(&address, &EIP1967_ADMIN_SLOT)
        })
        .await?;
        let admin = slot_to_address(&slot);
        Ok((!admin.is_zero()).then_some(admin))
    }
}
