//! In-memory chain endpoints.

use anyhow::{anyhow, Result};
use parking_lot::Mutex;
use permissions_book::pool::Chain;
use permissions_book::runner::Connector;
use permissions_book_types::{Address, EventKind, EventLog};
use permissions_transport::{ChainReader, LogSource};
use std::collections::HashMap;
use std::sync::Arc;

/// A recorded `fetch_logs` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub from: u64,
    pub to: u64,
}

/// A chain with fixed head, logs, getter results, Safes and proxy admins.
#[derive(Default)]
pub struct MockNode {
    head: u64,
    logs: Vec<EventLog>,
    getters: HashMap<(Address, String), Address>,
    safes: HashMap<Address, (Vec<Address>, u64)>,
    proxy_admins: HashMap<Address, Address>,
    windows: Mutex<Vec<Window>>,
    safe_reads: Mutex<usize>,
}

impl MockNode {
    pub fn new(head: u64) -> Self {
        Self {
            head,
            ..Self::default()
        }
    }

    pub fn with_logs(mut self, logs: Vec<EventLog>) -> Self {
        self.logs = logs;
        self
    }

    pub fn with_getter(mut self, target: Address, signature: &str, result: Address) -> Self {
        self.getters.insert((target, signature.to_string()), result);
        self
    }

    pub fn with_safe(mut self, address: Address, signers: Vec<Address>, threshold: u64) -> Self {
        self.safes.insert(address, (signers, threshold));
        self
    }

    pub fn with_proxy_admin(mut self, proxy: Address, admin: Address) -> Self {
        self.proxy_admins.insert(proxy, admin);
        self
    }

    pub fn windows(&self) -> Vec<Window> {
        self.windows.lock().clone()
    }

    pub fn safe_reads(&self) -> usize {
        *self.safe_reads.lock()
    }
}

#[async_trait::async_trait]
impl LogSource for MockNode {
    async fn chain_head(&self) -> Result<u64> {
        Ok(self.head)
    }

    async fn fetch_logs(
        &self,
        addresses: &[Address],
        kinds: &[EventKind],
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<EventLog>> {
        self.windows.lock().push(Window {
            from: from_block,
            to: to_block,
        });
        Ok(self
            .logs
            .iter()
            .filter(|log| addresses.contains(&log.address))
            .filter(|log| kinds.contains(&log.event.kind()))
            .filter(|log| (from_block..=to_block).contains(&log.block_number))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl ChainReader for MockNode {
    async fn call_address(&self, target: Address, signature: &str) -> Result<Address> {
        self.getters
            .get(&(target, signature.to_string()))
            .copied()
            .ok_or_else(|| anyhow!("execution reverted: {} on {}", signature, target))
    }

    async fn safe_owners(&self, address: Address) -> Result<Vec<Address>> {
        *self.safe_reads.lock() += 1;
        Ok(self
            .safes
            .get(&address)
            .map(|(signers, _)| signers.clone())
            .unwrap_or_default())
    }

    async fn safe_threshold(&self, address: Address) -> Result<Option<u64>> {
        Ok(self.safes.get(&address).map(|(_, threshold)| *threshold))
    }

    async fn proxy_admin(&self, address: Address) -> Result<Option<Address>> {
        Ok(self.proxy_admins.get(&address).copied())
    }
}

/// Hands out registered nodes by endpoint variable name.
#[derive(Default)]
pub struct MockConnector {
    nodes: HashMap<String, Arc<MockNode>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, rpc_url_env: &str, node: Arc<MockNode>) -> Self {
        self.nodes.insert(rpc_url_env.to_string(), node);
        self
    }
}

impl Connector for MockConnector {
    fn connect(&self, rpc_url_env: &str) -> Result<Chain> {
        let node = self
            .nodes
            .get(rpc_url_env)
            .ok_or_else(|| anyhow!("RPC endpoint variable {} is not set", rpc_url_env))?;
        Ok(Chain {
            logs: node.clone(),
            reader: node.clone(),
        })
    }
}
