//! Shared fixtures for core integration tests.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use parking_lot::Mutex;
use permissions_book_types::{Address, EventKind, EventLog, LedgerEvent, B256};
use permissions_transport::LogSource;

/// A recorded `fetch_logs` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub addresses: Vec<Address>,
    pub from: u64,
    pub to: u64,
}

/// In-memory chain: a fixed head and a list of logs.
pub struct MockChain {
    head: u64,
    logs: Vec<EventLog>,
    requests: Mutex<Vec<Request>>,
    head_queries: Mutex<usize>,
    fail: bool,
}

impl MockChain {
    pub fn new(head: u64, logs: Vec<EventLog>) -> Self {
        Self {
            head,
            logs,
            requests: Mutex::new(Vec::new()),
            head_queries: Mutex::new(0),
            fail: false,
        }
    }

    pub fn failing(head: u64) -> Self {
        Self {
            fail: true,
            ..Self::new(head, Vec::new())
        }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    pub fn head_queries(&self) -> usize {
        *self.head_queries.lock()
    }
}

#[async_trait::async_trait]
impl LogSource for MockChain {
    async fn chain_head(&self) -> Result<u64> {
        *self.head_queries.lock() += 1;
        Ok(self.head)
    }

    async fn fetch_logs(
        &self,
        addresses: &[Address],
        kinds: &[EventKind],
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<EventLog>> {
        if self.fail {
            return Err(anyhow!("connection reset"));
        }
        self.requests.lock().push(Request {
            addresses: addresses.to_vec(),
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

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn role_id(name: &str) -> B256 {
    alloy_primitives::keccak256(name.as_bytes())
}

pub fn at(address: Address, block: u64, index: u64, event: LedgerEvent) -> EventLog {
    EventLog {
        address,
        block_number: block,
        log_index: index,
        event,
    }
}

pub fn grant(contract: Address, block: u64, role: &str, account: Address) -> EventLog {
    at(
        contract,
        block,
        0,
        LedgerEvent::RoleGranted {
            role: role_id(role),
            account,
        },
    )
}

pub fn revoke(contract: Address, block: u64, role: &str, account: Address) -> EventLog {
    at(
        contract,
        block,
        0,
        LedgerEvent::RoleRevoked {
            role: role_id(role),
            account,
        },
    )
}
