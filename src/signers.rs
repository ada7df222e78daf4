//! Per-network Safe signer cache.
//!
//! The same multisig usually guards many modifiers across a network's pools. Signers
//! and thresholds are read once per address per run and reused; nothing is persisted,
//! since a Safe's signer set can change between runs.

use anyhow::Result;
use parking_lot::Mutex;
use permissions_book_types::{Address, ControllerRef};
use permissions_transport::ChainReader;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignerInfo {
    pub signers: Vec<Address>,
    pub threshold: Option<u64>,
}

#[derive(Default)]
pub struct SignerCache {
    entries: Mutex<HashMap<Address, SignerInfo>>,
}

impl SignerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signers and threshold of `address`; empty signers when it is not a Safe.
    pub async fn lookup(&self, reader: &dyn ChainReader, address: Address) -> Result<SignerInfo> {
        let cached = self.entries.lock().get(&address).cloned();
        if let Some(info) = cached {
            return Ok(info);
        }

        let signers = reader.safe_owners(address).await?;
        let threshold = if signers.is_empty() {
            None
        } else {
            reader.safe_threshold(address).await?
        };
        let info = SignerInfo { signers, threshold };

        tracing::debug!(
            address = %address,
            signers = info.signers.len(),
            threshold = ?info.threshold,
            "resolved signers"
        );
        self.entries.lock().insert(address, info.clone());
        Ok(info)
    }

    /// Build a [`ControllerRef`] for `address`, attaching Safe signers when present.
    pub async fn controller(
        &self,
        reader: &dyn ChainReader,
        address: Address,
        remote_chain: Option<String>,
    ) -> Result<ControllerRef> {
        // Remote controllers cannot be read through this chain's endpoint.
        let info = if remote_chain.is_some() {
            SignerInfo::default()
        } else {
            self.lookup(reader, address).await?
        };
        Ok(ControllerRef {
            address,
            multisig_signers: info.signers,
            threshold: info.threshold,
            remote_chain,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
