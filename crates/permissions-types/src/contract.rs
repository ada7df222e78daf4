//! Resolved contracts and the access modifiers that gate them.
//!
//! A [`ContractRecord`] is built fresh every run from static permission definitions,
//! ledger memberships and direct chain reads. Records are immutable once assembled
//! into a [`ContractSet`]; the resolver only ever reads them.

use crate::address::address_key;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A controller entry behind an access modifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerRef {
    pub address: Address,
    /// Safe signers; empty when the address is not a multisig.
    #[serde(default)]
    pub multisig_signers: Vec<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u64>,
    /// Network tag for controllers living on another chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_chain: Option<String>,
}

impl ControllerRef {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            multisig_signers: Vec::new(),
            threshold: None,
            remote_chain: None,
        }
    }

    pub fn multisig(address: Address, signers: Vec<Address>, threshold: u64) -> Self {
        Self {
            address,
            multisig_signers: signers,
            threshold: Some(threshold),
            remote_chain: None,
        }
    }

    pub fn with_remote_chain(mut self, chain: impl Into<String>) -> Self {
        self.remote_chain = Some(chain.into());
        self
    }

    pub fn is_multisig(&self) -> bool {
        !self.multisig_signers.is_empty()
    }
}

/// An access-control gate on a set of contract functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessModifier {
    pub name: String,
    /// Ordered controllers. The first entry is the canonical primary controller.
    pub controllers: Vec<ControllerRef>,
    pub functions: Vec<String>,
}

impl AccessModifier {
    pub fn new(name: impl Into<String>, controllers: Vec<ControllerRef>) -> Self {
        Self {
            name: name.into(),
            controllers,
            functions: Vec::new(),
        }
    }

    pub fn with_functions<I, S>(mut self, functions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.functions = functions.into_iter().map(Into::into).collect();
        self
    }

    pub fn primary(&self) -> Option<&ControllerRef> {
        self.controllers.first()
    }

    pub fn gates_any(&self, functions: &[String]) -> bool {
        self.functions.iter().any(|f| functions.contains(f))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRecord {
    pub name: String,
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_admin: Option<Address>,
    #[serde(default)]
    pub modifiers: Vec<AccessModifier>,
}

impl ContractRecord {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
            proxy_admin: None,
            modifiers: Vec::new(),
        }
    }

    pub fn with_proxy_admin(mut self, admin: Address) -> Self {
        self.proxy_admin = Some(admin);
        self
    }

    pub fn with_modifier(mut self, modifier: AccessModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }
}

/// Name-keyed, ordered collection of contract records for one pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractSet {
    records: BTreeMap<String, ContractRecord>,
}

impl ContractSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its own name, replacing any previous record of that name.
    pub fn insert(&mut self, record: ContractRecord) {
        self.records.insert(record.name.clone(), record);
    }

    pub fn get(&self, name: &str) -> Option<&ContractRecord> {
        self.records.get(name)
    }

    /// All records whose address equals `address`, in name order.
    pub fn by_address(&self, address: &Address) -> impl Iterator<Item = &ContractRecord> {
        let address = *address;
        self.records.values().filter(move |r| r.address == address)
    }

    pub fn find_by_address(&self, address: &Address) -> Option<&ContractRecord> {
        self.by_address(address).next()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContractRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Address → contract name, lowercase hex keys. Used to label report rows.
    pub fn address_names(&self) -> BTreeMap<String, String> {
        self.records
            .values()
            .map(|r| (address_key(&r.address), r.name.clone()))
            .collect()
    }
}

impl FromIterator<ContractRecord> for ContractSet {
    fn from_iter<T: IntoIterator<Item = ContractRecord>>(iter: T) -> Self {
        let mut set = ContractSet::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

impl Extend<ContractRecord> for ContractSet {
    fn extend<T: IntoIterator<Item = ContractRecord>>(&mut self, iter: T) {
        for record in iter {
            self.insert(record);
        }
    }
}
