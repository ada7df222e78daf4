//! Address parsing and typed address books.
//!
//! Pool configuration refers to contracts either by a well-known address book key
//! (`"ACL_MANAGER"`) or by a literal hex address. [`AddressRef`] captures both forms and
//! [`AddressBook`] resolves keys with explicit presence: a missing key and a key mapped
//! to the zero address both resolve to `None`.

use alloy_primitives::Address;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Parse a hex address (with or without `0x`, any letter case).
pub fn parse_address(value: &str) -> Result<Address> {
    let trimmed = value.trim();
    Address::from_str(trimmed).map_err(|e| anyhow!("Invalid address {}: {}", trimmed, e))
}

/// Lowercase `0x`-prefixed form, used as the key for label lookups.
pub fn address_key(address: &Address) -> String {
    format!("{:#x}", address)
}

/// Reference to an address: a literal value or a key into an [`AddressBook`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AddressRef {
    Literal(Address),
    Key(String),
}

impl TryFrom<String> for AddressRef {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
            return Ok(AddressRef::Literal(parse_address(trimmed)?));
        }
        if trimmed.is_empty() {
            return Err(anyhow!("Empty address reference"));
        }
        Ok(AddressRef::Key(trimmed.to_string()))
    }
}

impl From<AddressRef> for String {
    fn from(value: AddressRef) -> Self {
        value.to_string()
    }
}

impl fmt::Display for AddressRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressRef::Literal(address) => write!(f, "{}", address_key(address)),
            AddressRef::Key(key) => write!(f, "{}", key),
        }
    }
}

/// Mapping from well-known keys (`POOL`, `ACL_MANAGER`, ...) to deployed addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressBook {
    entries: BTreeMap<String, Address>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, address: Address) {
        self.entries.insert(key.into(), address);
    }

    /// Look up a key. Zero addresses count as absent.
    pub fn get(&self, key: &str) -> Option<Address> {
        self.entries
            .get(key)
            .copied()
            .filter(|address| !address.is_zero())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Resolve a reference against this book.
    pub fn resolve(&self, reference: &AddressRef) -> Option<Address> {
        match reference {
            AddressRef::Literal(address) if address.is_zero() => None,
            AddressRef::Literal(address) => Some(*address),
            AddressRef::Key(key) => self.get(key),
        }
    }

    /// Layer `other` on top of this book; keys in `other` win.
    pub fn merge(&mut self, other: &AddressBook) {
        for (key, address) in &other.entries {
            self.entries.insert(key.clone(), *address);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Human labels attached to addresses (`"Aave Guardian"`, `"Risk Steward Safe"`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressLabels {
    labels: BTreeMap<Address, String>,
}

impl AddressLabels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from string-keyed labels as found in configuration files.
    pub fn from_strings(raw: &BTreeMap<String, String>) -> Result<Self> {
        let mut labels = Self::new();
        for (address, label) in raw {
            labels.insert(parse_address(address)?, label.clone());
        }
        Ok(labels)
    }

    /// Attach a label, keeping any existing one.
    pub fn insert_if_absent(&mut self, address: Address, label: impl Into<String>) {
        self.labels.entry(address).or_insert_with(|| label.into());
    }

    pub fn insert(&mut self, address: Address, label: impl Into<String>) {
        self.labels.insert(address, label.into());
    }

    pub fn get(&self, address: &Address) -> Option<&str> {
        self.labels.get(address).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
