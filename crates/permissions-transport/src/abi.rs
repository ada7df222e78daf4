//! Minimal ABI encoding and decoding.
//!
//! Only static calls with no arguments are encoded (`owner()`, `getOwners()`, ...), and
//! only the return shapes those calls produce are decoded.

use alloy_primitives::{keccak256, Address, B256, U256};
use anyhow::{anyhow, Result};

const WORD: usize = 32;

/// 4-byte function selector for a signature like `"owner()"`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Calldata for a call with no arguments, `0x`-prefixed.
pub fn encode_call(signature: &str) -> String {
    format!("0x{}", hex::encode(selector(signature)))
}

/// Decode `0x`-prefixed hex into bytes.
pub fn decode_hex(value: &str) -> Result<Vec<u8>> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(stripped).map_err(|e| anyhow!("Invalid hex {}: {}", value, e))
}

/// The `index`-th 32-byte word of `data`.
pub fn word(data: &[u8], index: usize) -> Result<&[u8]> {
    let start = index * WORD;
    data.get(start..start + WORD)
        .ok_or_else(|| anyhow!("ABI data too short: need word {} of {} bytes", index, data.len()))
}

/// An address left-padded into a 32-byte word.
pub fn word_to_address(word: &[u8]) -> Result<Address> {
    if word.len() != WORD {
        return Err(anyhow!("Expected 32-byte word, got {} bytes", word.len()));
    }
    Ok(Address::from_slice(&word[12..]))
}

pub fn word_to_u64(word: &[u8]) -> Result<u64> {
    if word.len() != WORD {
        return Err(anyhow!("Expected 32-byte word, got {} bytes", word.len()));
    }
    let value = U256::from_be_slice(word);
    u64::try_from(value).map_err(|_| anyhow!("Word value {} does not fit in u64", value))
}

pub fn word_to_bool(word: &[u8]) -> Result<bool> {
    Ok(word_to_u64(word)? != 0)
}

/// Decode a single returned `address`.
pub fn decode_address(data: &[u8]) -> Result<Address> {
    word_to_address(word(data, 0)?)
}

/// Decode a single returned `uint256` that must fit in `u64`.
pub fn decode_u64(data: &[u8]) -> Result<u64> {
    word_to_u64(word(data, 0)?)
}

/// Decode a returned dynamic `address[]`.
pub fn decode_address_array(data: &[u8]) -> Result<Vec<Address>> {
    let offset = usize::try_from(word_to_u64(word(data, 0)?)?)
        .map_err(|_| anyhow!("address[] offset out of range"))?;
    if offset % WORD != 0 {
        return Err(anyhow!("Unaligned address[] offset {}", offset));
    }
    let base = offset / WORD;
    let len = usize::try_from(word_to_u64(word(data, base)?)?)
        .map_err(|_| anyhow!("address[] length out of range"))?;
    (0..len)
        .map(|i| word_to_address(word(data, base + 1 + i)?))
        .collect()
}

/// Address stored in the low 20 bytes of a storage slot.
pub fn slot_to_address(slot: &B256) -> Address {
    Address::from_slice(&slot[12..])
}
