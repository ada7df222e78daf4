//! Raw `eth_getLogs` entries and their decoding into ledger events.
//!
//! Event arguments are read positionally: indexed arguments from `topics[1..]`, then the
//! remaining arguments as 32-byte words of `data`. All supported events declare their
//! indexed arguments first, so this covers deployments that index all, some or none
//! of them.

use crate::abi::{decode_hex, word_to_address, word_to_bool};
use alloy_primitives::{Address, B256};
use anyhow::{anyhow, Context, Result};
use permissions_book_types::{EventKind, EventLog, LedgerEvent};
use serde::Deserialize;

/// A log entry as returned by `eth_getLogs`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    pub address: Address,
    pub topics: Vec<B256>,
    #[serde(default)]
    pub data: String,
    pub block_number: Option<String>,
    pub log_index: Option<String>,
    #[serde(default)]
    pub removed: bool,
}

/// Parse a JSON-RPC quantity (`"0x1a"`).
pub fn parse_quantity(value: &str) -> Result<u64> {
    let stripped = value
        .strip_prefix("0x")
        .ok_or_else(|| anyhow!("Quantity {} is missing 0x prefix", value))?;
    u64::from_str_radix(stripped, 16).map_err(|e| anyhow!("Invalid quantity {}: {}", value, e))
}

pub fn format_quantity(value: u64) -> String {
    format!("0x{:x}", value)
}

fn argument_words(raw: &RawLog) -> Result<Vec<Vec<u8>>> {
    let mut words: Vec<Vec<u8>> = raw.topics.iter().skip(1).map(|t| t.to_vec()).collect();
    let data = decode_hex(&raw.data)?;
    words.extend(data.chunks_exact(32).map(|chunk| chunk.to_vec()));
    Ok(words)
}

fn argument(words: &[Vec<u8>], index: usize, kind: EventKind) -> Result<&[u8]> {
    words
        .get(index)
        .map(Vec::as_slice)
        .ok_or_else(|| anyhow!("{} log is missing argument {}", kind, index))
}

/// Decode a raw log.
///
/// Returns `Ok(None)` for logs the ledger does not track (unknown `topic0`, removed by a
/// reorg, or still pending). Malformed logs of a known event are errors.
pub fn decode_log(raw: &RawLog) -> Result<Option<EventLog>> {
    if raw.removed {
        return Ok(None);
    }
    let Some(topic0) = raw.topics.first() else {
        return Ok(None);
    };
    let Some(kind) = EventKind::from_topic0(topic0) else {
        return Ok(None);
    };
    let (Some(block), Some(index)) = (&raw.block_number, &raw.log_index) else {
        return Ok(None);
    };

    let words = argument_words(raw).with_context(|| format!("Failed to read {} log data", kind))?;
    let event = match kind {
        EventKind::RoleGranted | EventKind::RoleRevoked => {
            let role = B256::from_slice(argument(&words, 0, kind)?);
            let account = word_to_address(argument(&words, 1, kind)?)?;
            if kind == EventKind::RoleGranted {
                LedgerEvent::RoleGranted { role, account }
            } else {
                LedgerEvent::RoleRevoked { role, account }
            }
        }
        EventKind::SenderUpdated => LedgerEvent::SenderUpdated {
            sender: word_to_address(argument(&words, 0, kind)?)?,
            approved: word_to_bool(argument(&words, 1, kind)?)?,
        },
        EventKind::AuthorizedSenderAdded => LedgerEvent::AuthorizedSenderAdded {
            sender: word_to_address(argument(&words, 0, kind)?)?,
        },
        EventKind::AuthorizedSenderRemoved => LedgerEvent::AuthorizedSenderRemoved {
            sender: word_to_address(argument(&words, 0, kind)?)?,
        },
    };

    Ok(Some(EventLog {
        address: raw.address,
        block_number: parse_quantity(block)?,
        log_index: parse_quantity(index)?,
        event,
    }))
}

/// Decode a batch of raw logs, skipping malformed entries.
///
/// Output is sorted by `(block_number, log_index)`.
pub fn decode_logs(raw_logs: &[RawLog]) -> Vec<EventLog> {
    let mut decoded: Vec<EventLog> = raw_logs
        .iter()
        .filter_map(|raw| match decode_log(raw) {
            Ok(log) => log,
            Err(e) => {
                tracing::debug!(address = %raw.address, error = %e, "skipping malformed log");
                None
            }
        })
        .collect();
    decoded.sort_by_key(|log| (log.block_number, log.log_index));
    decoded
}
