//! State survives across store instances, the way consecutive indexing runs see it.

use anyhow::Result;
use permissions_book_types::{Address, LedgerState, MembershipSet, SetSnapshot};
use permissions_store::{FsLedgerStore, FsOutputStore, LedgerStore};
use tempfile::TempDir;

#[test]
fn test_ledger_state_survives_reopen() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let mut state = LedgerState::default();
    state
        .checkpoint
        .record("CROSS_CHAIN_CONTROLLER", Address::repeat_byte(9), 1_000);
    state.checkpoint.advance(5_000);
    state.snapshot.insert(
        "CROSS_CHAIN_CONTROLLER",
        SetSnapshot::Members(MembershipSet::from_iter([Address::repeat_byte(3)])),
    );

    {
        let store = FsLedgerStore::new(temp_dir.path())?;
        store.save_state("1", "GOVERNANCE", &state)?;
    }

    let reopened = FsLedgerStore::new(temp_dir.path())?;
    assert_eq!(reopened.load_state("1", "GOVERNANCE")?, Some(state));
    Ok(())
}

#[test]
fn test_output_document_is_replaced() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = FsOutputStore::new(temp_dir.path())?;

    store.write("10", &serde_json::json!({ "run": 1 }))?;
    let path = store.write("10", &serde_json::json!({ "run": 2 }))?;

    assert!(path.ends_with("permissions/10-permissions.json"));
    let doc: Option<serde_json::Value> = store.read("10")?;
    assert_eq!(doc, Some(serde_json::json!({ "run": 2 })));
    Ok(())
}
