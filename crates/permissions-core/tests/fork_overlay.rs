//! Fork overlay: seeding, stream merge order and checkpoint isolation.

mod common;

use anyhow::Result;
use common::{addr, at, grant, revoke, MockChain};
use permissions_book_types::{LedgerEvent, MembershipSet};
use permissions_core::fork::{sync_pool, ForkSpec, PoolSources};
use permissions_core::ledger::{SetKind, TrackedSet};
use permissions_store::{LedgerStore, MemoryLedgerStore};

const NETWORK: &str = "1";
const BASE: &str = "AAVE_V3";
const FORK: &str = "AAVE_V3_FORK";

fn acl_set() -> TrackedSet {
    TrackedSet {
        id: "ACL_MANAGER".to_string(),
        address: addr(0xac),
        deployment_block: 10,
        kind: SetKind::Roles {
            role_names: vec!["POOL_ADMIN".to_string()],
            custodian: false,
        },
    }
}

fn oracle_set() -> TrackedSet {
    TrackedSet {
        id: "HUB_RISK_ORACLE".to_string(),
        address: addr(0x0c),
        deployment_block: 10,
        kind: SetKind::AuthorizedSenders,
    }
}

fn spec(activation_block: u64) -> ForkSpec {
    ForkSpec {
        base_pool: BASE.to_string(),
        activation_block,
        window: 50_000,
    }
}

#[tokio::test]
async fn test_fork_checkpoint_isolation() -> Result<()> {
    let store = MemoryLedgerStore::new();
    let acl = addr(0xac);
    let (a, b) = (addr(1), addr(2));

    let origin_at_100 = MockChain::new(100, vec![grant(acl, 20, "POOL_ADMIN", a)]);
    let base = sync_pool(
        &store,
        NETWORK,
        BASE,
        &[acl_set()],
        PoolSources::Direct {
            source: &origin_at_100,
            window: 9_999,
        },
    )
    .await?;
    assert_eq!(base.checkpoint.latest_block, 100);

    let origin = MockChain::new(
        400,
        vec![
            grant(acl, 20, "POOL_ADMIN", a),
            revoke(acl, 120, "POOL_ADMIN", a),
            grant(acl, 300, "POOL_ADMIN", addr(9)),
        ],
    );
    let fork_chain = MockChain::new(170, vec![grant(acl, 160, "POOL_ADMIN", b)]);
    let fork_spec = spec(150);

    let forked = sync_pool(
        &store,
        NETWORK,
        FORK,
        &[acl_set()],
        PoolSources::Forked {
            origin: &origin,
            origin_window: 9_999,
            fork: &fork_chain,
            spec: &fork_spec,
        },
    )
    .await?;

    // Origin window capped at the activation block; the head is never queried.
    let origin_windows: Vec<(u64, u64)> =
        origin.requests().iter().map(|r| (r.from, r.to)).collect();
    assert_eq!(origin_windows, vec![(100, 149)]);
    assert_eq!(origin.head_queries(), 0);
    let fork_windows: Vec<(u64, u64)> =
        fork_chain.requests().iter().map(|r| (r.from, r.to)).collect();
    assert_eq!(fork_windows, vec![(150, 169)]);

    assert_eq!(forked.checkpoint.latest_block, 170);
    let admins = forked.snapshot.roles("ACL_MANAGER").unwrap().members("POOL_ADMIN").unwrap();
    assert!(!admins.contains(&a));
    assert!(admins.contains(&b));
    assert!(!admins.contains(&addr(9)));

    let stored_base = store.load_state(NETWORK, BASE)?.unwrap_or_default();
    assert_eq!(stored_base, base);
    assert_eq!(stored_base.checkpoint.latest_block, 100);
    assert_eq!(
        store.load_checkpoint(NETWORK, FORK)?.map(|c| c.latest_block),
        Some(170)
    );
    Ok(())
}

#[tokio::test]
async fn test_repeated_fork_runs_reseed_from_base() -> Result<()> {
    let store = MemoryLedgerStore::new();
    let acl = addr(0xac);
    let origin = MockChain::new(100, vec![grant(acl, 20, "POOL_ADMIN", addr(1))]);
    sync_pool(
        &store,
        NETWORK,
        BASE,
        &[acl_set()],
        PoolSources::Direct {
            source: &origin,
            window: 9_999,
        },
    )
    .await?;

    let fork_spec = spec(150);
    for _ in 0..2 {
        let origin = MockChain::new(400, Vec::new());
        let fork_chain = MockChain::new(500, vec![grant(acl, 200, "POOL_ADMIN", addr(2))]);
        sync_pool(
            &store,
            NETWORK,
            FORK,
            &[acl_set()],
            PoolSources::Forked {
                origin: &origin,
                origin_window: 9_999,
                fork: &fork_chain,
                spec: &fork_spec,
            },
        )
        .await?;
        // Always from the base checkpoint, never from the fork's own.
        assert_eq!(origin.requests()[0].from, 100);
    }

    let forked = store.load_state(NETWORK, FORK)?.unwrap_or_default();
    assert_eq!(forked.checkpoint.latest_block, 500);
    assert_eq!(
        forked.snapshot.roles("ACL_MANAGER").unwrap().members("POOL_ADMIN").unwrap().len(),
        2
    );
    Ok(())
}

#[tokio::test]
async fn test_fork_without_base_state_starts_from_deployment() -> Result<()> {
    let store = MemoryLedgerStore::new();
    let oracle = addr(0x0c);
    let x = addr(7);
    let origin = MockChain::new(
        1_000,
        vec![at(oracle, 50, 0, LedgerEvent::AuthorizedSenderAdded { sender: x })],
    );
    // Net delta for X across both streams is +1.
    let fork_chain = MockChain::new(
        300,
        vec![
            at(oracle, 210, 0, LedgerEvent::AuthorizedSenderRemoved { sender: x }),
            at(oracle, 220, 0, LedgerEvent::AuthorizedSenderAdded { sender: x }),
        ],
    );
    let fork_spec = spec(200);

    let forked = sync_pool(
        &store,
        NETWORK,
        FORK,
        &[oracle_set()],
        PoolSources::Forked {
            origin: &origin,
            origin_window: 9_999,
            fork: &fork_chain,
            spec: &fork_spec,
        },
    )
    .await?;

    assert_eq!(origin.requests()[0].from, 10);
    assert_eq!(
        forked.snapshot.members("HUB_RISK_ORACLE"),
        Some(&MembershipSet::from_iter([x]))
    );
    assert!(store.load_state(NETWORK, BASE)?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_fork_cannot_target_itself() {
    let store = MemoryLedgerStore::new();
    let chain = MockChain::new(10, Vec::new());
    let fork_spec = ForkSpec {
        base_pool: FORK.to_string(),
        activation_block: 5,
        window: 100,
    };
    let result = sync_pool(
        &store,
        NETWORK,
        FORK,
        &[acl_set()],
        PoolSources::Forked {
            origin: &chain,
            origin_window: 100,
            fork: &chain,
            spec: &fork_spec,
        },
    )
    .await;
    assert!(result.is_err());
}
