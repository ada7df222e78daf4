//! A small deployment: a governance pool with the executor / payloads controller
//! pair, a lending pool whose roles live in an ACL manager, and a derived pool that
//! sees the lending pool's contracts without treating them as governance.

use anyhow::Result;
use permissions_book::config::AppConfig;
use permissions_book_types::{Address, EventLog, LedgerEvent, B256};
use std::path::Path;
use tempfile::TempDir;

pub const NETWORK_ENV: &str = "MOCK_RPC_MAINNET";
pub const FORK_ENV: &str = "MOCK_RPC_FORK";

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn acl_manager() -> Address {
    addr(0xac)
}
pub fn payloads_controller() -> Address {
    addr(0xa1)
}
pub fn executor() -> Address {
    addr(0xa2)
}
pub fn pool_configurator() -> Address {
    addr(0xc1)
}
pub fn pool() -> Address {
    addr(0xc2)
}
pub fn proxy_admin() -> Address {
    addr(0xc3)
}
pub fn guardian_safe() -> Address {
    addr(0x5a)
}
pub fn risk_steward() -> Address {
    addr(0x57)
}
pub fn deployer() -> Address {
    addr(0xee)
}
pub fn lido_config_engine() -> Address {
    addr(0xd1)
}

pub fn role_id(name: &str) -> B256 {
    alloy_primitives::keccak256(name.as_bytes())
}

pub fn grant(block: u64, role: &str, account: Address) -> EventLog {
    EventLog {
        address: acl_manager(),
        block_number: block,
        log_index: 0,
        event: LedgerEvent::RoleGranted {
            role: role_id(role),
            account,
        },
    }
}

pub fn revoke(block: u64, role: &str, account: Address) -> EventLog {
    EventLog {
        address: acl_manager(),
        block_number: block,
        log_index: 0,
        event: LedgerEvent::RoleRevoked {
            role: role_id(role),
            account,
        },
    }
}

fn networks_json() -> String {
    format!(
        r#"[
  {{
    "chainId": 1,
    "name": "Ethereum",
    "rpcUrlEnv": "{network_env}",
    "labels": {{ "{steward}": "Risk Steward" }},
    "pools": [
      {{
        "key": "GOV",
        "contracts": [
          {{
            "name": "PayloadsController",
            "address": "{payloads}",
            "modifiers": [ {{ "name": "onlyOwner", "controllers": [ {{ "from": "getter", "call": "owner()" }} ] }} ]
          }},
          {{
            "name": "Executor",
            "address": "{executor}",
            "modifiers": [ {{ "name": "onlyOwner", "controllers": [ {{ "from": "getter", "call": "owner()" }} ] }} ]
          }}
        ]
      }},
      {{
        "key": "V3",
        "governancePools": ["GOV"],
        "permissions": "functions/v3.json",
        "addressBook": {{
          "ACL_MANAGER": "{acl}",
          "POOL_CONFIGURATOR": "{configurator}",
          "POOL": "{pool}",
          "PROXY_ADMIN": "{proxy_admin}",
          "COLLECTOR": "0x0000000000000000000000000000000000000000"
        }},
        "tracked": [
          {{
            "id": "ACL_MANAGER",
            "address": "ACL_MANAGER",
            "deploymentBlock": 100,
            "type": "roles",
            "roleNames": ["POOL_ADMIN", "RISK_ADMIN", "EMERGENCY_ADMIN"]
          }}
        ],
        "contracts": [
          {{
            "name": "PoolConfigurator",
            "address": "POOL_CONFIGURATOR",
            "modifiers": [
              {{ "name": "onlyPoolAdmin", "controllers": [ {{ "from": "role", "set": "ACL_MANAGER", "role": "POOL_ADMIN" }} ] }},
              {{ "name": "onlyRiskOrPoolAdmins", "controllers": [
                {{ "from": "role", "set": "ACL_MANAGER", "role": "RISK_ADMIN" }},
                {{ "from": "role", "set": "ACL_MANAGER", "role": "POOL_ADMIN" }}
              ] }},
              {{ "name": "onlyEmergencyAdmin", "controllers": [ {{ "from": "role", "set": "ACL_MANAGER", "role": "EMERGENCY_ADMIN" }} ] }}
            ]
          }},
          {{
            "name": "Pool",
            "address": "POOL",
            "modifiers": [ {{ "name": "onlyOwner", "controllers": [ {{ "from": "getter", "call": "owner()" }} ] }} ]
          }},
          {{
            "name": "ProxyAdmin",
            "address": "PROXY_ADMIN",
            "modifiers": [ {{ "name": "onlyOwner", "controllers": [ {{ "from": "getter", "call": "owner()" }} ] }} ]
          }},
          {{
            "name": "Collector",
            "address": "COLLECTOR",
            "modifiers": [ {{ "name": "onlyFundsAdmin", "controllers": [ {{ "from": "proxyAdmin" }} ] }} ]
          }}
        ]
      }},
      {{
        "key": "LIDO",
        "governancePools": ["GOV"],
        "contextPools": ["V3"],
        "addressBook": {{ "CONFIG_ENGINE": "{lido_engine}" }},
        "contracts": [
          {{
            "name": "LidoConfigEngine",
            "address": "CONFIG_ENGINE",
            "modifiers": [ {{ "name": "onlyOwner", "controllers": [ {{ "from": "getter", "call": "owner()" }} ] }} ]
          }}
        ]
      }},
      {{
        "key": "V3_FORK",
        "fork": {{ "basePool": "V3", "activationBlock": 250, "rpcUrlEnv": "{fork_env}" }}
      }}
    ]
  }}
]"#,
        network_env = NETWORK_ENV,
        fork_env = FORK_ENV,
        steward = risk_steward(),
        payloads = payloads_controller(),
        executor = executor(),
        acl = acl_manager(),
        configurator = pool_configurator(),
        pool = pool(),
        proxy_admin = proxy_admin(),
        lido_engine = lido_config_engine(),
    )
}

const V3_FUNCTIONS: &str = r#"[
  {
    "contract": "PoolConfigurator",
    "proxyAdmin": true,
    "functions": [
      { "name": "setReserveFactor", "roles": ["onlyRiskOrPoolAdmins"] },
      { "name": "dropReserve", "roles": ["onlyPoolAdmin"] },
      { "name": "setPoolPause", "roles": ["onlyEmergencyAdmin"] }
    ]
  },
  {
    "contract": "Pool",
    "functions": [ { "name": "rescueTokens", "roles": ["onlyOwner"] } ]
  }
]"#;

const ACTIONS: &str = r#"{
  "updateReserveParams": ["setReserveFactor"],
  "removeReserve": ["dropReserve"],
  "pausePool": ["setPoolPause"],
  "upgradeGovernance": ["upgradeTo"]
}"#;

const DECENTRALIZATION: &str = r#"{
  "stewardIndicators": ["Steward"],
  "governanceOnlyActions": ["upgradeGovernance"],
  "strictModifiers": ["onlyOwner"],
  "administeredModifiers": ["onlyOwner", "onlyPoolAdmin", "onlyRiskOrPoolAdmins"]
}"#;

/// Write the deployment's static inputs under `root`.
pub fn write_statics(root: &Path) -> Result<()> {
    std::fs::create_dir_all(root.join("functions"))?;
    std::fs::write(root.join("networks.json"), networks_json())?;
    std::fs::write(root.join("functions/v3.json"), V3_FUNCTIONS)?;
    std::fs::write(root.join("actions.json"), ACTIONS)?;
    std::fs::write(root.join("decentralization.json"), DECENTRALIZATION)?;
    Ok(())
}

/// Statics in a fresh temporary directory, loaded.
pub fn load_app() -> Result<(TempDir, AppConfig)> {
    let dir = TempDir::new()?;
    write_statics(dir.path())?;
    let app = AppConfig::load(dir.path())?;
    Ok((dir, app))
}
