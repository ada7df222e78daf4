mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cli() -> Command {
    #[allow(deprecated)]
    let cmd = Command::cargo_bin("permissions-book").unwrap();
    cmd
}

#[test]
fn test_help_lists_selection_flags() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--network"))
        .stdout(predicate::str::contains("--pool"))
        .stdout(predicate::str::contains("--fork"));
}

#[test]
fn test_pool_without_network_is_rejected() {
    let statics = TempDir::new().unwrap();
    common::write_statics(statics.path()).unwrap();

    cli()
        .arg("--config-dir")
        .arg(statics.path())
        .arg("--pool")
        .arg("v3")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--pool requires --network"));
}

#[test]
fn test_unknown_network_is_rejected() {
    let statics = TempDir::new().unwrap();
    common::write_statics(statics.path()).unwrap();

    cli()
        .arg("--config-dir")
        .arg(statics.path())
        .arg("-n")
        .arg("5")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown network 5"));
}

#[test]
fn test_missing_endpoint_fails_run_without_output() {
    let statics = TempDir::new().unwrap();
    common::write_statics(statics.path()).unwrap();
    let out = TempDir::new().unwrap();

    cli()
        .env_remove(common::NETWORK_ENV)
        .arg("--config-dir")
        .arg(statics.path())
        .arg("--out-dir")
        .arg(out.path())
        .arg("-n")
        .arg("1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 network(s) failed"));

    assert!(!out.path().join("permissions/1-permissions.json").exists());
}

#[test]
fn test_missing_config_dir_fails() {
    let empty = TempDir::new().unwrap();
    cli()
        .arg("--config-dir")
        .arg(empty.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("networks.json"));
}
