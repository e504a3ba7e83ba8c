use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("rxdesk")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("logout"))
        .stdout(predicate::str::contains("whoami"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("api"));
}

#[test]
fn test_config_help_shows_subcommands() {
    cargo_bin_cmd!("rxdesk")
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("path"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_unknown_resource_is_rejected() {
    cargo_bin_cmd!("rxdesk")
        .args(["list", "widgets"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown resource 'widgets'"));
}

#[test]
fn test_verify_requires_a_decision() {
    cargo_bin_cmd!("rxdesk")
        .args(["verify", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--approve"));
}

#[test]
fn test_invalid_order_status_is_rejected() {
    cargo_bin_cmd!("rxdesk")
        .args(["order-status", "3", "Shipped"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid order status"));
}
