//! Integration tests for the CLI surface.
//!
//! These run the built binary and only exercise paths that never reach
//! the container runtime: help text, completion generation, argument
//! validation, and config-file rejection.

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn stowage() -> Command {
    Command::cargo_bin("stowage").unwrap()
}

#[test]
fn help_lists_command_families() {
    stowage()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("container"))
        .stdout(predicate::str::contains("image"))
        .stdout(predicate::str::contains("system"))
        .stdout(predicate::str::contains("registry"))
        .stdout(predicate::str::contains("mcp"));
}

#[test]
fn version_prints_package_version() {
    stowage()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn mcp_help_shows_client_configuration() {
    stowage()
        .args(["mcp", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mcpServers"))
        .stdout(predicate::str::contains("JSON-RPC"));
}

#[test]
fn completion_emits_a_script_for_each_shell() {
    for shell in ["bash", "zsh", "fish"] {
        stowage()
            .args(["completion", shell])
            .assert()
            .success()
            .stdout(predicate::str::contains("stowage"));
    }
}

#[test]
fn unknown_subcommand_fails() {
    stowage()
        .arg("volumes")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn bad_signal_is_rejected_at_parse_time() {
    stowage()
        .args(["container", "stop", "web", "--signal", "SIGBOGUS"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown signal"));
}

#[test]
fn exec_requires_a_command() {
    stowage()
        .args(["container", "exec", "web"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn image_delete_all_conflicts_with_references() {
    stowage()
        .args(["image", "delete", "--all", "alpine:latest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn unparsable_config_file_aborts_early() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child("config.toml");
    config.write_str("runtime_path = 42\n").unwrap();

    // Completion does not touch the runtime, so the only failure mode
    // here is the config load.
    stowage()
        .env("STOWAGE_CONFIG", config.path())
        .args(["completion", "bash"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config file"));
}

#[test]
fn invalid_config_value_names_the_field() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child("config.toml");
    config.write_str("runtime_path = \"\"\n").unwrap();

    stowage()
        .env("STOWAGE_CONFIG", config.path())
        .args(["completion", "bash"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("runtime_path"));
}

#[test]
fn valid_config_file_is_accepted() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child("config.toml");
    config
        .write_str("runtime_path = \"/usr/local/bin/container\"\ndebug = false\n")
        .unwrap();

    stowage()
        .env("STOWAGE_CONFIG", config.path())
        .args(["completion", "bash"])
        .assert()
        .success();
}
