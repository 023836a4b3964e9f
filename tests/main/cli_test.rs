//! CLI contract tests.

use assert_cmd::Command;

#[test]
fn help_lists_primary_subcommands() {
    let cmd = Command::cargo_bin("chatbridge");
    let mut cmd = match cmd {
        Ok(cmd) => cmd,
        Err(err) => panic!("binary should resolve: {err}"),
    };
    let assert = cmd.arg("--help").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("start"));
    assert!(stdout.contains("link"));
    assert!(stdout.contains("status"));
}

#[test]
fn version_flag_prints_package_version() {
    let cmd = Command::cargo_bin("chatbridge");
    let mut cmd = match cmd {
        Ok(cmd) => cmd,
        Err(err) => panic!("binary should resolve: {err}"),
    };
    let assert = cmd.arg("--version").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}
