// SPDX-License-Identifier: Apache-2.0

use assert_cmd::Command;

#[test]
fn help_lists_both_commands() {
    let output = Command::cargo_bin("errata")
        .expect("bin")
        .arg("--help")
        .output()
        .expect("help");
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).expect("utf8");
    assert!(text.contains("audit"));
    assert!(text.contains("reconcile"));
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    Command::cargo_bin("errata")
        .expect("bin")
        .assert()
        .failure();
}

#[test]
fn unknown_scope_keyword_is_rejected_by_the_parser() {
    Command::cargo_bin("errata")
        .expect("bin")
        .args([
            "audit",
            "--api-url",
            "https://imaging.test/api",
            "--api-key",
            "k",
            "--parent",
            "p1",
            "--scope",
            "everything",
        ])
        .assert()
        .failure();
}
