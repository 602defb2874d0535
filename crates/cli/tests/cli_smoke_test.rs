//! Binary-level checks for the `libris` command.

use assert_cmd::Command;

fn libris() -> Command {
    let mut cmd = Command::cargo_bin("libris").unwrap();
    cmd.env_remove("LIBRIS_API_URL").env_remove("LIBRIS_API_TOKEN");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let output = libris().arg("--help").output().unwrap();
    assert!(output.status.success());

    let help = String::from_utf8(output.stdout).unwrap();
    for command in ["list", "show", "stats", "add", "edit", "delete", "increment", "decrement", "serve"] {
        assert!(help.contains(command), "missing {command} in help");
    }
}

#[test]
fn test_malformed_id_is_rejected() {
    libris().args(["show", "not-a-uuid"]).assert().failure();
}

#[test]
fn test_unreachable_api_exits_non_zero() {
    let output = libris()
        .args(["--api-url", "http://127.0.0.1:9", "--timeout-secs", "2", "list"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("failed to list books"));
}
