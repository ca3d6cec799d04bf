//! CLI arg parsing tests for hostlens (client)
use std::process::Command;

#[test]
fn test_help_mentions_flags() {
    let output = Command::new(env!("CARGO_BIN_EXE_hostlens"))
        .arg("--help")
        .output()
        .expect("run hostlens --help");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(
        text.contains("--url") && text.contains("--limit") && text.contains("--pretty"),
        "help text missing expected flags (--url, --limit, --pretty)\n{text}"
    );
    assert!(text.contains("Usage:"));
}

#[test]
fn rejects_a_non_websocket_url() {
    // Fails before any network I/O, so this is safe offline.
    let output = Command::new(env!("CARGO_BIN_EXE_hostlens"))
        .args(["get_system_info", "--url", "http://127.0.0.1:3000/ws"])
        .output()
        .expect("run hostlens");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("ws://"),
        "expected scheme complaint, got: {stderr}"
    );
}

#[test]
fn rejects_an_unparseable_url() {
    let output = Command::new(env!("CARGO_BIN_EXE_hostlens"))
        .args(["get_system_info", "--url", "not a url"])
        .output()
        .expect("run hostlens");
    assert!(!output.status.success());
}
