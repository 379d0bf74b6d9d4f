//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data
//! directory and verify outputs.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "flowdoro-cli", "--"])
        .args(args)
        .env("FLOWDORO_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn timer_status_prints_snapshot_json() {
    let (stdout, _, code) = run_cli(&["timer", "status"]);
    assert_eq!(code, 0, "timer status failed");

    // A stopped timer prints exactly one snapshot object.
    let snapshot: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(snapshot["type"], "StateSnapshot");
    assert!(snapshot["remaining_secs"].is_u64());
}

#[test]
fn timer_stop_is_idempotent() {
    let (_, _, first) = run_cli(&["timer", "stop"]);
    let (stdout, _, second) = run_cli(&["timer", "stop"]);
    assert_eq!(first, 0);
    assert_eq!(second, 0);
    assert!(stdout.contains("TimerStopped"));
}

#[test]
fn flow_rate_rejects_unknown_rating() {
    let (_, stderr, code) = run_cli(&["flow", "rate", "meh"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown rating"));
}

#[test]
fn flow_status_reports_streak_and_goal() {
    let (stdout, _, code) = run_cli(&["flow", "status"]);
    assert_eq!(code, 0, "flow status failed");
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(status["streak"].is_u64());
    assert!(status["daily"]["goal"].is_u64());
}

#[test]
fn config_get_and_list() {
    let (stdout, _, code) = run_cli(&["config", "get", "timer.work_duration"]);
    assert_eq!(code, 0, "config get failed");
    assert!(stdout.trim().parse::<u32>().is_ok());

    let (stdout, _, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0, "config list failed");
    assert!(stdout.contains("[timer]"));
}

#[test]
fn config_get_unknown_key_fails() {
    let (_, _, code) = run_cli(&["config", "get", "timer.no_such_key"]);
    assert_ne!(code, 0);
}

#[test]
fn stats_today_prints_json() {
    let (stdout, _, code) = run_cli(&["stats", "today"]);
    assert_eq!(code, 0, "stats today failed");
    let stats: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(stats["total_sessions"].is_u64());
}
