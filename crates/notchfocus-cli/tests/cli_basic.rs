//! CLI E2E tests.
//!
//! Each test runs the binary against its own data directory (via
//! NOTCHFOCUS_DATA_DIR) so tests stay independent and leave the user's
//! real data untouched.

use std::path::Path;
use std::process::Command;

fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "notchfocus-cli", "--"])
        .args(args)
        .env("NOTCHFOCUS_DATA_DIR", data_dir)
        .output()
        .expect("failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (output.status.code().unwrap_or(-1), stdout, stderr)
}

#[test]
fn status_starts_idle() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["timer", "status"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"phase\": \"idle\""), "stdout: {stdout}");
    assert!(stdout.contains("\"display_time\": \"25:00\""), "stdout: {stdout}");
}

#[test]
fn start_tick_pause_cycle() {
    let dir = tempfile::tempdir().unwrap();

    let (code, stdout, _) = run_cli(dir.path(), &["timer", "start"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"type\": \"SessionStarted\""), "stdout: {stdout}");

    let (code, stdout, _) = run_cli(dir.path(), &["timer", "tick", "--seconds", "3"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"display_time\": \"24:57\""), "stdout: {stdout}");

    let (code, stdout, _) = run_cli(dir.path(), &["timer", "pause"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"type\": \"SessionPaused\""), "stdout: {stdout}");

    // Pausing again is a no-op and prints the snapshot instead.
    let (code, stdout, _) = run_cli(dir.path(), &["timer", "pause"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"phase\": \"paused\""), "stdout: {stdout}");

    let (code, stdout, _) = run_cli(dir.path(), &["timer", "resume"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"type\": \"SessionResumed\""), "stdout: {stdout}");

    let (code, stdout, _) = run_cli(dir.path(), &["timer", "reset"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"type\": \"SessionReset\""), "stdout: {stdout}");
}

#[test]
fn completed_work_session_reaches_break() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["config", "set", "timers.short_work_min", "1"]);
    run_cli(dir.path(), &["timer", "start"]);

    let (code, stdout, _) = run_cli(dir.path(), &["timer", "tick", "--seconds", "60"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"type\":\"SessionCompleted\""), "stdout: {stdout}");
    assert!(stdout.contains("\"display_time\": \"05:00\""), "stdout: {stdout}");

    let (code, stdout, _) = run_cli(dir.path(), &["timer", "next"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"kind\": \"break\""), "stdout: {stdout}");

    let (code, stdout, _) = run_cli(dir.path(), &["stats", "today"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"focus_min\": 1"), "stdout: {stdout}");
    assert!(stdout.contains("\"streak_days\": 1"), "stdout: {stdout}");
}

#[test]
fn config_get_set_list_reset() {
    let dir = tempfile::tempdir().unwrap();

    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "timers.short_work_min"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");

    let (code, stdout, _) =
        run_cli(dir.path(), &["config", "set", "timers.short_work_min", "9000"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    // Clamped to the documented maximum.
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "timers.short_work_min"]);
    assert_eq!(stdout.trim(), "180");

    let (code, stdout, _) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("\"always_on_top\": true"), "stdout: {stdout}");

    let (code, _, _) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["config", "get", "timers.short_work_min"]);
    assert_eq!(stdout.trim(), "25");

    let (code, _, stderr) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"), "stderr: {stderr}");
}

#[test]
fn stats_history_is_empty_initially() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["stats", "history"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "[]");
}
