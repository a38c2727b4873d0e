//! Basic CLI E2E tests.
//!
//! Tests run the built binary against a temporary HOME and parse its JSON
//! output.

use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_pathways"))
        .args(args)
        .env("HOME", home)
        .env_remove("PATHWAYS_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(home: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

fn home() -> TempDir {
    tempfile::tempdir().unwrap()
}

#[test]
fn test_lesson_awards_xp_and_first_badge() {
    let home = home();
    let out = run_json(home.path(), &["lesson", "--perfect"]);
    assert_eq!(out["award"]["xpAwarded"], 35);
    assert_eq!(out["user"]["totalLessonsCompleted"], 1);
    assert_eq!(out["user"]["currentStreak"], 1);

    let events = out["events"].as_array().unwrap();
    assert!(events
        .iter()
        .any(|e| e["type"] == "badge_awarded" && e["badge_id"] == "first_steps"));
    assert!(home.path().join(".config/pathways/pathways.db").exists());
}

#[test]
fn test_status_reflects_previous_commands() {
    let home = home();
    run_json(home.path(), &["reading"]);
    run_json(home.path(), &["writing"]);

    let status = run_json(home.path(), &["status"]);
    assert_eq!(status["user"]["totalReadingCompleted"], 1);
    assert_eq!(status["user"]["totalWritingCompleted"], 1);
    assert!(status["user"]["xp"].as_u64().unwrap() >= 35);
    assert_eq!(status["user"]["level"], 1);
    assert!(status["xpForNextLevel"].as_u64().unwrap() <= 65);
}

#[test]
fn test_zero_xp_is_rejected() {
    let home = home();
    let (_, stderr, code) = run_cli(home.path(), &["xp", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_badges_queries() {
    let home = home();
    let list = run_json(home.path(), &["badges", "list"]);
    assert_eq!(list.as_array().unwrap().len(), 15);

    let summary = run_json(home.path(), &["badges", "summary"]);
    assert_eq!(summary["totalBadges"], 15);
    assert_eq!(summary["earnedBadges"], 0);

    let progress = run_json(home.path(), &["badges", "progress", "week_warrior"]);
    assert_eq!(progress["earned"], false);
    assert_eq!(progress["progress"], 0.0);

    let consistency = run_json(home.path(), &["badges", "category", "consistency"]);
    assert_eq!(consistency["color"], "#e74c3c");
    assert_eq!(consistency["badges"].as_array().unwrap().len(), 3);

    let (_, stderr, code) = run_cli(home.path(), &["badges", "progress", "nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown badge"));
}

#[test]
fn test_challenges_list_and_complete() {
    let home = home();
    let active = run_json(home.path(), &["challenge", "list"]);
    let active = active.as_array().unwrap();
    assert_eq!(active.len(), 5);
    assert!(active.iter().all(|c| c["difficultyColor"]
        .as_str()
        .is_some_and(|color| color.starts_with('#'))));

    let first = run_json(home.path(), &["challenge", "complete", "speed_reader"]);
    assert_eq!(first["award"]["xpAwarded"], 50);
    let again = run_json(home.path(), &["challenge", "complete", "speed_reader"]);
    assert!(again["award"].is_null());

    let stats = run_json(home.path(), &["challenge", "stats"]);
    assert_eq!(stats["dailyCompleted"], 1);

    let tracked = run_json(
        home.path(),
        &["challenge", "track", "study_time", "--amount", "25"],
    );
    assert_eq!(tracked["amount"], 25);

    let (_, _, code) = run_cli(home.path(), &["challenge", "track", "juggling"]);
    assert_ne!(code, 0);
    let (_, stderr, code) = run_cli(home.path(), &["challenge", "progress", "nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown challenge"));
}

#[test]
fn test_export_import_and_reset() {
    let home = home();
    run_json(home.path(), &["lesson"]);
    let backup = home.path().join("backup.json");
    run_json(
        home.path(),
        &["data", "export", "--output", backup.to_str().unwrap()],
    );

    let (_, _, code) = run_cli(home.path(), &["data", "reset"]);
    assert_eq!(code, 1);
    let reset = run_json(home.path(), &["data", "reset", "--yes"]);
    assert_eq!(reset["user"]["xp"], 0);

    let imported = run_json(home.path(), &["data", "import", backup.to_str().unwrap()]);
    assert_eq!(imported["user"]["totalLessonsCompleted"], 1);

    let broken = home.path().join("broken.json");
    std::fs::write(&broken, "{\"version\":1}").unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["data", "import", broken.to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Malformed state"));
}

#[test]
fn test_config_get_set() {
    let home = home();
    let value = run_json(home.path(), &["config", "get", "goals.weekly_xp_goal"]);
    assert_eq!(value["value"], "300");

    run_json(home.path(), &["config", "set", "calendar.week_starts_on", "monday"]);
    let value = run_json(home.path(), &["config", "get", "calendar.week_starts_on"]);
    assert_eq!(value["value"], "monday");

    let list = run_json(home.path(), &["config", "list"]);
    assert_eq!(list["challenges.daily_count"], "3");

    let (_, _, code) = run_cli(home.path(), &["config", "set", "goals.nope", "1"]);
    assert_eq!(code, 1);
    let (_, _, code) = run_cli(home.path(), &["config", "set", "goals.weekly_xp_goal", "many"]);
    assert_eq!(code, 1);
}

#[test]
fn test_settings_goal() {
    let home = home();
    let out = run_json(home.path(), &["settings", "goal", "120"]);
    assert_eq!(out["weeklyGoal"], 120);
    let (_, _, code) = run_cli(home.path(), &["settings", "goal", "0"]);
    assert_eq!(code, 1);
}

#[test]
fn test_completions() {
    let home = home();
    let (stdout, _, code) = run_cli(home.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("pathways"));
}
