use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_path(name: &str) -> String {
    workspace_root()
        .join("tests/fixtures")
        .join(name)
        .to_string_lossy()
        .to_string()
}

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_chronicon-stash"))
        .args(args)
        .output()
        .expect("failed to run chronicon-stash CLI")
}

#[test]
fn cli_lists_live_items_by_default() {
    let output = run_cli(&[&fixture_path("player.stash")]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Version: 2.5  Size: 2  Items: 3",
            "   1: Sword",
            "   2: Amulet of Haste",
        ]
    );
}

#[test]
fn cli_all_includes_stale_items() {
    let output = run_cli(&["--all", &fixture_path("player.stash")]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 4);
    assert!(stdout.contains("   3: Old Boots (stale)"));
}

#[test]
fn cli_prints_item_sheet() {
    let output = run_cli(&["--item", "1", &fixture_path("player.stash")]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "   1: Sword");
    assert_eq!(lines[1].trim(), "dmg = 1.0");
    assert_eq!(lines[2].trim(), "level = 12.0");
    assert_eq!(lines.len(), 5);
}

#[test]
fn cli_json_exports_live_items() {
    let output = run_cli(&["--json", &fixture_path("player.stash")]);
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(json["version"], 2.5);
    assert_eq!(json["size"], 2);
    assert_eq!(json["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["items"][0]["stats"]["rarity"], "rare");
}

#[test]
fn cli_json_item_lists_stats() {
    let output = run_cli(&["--json", "--item", "2", &fixture_path("player.stash")]);
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    let names: Vec<&str> = json
        .as_array()
        .expect("array of stats")
        .iter()
        .filter_map(|s| s["name"].as_str())
        .collect();
    assert_eq!(names, vec!["empty", "id", "name", "speed"]);
    assert_eq!(json[1]["kind"], "Opaque(2)");
}

#[test]
fn cli_unknown_item_fails_with_usage_code() {
    let output = run_cli(&["--item", "7", &fixture_path("player.stash")]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no item 7"));
}

#[test]
fn cli_check_reports_identical_roundtrip() {
    let output = run_cli(&["--check", &fixture_path("player.stash")]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("identical"));
}

#[test]
fn cli_legacy_check_reports_difference() {
    let output = run_cli(&["--check", "--legacy", &fixture_path("player.stash")]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("differs"));
}

#[test]
fn cli_rejects_missing_file() {
    let output = run_cli(&[&fixture_path("missing.stash")]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error reading"));
}
