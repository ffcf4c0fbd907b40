//! Integration tests for the `rota` CLI.
//!
//! Each test creates a temp board directory, runs `rota` as a subprocess,
//! and verifies stdout and/or the table files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Path to the built `rota` binary.
fn rota_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_rota"))
}

/// Create a small board: two teams, three profiles, two tasks.
fn create_test_board(root: &Path) {
    let rota_dir = root.join("rota");
    fs::create_dir_all(rota_dir.join("tables")).unwrap();

    fs::write(
        rota_dir.join("rota.toml"),
        r#"[board]
name = "Studio"

[session]
user = "u-sarah"
"#,
    )
    .unwrap();

    fs::write(
        rota_dir.join("tables/teams.json"),
        r#"[
  { "id": "t-design", "name": "Design", "order_index": 0 },
  { "id": "t-eng", "name": "Engineering", "order_index": 1 }
]
"#,
    )
    .unwrap();

    fs::write(
        rota_dir.join("tables/profiles.json"),
        r#"[
  { "id": "u-sarah", "full_name": "Sarah Chen", "email": "sarah@example.com",
    "role": "Designer", "team_id": "t-design", "is_admin": true, "status": "active" },
  { "id": "u-mike", "full_name": "Mike Ross", "email": "mike@example.com",
    "team_id": "t-eng", "is_admin": false, "status": "active" },
  { "id": "u-olive", "full_name": "Olive Gone", "status": "deactivated" }
]
"#,
    )
    .unwrap();

    fs::write(
        rota_dir.join("tables/tasks.json"),
        r##"[
  { "id": "task-1", "title": "Marketing Strategy", "description": "Q4 plan",
    "assignee_id": "u-sarah", "assignee": "Sarah Chen", "day": "Mon",
    "time_block": "morning", "team": "Design", "color": "#AF52DE" },
  { "id": "task-2", "title": "Client Support", "assignee_id": "u-mike",
    "assignee": "Mike Ross", "day": "Wed", "time_block": "whole-day",
    "team": "Engineering", "color": "#FF2D55" }
]
"##,
    )
    .unwrap();
}

/// Run `rota` with the given args in the given directory, returning (stdout, stderr, success).
fn run_rota(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(rota_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("ROTA_LOG")
        .output()
        .expect("failed to run rota");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `rota` expecting success, return stdout.
fn run_rota_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_rota(dir, args);
    if !success {
        panic!(
            "rota {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

fn read_table(root: &Path, name: &str) -> serde_json::Value {
    let text = fs::read_to_string(root.join(format!("rota/tables/{}.json", name))).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn task_row<'a>(tasks: &'a serde_json::Value, id: &str) -> &'a serde_json::Value {
    tasks
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == id)
        .unwrap()
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

#[test]
fn test_init_creates_workspace() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_rota_ok(tmp.path(), &["init", "--name", "Studio", "--user", "u-sarah"]);
    assert!(out.contains("Initialized rota board: Studio"));

    let config = fs::read_to_string(tmp.path().join("rota/rota.toml")).unwrap();
    assert!(config.contains("name = \"Studio\""));
    assert!(config.contains("user = \"u-sarah\""));
    assert_eq!(read_table(tmp.path(), "tasks"), serde_json::json!([]));
}

#[test]
fn test_init_twice_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_rota_ok(tmp.path(), &["init"]);
    let (_, stderr, success) = run_rota(tmp.path(), &["init"]);
    assert!(!success);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("already exists"));
}

#[test]
fn test_outside_workspace_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_, stderr, success) = run_rota(tmp.path(), &["teams"]);
    assert!(!success);
    assert!(stderr.contains("not a rota workspace"));
}

#[test]
fn test_login_sets_session_user() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    let out = run_rota_ok(tmp.path(), &["login", "u-mike"]);
    assert!(out.contains("Signed in as u-mike"));
    let config = fs::read_to_string(tmp.path().join("rota/rota.toml")).unwrap();
    assert!(config.contains("user = \"u-mike\""));
    assert!(config.contains("name = \"Studio\""));
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

#[test]
fn test_teams_with_member_counts() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    let out = run_rota_ok(tmp.path(), &["teams"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Design (1 member)"));
    assert!(lines[1].contains("Engineering (1 member)"));
}

#[test]
fn test_members_hides_deactivated_by_default() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    let out = run_rota_ok(tmp.path(), &["members"]);
    assert!(out.contains("Sarah Chen"));
    assert!(out.contains("[admin]"));
    assert!(!out.contains("Olive Gone"));

    let all = run_rota_ok(tmp.path(), &["members", "--all"]);
    assert!(all.contains("Olive Gone"));
    assert!(all.contains("[deactivated]"));
}

#[test]
fn test_members_json() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    let out = run_rota_ok(tmp.path(), &["members", "--team", "engineering", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    let arr = parsed.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["id"], "u-mike");
    assert_eq!(arr[0]["title"], "Engineering Team Member");
    assert_eq!(arr[0]["team"], "Engineering");
}

#[test]
fn test_tasks_filters() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    let out = run_rota_ok(tmp.path(), &["tasks"]);
    assert_eq!(out.lines().count(), 2);

    let wed = run_rota_ok(tmp.path(), &["tasks", "--day", "wed"]);
    assert!(wed.contains("Client Support"));
    assert!(!wed.contains("Marketing Strategy"));

    let design = run_rota_ok(tmp.path(), &["tasks", "--team", "Design", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&design).unwrap();
    let arr = parsed.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["title"], "Marketing Strategy");
    assert_eq!(arr[0]["time_block"], "morning");
    assert_eq!(arr[0]["description"], "Q4 plan");
}

#[test]
fn test_projects_filter() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    let out = run_rota_ok(tmp.path(), &["projects", "market"]);
    assert_eq!(out.trim(), "#AF52DE  Marketing Strategy");
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

#[test]
fn test_assign_creates_task_in_member_team() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    let out = run_rota_ok(
        tmp.path(),
        &["assign", "mike", "fri", "Platform Upgrade", "--block", "pm", "--json"],
    );
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["ok"], true);
    assert_eq!(parsed["message"], "Task created");
    let id = parsed["id"].as_str().unwrap().to_string();

    let tasks = read_table(tmp.path(), "tasks");
    let row = task_row(&tasks, &id);
    assert_eq!(row["title"], "Platform Upgrade");
    assert_eq!(row["team"], "Engineering");
    assert_eq!(row["day"], "Fri");
    assert_eq!(row["time_block"], "afternoon");
    assert_eq!(row["assignee"], "Mike Ross");
    assert_eq!(row["color"], "#5AC8FA");
}

#[test]
fn test_assign_unknown_project_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    let (_, stderr, success) = run_rota(tmp.path(), &["assign", "mike", "mon", "Nope"]);
    assert!(!success);
    assert!(stderr.contains("no project matches"));
    assert_eq!(read_table(tmp.path(), "tasks").as_array().unwrap().len(), 2);
}

#[test]
fn test_move_task() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    let out = run_rota_ok(tmp.path(), &["move", "task-1", "thu", "Engineering"]);
    assert!(out.contains("Task moved to Engineering Thu"));

    let tasks = read_table(tmp.path(), "tasks");
    let row = task_row(&tasks, "task-1");
    assert_eq!(row["day"], "Thu");
    assert_eq!(row["team"], "Engineering");
    // the rest of the row is untouched
    assert_eq!(row["assignee"], "Sarah Chen");
}

#[test]
fn test_move_to_unknown_team_fails() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    let (_, stderr, success) = run_rota(tmp.path(), &["move", "task-1", "thu", "Sales"]);
    assert!(!success);
    assert!(stderr.contains("no team named"));
}

#[test]
fn test_edit_and_clear_description() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    run_rota_ok(tmp.path(), &["edit", "task-1", "--project", "User Testing"]);
    let tasks = read_table(tmp.path(), "tasks");
    let row = task_row(&tasks, "task-1");
    assert_eq!(row["title"], "User Testing");
    assert_eq!(row["color"], "#FF3B30");
    assert_eq!(row["description"], "Q4 plan");

    run_rota_ok(tmp.path(), &["edit", "task-1", "--description", ""]);
    let tasks = read_table(tmp.path(), "tasks");
    assert!(task_row(&tasks, "task-1")["description"].is_null());
}

#[test]
fn test_delete_task() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    run_rota_ok(tmp.path(), &["delete", "task-2"]);
    let tasks = read_table(tmp.path(), "tasks");
    let ids: Vec<&str> = tasks
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["task-1"]);
}

#[test]
fn test_admin_toggle_and_reassign() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    let out = run_rota_ok(tmp.path(), &["admin", "Mike Ross"]);
    assert!(out.contains("Admin rights granted"));

    run_rota_ok(tmp.path(), &["reassign", "u-mike", "unassigned"]);
    let out = run_rota_ok(tmp.path(), &["members", "--team", "Unassigned", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed[0]["id"], "u-mike");
    assert_eq!(parsed[0]["is_admin"], true);
}

#[test]
fn test_theme_cycle_and_set() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_board(tmp.path());
    let out = run_rota_ok(tmp.path(), &["theme"]);
    assert!(out.contains("Theme set to light"));
    let out = run_rota_ok(tmp.path(), &["--as", "u-mike", "theme", "dark"]);
    assert!(out.contains("Theme set to dark"));

    let profiles = read_table(tmp.path(), "profiles");
    let by_id = |id: &str| {
        profiles
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["id"] == id)
            .unwrap()["theme_preference"]
            .clone()
    };
    assert_eq!(by_id("u-sarah"), "light");
    assert_eq!(by_id("u-mike"), "dark");
}

#[test]
fn test_seed_team_and_member() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_rota_ok(tmp.path(), &["init", "--name", "Studio"]);
    run_rota_ok(tmp.path(), &["team", "add", "Design"]);
    run_rota_ok(tmp.path(), &["team", "add", "Research"]);
    run_rota_ok(
        tmp.path(),
        &["member", "add", "Ana Ruiz", "--team", "Research", "--role", "Researcher"],
    );

    let teams = read_table(tmp.path(), "teams");
    assert_eq!(teams[1]["name"], "Research");
    assert_eq!(teams[1]["order_index"], 1);

    let out = run_rota_ok(tmp.path(), &["members"]);
    assert!(out.contains("Ana Ruiz"));
    assert!(out.contains("Researcher"));
    assert!(out.contains("Research"));
}
