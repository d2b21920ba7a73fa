use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_data_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("habitgrid-{nanos}-{name}"))
}

fn seed_store(dir: &Path, tasks: serde_json::Value) {
    std::fs::create_dir_all(dir).unwrap();
    let content = serde_json::json!({
        "schema_version": 1,
        "tasks": tasks,
    });
    std::fs::write(
        dir.join("habits.json"),
        serde_json::to_string_pretty(&content).unwrap(),
    )
    .unwrap();
}

fn habit(dir: &Path, args: &[&str]) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_habit");
    Command::new(exe)
        .args(args)
        .env("HABITGRID_DATA_DIR", dir)
        .env("HABITGRID_CONFIG_PATH", dir.join("config.json"))
        .env("HABITGRID_TODAY", "2024-06-15")
        .output()
        .expect("failed to run habit command")
}

fn load_tasks(dir: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(dir.join("habits.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    parsed["tasks"].clone()
}

fn exercise_task() -> serde_json::Value {
    serde_json::json!({
        "id": "task-1",
        "name": "Exercise",
        "icon": "💪",
        "colors": [
            { "id": "done", "name": "Done", "hue": 142 },
            { "id": "partial", "name": "Partial", "hue": 38 },
            { "id": "missed", "name": "Missed", "hue": 0 }
        ],
        "grid_data": {},
        "created_at": "2024-01-01T00:00:00Z"
    })
}

#[test]
fn first_run_seeds_default_habits() {
    let dir = temp_data_dir("seed");

    let output = habit(&dir, &["list"]);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let tasks = load_tasks(&dir);
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    assert!(stdout.contains("Exercise"));
    assert!(stdout.contains("Study"));
    assert_eq!(tasks.as_array().unwrap().len(), 2);
}

#[test]
fn add_writes_habit_to_store() {
    let dir = temp_data_dir("add");
    seed_store(&dir, serde_json::json!([exercise_task()]));

    let output = habit(&dir, &["add", "Read", "--icon", "📖"]);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let tasks = load_tasks(&dir);
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    assert!(stdout.contains("Added habit: 📖 Read"));
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[1]["name"], "Read");
    assert_eq!(tasks[1]["colors"].as_array().unwrap().len(), 3);
}

#[test]
fn add_rejects_blank_name() {
    let dir = temp_data_dir("add-blank");
    seed_store(&dir, serde_json::json!([exercise_task()]));

    let output = habit(&dir, &["add", "  "]);
    std::fs::remove_dir_all(&dir).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn add_uses_configured_default_icon() {
    let dir = temp_data_dir("add-icon");
    seed_store(&dir, serde_json::json!([exercise_task()]));

    let output = habit(
        &dir,
        &["--config-override", "default_icon=🥗", "add", "Eat well"],
    );
    let tasks = load_tasks(&dir);
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    assert_eq!(tasks.as_array().unwrap()[1]["icon"], "🥗");
}

#[test]
fn edit_updates_name_and_icon() {
    let dir = temp_data_dir("edit");
    seed_store(&dir, serde_json::json!([exercise_task()]));

    let output = habit(
        &dir,
        &["edit", "task-1", "--name", "Morning run", "--icon", "🏃"],
    );
    let tasks = load_tasks(&dir);
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    assert_eq!(tasks.as_array().unwrap()[0]["name"], "Morning run");
    assert_eq!(tasks.as_array().unwrap()[0]["icon"], "🏃");
}

#[test]
fn edit_rejects_unknown_habit() {
    let dir = temp_data_dir("edit-missing");
    seed_store(&dir, serde_json::json!([exercise_task()]));

    let output = habit(&dir, &["edit", "task-9", "--name", "x"]);
    std::fs::remove_dir_all(&dir).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: not_found"));
}

#[test]
fn delete_removes_habit() {
    let dir = temp_data_dir("delete");
    seed_store(&dir, serde_json::json!([exercise_task()]));

    let output = habit(&dir, &["delete", "task-1"]);
    let tasks = load_tasks(&dir);
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    assert!(tasks.as_array().unwrap().is_empty());
}

#[test]
fn show_json_includes_palette_and_grid() {
    let dir = temp_data_dir("show-json");
    let mut task = exercise_task();
    task["grid_data"] = serde_json::json!({ "2024-0-15": "done" });
    seed_store(&dir, serde_json::json!([task]));

    let output = habit(&dir, &["--json", "show", "task-1"]);
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    assert_eq!(parsed["id"], "task-1");
    assert_eq!(parsed["grid_data"]["2024-0-15"], "done");
    assert_eq!(parsed["colors"].as_array().unwrap().len(), 3);
}

#[test]
fn list_json_reports_marked_day_counts() {
    let dir = temp_data_dir("list-json");
    let mut task = exercise_task();
    task["grid_data"] = serde_json::json!({ "2024-0-15": "done", "2024-0-16": "missed" });
    seed_store(&dir, serde_json::json!([task]));

    let output = habit(&dir, &["--json", "list"]);
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    let tasks = parsed.as_array().expect("json array");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["marked_days"], 2);
}

#[test]
fn malformed_store_is_reported_not_replaced() {
    let dir = temp_data_dir("malformed");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("habits.json"), "{ not json ").unwrap();

    let output = habit(&dir, &["list"]);
    let content = std::fs::read_to_string(dir.join("habits.json")).unwrap();
    std::fs::remove_dir_all(&dir).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_data"));
    assert_eq!(content, "{ not json ");
}

#[test]
fn interactive_mode_runs_commands_until_exit() {
    use std::io::Write;
    use std::process::Stdio;

    let dir = temp_data_dir("interactive");
    seed_store(&dir, serde_json::json!([exercise_task()]));

    let exe = env!("CARGO_BIN_EXE_habit");
    let mut child = Command::new(exe)
        .env("HABITGRID_DATA_DIR", &dir)
        .env("HABITGRID_CONFIG_PATH", dir.join("config.json"))
        .env("HABITGRID_TODAY", "2024-06-15")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn interactive session");

    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(b"list\nadd \"Drink water\"\nexit\n")
        .unwrap();

    let output = child.wait_with_output().unwrap();
    let tasks = load_tasks(&dir);
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Exercise"));
    assert!(stdout.contains("Added habit"));
    assert_eq!(tasks.as_array().unwrap().len(), 2);
    assert_eq!(tasks.as_array().unwrap()[1]["name"], "Drink water");
}
