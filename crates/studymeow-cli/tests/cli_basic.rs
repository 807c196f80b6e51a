//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary and verify its JSON output.

mod common;

use common::{assert_contains, Home};

#[test]
fn test_task_lifecycle() {
    let home = Home::new();
    let task = home.json(&["task", "add", "Read chapter 3", "--minutes", "30", "--difficulty", "hard"]);
    assert_eq!(task["status"], "pending");
    assert_eq!(task["difficulty"], "hard");
    assert_eq!(task["estimated_minutes"], 30);
    let id = task["id"].as_str().unwrap().to_string();

    let tasks = home.json(&["task", "list"]);
    assert_eq!(tasks.as_array().unwrap().len(), 1);

    let started = home.json(&["task", "start", &id]);
    assert_eq!(started["status"], "in-progress");
    let in_progress = home.json(&["task", "list", "--status", "in-progress"]);
    assert_eq!(in_progress.as_array().unwrap().len(), 1);

    let done = home.json(&["task", "complete", &id, "--minutes", "28"]);
    assert_eq!(done["status"], "completed");
    assert_eq!(done["actual_minutes"], 28);

    let today = home.json(&["task", "today"]);
    assert_eq!(today.as_array().unwrap().len(), 1);

    let out = home.success(&["task", "delete", &id]);
    assert_contains(&out, "Task deleted:");
    let tasks = home.json(&["task", "list"]);
    assert!(tasks.as_array().unwrap().is_empty());
}

#[test]
fn test_task_update() {
    let home = Home::new();
    let task = home.json(&["task", "add", "Flashcards"]);
    let id = task["id"].as_str().unwrap().to_string();

    let updated = home.json(&["task", "update", &id, "--title", "Spanish flashcards", "--priority", "high"]);
    assert_eq!(updated["title"], "Spanish flashcards");
    assert_eq!(updated["priority"], "high");
    assert_eq!(updated["estimated_minutes"], 25);

    let fetched = home.json(&["task", "get", &id]);
    assert_eq!(fetched["title"], "Spanish flashcards");
}

#[test]
fn test_task_rejects_invalid_input() {
    let home = Home::new();
    let err = home.failure(&["task", "add", "Nothing", "--minutes", "0"]);
    assert_contains(&err, "error:");
    home.failure(&["task", "get", "missing-id"]);
    home.failure(&["task", "start", "missing-id"]);
}

#[test]
fn test_timer_start_pause_stop() {
    let home = Home::new();
    let status = home.json(&["timer", "status"]);
    assert_eq!(status["state"], "idle");
    assert_eq!(status["target_secs"], 1500);

    let started = home.json(&["timer", "start"]);
    assert_eq!(started["state"], "running");

    let paused = home.json(&["timer", "pause"]);
    assert_eq!(paused["state"], "paused");

    let stopped = home.json(&["timer", "stop"]);
    assert_eq!(stopped["type"], "timer_stopped");
    let status = home.json(&["timer", "status"]);
    assert_eq!(status["state"], "idle");
}

#[test]
fn test_timer_duration() {
    let home = Home::new();
    let snapshot = home.json(&["timer", "duration", "2700"]);
    assert_eq!(snapshot["target_secs"], 2700);
    assert_eq!(home.success(&["config", "get", "timer.focus_duration_secs"]).trim(), "2700");
    home.failure(&["timer", "duration", "0"]);

    let presets = home.json(&["timer", "presets"]);
    assert_eq!(presets, serde_json::json!([1500, 2700, 3600]));
}

#[test]
fn test_config_focus_change_reaches_saved_timer() {
    let home = Home::new();
    home.success(&["timer", "start"]);
    home.success(&["timer", "tick", "--count", "3"]);
    home.success(&["config", "set", "timer.focus_duration_secs", "3600"]);

    // The running session keeps its target until it is stopped.
    let status = home.json(&["timer", "status"]);
    assert_eq!(status["target_secs"], 1500);
    assert_eq!(status["elapsed_secs"], 3);

    home.success(&["timer", "stop"]);
    let status = home.json(&["timer", "status"]);
    assert_eq!(status["target_secs"], 3600);
}

#[test]
fn test_config_seed_can_be_cleared() {
    let home = Home::new();
    home.success(&["config", "set", "rewards.seed", "42"]);
    assert_eq!(home.success(&["config", "get", "rewards.seed"]).trim(), "42");
    home.success(&["config", "set", "rewards.seed", "none"]);
    assert_eq!(home.success(&["config", "get", "rewards.seed"]).trim(), "null");
}

#[test]
fn test_progress_study_and_register() {
    let home = Home::new();
    let outcome = home.json(&["progress", "study", "30"]);
    assert_eq!(outcome["xp_gained"], 5);
    assert_eq!(outcome["leveled_up"], false);

    let progress = home.json(&["progress", "show"]);
    assert_eq!(progress["level"], 1);
    assert_eq!(progress["experience"], 5);
    assert_eq!(progress["total_study_minutes"], 30);
    assert_eq!(progress["required_xp"], 100);

    home.failure(&["progress", "study", "0"]);

    let fresh = home.json(&["progress", "register", "mia", "--email", "mia@example.com"]);
    assert_eq!(fresh["username"], "mia");
    assert_eq!(fresh["total_study_minutes"], 0);
}

#[test]
fn test_cards_catalog_and_progress() {
    let home = Home::new();
    let catalog = home.json(&["cards", "catalog"]);
    assert_eq!(catalog["entries"].as_array().unwrap().len(), 8);

    let progress = home.json(&["cards", "progress"]);
    assert_eq!(progress["total"], 8);
    assert_eq!(progress["collected"], 0);

    let owned = home.json(&["cards", "list"]);
    assert!(owned.as_array().unwrap().is_empty());

    // A zero ratio can never clear the drop threshold.
    let roll = home.json(&["cards", "roll", "--difficulty", "hard", "--ratio", "0"]);
    assert_eq!(roll["result"], "none");

    home.failure(&["cards", "remove", "missing-id"]);
}

#[test]
fn test_config_get_set() {
    let home = Home::new();
    assert_eq!(home.success(&["config", "get", "timer.focus_duration_secs"]).trim(), "1500");

    home.success(&["config", "set", "timer.break_duration_secs", "600"]);
    assert_eq!(home.success(&["config", "get", "timer.break_duration_secs"]).trim(), "600");

    let cfg = home.json(&["config", "show"]);
    assert_eq!(cfg["timer"]["break_duration_secs"], 600);

    home.failure(&["config", "set", "timer.nonexistent", "1"]);
    home.failure(&["config", "get", "timer.nonexistent"]);

    home.success(&["config", "reset"]);
    assert_eq!(home.success(&["config", "get", "timer.break_duration_secs"]).trim(), "300");
}

#[test]
fn test_stats() {
    let home = Home::new();
    let stats = home.json(&["stats"]);
    assert_eq!(stats["total_tasks"], 0);
    assert_eq!(stats["completion_rate"], 0);
    assert_eq!(stats["sessions_recorded"], 0);
    assert_eq!(stats["level"], 1);
}
