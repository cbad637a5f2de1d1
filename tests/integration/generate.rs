use predicates::prelude::*;
use serde_json::json;

use crate::common::{FileAssert, TestProject};

#[test]
fn test_generate_mcp_capability() {
    let project = TestProject::new().unwrap();

    project
        .vibe_plugins()
        .args(["generate", "-n", "lint-fix", "-d", "Lint Fixer", "-t", "mcp", "-c", "效率提升"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lint Fixer"));

    let plugin = project.plugins_path().join("productivity");
    FileAssert::contains(plugin.join("mcp/lint-fix/index.js"), "lint-fix");

    let descriptor = project.read_json("plugins/productivity/.claude-plugin/plugin.json");
    assert_eq!(descriptor["name"], "productivity");
    let servers = descriptor["mcpServers"].as_array().unwrap();
    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0]["name"], "lint-fix");
    assert_eq!(servers[0]["command"], "node");

    let install = project.read_json("plugins/productivity/install.json");
    assert_eq!(install["mcp"], json!(["lint-fix"]));
    assert_eq!(install["skills"], json!([]));
}

#[test]
fn test_generate_twice_keeps_one_entry() {
    let project = TestProject::new().unwrap();
    let args = ["gen", "-n", "review", "-d", "Code Review", "-t", "command", "-c", "stability"];

    project.vibe_plugins().args(args).assert().success();
    project.vibe_plugins().args(args).assert().success();

    FileAssert::exists(project.plugins_path().join("stability/commands/review.md"));
    let descriptor = project.read_json("plugins/stability/.claude-plugin/plugin.json");
    assert_eq!(descriptor["commands"].as_array().unwrap().len(), 1);
    let install = project.read_json("plugins/stability/install.json");
    assert_eq!(install["commands"], json!(["review"]));
}

#[test]
fn test_generate_dry_run_writes_nothing() {
    let project = TestProject::new().unwrap();

    project
        .vibe_plugins()
        .args([
            "new", "-n", "notes", "-d", "Notes", "-t", "skill", "-c", "productivity", "--dry-run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run complete."));

    FileAssert::not_exists(project.plugins_path().join("productivity"));
}

#[test]
fn test_generate_unknown_type_fails() {
    let project = TestProject::new().unwrap();

    project
        .vibe_plugins()
        .args(["generate", "-n", "x", "-d", "X", "-t", "widget", "-c", "productivity"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unknown capability type: widget"));

    FileAssert::not_exists(project.plugins_path().join("productivity"));
}

#[test]
fn test_generate_rejects_path_like_name() {
    let project = TestProject::new().unwrap();

    project
        .vibe_plugins()
        .args(["generate", "-n", "../escape", "-d", "Escape", "-t", "prompt", "-c", "productivity"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid name"));
}

#[test]
fn test_generate_batch_partial_failure() {
    let project = TestProject::new().unwrap();
    project
        .write(
            "project/items.json",
            &json!([
                {"name": "a", "displayName": "A", "type": "prompt", "category": "productivity"},
                {"name": "b", "displayName": "B", "type": "nonsense", "category": "productivity"},
                {"name": "c", "displayName": "C", "type": "agent", "category": "productivity"}
            ])
            .to_string(),
        )
        .unwrap();

    project
        .vibe_plugins()
        .args(["generate-batch", "items.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated: 2 succeeded, 1 failed"));

    let plugin = project.plugins_path().join("productivity");
    FileAssert::exists(plugin.join("prompts/a.md"));
    FileAssert::exists(plugin.join("agents/c.md"));
    let install = project.read_json("plugins/productivity/install.json");
    assert_eq!(install["prompts"], json!(["a"]));
    assert_eq!(install["agents"], json!(["c"]));
}

#[test]
fn test_generate_batch_rejects_non_array() {
    let project = TestProject::new().unwrap();
    project.write("project/items.json", r#"{"name": "a"}"#).unwrap();

    project
        .vibe_plugins()
        .args(["gen-batch", "items.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid batch file"));
}

#[test]
fn test_list_types() {
    let project = TestProject::new().unwrap();

    project
        .vibe_plugins()
        .arg("list-types")
        .assert()
        .success()
        .stdout(predicate::str::contains("slash-command"))
        .stdout(predicate::str::contains("plugins/cross-platform/"))
        .stdout(predicate::str::contains("效率提升"));
}
