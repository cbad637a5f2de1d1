use predicates::prelude::*;
use serde_json::json;
use std::fs;
use vibe_plugins::test_utils::{PluginFixture, snapshot_dir};

use crate::common::{FileAssert, TestProject};

fn demo_plugin(project: &TestProject) {
    PluginFixture::new("demo")
        .with_mcp("alpha")
        .skill_source("fmt")
        .command_source("ship")
        .install_json(json!({"mcp": ["alpha"], "skills": ["fmt"], "commands": ["ship"]}))
        .write(&project.plugins_path())
        .unwrap();
}

#[test]
fn test_install_detects_claude() {
    let project = TestProject::new().unwrap();
    demo_plugin(&project);
    fs::create_dir_all(project.project_path().join(".claude")).unwrap();

    project
        .vibe_plugins()
        .args(["install", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Installation complete."))
        .stdout(predicate::str::contains("./.claude-plugin/demo"));

    let installed = project.project_path().join(".claude-plugin/demo");
    FileAssert::exists(installed.join("mcp/alpha/index.js"));
    FileAssert::exists(installed.join("skills/fmt/SKILL.md"));

    let descriptor = project.read_json("project/.claude-plugin/demo/.claude-plugin/plugin.json");
    let servers = descriptor["mcpServers"].as_array().unwrap();
    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0]["name"], "alpha");
    assert_eq!(servers[0]["args"], json!(["./mcp/alpha/index.js"]));
}

#[test]
fn test_install_into_qoder_project() {
    let project = TestProject::new().unwrap();
    demo_plugin(&project);
    project.write("project/qoder.config.json", "{}\n").unwrap();

    project.vibe_plugins().args(["add", "demo"]).assert().success();

    let target = project.project_path();
    FileAssert::exists(target.join("mcp/demo/alpha/index.js"));
    FileAssert::exists(target.join("skills/fmt/SKILL.md"));
    FileAssert::exists(target.join("commands/ship.md"));

    let config = project.read_json("project/qoder.config.json");
    assert_eq!(
        config["mcp"],
        json!([{"name": "alpha", "command": "node", "args": ["./mcp/demo/alpha/index.js"]}])
    );
    assert_eq!(config["skills"], json!(["fmt"]));
    assert_eq!(config["commands"], json!(["ship"]));

    // A second run changes nothing in the registry.
    project.vibe_plugins().args(["install", "demo"]).assert().success();
    assert_eq!(project.read_json("project/qoder.config.json"), config);
}

#[test]
fn test_install_forced_cursor_uses_home() {
    let project = TestProject::new().unwrap();
    demo_plugin(&project);
    // The Claude marker is ignored when the environment is forced.
    fs::create_dir_all(project.project_path().join(".claude")).unwrap();

    project
        .vibe_plugins()
        .args(["install", "demo", "--env", "cursor"])
        .assert()
        .success();

    let store = project.home_path().join(".cursor/vibe-plugins/demo/mcp");
    FileAssert::exists(store.join("alpha/index.js"));
    FileAssert::not_exists(project.project_path().join(".claude-plugin"));

    let settings = project.read_json("home/.cursor/settings.json");
    let entry = &settings["mcpServers"]["alpha"];
    assert_eq!(entry["command"], "node");
    assert_eq!(entry["args"], json!([store.join("alpha/index.js").display().to_string()]));
}

#[test]
fn test_install_dry_run_writes_nothing() {
    let project = TestProject::new().unwrap();
    demo_plugin(&project);
    project.write("project/qoder.config.json", "{}\n").unwrap();
    let before = snapshot_dir(project.root()).unwrap();

    project
        .vibe_plugins()
        .args(["install", "demo", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Planned actions:"))
        .stdout(predicate::str::contains("Dry run complete. No files were written."));

    assert_eq!(snapshot_dir(project.root()).unwrap(), before);
}

#[test]
fn test_install_undetected_environment_fails() {
    let project = TestProject::new().unwrap();
    demo_plugin(&project);

    project
        .vibe_plugins()
        .args(["install", "demo"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unable to detect environment"))
        .stderr(predicate::str::contains("--env"));
}

#[test]
fn test_install_missing_plugin_fails() {
    let project = TestProject::new().unwrap();
    fs::create_dir_all(project.project_path().join(".claude")).unwrap();

    project
        .vibe_plugins()
        .args(["install", "ghost"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Plugin \"ghost\" not found"));
}

#[test]
fn test_install_target_flag() {
    let project = TestProject::new().unwrap();
    demo_plugin(&project);
    let elsewhere = project.root().join("elsewhere");
    fs::create_dir_all(elsewhere.join(".claude-plugin")).unwrap();

    project
        .vibe_plugins()
        .args(["install", "demo", "--target"])
        .arg(&elsewhere)
        .assert()
        .success();

    FileAssert::exists(elsewhere.join(".claude-plugin/demo/.claude-plugin/plugin.json"));
}

#[test]
fn test_debug_env_prints_error_chain() {
    let project = TestProject::new().unwrap();

    project
        .vibe_plugins()
        .env("VIBE_PLUGINS_DEBUG", "1")
        .args(["install", "ghost", "--env", "qoder"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("debug:"));
}

#[test]
fn test_install_rejects_descriptor_name_outside_target() {
    let project = TestProject::new().unwrap();
    PluginFixture::new("demo")
        .descriptor(json!({"name": "../../precious", "mcpServers": []}))
        .with_mcp("alpha")
        .write(&project.plugins_path())
        .unwrap();
    project.write("precious/keep.txt", "keep\n").unwrap();
    fs::create_dir_all(project.project_path().join(".claude")).unwrap();

    for _ in 0..2 {
        project
            .vibe_plugins()
            .args(["install", "demo"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Invalid name \"../../precious\""));
    }

    FileAssert::contains(project.root().join("precious/keep.txt"), "keep");
    FileAssert::not_exists(project.project_path().join(".claude-plugin"));
}

#[test]
fn test_install_rejects_unit_name_outside_target() {
    let project = TestProject::new().unwrap();
    PluginFixture::new("demo")
        .skill_source("fmt")
        .install_json(json!({"skills": ["../x"]}))
        .write(&project.plugins_path())
        .unwrap();
    project.write("project/qoder.config.json", "{}\n").unwrap();
    let before = snapshot_dir(project.root()).unwrap();

    project
        .vibe_plugins()
        .args(["install", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid name \"../x\""));

    assert_eq!(snapshot_dir(project.root()).unwrap(), before);
}
