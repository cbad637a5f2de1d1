use predicates::prelude::*;
use serde_json::json;
use vibe_plugins::test_utils::snapshot_dir;

use crate::common::{FileAssert, TestProject};

fn cross_platform_preset(project: &TestProject) {
    project.write("presets/cross-platform/rules/overview.md", "# Overview\n").unwrap();
    project.write("presets/cross-platform/commands/ship.md", "# /ship\n").unwrap();
    project.write("presets/cross-platform/.aiignore", "node_modules/\n").unwrap();
    project
        .write(
            "presets/cross-platform/mcp.json",
            &json!({"mcpServers": {"figma": {"command": "npx", "args": ["figma-mcp"]}}})
                .to_string(),
        )
        .unwrap();
}

#[test]
fn test_install_preset_merges_mcp() {
    let project = TestProject::new().unwrap();
    cross_platform_preset(&project);
    project
        .write(
            "project/.rulesync/mcp.json",
            &json!({"mcpServers": {"local": {"command": "node"}}}).to_string(),
        )
        .unwrap();

    project
        .vp()
        .args(["install", "cross-platform"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Preset \"cross-platform\" installed"))
        .stdout(predicate::str::contains("vp generate cursor"));

    let rulesync = project.project_path().join(".rulesync");
    FileAssert::exists(rulesync.join("rules/overview.md"));
    FileAssert::exists(rulesync.join("commands/ship.md"));
    FileAssert::contains(rulesync.join(".aiignore"), "node_modules/");

    let mcp = project.read_json("project/.rulesync/mcp.json");
    assert_eq!(mcp["mcpServers"]["local"], json!({"command": "node"}));
    assert_eq!(mcp["mcpServers"]["figma"]["args"], json!(["figma-mcp"]));
}

#[test]
fn test_install_preset_into_target_dir() {
    let project = TestProject::new().unwrap();
    cross_platform_preset(&project);

    project.vp().args(["install", "cross-platform", "../app"]).assert().success();

    FileAssert::exists(project.root().join("app/.rulesync/rules/overview.md"));
    FileAssert::not_exists(project.project_path().join(".rulesync"));
}

#[test]
fn test_install_preset_dry_run() {
    let project = TestProject::new().unwrap();
    cross_platform_preset(&project);
    let before = snapshot_dir(project.root()).unwrap();

    project
        .vp()
        .args(["install", "cross-platform", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run complete."));

    assert_eq!(snapshot_dir(project.root()).unwrap(), before);
}

#[test]
fn test_install_unknown_preset() {
    let project = TestProject::new().unwrap();
    cross_platform_preset(&project);

    project
        .vp()
        .args(["install", "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Preset \"nope\" not found"))
        .stderr(predicate::str::contains("cross-platform"));
}

#[test]
fn test_list_presets() {
    let project = TestProject::new().unwrap();

    project
        .vp()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("cross-platform"))
        .stdout(predicate::str::contains("productivity"))
        .stdout(predicate::str::contains("vibe-tools"));
}
