use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const LEGACY: &str = r#"{
    "name": "world",
    "frames": [
        {"frame": 1, "angle": "orthogonal"},
        {"frame": 2, "front_face_id": 1},
        {"frame": 3, "game_id": 30, "type": "item"}
    ]
}"#;

fn project_with(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    for (name, contents) in files {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        fs::write(path, contents).expect("write file");
    }
    dir
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read output")).expect("valid JSON")
}

#[test]
fn refactor_tileset_uses_default_file_names() {
    let dir = project_with(&[("tileset_old.json", LEGACY)]);
    let mut cmd = Command::cargo_bin("refactor-tileset").expect("binary exists");
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd.assert()
        .success()
        .stderr(contains("migrated 2 frame(s)"));

    let output = read_json(&dir.path().join("tileset.json"));
    assert_eq!(
        output["frames"],
        json!([
            {"default_face": "front", "faces": {"front": 1}},
            {"default_face": "top", "faces": {"top": 2, "front": 1}},
            {"frame": 3, "game_id": 30, "type": "item"}
        ])
    );
    assert_eq!(output["name"], "world");
    assert_eq!(
        fs::read_to_string(dir.path().join("tileset_old.json")).unwrap(),
        LEGACY
    );
}

#[test]
fn refactor_tileset_writes_four_space_indent() {
    let dir = project_with(&[("old.json", r#"{"frames": []}"#)]);
    let mut cmd = Command::cargo_bin("refactor-tileset").expect("binary exists");
    cmd.current_dir(dir.path()).args(["old.json", "new.json"]);
    cmd.assert().success();
    assert_eq!(
        fs::read_to_string(dir.path().join("new.json")).unwrap(),
        "{\n    \"frames\": []\n}\n"
    );
}

#[test]
fn refactor_tileset_aborts_on_unresolved_front_face() {
    let dir = project_with(&[(
        "tileset_old.json",
        r#"{"frames": [{"frame": 4, "front_face_id": 40}]}"#,
    )]);
    let mut cmd = Command::cargo_bin("refactor-tileset").expect("binary exists");
    cmd.current_dir(dir.path());
    cmd.assert()
        .failure()
        .code(1)
        .stderr(contains("front face not found for frame 4"));
    assert!(!dir.path().join("tileset.json").exists());
}

#[test]
fn refactor_tileset_dry_run_prints_instead_of_writing() {
    let dir = project_with(&[("tileset_old.json", LEGACY)]);
    let mut cmd = Command::cargo_bin("refactor-tileset").expect("binary exists");
    cmd.current_dir(dir.path()).arg("--dry-run");
    cmd.assert()
        .success()
        .stdout(contains("\"default_face\": \"front\""));
    assert!(!dir.path().join("tileset.json").exists());
}

#[test]
fn refactor_tileset_reports_missing_input() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut cmd = Command::cargo_bin("refactor-tileset").expect("binary exists");
    cmd.current_dir(dir.path());
    cmd.assert()
        .failure()
        .stderr(contains("unable to read tileset_old.json"));
}

const GAME_LEGACY: &str = r#"{
    "tile_width": 16,
    "tile_height": 16,
    "frames": [
        {"frame": 1, "game_id": 1, "type": "tile", "sprite_type": "single", "angle": "orthogonal"},
        {"frame": 2, "game_id": 2, "type": "tile", "sprite_type": "single", "front_face_id": 1},
        {"frame": 3, "game_id": 3, "type": "item", "sprite_type": "multiple",
         "width": 1, "height": 2, "anchor_x": 0, "anchor_y": 1, "angle": "parallel"}
    ]
}"#;

#[test]
fn refactor_tileset_verify_loads_output_like_the_game() {
    let dir = project_with(&[("tileset_old.json", GAME_LEGACY)]);
    let mut cmd = Command::cargo_bin("refactor-tileset").expect("binary exists");
    cmd.current_dir(dir.path())
        .arg("--verify")
        .env_remove("RUST_LOG");
    cmd.assert()
        .success()
        .stderr(contains("loads as 3 frame(s), 1 multi-cell"));
}

#[test]
fn refactor_tileset_verify_rejects_output_the_game_cannot_load() {
    // No game_id/type/sprite_type: migrates fine but the game loader refuses it.
    let dir = project_with(&[("tileset_old.json", LEGACY)]);
    let mut cmd = Command::cargo_bin("refactor-tileset").expect("binary exists");
    cmd.current_dir(dir.path()).arg("--verify");
    cmd.assert()
        .failure()
        .code(1)
        .stderr(contains("failed to load tileset.json"))
        .stderr(contains("frame record 0 is malformed"));
}

#[test]
fn refactor_tileset_keeps_records_it_does_not_migrate() {
    let source = r#"{"frames": [{"frame": -1, "type": "marker"}, {"frame": "a"}]}"#;
    let dir = project_with(&[("tileset_old.json", source)]);
    let mut cmd = Command::cargo_bin("refactor-tileset").expect("binary exists");
    cmd.current_dir(dir.path());
    cmd.assert().success();
    assert_eq!(
        read_json(&dir.path().join("tileset.json")),
        serde_json::from_str::<Value>(source).unwrap()
    );
}

#[test]
fn launcher_dry_run_prints_default_plan() {
    let dir = project_with(&[("data/scripts/init.lua", "-- init")]);
    let mut cmd = Command::cargo_bin("ysamba-run").expect("binary exists");
    cmd.arg("--root")
        .arg(dir.path())
        .arg("--dry-run")
        .env_remove("RUST_LOG");
    cmd.assert()
        .success()
        .stderr(contains("would run `cmake -B"))
        .stderr(contains("would run `cmake --build"))
        .stderr(contains("would mirror"))
        .stderr(contains("build/bin/ysamba").or(contains("build\\bin\\ysamba")));
    assert!(!dir.path().join("build").exists());
}

#[test]
fn launcher_fails_when_binary_is_missing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut cmd = Command::cargo_bin("ysamba-run").expect("binary exists");
    cmd.arg("--root").arg(dir.path()).arg("--run");
    cmd.assert()
        .failure()
        .code(1)
        .stderr(contains("failed to launch"));
}

#[test]
fn launcher_rejects_unknown_flag() {
    let mut cmd = Command::cargo_bin("ysamba-run").expect("binary exists");
    cmd.arg("--deploy");
    cmd.assert().failure().stderr(contains("--deploy"));
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn install_fake_binary(root: &Path, script: &str) {
        let bin = root.join("build/bin/ysamba");
        fs::create_dir_all(bin.parent().unwrap()).unwrap();
        fs::write(&bin, format!("#!/bin/sh\n{script}\n")).unwrap();
        fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn launcher_run_stages_scripts_and_runs_from_root() {
        let dir = project_with(&[("data/scripts/ai/walk.lua", "return {}")]);
        install_fake_binary(dir.path(), "cat build/bin/data/scripts/ai/walk.lua > ran.txt");

        let mut cmd = Command::cargo_bin("ysamba-run").expect("binary exists");
        cmd.arg("--root").arg(dir.path()).arg("-r");
        cmd.assert().success();

        assert_eq!(
            fs::read_to_string(dir.path().join("ran.txt")).unwrap(),
            "return {}"
        );
    }

    #[test]
    fn launcher_propagates_exit_code_of_failing_tool() {
        let dir = tempfile::tempdir().expect("temp dir");
        install_fake_binary(dir.path(), "exit 4");

        let mut cmd = Command::cargo_bin("ysamba-run").expect("binary exists");
        cmd.arg("--root").arg(dir.path()).arg("--run");
        cmd.assert()
            .failure()
            .code(4)
            .stderr(contains("exited with status 4"));
    }
}
