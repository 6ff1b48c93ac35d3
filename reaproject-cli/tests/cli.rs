use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn inspect_renders_treeviz_by_default() {
    let mut cmd = cargo_bin_cmd!("reaproject");
    cmd.arg("inspect").arg(fixture_path("two_tracks.rpp"));

    cmd.assert().success().stdout(
        predicate::str::contains("⧉ REAPER_PROJECT")
            .and(predicate::str::contains("▣ TRACK"))
            .and(predicate::str::contains("· NAME Kick")),
    );
}

#[test]
fn inspect_as_json() {
    let mut cmd = cargo_bin_cmd!("reaproject");
    cmd.arg("inspect")
        .arg(fixture_path("minimal.rpp"))
        .arg("--format")
        .arg("json");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""tag": "REAPER_PROJECT""#));
}

#[test]
fn inspect_reports_parse_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.rpp");
    fs::write(&path, "<REAPER_PROJECT\n  <TRACK\n>\n").unwrap();

    let mut cmd = cargo_bin_cmd!("reaproject");
    cmd.arg("inspect").arg(&path);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("chunk <REAPER_PROJECT opened on line 1 is never closed"));
}

#[test]
fn convert_json_back_to_rpp() {
    let dir = tempdir().unwrap();
    let json = dir.path().join("project.json");

    cargo_bin_cmd!("reaproject")
        .arg("convert")
        .arg(fixture_path("two_tracks.rpp"))
        .arg("--to")
        .arg("json")
        .arg("--output")
        .arg(&json)
        .assert()
        .success();

    let expected = fs::read_to_string(fixture_path("two_tracks.rpp")).unwrap();
    cargo_bin_cmd!("reaproject")
        .arg("convert")
        .arg(&json)
        .arg("--to")
        .arg("rpp")
        .assert()
        .success()
        .stdout(predicate::eq(expected));
}

#[test]
fn convert_rejects_unknown_format() {
    cargo_bin_cmd!("reaproject")
        .arg("convert")
        .arg(fixture_path("minimal.rpp"))
        .arg("--to")
        .arg("midi")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format 'midi'"));
}

#[test]
fn transform_with_builtin_script_writes_outputs() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("reaproject")
        .arg("transform")
        .arg(fixture_path("two_tracks.rpp"))
        .arg("--script")
        .arg("split-tracks")
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Kick.rpp").and(predicate::str::contains("Snare Top.rpp")));

    let kick = fs::read_to_string(dir.path().join("Kick.rpp")).unwrap();
    assert!(kick.starts_with("<REAPER_PROJECT"));
    assert!(kick.contains("NAME Kick"));
    assert!(!kick.contains("Snare Top"));
}

#[test]
fn transform_merges_other_projects() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("reaproject")
        .arg("transform")
        .arg(fixture_path("two_tracks.rpp"))
        .arg(fixture_path("second.rpp"))
        .arg("--script")
        .arg("merge-tracks")
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .success();

    let merged = fs::read_to_string(dir.path().join("merged.rpp")).unwrap();
    assert!(merged.contains("NAME Kick"));
    assert!(merged.contains("NAME Bass"));
}

#[test]
fn transform_script_file_and_runtime_error() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("fail.rhai");
    fs::write(&script, "throw \"boom\";").unwrap();

    cargo_bin_cmd!("reaproject")
        .arg("transform")
        .arg(fixture_path("minimal.rpp"))
        .arg("--script-file")
        .arg(&script)
        .arg("--out-dir")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("transform failed: boom"));

    assert!(!dir.path().join("out").exists());
}

#[test]
fn transform_times_out() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("spin.rhai");
    fs::write(&script, "loop {}").unwrap();

    cargo_bin_cmd!("reaproject")
        .env("REAPROJECT__ENGINE__TIMEOUT_MS", "100")
        .arg("transform")
        .arg(fixture_path("minimal.rpp"))
        .arg("--script-file")
        .arg(&script)
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("time limit of 100 ms"));
}

#[test]
fn transform_uses_configured_layout() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "[serializer]\nline_ending = \"crlf\"\n").unwrap();

    cargo_bin_cmd!("reaproject")
        .arg("--config")
        .arg(&config)
        .arg("transform")
        .arg(fixture_path("minimal.rpp"))
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .success();

    let written = fs::read_to_string(dir.path().join("copy.rpp")).unwrap();
    assert_eq!(
        written,
        "<REAPER_PROJECT 0.1 7.0/linux-x86_64 1700000000\r\n>\r\n"
    );
}

#[test]
fn scripts_lists_catalog() {
    cargo_bin_cmd!("reaproject")
        .arg("scripts")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("copy-source")
                .and(predicate::str::contains("merge-tracks"))
                .and(predicate::str::contains("split-tracks"))
                .and(predicate::str::contains("strip-fx")),
        );
}

#[test]
fn scripts_show_and_functions() {
    cargo_bin_cmd!("reaproject")
        .arg("scripts")
        .arg("--show")
        .arg("copy-source")
        .assert()
        .success()
        .stdout(predicate::str::contains("data: source"));

    cargo_bin_cmd!("reaproject")
        .arg("scripts")
        .arg("--functions")
        .assert()
        .success()
        .stdout(predicate::str::contains("children(node, tag)"));

    cargo_bin_cmd!("reaproject")
        .arg("scripts")
        .arg("--show")
        .arg("nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no built-in script named 'nope'"));
}
