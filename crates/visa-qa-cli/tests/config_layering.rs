//! Integration tests for configuration layering.
//!
//! Tests the priority chain: hardcoded defaults < XDG config < project config < CLI args

#![allow(clippy::unwrap_used)] // Test code uses unwrap for brevity
#![allow(deprecated)] // cargo_bin deprecation warning

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use visa_qa_test_support::{DetectionBuilder, ExifBuilder, SyntheticFrameBuilder};

fn write_photo(dir: &Path) -> PathBuf {
    let path = dir.join("photo_01.jpg");
    let bytes = ExifBuilder::new()
        .date_time_original("2024:05:20 09:30:00")
        .software("Camera Firmware 2.1")
        .jpeg(&SyntheticFrameBuilder::portrait())
        .unwrap();
    fs::write(&path, bytes).unwrap();
    fs::write(
        dir.join("photo_01.landmarks.json"),
        serde_json::to_string(&DetectionBuilder::centered().build()).unwrap(),
    )
    .unwrap();
    path
}

/// Runs the binary from `cwd` with an empty XDG config home.
fn visa_qa(cwd: &Path, xdg: &Path) -> Command {
    let mut cmd = Command::cargo_bin("visa-qa").unwrap();
    cmd.current_dir(cwd)
        .env("XDG_CONFIG_HOME", xdg)
        .arg("--now")
        .arg("2024-07-01");
    cmd
}

fn report(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_project_config_applies_format() {
    let dir = tempfile::tempdir().unwrap();
    let xdg = tempfile::tempdir().unwrap();
    let photo = write_photo(dir.path());
    fs::write(dir.path().join(".visa-qa.toml"), "[output]\nformat = 'json'\n").unwrap();

    let output = visa_qa(dir.path(), xdg.path()).arg(&photo).output().unwrap();

    assert!(report(&output).is_array());
}

#[test]
fn test_cli_format_overrides_project_config() {
    let dir = tempfile::tempdir().unwrap();
    let xdg = tempfile::tempdir().unwrap();
    let photo = write_photo(dir.path());
    fs::write(dir.path().join(".visa-qa.toml"), "[output]\nformat = 'json'\n").unwrap();

    let output = visa_qa(dir.path(), xdg.path())
        .arg("--format")
        .arg("jsonl")
        .arg(&photo)
        .output()
        .unwrap();

    assert!(report(&output).is_object());
}

#[test]
fn test_project_config_found_in_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let xdg = tempfile::tempdir().unwrap();
    let nested = dir.path().join("batch").join("today");
    fs::create_dir_all(&nested).unwrap();
    let photo = write_photo(&nested);
    fs::write(dir.path().join(".visa-qa.toml"), "[rules]\nvariant = 'compact'\n").unwrap();

    let output = visa_qa(&nested, xdg.path()).arg(&photo).output().unwrap();

    let verdicts = report(&output)["verdicts"].as_object().unwrap().clone();
    assert!(!verdicts.contains_key("background-uniformity"));
}

#[test]
fn test_cli_variant_overrides_project_config() {
    let dir = tempfile::tempdir().unwrap();
    let xdg = tempfile::tempdir().unwrap();
    let photo = write_photo(dir.path());
    fs::write(dir.path().join(".visa-qa.toml"), "[rules]\nvariant = 'compact'\n").unwrap();

    let output = visa_qa(dir.path(), xdg.path())
        .arg("--variant")
        .arg("full")
        .arg(&photo)
        .output()
        .unwrap();

    assert!(report(&output)["verdicts"]
        .as_object()
        .unwrap()
        .contains_key("background-uniformity"));
}

#[test]
fn test_project_config_disables_detector() {
    let dir = tempfile::tempdir().unwrap();
    let xdg = tempfile::tempdir().unwrap();
    let photo = write_photo(dir.path());
    fs::write(dir.path().join(".visa-qa.toml"), "[detector]\nenabled = false\n").unwrap();

    let output = visa_qa(dir.path(), xdg.path()).arg(&photo).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(report(&output)["detected_face"], false);
}

#[cfg(target_os = "linux")]
#[test]
fn test_project_config_overrides_xdg_config() {
    let dir = tempfile::tempdir().unwrap();
    let xdg = tempfile::tempdir().unwrap();
    let photo = write_photo(dir.path());
    fs::create_dir_all(xdg.path().join("visa-qa")).unwrap();
    fs::write(
        xdg.path().join("visa-qa").join("config.toml"),
        "[output]\nformat = 'json'\nmetadata = true\n",
    )
    .unwrap();
    fs::write(dir.path().join(".visa-qa.toml"), "[output]\nformat = 'jsonl'\n").unwrap();

    let output = visa_qa(dir.path(), xdg.path()).arg(&photo).output().unwrap();

    let report = report(&output);
    // Format from the project file, metadata flag kept from XDG
    assert!(report.is_object());
    assert_eq!(report["metadata"]["Software"], "Camera Firmware 2.1");
}

#[test]
fn test_invalid_config_warns_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let xdg = tempfile::tempdir().unwrap();
    let photo = write_photo(dir.path());
    fs::write(dir.path().join(".visa-qa.toml"), "[output\nformat = 'json'\n").unwrap();

    visa_qa(dir.path(), xdg.path())
        .arg(&photo)
        .assert()
        .code(0)
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn test_invalid_format_value_warns() {
    let dir = tempfile::tempdir().unwrap();
    let xdg = tempfile::tempdir().unwrap();
    let photo = write_photo(dir.path());
    fs::write(dir.path().join(".visa-qa.toml"), "[output]\nformat = 'xml'\n").unwrap();

    visa_qa(dir.path(), xdg.path())
        .arg(&photo)
        .assert()
        .code(0)
        .stderr(predicate::str::contains("output.format"));
}
