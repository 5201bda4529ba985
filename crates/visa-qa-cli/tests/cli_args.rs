//! CLI argument validation tests.
//!
//! Tests command-line argument parsing, validation, and error handling.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use visa_qa_test_support::{encode_jpeg, SyntheticFrameBuilder};

fn write_photo(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, encode_jpeg(&SyntheticFrameBuilder::portrait()).unwrap()).unwrap();
    path
}

// === Missing/Invalid Path Tests ===

#[test]
fn test_missing_path_shows_error() {
    let mut cmd = Command::cargo_bin("visa-qa").unwrap();
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("No paths specified"));
}

#[test]
fn test_nonexistent_path_is_an_error() {
    let mut cmd = Command::cargo_bin("visa-qa").unwrap();
    cmd.arg("/nonexistent/path/to/photo.jpg");

    cmd.assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(
            predicate::str::contains("does not exist")
                .and(predicate::str::contains("No photos were checked")),
        );
}

#[test]
fn test_nonexistent_path_does_not_mask_checked_photos() {
    let temp_dir = tempfile::tempdir().unwrap();
    let photo = write_photo(temp_dir.path(), "photo_01.jpg");

    let mut cmd = Command::cargo_bin("visa-qa").unwrap();
    cmd.arg("--no-detect").arg("/nonexistent/photo.jpg").arg(photo);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_empty_directory() {
    let temp_dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::cargo_bin("visa-qa").unwrap();
    cmd.arg(temp_dir.path());

    cmd.assert().code(2).stdout(predicate::str::is_empty());
}

#[test]
fn test_file_without_extension_is_checked() {
    let temp_dir = tempfile::tempdir().unwrap();
    let photo = write_photo(temp_dir.path(), "photo_01");

    let output = Command::cargo_bin("visa-qa")
        .unwrap()
        .arg("--no-detect")
        .arg(&photo)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("Unsupported"), "{stderr}");
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["verdicts"]["format"]["status"], "pass");
    assert_eq!(report["verdicts"]["format"]["detail"], "JPG");
    assert_eq!(report["verdicts"]["face-centering"]["status"], "fail");
}

#[test]
fn test_undecodable_photo_is_skipped_with_error_code() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("broken.jpg"), b"definitely not a jpeg").unwrap();

    let mut cmd = Command::cargo_bin("visa-qa").unwrap();
    cmd.arg(temp_dir.path());

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Skipping").and(predicate::str::contains("broken.jpg")));
}

// === Strategy Flags ===

#[test]
fn test_unknown_variant_rejected() {
    let mut cmd = Command::cargo_bin("visa-qa").unwrap();
    cmd.arg("--variant").arg("tiny").arg("photo.jpg");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown variant 'tiny'"));
}

#[test]
fn test_unknown_shadow_strategy_rejected() {
    let mut cmd = Command::cargo_bin("visa-qa").unwrap();
    cmd.arg("--shadow").arg("soft").arg("photo.jpg");

    cmd.assert().failure().stderr(
        predicate::str::contains("unknown shadow strategy")
            .and(predicate::str::contains("binary-threshold")),
    );
}

#[test]
fn test_strategy_names_are_case_insensitive() {
    let temp_dir = tempfile::tempdir().unwrap();
    let photo = write_photo(temp_dir.path(), "photo_01.jpg");

    let mut cmd = Command::cargo_bin("visa-qa").unwrap();
    cmd.arg("--contrast")
        .arg("STDDEV")
        .arg("--tilt")
        .arg("Jaw-Vector")
        .arg(photo);

    cmd.assert().code(predicate::in_iter([0, 1]));
}

// === Numeric Flags ===

#[test]
fn test_zero_detect_timeout_rejected() {
    let mut cmd = Command::cargo_bin("visa-qa").unwrap();
    cmd.arg("--detect-timeout-ms").arg("0").arg("photo.jpg");

    cmd.assert().failure();
}

#[test]
fn test_invalid_now_rejected() {
    let mut cmd = Command::cargo_bin("visa-qa").unwrap();
    cmd.arg("--now").arg("01/07/2024").arg("photo.jpg");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("YYYY-MM-DD"));
}

#[test]
fn test_non_numeric_line_offset_rejected() {
    let mut cmd = Command::cargo_bin("visa-qa").unwrap();
    cmd.arg("--head-top").arg("high").arg("photo.jpg");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not a valid number"));
}

#[test]
fn test_negative_line_offset_accepted() {
    let temp_dir = tempfile::tempdir().unwrap();
    let photo = write_photo(temp_dir.path(), "photo_01.jpg");

    let mut cmd = Command::cargo_bin("visa-qa").unwrap();
    cmd.arg("--eye").arg("-40").arg(photo);

    cmd.assert().code(predicate::in_iter([0, 1]));
}

// === Detector Flags ===

#[test]
fn test_blank_detector_command_is_an_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let photo = write_photo(temp_dir.path(), "photo_01.jpg");

    let mut cmd = Command::cargo_bin("visa-qa").unwrap();
    cmd.arg("--detector-cmd").arg("   ").arg(photo);

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Detector command is empty"));
}

// === Help and Version ===

#[test]
fn test_help_lists_flags() {
    let mut cmd = Command::cargo_bin("visa-qa").unwrap();
    cmd.arg("--help");

    cmd.assert().success().stdout(
        predicate::str::contains("--variant")
            .and(predicate::str::contains("--require-face"))
            .and(predicate::str::contains("--detector-cmd"))
            .and(predicate::str::contains("lines")),
    );
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("visa-qa").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("visa-qa"));
}

#[test]
fn test_check_subcommand_matches_default() {
    let temp_dir = tempfile::tempdir().unwrap();
    let photo = write_photo(temp_dir.path(), "photo_01.jpg");

    let mut cmd = Command::cargo_bin("visa-qa").unwrap();
    cmd.arg("check").arg(&photo);

    cmd.assert()
        .code(predicate::in_iter([0, 1]))
        .stdout(predicate::str::contains("photo_01.jpg"));
}
