use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn turbotext() -> Command {
    Command::cargo_bin("turbotext").unwrap()
}

#[test]
fn test_help_lists_fix_and_format_flags() {
    turbotext()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--fix"))
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--no-fail"));
}

#[test]
fn test_no_files_is_an_error() {
    turbotext()
        .assert()
        .failure()
        .stderr(predicate::str::contains("No files specified"));
}

#[test]
fn test_unsupported_file_is_rejected_with_warning() {
    let dir = TempDir::new().unwrap();
    let exe = dir.path().join("report.exe");
    fs::write(&exe, "binary").unwrap();

    turbotext()
        .arg(&exe)
        .arg("--no-color")
        .assert()
        .failure()
        .stderr(predicate::str::contains("report.exe"))
        .stderr(predicate::str::contains("unsupported file type"))
        .stderr(predicate::str::contains("No supported files to analyze"));
}

#[test]
fn test_interactive_requires_fix() {
    let dir = TempDir::new().unwrap();
    let txt = dir.path().join("notes.txt");
    fs::write(&txt, "hello world").unwrap();

    turbotext()
        .arg(&txt)
        .arg("--interactive")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--fix"));
}

#[test]
fn test_completion_generation() {
    turbotext()
        .arg("--completion")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("turbotext"));
}

#[test]
fn test_unreachable_service_surfaces_one_error() {
    let dir = TempDir::new().unwrap();
    let txt = dir.path().join("notes.txt");
    fs::write(&txt, "The dog run fast").unwrap();

    // Port 9 (discard) is never an HTTP service
    turbotext()
        .arg(&txt)
        .arg("--no-color")
        .env("TURBOTEXT_API_BASE", "http://127.0.0.1:9")
        .assert()
        .failure();
}
