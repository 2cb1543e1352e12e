//! Integration tests for bracket resource management with real file I/O.
//!
//! These tests verify that the bracket pattern releases resources on every
//! path and applies the documented failure precedence.

use std::cell::Cell;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;

use resultflow::bracket::{bracket, RELEASE_ERROR_KEY};
use resultflow::{meta, BoxError, Outcome, StepOutput, Value};

// ============================================================================
// File I/O
// ============================================================================

/// Helper to create a unique temp file path
fn temp_file_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("resultflow_bracket_test_{}_{}.txt", name, std::process::id()))
}

struct TempFile {
    path: PathBuf,
    file: File,
}

fn create(path: &PathBuf) -> Result<StepOutput<TempFile, BoxError>, io::Error> {
    let file = File::create(path)?;
    Ok(StepOutput::Value(TempFile {
        path: path.clone(),
        file,
    }))
}

fn remove(temp: TempFile) -> Result<(), io::Error> {
    drop(temp.file);
    fs::remove_file(&temp.path)
}

#[test]
fn bracket_removes_temp_file_on_success() {
    let path = temp_file_path("success");

    let out: Outcome<usize, BoxError> = bracket(
        || create(&path),
        |temp| {
            temp.file.write_all(b"hello bracket")?;
            Ok::<_, io::Error>(StepOutput::Value(13))
        },
        remove,
    );

    assert_eq!(out.value(), Some(&13));
    assert!(!path.exists(), "temp file should be removed");
}

#[test]
fn bracket_removes_temp_file_when_use_fails() {
    let path = temp_file_path("use_fails");

    let out: Outcome<usize, BoxError> = bracket(
        || create(&path),
        |_temp| Err::<StepOutput<usize, BoxError>, _>("parse error"),
        remove,
    );

    assert_eq!(out.error().map(|e| e.to_string()), Some("parse error".to_string()));
    assert!(out.meta().get(RELEASE_ERROR_KEY).is_none());
    assert!(!path.exists(), "temp file should be removed");
}

#[test]
fn bracket_skips_release_when_acquire_fails() {
    let missing_dir = std::env::temp_dir().join("resultflow_no_such_dir").join("x.txt");
    let released = Cell::new(false);

    let out: Outcome<(), BoxError> = bracket(
        || create(&missing_dir),
        |_temp| StepOutput::Value(()),
        |temp| {
            released.set(true);
            remove(temp)
        },
    );

    assert!(out.is_failure());
    assert!(!released.get());
}

#[test]
fn bracket_release_error_overrides_success() {
    let path = temp_file_path("release_fails");

    let out: Outcome<(), BoxError> = bracket(
        || create(&path),
        |temp| {
            // Removing the file early makes the release step fail.
            fs::remove_file(&temp.path)?;
            Ok::<_, io::Error>(Outcome::success_with((), meta! { "written" => false }))
        },
        remove,
    );

    let err = out.error().expect("release failure expected");
    assert_eq!(err.downcast_ref::<io::Error>().map(|e| e.kind()), Some(io::ErrorKind::NotFound));
    assert_eq!(out.meta().get("written"), Some(&Value::Bool(false)));
}

// ============================================================================
// Precedence with in-memory resources
// ============================================================================

#[test]
fn both_use_and_release_failures_stay_observable() {
    let out: Outcome<(), String> = bracket(
        || StepOutput::Value(vec![1, 2, 3]),
        |_pool| Outcome::failure_with("query failed".to_string(), meta! { "query" => "select" }),
        |_pool| Err::<(), _>("pool poisoned".to_string()),
    );

    assert_eq!(out.error().map(String::as_str), Some("query failed"));
    assert_eq!(out.meta().get("query"), Some(&Value::from("select")));

    let release = out.meta().get(RELEASE_ERROR_KEY).expect("release error recorded");
    assert_eq!(release.get("message"), Some(&Value::from(format!("{:?}", "pool poisoned"))));
}

#[test]
fn release_runs_exactly_once() {
    let releases = Cell::new(0);

    for fail_use in [false, true] {
        let _: Outcome<(), String> = bracket(
            || StepOutput::Value(()),
            |_| {
                if fail_use {
                    Err("boom".to_string())
                } else {
                    Ok(StepOutput::Value(()))
                }
            },
            |_| {
                releases.set(releases.get() + 1);
                Ok::<(), String>(())
            },
        );
    }

    assert_eq!(releases.get(), 2);
}

#[test]
fn use_can_mutate_resource_before_release() {
    let seen = Cell::new(0);

    let out: Outcome<usize, String> = Outcome::bracket(
        || StepOutput::Value(Vec::<u8>::new()),
        |buf| {
            buf.extend_from_slice(b"abc");
            StepOutput::Value(buf.len())
        },
        |buf| {
            seen.set(buf.len());
            Ok::<(), String>(())
        },
    );

    assert_eq!(out.value(), Some(&3));
    assert_eq!(seen.get(), 3);
}
