//! End-to-end pipeline tests over real processes

use crate::common::{setup_test_logging, CountingRunner, TestBed};
use assert_matches::assert_matches;
use runcell_engine::{EngineError, ExecutionRequest, OutcomeStatus, Report, Severity};
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_hello_world_succeeds() {
    setup_test_logging();
    let bed = TestBed::new();

    let outcome = bed
        .pipeline
        .execute(ExecutionRequest::new("shell", "echo 'Hello, World!'"))
        .await
        .expect("pipeline failed");

    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert!(outcome.stdout.contains("Hello, World!"));
    assert!(outcome.stderr.is_empty());
    assert_eq!(outcome.language_id, "shell");
}

#[tokio::test]
async fn test_nonzero_exit_is_runtime_error() {
    setup_test_logging();
    let bed = TestBed::new();

    let outcome = bed
        .pipeline
        .execute(ExecutionRequest::new(
            "shell",
            "echo broken >&2\nexit 1",
        ))
        .await
        .expect("pipeline failed");

    assert_eq!(outcome.status, OutcomeStatus::RuntimeError);
    assert!(outcome.stderr.contains("broken"));
}

#[tokio::test]
async fn test_compiled_profile_runs_built_binary() {
    setup_test_logging();
    let bed = TestBed::new();

    let outcome = bed
        .pipeline
        .execute(ExecutionRequest::new("copyc", "echo compiled-hello"))
        .await
        .expect("pipeline failed");

    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert!(outcome.stdout.contains("compiled-hello"));
}

#[tokio::test]
async fn test_compile_failure_never_reaches_run_phase() {
    setup_test_logging();
    let (runner, count) = CountingRunner::new();
    let bed = TestBed::with_runner(runner);

    let outcome = bed
        .pipeline
        .execute(ExecutionRequest::new(
            "scriptc",
            "echo 'bad token' >&2\nexit 3",
        ))
        .await
        .expect("pipeline failed");

    assert_eq!(outcome.status, OutcomeStatus::CompileError);
    assert!(outcome.stdout.is_empty());
    assert!(outcome.stderr.contains("bad token"));
    // Only the compile invocation happened.
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_sleeping_snippet_times_out() {
    setup_test_logging();
    let bed = TestBed::with_run_timeout(Duration::from_millis(500));

    let start = Instant::now();
    let outcome = bed
        .pipeline
        .execute(ExecutionRequest::new("shell", "sleep 30"))
        .await
        .expect("pipeline failed");

    assert_eq!(outcome.status, OutcomeStatus::Timeout);
    assert!(outcome.stdout.is_empty());
    assert!(outcome.stderr.contains("timed out"));
    // Returned within the budget plus kill grace, nowhere near the sleep.
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_unknown_language_is_rejected() {
    setup_test_logging();
    let bed = TestBed::new();

    let err = bed
        .pipeline
        .execute(ExecutionRequest::new("cobol", "DISPLAY 'HI'."))
        .await
        .unwrap_err();

    assert_matches!(err, EngineError::UnknownLanguage(id) if id == "cobol");
}

#[tokio::test]
async fn test_empty_source_is_rejected() {
    setup_test_logging();
    let (runner, count) = CountingRunner::new();
    let bed = TestBed::with_runner(runner);

    let err = bed
        .pipeline
        .execute(ExecutionRequest::new("shell", "   \n\t\n"))
        .await
        .unwrap_err();

    assert_matches!(err, EngineError::EmptyInput);
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_outcome_serializes_for_the_boundary() {
    setup_test_logging();
    let bed = TestBed::new();

    let outcome = bed
        .pipeline
        .execute(ExecutionRequest::new("shell", "echo json"))
        .await
        .expect("pipeline failed");

    let value: serde_json::Value = serde_json::to_value(&outcome).expect("serialize outcome");
    assert_eq!(value["status"], "success");
    assert_eq!(value["language_id"], "shell");
    assert!(value["stdout"].as_str().unwrap().contains("json"));
}

#[tokio::test]
async fn test_report_pairs_follow_status() {
    setup_test_logging();
    let bed = TestBed::new();

    let ok = bed
        .pipeline
        .execute(ExecutionRequest::new("shell", "echo fine"))
        .await
        .unwrap();
    assert_eq!(Report::from_outcome(&ok).severity, Severity::Info);

    let failed = bed
        .pipeline
        .execute(ExecutionRequest::new("shell", "exit 9"))
        .await
        .unwrap();
    let report = Report::from_outcome(&failed);
    assert_eq!(report.severity, Severity::Error);
}
