//! `TokioCommandRunner` with real child processes.

#![cfg(unix)]
#![allow(clippy::expect_used)]

use std::time::{Duration, Instant};

use qs_vmsd::application::ports::CommandRunner;
use qs_vmsd::infra::command_runner::TokioCommandRunner;

#[tokio::test]
async fn test_captures_stdout_stderr_and_status() {
    let runner = TokioCommandRunner::new(Duration::from_secs(10));

    let output = runner
        .run("sh", &["-c", "echo out; echo err >&2; exit 3"])
        .await
        .expect("run");

    assert_eq!(output.status.code(), Some(3));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "out\n");
    assert_eq!(String::from_utf8_lossy(&output.stderr), "err\n");
}

#[tokio::test]
async fn test_passes_extra_environment() {
    let runner = TokioCommandRunner::new(Duration::from_secs(10));

    let output = runner
        .run_with_env("sh", &["-c", "printf %s \"$MCP_PASSWORD\""], &[("MCP_PASSWORD", "s3cret")])
        .await
        .expect("run");

    assert_eq!(String::from_utf8_lossy(&output.stdout), "s3cret");
}

#[tokio::test]
async fn test_timeout_kills_child() {
    let runner = TokioCommandRunner::new(Duration::from_millis(200));
    let started = Instant::now();

    let err = runner
        .run("sleep", &["30"])
        .await
        .expect_err("must time out");

    assert!(err.to_string().contains("timed out"), "{err}");
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_spawn_failure_names_program() {
    let runner = TokioCommandRunner::default();

    let err = runner
        .run("/nonexistent/qs-tool", &[])
        .await
        .expect_err("spawn fails");

    assert!(err.to_string().contains("failed to spawn /nonexistent/qs-tool"), "{err}");
}
