//! Process spawning with wall-clock timeout and output capture

use crate::error::{EngineError, Result};
use crate::profile::Invocation;
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::debug;

/// How long to keep draining the pipes after a kill. A killed child may have
/// leaked descendants that still hold the write ends open, so the pipes are
/// not guaranteed to close; the grace bounds how long we wait for them.
const DRAIN_GRACE: Duration = Duration::from_millis(200);

/// Structured result of one child-process invocation
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Exit code; -1 when the platform reported none (e.g. killed by signal)
    pub exit_code: i32,

    /// Captured standard output (partial if the process was killed)
    pub stdout: Vec<u8>,

    /// Captured standard error (partial if the process was killed)
    pub stderr: Vec<u8>,

    /// Whether the wall-clock budget elapsed and the process was killed
    pub timed_out: bool,

    /// Wall-clock time from spawn to reap
    pub duration: Duration,
}

impl RunOutput {
    /// Whether the process ran to completion and exited zero
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

/// Abstraction over spawning one bounded child process.
///
/// The pipeline only talks to this trait, so tests can substitute recording or
/// counting implementations.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Spawn the invocation, enforce the timeout, capture output to completion
    async fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<RunOutput>;
}

/// Production runner backed by `tokio::process`.
///
/// Spawns exactly one child per call (program plus argument list, never a
/// shell) with stdin closed and both output streams piped. The timeout clock
/// starts at spawn; on expiry the child is killed forcibly and reaped, and
/// whatever output was captured up to that point is returned. Termination of
/// descendants the child itself spawned is best-effort.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<RunOutput> {
        let start = Instant::now();

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| EngineError::internal("process spawn", err))?;

        // Drain both pipes concurrently into shared buffers so a chatty child
        // cannot dead-lock against a full pipe buffer while we wait on it, and
        // so partial output survives an abandoned drain on the kill path.
        let stdout_buf = Arc::new(Mutex::new(Vec::new()));
        let stderr_buf = Arc::new(Mutex::new(Vec::new()));
        let stdout_task = tokio::spawn(drain(child.stdout.take(), stdout_buf.clone()));
        let stderr_task = tokio::spawn(drain(child.stderr.take(), stderr_buf.clone()));

        let mut timed_out = false;
        let status = match tokio::time::timeout(timeout, child.wait()).await {
            Ok(wait_result) => {
                wait_result.map_err(|err| EngineError::internal("process wait", err))?
            }
            Err(_elapsed) => {
                timed_out = true;
                debug!(program = %invocation.program, ?timeout, "timeout elapsed, killing child");
                // start_kill errs if the child already exited; the wait below
                // reaps it either way.
                let _ = child.start_kill();
                child
                    .wait()
                    .await
                    .map_err(|err| EngineError::internal("process reap", err))?
            }
        };

        // On a normal exit the pipes close with the child and the readers
        // finish promptly. Descendants the child leaked (on either path) can
        // hold the write ends open, so the join is always bounded: never past
        // the remaining budget plus the grace.
        let drain_budget = if timed_out {
            DRAIN_GRACE
        } else {
            timeout.saturating_sub(start.elapsed()) + DRAIN_GRACE
        };
        let _ = tokio::time::timeout(drain_budget, async {
            let _ = stdout_task.await;
            let _ = stderr_task.await;
        })
        .await;

        let stdout = std::mem::take(&mut *stdout_buf.lock().await);
        let stderr = std::mem::take(&mut *stderr_buf.lock().await);

        Ok(RunOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout,
            stderr,
            timed_out,
            duration: start.elapsed(),
        })
    }
}

async fn drain(pipe: Option<impl tokio::io::AsyncRead + Unpin>, buf: Arc<Mutex<Vec<u8>>>) {
    let Some(mut pipe) = pipe else {
        return;
    };
    let mut chunk = [0u8; 8192];
    loop {
        match pipe.read(&mut chunk).await {
            // EOF, or a broken pipe mid-stream; keep the partial output.
            Ok(0) | Err(_) => break,
            Ok(n) => buf.lock().await.extend_from_slice(&chunk[..n]),
        }
    }
}
