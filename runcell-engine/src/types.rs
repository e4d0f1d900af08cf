//! Core types for snippet execution

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request to compile and run one snippet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Registered language id (or alias) selecting the execution profile
    pub language_id: String,

    /// The source text to execute
    pub source_text: String,

    /// Optional run-phase timeout overriding the profile value
    pub run_timeout: Option<Duration>,
}

impl ExecutionRequest {
    /// Create a request for the given language and source
    pub fn new(language_id: impl Into<String>, source_text: impl Into<String>) -> Self {
        Self {
            language_id: language_id.into(),
            source_text: source_text.into(),
            run_timeout: None,
        }
    }

    /// Override the profile's run timeout
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }
}

/// Terminal classification of one execution request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The compiler exited non-zero (or the compile phase timed out)
    CompileError,
    /// The program or interpreter exited non-zero
    RuntimeError,
    /// The run phase exceeded its wall-clock budget and was killed
    Timeout,
    /// The program exited zero
    Success,
}

/// Normalized result of one execution request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Terminal status
    pub status: OutcomeStatus,

    /// Captured standard output (empty for non-success statuses)
    pub stdout: String,

    /// Captured standard error, compiler diagnostics, or the timeout message
    pub stderr: String,

    /// Canonical id of the profile that ran the request
    pub language_id: String,

    /// Wall-clock duration of the run phase in milliseconds (0 when it never ran)
    pub duration_ms: u64,
}

impl ExecutionOutcome {
    /// Check whether the request succeeded
    pub fn success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}
