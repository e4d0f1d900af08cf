//! Display normalization for execution outcomes

use crate::types::{ExecutionOutcome, OutcomeStatus};
use serde::{Deserialize, Serialize};

/// How a report should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Positive/informational presentation (program output)
    Info,
    /// Error presentation (diagnostics or the timeout message)
    Error,
}

/// Pre-formatted text/severity pair for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub severity: Severity,
    pub body: String,
}

impl Report {
    /// Map an outcome to its displayable form. Pure; no I/O.
    pub fn from_outcome(outcome: &ExecutionOutcome) -> Self {
        match outcome.status {
            OutcomeStatus::Success => Self {
                severity: Severity::Info,
                body: outcome.stdout.clone(),
            },
            OutcomeStatus::CompileError => Self {
                severity: Severity::Error,
                body: format!("Compilation Error:\n{}", outcome.stderr),
            },
            OutcomeStatus::RuntimeError | OutcomeStatus::Timeout => Self {
                severity: Severity::Error,
                body: outcome.stderr.clone(),
            },
        }
    }
}
