//! Engine error taxonomy

use thiserror::Error;

/// Errors that end a request before or outside a compile/run phase.
///
/// Compile failures, runtime failures and timeouts are not errors; they are
/// terminal [`crate::OutcomeStatus`] values. This enum covers the cases where
/// no outcome can be produced at all.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The request referenced a language id that is not registered.
    #[error("unknown language '{0}'")]
    UnknownLanguage(String),

    /// The source text was empty or whitespace-only; nothing to execute.
    #[error("empty source text, nothing to execute")]
    EmptyInput,

    /// Unexpected failure in workspace handling or process spawning.
    /// Workspace teardown still runs before this is surfaced.
    #[error("internal error during {stage}: {source}")]
    Internal {
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    pub(crate) fn internal(stage: &'static str, source: std::io::Error) -> Self {
        Self::Internal { stage, source }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
