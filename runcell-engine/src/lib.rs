//! Runcell engine - compile-and-run execution for code snippets
//!
//! Turns a snippet of source code and a language selector into a bounded process
//! invocation: write the source to an ephemeral workspace, compile it when the
//! language requires a build step, run it under a wall-clock timeout, capture the
//! output, and tear the workspace down on every exit path.

mod error;
mod pipeline;
mod profile;
mod report;
mod runner;
mod types;
mod workspace;

pub use error::{EngineError, Result};
pub use pipeline::ExecutionPipeline;
pub use profile::{
    CommandTemplate, Invocation, LanguageProfile, ProfileRegistry, BINARY_PLACEHOLDER,
    SOURCE_PLACEHOLDER,
};
pub use report::{Report, Severity};
pub use runner::{CommandRunner, ProcessRunner, RunOutput};
pub use types::{ExecutionOutcome, ExecutionRequest, OutcomeStatus};
pub use workspace::{Workspace, WorkspaceManager};
