//! Compile-then-run orchestration for one execution request

use crate::error::{EngineError, Result};
use crate::profile::{LanguageProfile, ProfileRegistry};
use crate::runner::{CommandRunner, ProcessRunner};
use crate::types::{ExecutionOutcome, ExecutionRequest, OutcomeStatus};
use crate::workspace::{Workspace, WorkspaceManager};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Orchestrates one request through validate, acquire, compile, run, release.
///
/// Holds no per-request state; the registry is read-only and every workspace
/// and child process belongs to exactly one `execute` call, so a single
/// pipeline value can serve concurrent requests.
pub struct ExecutionPipeline {
    registry: Arc<ProfileRegistry>,
    workspaces: WorkspaceManager,
    runner: Arc<dyn CommandRunner>,
}

impl ExecutionPipeline {
    /// Pipeline with the stock registry and the production process runner
    pub fn new() -> Self {
        Self::with_runner(ProcessRunner::new())
    }

    /// Pipeline with a custom runner implementation
    pub fn with_runner(runner: impl CommandRunner + 'static) -> Self {
        Self {
            registry: Arc::new(ProfileRegistry::with_defaults()),
            workspaces: WorkspaceManager::new(),
            runner: Arc::new(runner),
        }
    }

    /// Replace the profile registry
    pub fn with_registry(mut self, registry: ProfileRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Replace the workspace manager (e.g. to relocate the scratch directory)
    pub fn with_workspace_manager(mut self, workspaces: WorkspaceManager) -> Self {
        self.workspaces = workspaces;
        self
    }

    /// The registry this pipeline resolves languages against
    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    /// Execute one request to a terminal outcome.
    ///
    /// Validation failures (`UnknownLanguage`, `EmptyInput`) reject the request
    /// before any filesystem or process work. Everything past workspace
    /// acquisition releases the workspace on every exit path before returning.
    pub async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionOutcome> {
        let profile = self.registry.lookup(&request.language_id)?.clone();

        if request.source_text.trim().is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let request_id = uuid::Uuid::new_v4();
        info!(
            %request_id,
            language = %profile.id,
            source_len = request.source_text.len(),
            "executing snippet"
        );

        let workspace = self
            .workspaces
            .acquire(&request.source_text, &profile)
            .await?;

        let phases = self.run_phases(&request, &profile, &workspace).await;
        let released = self.workspaces.release(workspace).await;

        // A phase failure is the more informative error; a teardown failure
        // after successful phases must still surface rather than be swallowed.
        let outcome = phases?;
        released?;

        info!(
            %request_id,
            language = %profile.id,
            status = ?outcome.status,
            duration_ms = outcome.duration_ms,
            "snippet finished"
        );
        Ok(outcome)
    }

    async fn run_phases(
        &self,
        request: &ExecutionRequest,
        profile: &LanguageProfile,
        workspace: &Workspace,
    ) -> Result<ExecutionOutcome> {
        if let Some(compile) = &profile.compile {
            let invocation = compile.render(&workspace.source_path, workspace.binary_path.as_deref());
            debug!(language = %profile.id, command = %invocation, "compile phase");

            let compiled = self.runner.run(&invocation, profile.compile_timeout).await?;
            if !compiled.success() {
                let stderr = if compiled.timed_out {
                    timeout_message(profile.compile_timeout)
                } else {
                    String::from_utf8_lossy(&compiled.stderr).into_owned()
                };
                debug!(language = %profile.id, exit_code = compiled.exit_code, "compile failed");
                return Ok(ExecutionOutcome {
                    status: OutcomeStatus::CompileError,
                    stdout: String::new(),
                    stderr,
                    language_id: profile.id.clone(),
                    duration_ms: 0,
                });
            }
        }

        let run_timeout = request.run_timeout.unwrap_or(profile.run_timeout);
        let invocation = profile
            .run
            .render(&workspace.source_path, workspace.binary_path.as_deref());
        debug!(language = %profile.id, command = %invocation, ?run_timeout, "run phase");

        let ran = self.runner.run(&invocation, run_timeout).await?;
        let duration_ms = ran.duration.as_millis() as u64;

        let outcome = if ran.timed_out {
            ExecutionOutcome {
                status: OutcomeStatus::Timeout,
                stdout: String::new(),
                stderr: timeout_message(run_timeout),
                language_id: profile.id.clone(),
                duration_ms,
            }
        } else if ran.exit_code != 0 {
            ExecutionOutcome {
                status: OutcomeStatus::RuntimeError,
                stdout: String::from_utf8_lossy(&ran.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&ran.stderr).into_owned(),
                language_id: profile.id.clone(),
                duration_ms,
            }
        } else {
            ExecutionOutcome {
                status: OutcomeStatus::Success,
                stdout: String::from_utf8_lossy(&ran.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&ran.stderr).into_owned(),
                language_id: profile.id.clone(),
                duration_ms,
            }
        };
        Ok(outcome)
    }
}

impl Default for ExecutionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// The human-readable message surfaced when a phase exceeds its budget
fn timeout_message(limit: Duration) -> String {
    if limit.subsec_nanos() == 0 {
        format!("Execution timed out ({} seconds limit)", limit.as_secs())
    } else {
        format!("Execution timed out ({:.1} seconds limit)", limit.as_secs_f32())
    }
}
