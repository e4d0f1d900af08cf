//! Common test utilities shared across the runcell integration tests

use async_trait::async_trait;
use runcell_engine::{
    CommandRunner, CommandTemplate, ExecutionPipeline, Invocation, LanguageProfile, ProcessRunner,
    ProfileRegistry, Result, RunOutput, WorkspaceManager, BINARY_PLACEHOLDER, SOURCE_PLACEHOLDER,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Setup logging for tests
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Interpreted profile that feeds the snippet to `sh`
pub fn shell_profile(run_timeout: Duration) -> LanguageProfile {
    LanguageProfile {
        id: "shell".to_string(),
        display_name: "Shell".to_string(),
        source_extension: "sh".to_string(),
        compile: None,
        run: CommandTemplate::new("sh", &[SOURCE_PLACEHOLDER]),
        compile_timeout: Duration::from_secs(10),
        run_timeout,
    }
}

/// "Compiled" profile whose build step copies the source to the binary path,
/// which is then executed through `sh`. Exercises the full two-phase path
/// without needing a real compiler on the host.
pub fn copy_compiled_profile() -> LanguageProfile {
    LanguageProfile {
        id: "copyc".to_string(),
        display_name: "Copy-compiled".to_string(),
        source_extension: "src".to_string(),
        compile: Some(CommandTemplate::new(
            "cp",
            &[SOURCE_PLACEHOLDER, BINARY_PLACEHOLDER],
        )),
        run: CommandTemplate::new("sh", &[BINARY_PLACEHOLDER]),
        compile_timeout: Duration::from_secs(10),
        run_timeout: Duration::from_secs(5),
    }
}

/// Compiled profile whose build step executes the snippet itself through `sh`,
/// so a test snippet scripts the compiler's exit code and stderr.
pub fn scripted_compiler_profile() -> LanguageProfile {
    LanguageProfile {
        id: "scriptc".to_string(),
        display_name: "Scripted compiler".to_string(),
        source_extension: "src".to_string(),
        compile: Some(CommandTemplate::new("sh", &[SOURCE_PLACEHOLDER])),
        run: CommandTemplate::new("sh", &[BINARY_PLACEHOLDER]),
        compile_timeout: Duration::from_secs(10),
        run_timeout: Duration::from_secs(5),
    }
}

/// Interpreted profile pointing at a program that does not exist
pub fn missing_interpreter_profile() -> LanguageProfile {
    LanguageProfile {
        id: "ghost".to_string(),
        display_name: "Ghost".to_string(),
        source_extension: "gh".to_string(),
        compile: None,
        run: CommandTemplate::new("runcell-test-missing-interpreter", &[SOURCE_PLACEHOLDER]),
        compile_timeout: Duration::from_secs(10),
        run_timeout: Duration::from_secs(5),
    }
}

/// Registry with every test profile registered
pub fn test_registry(run_timeout: Duration) -> ProfileRegistry {
    ProfileRegistry::empty()
        .with_profile(shell_profile(run_timeout))
        .with_profile(copy_compiled_profile())
        .with_profile(scripted_compiler_profile())
        .with_profile(missing_interpreter_profile())
}

/// A pipeline wired to an isolated scratch directory
pub struct TestBed {
    pub scratch: tempfile::TempDir,
    pub pipeline: ExecutionPipeline,
}

impl TestBed {
    pub fn new() -> Self {
        Self::with_run_timeout(Duration::from_secs(5))
    }

    pub fn with_run_timeout(run_timeout: Duration) -> Self {
        let scratch = tempfile::tempdir().expect("Failed to create scratch dir");
        let pipeline = ExecutionPipeline::new()
            .with_registry(test_registry(run_timeout))
            .with_workspace_manager(WorkspaceManager::with_scratch_dir(scratch.path()));
        Self { scratch, pipeline }
    }

    pub fn with_runner(runner: impl CommandRunner + 'static) -> Self {
        let scratch = tempfile::tempdir().expect("Failed to create scratch dir");
        let pipeline = ExecutionPipeline::with_runner(runner)
            .with_registry(test_registry(Duration::from_secs(5)))
            .with_workspace_manager(WorkspaceManager::with_scratch_dir(scratch.path()));
        Self { scratch, pipeline }
    }

    /// Artifacts still present in the scratch directory
    pub fn leftover_artifacts(&self) -> Vec<PathBuf> {
        leftover_artifacts(self.scratch.path())
    }
}

impl Default for TestBed {
    fn default() -> Self {
        Self::new()
    }
}

pub fn leftover_artifacts(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .expect("Failed to read scratch dir")
        .map(|entry| entry.expect("Failed to read scratch entry").path())
        .collect()
}

/// Process runner wrapper that counts invocations
pub struct CountingRunner {
    inner: ProcessRunner,
    count: Arc<AtomicUsize>,
}

impl CountingRunner {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner: ProcessRunner::new(),
                count: count.clone(),
            },
            count,
        )
    }
}

#[async_trait]
impl CommandRunner for CountingRunner {
    async fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<RunOutput> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.inner.run(invocation, timeout).await
    }
}
