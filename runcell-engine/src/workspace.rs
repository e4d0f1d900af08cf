//! Ephemeral filesystem workspaces for execution requests

use crate::error::{EngineError, Result};
use crate::profile::LanguageProfile;
use std::path::{Path, PathBuf};
use tracing::warn;

/// The ephemeral artifacts of one execution request.
///
/// Owned by exactly one pipeline run. `WorkspaceManager::release` is the normal
/// teardown path; if a workspace is dropped without it (an early return the
/// pipeline did not anticipate), Drop removes the artifacts best-effort so
/// nothing outlives the request.
#[derive(Debug)]
pub struct Workspace {
    /// Path of the written source file
    pub source_path: PathBuf,

    /// Reserved path for the compiled binary; the file only exists after a
    /// successful compile phase
    pub binary_path: Option<PathBuf>,

    released: bool,
}

impl Workspace {
    /// Every path this workspace may own, whether or not it exists yet
    fn paths(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.source_path.as_path()).chain(self.binary_path.as_deref())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        for path in [Some(self.source_path.clone()), self.binary_path.clone()]
            .into_iter()
            .flatten()
        {
            if let Err(err) = std::fs::remove_file(&path) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), %err, "workspace drop cleanup failed");
                }
            }
        }
    }
}

/// Creates and tears down workspaces under a scratch directory
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    scratch_dir: PathBuf,
}

impl WorkspaceManager {
    /// Manager rooted at the OS temp directory
    pub fn new() -> Self {
        Self {
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Manager rooted at a custom scratch directory
    pub fn with_scratch_dir(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
        }
    }

    /// The directory new workspaces are created under
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Write `source_text` to a uniquely named file and, for compiled profiles,
    /// reserve a sibling binary path (allocated, not created).
    pub async fn acquire(&self, source_text: &str, profile: &LanguageProfile) -> Result<Workspace> {
        let stem = format!("snippet-{}", uuid::Uuid::new_v4());
        let source_path = self
            .scratch_dir
            .join(format!("{stem}.{}", profile.source_extension));
        let binary_path = profile
            .is_compiled()
            .then(|| self.scratch_dir.join(format!("{stem}.bin")));

        if let Err(err) = tokio::fs::write(&source_path, source_text).await {
            // A failed write may still have created the file.
            let _ = tokio::fs::remove_file(&source_path).await;
            return Err(EngineError::internal("workspace acquire", err));
        }

        Ok(Workspace {
            source_path,
            binary_path,
            released: false,
        })
    }

    /// Remove every artifact path that exists. Idempotent: not-found is fine;
    /// any other filesystem error propagates after all paths were attempted.
    pub async fn release(&self, mut workspace: Workspace) -> Result<()> {
        let mut first_error = None;

        for path in workspace.paths() {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    warn!(path = %path.display(), %err, "workspace release failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        // Drop must not retry paths we already handled.
        workspace.released = true;

        match first_error {
            None => Ok(()),
            Some(err) => Err(EngineError::internal("workspace release", err)),
        }
    }
}

impl Default for WorkspaceManager {
    fn default() -> Self {
        Self::new()
    }
}
