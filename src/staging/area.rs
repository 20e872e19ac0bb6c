//! Staging directory lifecycle.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::config::schema::StagingConfig;
use crate::observability::metrics;
use crate::staging::error::{StagingError, StagingOp};

/// Directory name used when the config does not override it.
pub const DEFAULT_DIR_NAME: &str = "tmp";

/// Resolve `name` under `root`, returning an absolute path.
///
/// A relative `root` is resolved against the current working directory.
pub fn root_relative_path(root: &Path, name: &str) -> io::Result<PathBuf> {
    std::path::absolute(root.join(name))
}

/// Result of [`StagingArea::ensure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created,
    Failed(StagingError),
}

impl EnsureOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, EnsureOutcome::Created)
    }

    fn label(&self) -> &'static str {
        match self {
            EnsureOutcome::Created => "created",
            EnsureOutcome::Failed(_) => "failed",
        }
    }
}

/// Result of a tear-down attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeardownOutcome {
    Removed,
    Failed(StagingError),
    /// Removal did not finish within the coordinator's deadline.
    TimedOut(std::time::Duration),
}

impl TeardownOutcome {
    pub fn is_removed(&self) -> bool {
        matches!(self, TeardownOutcome::Removed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TeardownOutcome::Removed => "removed",
            TeardownOutcome::Failed(_) => "failed",
            TeardownOutcome::TimedOut(_) => "timed_out",
        }
    }
}

/// The staging directory for in-flight uploads.
///
/// Constructed once at startup and shared by the HTTP layer, the readiness
/// hook and the shutdown coordinator.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
    path: PathBuf,
}

impl StagingArea {
    /// Create a staging area named `name` under `root`.
    pub fn new(root: impl AsRef<Path>, name: &str) -> io::Result<Self> {
        let root = std::path::absolute(root.as_ref())?;
        let path = root_relative_path(&root, name)?;
        Ok(Self { root, path })
    }

    /// Build from config, defaulting the root to the working directory.
    pub fn from_config(config: &StagingConfig) -> io::Result<Self> {
        let root = match &config.root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };
        Self::new(root, &config.dir_name)
    }

    /// Process root the staging directory lives under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the staging directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path for a staged file with the given (already sanitised) name.
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.path.join(file_name)
    }

    /// Whether the staging directory currently exists as a directory.
    pub async fn is_present(&self) -> bool {
        fs::metadata(&self.path)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    /// Create the staging directory. The parent must already exist.
    ///
    /// Failures (including an existing entry at the path) are logged and
    /// returned as [`EnsureOutcome::Failed`].
    pub async fn ensure(&self) -> EnsureOutcome {
        let outcome = match fs::create_dir(&self.path).await {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Staging directory created");
                EnsureOutcome::Created
            }
            Err(e) => {
                let err = StagingError::new(StagingOp::Create, &self.path, &e);
                tracing::error!(
                    op = %err.op,
                    path = %self.path.display(),
                    error = %e,
                    "Error creating staging directory"
                );
                EnsureOutcome::Failed(err)
            }
        };
        metrics::record_ensure(outcome.label());
        outcome
    }

    /// Recursively remove the staging directory and everything beneath it.
    ///
    /// Never returns an error; failures are logged and reported in the outcome.
    pub async fn tear_down(&self) -> TeardownOutcome {
        let outcome = match fs::remove_dir_all(&self.path).await {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Staging directory removed");
                TeardownOutcome::Removed
            }
            Err(e) => {
                let err = StagingError::new(StagingOp::Remove, &self.path, &e);
                tracing::error!(
                    op = %err.op,
                    path = %self.path.display(),
                    error = %e,
                    "Error removing staging directory"
                );
                TeardownOutcome::Failed(err)
            }
        };
        metrics::record_teardown(outcome.label());
        outcome
    }
}
