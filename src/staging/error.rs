//! Recoverable staging directory errors.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Filesystem operation performed on the staging directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingOp {
    Create,
    Remove,
}

impl fmt::Display for StagingOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StagingOp::Create => write!(f, "create"),
            StagingOp::Remove => write!(f, "remove"),
        }
    }
}

/// A failed create or remove of the staging directory.
///
/// Carries the io error's kind and message instead of the error itself so
/// outcomes can be cloned into shutdown reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to {op} staging directory {}: {message}", .path.display())]
pub struct StagingError {
    pub op: StagingOp,
    pub path: PathBuf,
    pub kind: io::ErrorKind,
    pub message: String,
}

impl StagingError {
    pub fn new(op: StagingOp, path: &Path, err: &io::Error) -> Self {
        Self {
            op,
            path: path.to_path_buf(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
