//! Upload staging area.
//!
//! # Data Flow
//! ```text
//! Startup (readiness hook):
//!     StagingArea::ensure → create <root>/tmp (non-recursive)
//!
//! Requests:
//!     upload handlers → write one file each into <root>/tmp
//!
//! Shutdown (close hook / signals / fatal error):
//!     StagingArea::tear_down → remove <root>/tmp recursively
//! ```
//!
//! # Design Decisions
//! - Both operations return an outcome value; filesystem errors never escape
//! - The path is resolved once at construction and shared via `Arc`
//! - No lock guards in-flight writers against tear-down

pub mod area;
pub mod error;

pub use area::{root_relative_path, EnsureOutcome, StagingArea, TeardownOutcome, DEFAULT_DIR_NAME};
pub use error::{StagingError, StagingOp};
