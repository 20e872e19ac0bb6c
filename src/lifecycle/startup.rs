//! Startup orchestration.
//!
//! The readiness hook runs after the listener is bound and before the server
//! accepts connections. It never fails: a staging directory that cannot be
//! created is logged and startup continues.

use crate::staging::{EnsureOutcome, StagingArea};

/// Run the readiness hook: create the staging directory.
pub async fn run_ready_hook(staging: &StagingArea) -> EnsureOutcome {
    let outcome = staging.ensure().await;
    if let EnsureOutcome::Failed(err) = &outcome {
        tracing::warn!(error = %err, "Continuing startup without a fresh staging directory");
    }
    outcome
}
