//! Bounded staging tear-down and completion reporting.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;

use crate::lifecycle::shutdown::ShutdownReason;
use crate::staging::{StagingArea, TeardownOutcome};

/// What happened during one tear-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownReport {
    pub reason: ShutdownReason,
    pub outcome: TeardownOutcome,
    pub elapsed: Duration,
}

/// Runs staging tear-down for every shutdown trigger and reports completion.
///
/// Each call to [`tear_down`](Self::tear_down) attempts the full removal and
/// then publishes its report. Calls are not serialised against each other: a
/// second concurrent tear-down usually finds the directory gone and reports
/// a `NotFound` failure. [`completed`](Self::completed) yields the first
/// published report.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    staging: Arc<StagingArea>,
    timeout: Duration,
    done_tx: watch::Sender<Option<TeardownReport>>,
    completions: AtomicU64,
}

impl ShutdownCoordinator {
    pub fn new(staging: Arc<StagingArea>, timeout: Duration) -> Self {
        let (done_tx, _) = watch::channel(None);
        Self {
            staging,
            timeout,
            done_tx,
            completions: AtomicU64::new(0),
        }
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Remove the staging directory, bounded by the configured timeout.
    ///
    /// Always publishes a report, whether removal succeeded, failed or timed out.
    pub async fn tear_down(&self, reason: ShutdownReason) -> TeardownReport {
        let staging = Arc::clone(&self.staging);
        self.finish(reason, async move { staging.tear_down().await })
            .await
    }

    async fn finish<F>(&self, reason: ShutdownReason, removal: F) -> TeardownReport
    where
        F: Future<Output = TeardownOutcome>,
    {
        tracing::info!(
            reason = %reason,
            path = %self.staging.path().display(),
            timeout_secs = self.timeout.as_secs_f64(),
            "Tearing down staging directory"
        );

        let started = Instant::now();
        let outcome = match tokio::time::timeout(self.timeout, removal).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!(
                    path = %self.staging.path().display(),
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Staging tear-down timed out"
                );
                crate::observability::metrics::record_teardown("timed_out");
                TeardownOutcome::TimedOut(self.timeout)
            }
        };

        let report = TeardownReport {
            reason,
            outcome,
            elapsed: started.elapsed(),
        };

        self.completions.fetch_add(1, Ordering::SeqCst);
        let first = self.done_tx.send_if_modified(|slot| {
            if slot.is_none() {
                *slot = Some(report.clone());
                true
            } else {
                false
            }
        });

        tracing::info!(
            reason = %report.reason,
            outcome = report.outcome.label(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            first,
            "Staging tear-down finished"
        );
        report
    }

    /// Wait for the first tear-down to finish and return its report.
    pub async fn completed(&self) -> Option<TeardownReport> {
        let mut rx = self.done_tx.subscribe();
        let report = rx.wait_for(Option::is_some).await.ok()?;
        report.clone()
    }

    /// The first published report, if any tear-down has finished.
    pub fn report(&self) -> Option<TeardownReport> {
        self.done_tx.borrow().clone()
    }

    /// Number of tear-downs that have reached their terminal step.
    pub fn completions(&self) -> u64 {
        self.completions.load(Ordering::SeqCst)
    }
}
