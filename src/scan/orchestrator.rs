// ============================================
// Scan Orchestrator
// ============================================
//
// idle -> validating -> running -> (unit executes, results appended)* -> complete
//                 \-> error          \-> error
//
// Units run one at a time in registry order. After each unit the session is
// published as a snapshot together with a progress event, so readers can render
// partial results. Only this module mutates a `ScanSession`.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::events::{Notification, ScanEvent, ScanReporter};
use super::model::{CheckResult, ScanPhase, ScanSession, ScanSnapshot};
use super::validator;
use crate::checks::{CheckRegistry, RegisteredCheck};
use crate::errors::{CheckError, ScanError};

pub struct ScanOrchestrator {
    registry: Arc<CheckRegistry>,
    check_timeout: Duration,
}

impl ScanOrchestrator {
    pub fn new(registry: CheckRegistry, check_timeout: Duration) -> Self {
        Self {
            registry: Arc::new(registry),
            check_timeout,
        }
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    /// Validate `input` and run every registered unit against it.
    pub async fn run_scan(
        &self,
        input: &str,
        reporter: &ScanReporter,
    ) -> Result<ScanSnapshot, ScanError> {
        let session = self.begin(input, reporter)?;
        self.execute(session, reporter).await
    }

    /// Validation step. On success the previous session is replaced by a fresh,
    /// running one and published; on failure nothing runs and the matching
    /// notification is emitted.
    pub fn begin(&self, input: &str, reporter: &ScanReporter) -> Result<ScanSession, ScanError> {
        reporter.set_phase(ScanPhase::Validating);

        let target = match validator::parse_target(input) {
            Ok(target) => target,
            Err(e) => {
                tracing::info!("Rejected scan input: {}", e);
                reporter.reject(&e);
                return Err(e);
            }
        };

        let session = ScanSession::start(target);
        reporter.publish(session.snapshot());

        tracing::info!(
            "Scan {} started for {} ({} checks)",
            session.id(),
            session.target_url(),
            self.registry.len()
        );

        Ok(session)
    }

    /// Run all units for a session produced by [`begin`](Self::begin).
    pub async fn execute(
        &self,
        mut session: ScanSession,
        reporter: &ScanReporter,
    ) -> Result<ScanSnapshot, ScanError> {
        let target = session.target_url().clone();

        for check in self.registry.iter() {
            match self.run_unit(check, &target).await {
                Ok(results) => {
                    session.append(results);
                    session.advance(check.checkpoint);
                    self.report_progress(&session, reporter);
                }
                Err(reason) => {
                    tracing::error!("Scan {} failed: {}", session.id(), reason);
                    session.abort(reason.clone());
                    reporter.conclude(
                        session.snapshot(),
                        Notification::scan_failed(session.id(), &reason),
                    );
                    return Err(ScanError::ScanAborted(reason));
                }
            }
        }

        session.complete();
        reporter.emit(progress_event(&session));
        reporter.conclude(
            session.snapshot(),
            Notification::scan_complete(session.id(), session.target_url().as_str()),
        );

        tracing::info!(
            "Scan {} completed for {}: {} results",
            session.id(),
            session.target_url(),
            session.results().len()
        );

        Ok(session.snapshot())
    }

    fn report_progress(&self, session: &ScanSession, reporter: &ScanReporter) {
        reporter.publish(session.snapshot());
        reporter.emit(progress_event(session));
    }

    /// Run one unit with a timeout and panic isolation.
    /// `Err` means the scan must stop.
    async fn run_unit(
        &self,
        check: &RegisteredCheck,
        target: &Url,
    ) -> Result<Vec<CheckResult>, String> {
        let unit = &check.unit;
        let guarded = AssertUnwindSafe(unit.run(target)).catch_unwind();

        match tokio::time::timeout(self.check_timeout, guarded).await {
            Err(_) => {
                tracing::warn!(
                    "Check '{}' timed out after {:?}; reporting warnings",
                    unit.id(),
                    self.check_timeout
                );
                Ok(unit.degraded(&format!("timed out after {:?}", self.check_timeout)))
            }
            Ok(Err(panic)) => Err(format!(
                "check '{}' panicked: {}",
                unit.id(),
                panic_message(panic.as_ref())
            )),
            Ok(Ok(Err(CheckError::Degraded(reason)))) => {
                tracing::warn!("Check '{}' degraded: {}", unit.id(), reason);
                Ok(unit.degraded(&reason))
            }
            Ok(Ok(Err(CheckError::Fault(reason)))) => {
                Err(format!("check '{}' failed: {}", unit.id(), reason))
            }
            Ok(Ok(Ok(results))) => {
                tracing::debug!("Check '{}' produced {} results", unit.id(), results.len());
                Ok(results)
            }
        }
    }
}

fn progress_event(session: &ScanSession) -> ScanEvent {
    ScanEvent::Progress {
        scan_id: session.id(),
        progress: session.progress(),
        results: session.results().to_vec(),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
