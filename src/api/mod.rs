use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::CheckMode;
use crate::scan::{ScanOrchestrator, ScanReporter};

pub mod error;
pub mod health;
pub mod input;
pub mod routes;
pub mod scan;

// ============================================
// Application State
// ============================================

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<ScanOrchestrator>,
    reporter: Arc<ScanReporter>,
    scan_in_flight: Arc<AtomicBool>,
    check_mode: CheckMode,
}

impl AppState {
    pub fn new(orchestrator: ScanOrchestrator, check_mode: CheckMode) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            reporter: Arc::new(ScanReporter::new()),
            scan_in_flight: Arc::new(AtomicBool::new(false)),
            check_mode,
        }
    }

    pub fn orchestrator(&self) -> &Arc<ScanOrchestrator> {
        &self.orchestrator
    }

    pub fn reporter(&self) -> &Arc<ScanReporter> {
        &self.reporter
    }

    pub fn check_mode(&self) -> CheckMode {
        self.check_mode
    }

    /// Claim the single scan slot. `None` while another scan is in flight.
    pub fn try_acquire_scan(&self) -> Option<ScanPermit> {
        self.scan_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ScanPermit {
                flag: Arc::clone(&self.scan_in_flight),
            })
    }

    pub fn scan_in_flight(&self) -> bool {
        self.scan_in_flight.load(Ordering::Acquire)
    }
}

/// Releases the scan slot when dropped, including on panic or early return
pub struct ScanPermit {
    flag: Arc<AtomicBool>,
}

impl Drop for ScanPermit {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Full application router without transport layers (CORS, tracing, compression)
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(health::ping))
        .route("/health", get(health::health_check))
        .nest("/v1", routes::v1_routes())
        .with_state(state)
}
