use axum::{
    Router,
    routing::{get, post},
};

use super::AppState;
use super::{input, scan};

/// V1 API routes
///
/// ## Scan
/// - POST /scan/start - Validate a URL and start a scan (409 while one is running)
/// - GET  /scan - Current scan status
/// - GET  /scan/results - Current results with pass/fail/warning counts
/// - GET  /scan/events - SSE stream of progress and completion events
/// - GET  /checks - Registered check units in execution order
///
/// ## Input
/// - POST /input/validate - Check URL syntax without scanning
/// - POST /input/spoken - Turn a speech transcript into a URL candidate
pub fn v1_routes() -> Router<AppState> {
    Router::new()
        // ========================================
        // Scan orchestration
        // ========================================
        .route("/scan/start", post(scan::start_scan))
        .route("/scan", get(scan::get_scan_status))
        .route("/scan/results", get(scan::get_scan_results))
        .route("/scan/events", get(scan::scan_events))
        .route("/checks", get(scan::list_checks))
        // ========================================
        // Input helpers
        // ========================================
        .route("/input/validate", post(input::validate_url))
        .route("/input/spoken", post(input::normalize_spoken))
}
