use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::config::CheckMode;
use crate::scan::ScanPhase;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub check_mode: CheckMode,
    pub scan: ScanHealth,
}

#[derive(Serialize, Deserialize)]
pub struct ScanHealth {
    pub phase: ScanPhase,
    pub is_running: bool,
    pub checks_registered: usize,
}

#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
}

/// Lightweight liveness probe for container healthchecks.
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse { status: "ok" })
}

/// Reports the check mode and the state of the current scan.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.reporter().current();
    let checks_registered = state.orchestrator().registry().len();

    Json(HealthResponse {
        status: if checks_registered > 0 {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        check_mode: state.check_mode(),
        scan: ScanHealth {
            phase: snapshot.phase,
            is_running: snapshot.is_running,
            checks_registered,
        },
    })
}
