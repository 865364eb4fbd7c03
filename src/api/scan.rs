use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use chrono::{DateTime, Utc};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;
use validator::Validate;

use super::AppState;
use super::error::{ApiError, scan_error, validation_error};
use crate::checks::registry::CheckInfo;
use crate::config::CheckMode;
use crate::errors::ScanError;
use crate::scan::{CheckResult, ScanEvent, ScanPhase, ScanSnapshot, ScanSummary, summarize};

/// Buffered SSE events per connected client
const SSE_CHANNEL_CAPACITY: usize = 64;

// ============================================
// SSE Stream for Scan Events
// ============================================

/// A stream that delivers real-time scan events to connected clients
struct ScanEventStream {
    rx: mpsc::Receiver<Event>,
}

impl Stream for ScanEventStream {
    type Item = Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(event)) => Poll::Ready(Some(Ok(event))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

// ============================================
// Request/Response Types
// ============================================

#[derive(Debug, Deserialize, Validate)]
pub struct StartScanRequest {
    /// Emptiness is reported as INPUT_EMPTY by the validator, not here
    #[validate(length(max = 2048))]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartScanResponse {
    pub scan_id: Uuid,
    pub target_url: String,
    pub status: String,
    pub checks_total: usize,
    pub expected_results: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanStatusResponse {
    pub scan_id: Option<Uuid>,
    pub target_url: Option<String>,
    pub phase: ScanPhase,
    pub progress: u8,
    pub is_running: bool,
    pub results_count: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<&ScanSnapshot> for ScanStatusResponse {
    fn from(snap: &ScanSnapshot) -> Self {
        Self {
            scan_id: snap.scan_id,
            target_url: snap.target_url.clone(),
            phase: snap.phase,
            progress: snap.progress,
            is_running: snap.is_running,
            results_count: snap.results.len(),
            started_at: snap.started_at,
            completed_at: snap.completed_at,
            error_message: snap.error_message.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScanResultsResponse {
    pub scan_id: Option<Uuid>,
    pub target_url: Option<String>,
    pub phase: ScanPhase,
    pub progress: u8,
    pub summary: ScanSummary,
    pub results: Vec<CheckResult>,
}

#[derive(Debug, Serialize)]
pub struct CheckListResponse {
    pub mode: CheckMode,
    pub expected_results: usize,
    pub checks: Vec<CheckInfo>,
}

// ============================================
// Handlers
// ============================================

/// Validate the target, reset the session and run the checks in the background.
pub async fn start_scan(
    State(state): State<AppState>,
    Json(req): Json<StartScanRequest>,
) -> Result<(StatusCode, Json<StartScanResponse>), ApiError> {
    req.validate().map_err(validation_error)?;

    let permit = state.try_acquire_scan().ok_or_else(|| {
        tracing::warn!("Scan requested while another scan is running");
        scan_error(&ScanError::AlreadyRunning)
    })?;

    let orchestrator = Arc::clone(state.orchestrator());
    let reporter = Arc::clone(state.reporter());

    let session = orchestrator
        .begin(&req.url, &reporter)
        .map_err(|e| scan_error(&e))?;

    let response = StartScanResponse {
        scan_id: session.id(),
        target_url: session.target_url().to_string(),
        status: "running".to_string(),
        checks_total: orchestrator.registry().len(),
        expected_results: orchestrator.registry().expected_results(),
        created_at: Utc::now(),
    };

    tokio::spawn(async move {
        let _permit = permit;
        if let Err(e) = orchestrator.execute(session, &reporter).await {
            tracing::warn!("Background scan ended with error: {}", e);
        }
    });

    Ok((StatusCode::ACCEPTED, Json(response)))
}

pub async fn get_scan_status(State(state): State<AppState>) -> Json<ScanStatusResponse> {
    Json(ScanStatusResponse::from(&state.reporter().current()))
}

pub async fn get_scan_results(State(state): State<AppState>) -> Json<ScanResultsResponse> {
    let snap = state.reporter().current();
    Json(ScanResultsResponse {
        summary: summarize(&snap.results),
        scan_id: snap.scan_id,
        target_url: snap.target_url,
        phase: snap.phase,
        progress: snap.progress,
        results: snap.results,
    })
}

pub async fn list_checks(State(state): State<AppState>) -> Json<CheckListResponse> {
    let registry = state.orchestrator().registry();
    Json(CheckListResponse {
        mode: state.check_mode(),
        expected_results: registry.expected_results(),
        checks: registry.describe(),
    })
}

// ============================================
// SSE Scan Events
// ============================================

pub async fn scan_events(State(state): State<AppState>) -> Response {
    // Subscribe before reading the snapshot so a scan finishing in between
    // still delivers its terminal event
    let events = state.reporter().subscribe();
    let snapshot = state.reporter().current();

    let (tx, rx) = mpsc::channel::<Event>(SSE_CHANNEL_CAPACITY);

    let _ = tx
        .send(
            Event::default().event("connected").data(
                serde_json::json!({
                    "scan_id": snapshot.scan_id,
                    "phase": snapshot.phase,
                    "progress": snapshot.progress,
                })
                .to_string(),
            ),
        )
        .await;

    if snapshot.is_running {
        tokio::spawn(async move {
            forward_scan_events(events, tx).await;
        });
    } else if let Some(notice) = state.reporter().last_notice() {
        // Already finished: replay the final notification and close
        let event = ScanEvent::Notice(notice);
        match Event::default().event(event.event_name()).json_data(&event) {
            Ok(sse_event) => {
                let _ = tx.send(sse_event).await;
            }
            Err(e) => tracing::error!("Failed to encode scan event: {}", e),
        }
    }

    let stream = ScanEventStream { rx };
    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// Background task relaying orchestrator events to one SSE client
async fn forward_scan_events(mut events: broadcast::Receiver<ScanEvent>, tx: mpsc::Sender<Event>) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("SSE client lagged, skipped {} scan events", skipped);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => break,
        };

        let terminal = event.is_terminal();
        let sse_event = match Event::default().event(event.event_name()).json_data(&event) {
            Ok(e) => e,
            Err(e) => {
                tracing::error!("Failed to encode scan event: {}", e);
                continue;
            }
        };

        if tx.send(sse_event).await.is_err() || terminal {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_idle_snapshot() {
        let status = ScanStatusResponse::from(&ScanSnapshot::idle());
        assert_eq!(status.phase, ScanPhase::Idle);
        assert_eq!(status.results_count, 0);
        assert!(status.scan_id.is_none());
    }

    #[test]
    fn test_request_length_limit() {
        let req = StartScanRequest {
            url: format!("https://example.com/{}", "a".repeat(2048)),
        };
        assert!(req.validate().is_err());

        let req = StartScanRequest {
            url: String::new(),
        };
        assert!(req.validate().is_ok());
    }
}
