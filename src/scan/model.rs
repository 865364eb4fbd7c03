use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Progress value held once every unit has finished
pub const PROGRESS_COMPLETE: u8 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    Warning,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Fail => "fail",
            CheckStatus::Warning => "warning",
        }
    }
}

/// One labeled outcome of a check unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckResult {
    pub test: String,
    pub status: CheckStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl CheckResult {
    pub fn new(test: impl Into<String>, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            test: test.into(),
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn pass(test: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(test, CheckStatus::Pass, message)
    }

    pub fn fail(test: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(test, CheckStatus::Fail, message)
    }

    pub fn warning(test: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(test, CheckStatus::Warning, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    Idle,
    Validating,
    Running,
    Complete,
    Error,
}

impl ScanPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanPhase::Complete | ScanPhase::Error)
    }
}

/// Mutable state of one scan. Only the orchestrator holds one of these;
/// everybody else sees `ScanSnapshot`s.
#[derive(Debug)]
pub struct ScanSession {
    id: Uuid,
    target_url: Url,
    results: Vec<CheckResult>,
    progress: u8,
    is_running: bool,
    phase: ScanPhase,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    error_message: Option<String>,
}

impl ScanSession {
    /// Fresh session for a validated target: no results, zero progress, running.
    pub fn start(target_url: Url) -> Self {
        Self {
            id: Uuid::new_v4(),
            target_url,
            results: Vec::new(),
            progress: 0,
            is_running: true,
            phase: ScanPhase::Running,
            started_at: Utc::now(),
            completed_at: None,
            error_message: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn target_url(&self) -> &Url {
        &self.target_url
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    pub fn append(&mut self, results: impl IntoIterator<Item = CheckResult>) {
        self.results.extend(results);
    }

    /// Move progress to `checkpoint`. Never goes backwards, never past 100.
    pub fn advance(&mut self, checkpoint: u8) {
        self.progress = self.progress.max(checkpoint.min(PROGRESS_COMPLETE));
    }

    pub fn complete(&mut self) {
        self.progress = PROGRESS_COMPLETE;
        self.is_running = false;
        self.phase = ScanPhase::Complete;
        self.completed_at = Some(Utc::now());
    }

    /// Stop the scan after a fault. Results appended so far stay in place.
    pub fn abort(&mut self, reason: impl Into<String>) {
        self.is_running = false;
        self.phase = ScanPhase::Error;
        self.completed_at = Some(Utc::now());
        self.error_message = Some(reason.into());
    }

    pub fn snapshot(&self) -> ScanSnapshot {
        ScanSnapshot {
            scan_id: Some(self.id),
            target_url: Some(self.target_url.to_string()),
            phase: self.phase,
            progress: self.progress,
            is_running: self.is_running,
            results: self.results.clone(),
            started_at: Some(self.started_at),
            completed_at: self.completed_at,
            error_message: self.error_message.clone(),
        }
    }
}

/// Read-only copy of a session handed to readers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanSnapshot {
    pub scan_id: Option<Uuid>,
    pub target_url: Option<String>,
    pub phase: ScanPhase,
    pub progress: u8,
    pub is_running: bool,
    pub results: Vec<CheckResult>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ScanSnapshot {
    /// State before any scan has been requested
    pub fn idle() -> Self {
        Self {
            scan_id: None,
            target_url: None,
            phase: ScanPhase::Idle,
            progress: 0,
            is_running: false,
            results: Vec::new(),
            started_at: None,
            completed_at: None,
            error_message: None,
        }
    }

    /// State after input was rejected: no scan identity, no results
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            phase: ScanPhase::Error,
            error_message: Some(message.into()),
            ..Self::idle()
        }
    }
}
