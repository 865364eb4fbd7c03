// ============================================
// Scan Events & User-Facing Notifications
// ============================================
//
// The orchestrator publishes two things:
// - the latest `ScanSnapshot` on a watch channel (readers poll it)
// - a stream of `ScanEvent`s on a broadcast channel (SSE subscribers)
// The last notification is kept so late subscribers get the same event.

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

use super::model::{CheckResult, ScanPhase, ScanSnapshot};
use crate::errors::ScanError;

/// Broadcast buffer; one scan emits at most a handful of events
const EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    InputEmpty,
    InputMalformed,
    ScanFailed,
    ScanComplete,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_id: Option<Uuid>,
}

impl Notification {
    /// Notification for input rejected before a scan starts.
    /// Returns `None` for errors that are not input errors.
    pub fn rejected(error: &ScanError) -> Option<Self> {
        let (kind, title) = match error {
            ScanError::InputEmpty => (NotificationKind::InputEmpty, "URL required"),
            ScanError::InputMalformed(_) => (NotificationKind::InputMalformed, "Invalid URL"),
            _ => return None,
        };
        Some(Self {
            kind,
            title: title.to_string(),
            description: error.to_string(),
            scan_id: None,
        })
    }

    pub fn scan_failed(scan_id: Uuid, reason: &str) -> Self {
        Self {
            kind: NotificationKind::ScanFailed,
            title: "Scan failed".to_string(),
            description: format!("The scan stopped unexpectedly: {}", reason),
            scan_id: Some(scan_id),
        }
    }

    pub fn scan_complete(scan_id: Uuid, target_url: &str) -> Self {
        Self {
            kind: NotificationKind::ScanComplete,
            title: "Scan complete".to_string(),
            description: format!("Finished security checks for {}", target_url),
            scan_id: Some(scan_id),
        }
    }

    /// SSE event name for this notification
    pub fn event_name(&self) -> &'static str {
        match self.kind {
            NotificationKind::InputEmpty | NotificationKind::InputMalformed => "invalid",
            NotificationKind::ScanFailed => "failed",
            NotificationKind::ScanComplete => "completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanEvent {
    /// Emitted after every unit, and once more at completion
    Progress {
        scan_id: Uuid,
        progress: u8,
        results: Vec<CheckResult>,
    },
    Notice(Notification),
}

impl ScanEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            ScanEvent::Progress { .. } => "progress",
            ScanEvent::Notice(n) => n.event_name(),
        }
    }

    /// Completion and failure end a scan's event stream
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanEvent::Notice(Notification {
                kind: NotificationKind::ScanFailed | NotificationKind::ScanComplete,
                ..
            })
        )
    }
}

/// Publishing side of the snapshot and event channels
pub struct ScanReporter {
    snapshot: watch::Sender<ScanSnapshot>,
    events: broadcast::Sender<ScanEvent>,
    last_notice: watch::Sender<Option<Notification>>,
}

impl ScanReporter {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(ScanSnapshot::idle());
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let (last_notice, _) = watch::channel(None);
        Self {
            snapshot,
            events,
            last_notice,
        }
    }

    /// Latest published snapshot
    pub fn current(&self) -> ScanSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<ScanSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.events.subscribe()
    }

    /// Notification that ended the current snapshot, if any
    pub fn last_notice(&self) -> Option<Notification> {
        self.last_notice.borrow().clone()
    }

    /// Replace the snapshot. A new snapshot invalidates the last notification.
    pub(crate) fn publish(&self, snapshot: ScanSnapshot) {
        self.last_notice.send_replace(None);
        self.snapshot.send_replace(snapshot);
    }

    pub(crate) fn set_phase(&self, phase: ScanPhase) {
        self.snapshot.send_modify(|s| s.phase = phase);
    }

    pub(crate) fn emit(&self, event: ScanEvent) {
        // No subscribers is fine; snapshots still carry the state
        let _ = self.events.send(event);
    }

    /// Publish the final snapshot together with the notification that ends it.
    /// The notification is recorded first, so a reader that sees the final
    /// snapshot also finds it.
    pub(crate) fn conclude(&self, snapshot: ScanSnapshot, notice: Notification) {
        self.last_notice.send_replace(Some(notice.clone()));
        self.snapshot.send_replace(snapshot);
        self.emit(ScanEvent::Notice(notice));
    }

    /// Record an input rejection. The snapshot no longer refers to any
    /// earlier scan, and only the matching input notification is emitted.
    pub(crate) fn reject(&self, error: &ScanError) {
        let snapshot = ScanSnapshot::rejected(error.to_string());
        match Notification::rejected(error) {
            Some(notice) => self.conclude(snapshot, notice),
            None => self.publish(snapshot),
        }
    }
}

impl Default for ScanReporter {
    fn default() -> Self {
        Self::new()
    }
}
