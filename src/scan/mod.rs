pub mod events;
pub mod model;
pub mod orchestrator;
pub mod summary;
pub mod validator;

pub use events::{Notification, NotificationKind, ScanEvent, ScanReporter};
pub use model::{CheckResult, CheckStatus, ScanPhase, ScanSession, ScanSnapshot};
pub use orchestrator::ScanOrchestrator;
pub use summary::{ScanSummary, summarize};
pub use validator::{parse_target, validate};
