// Error types for scan orchestration and individual check units

use thiserror::Error;

/// Errors surfaced to whoever requested a scan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Blank or whitespace-only target
    #[error("Please enter a URL to scan")]
    InputEmpty,

    /// Target does not parse as an absolute URL with a host
    #[error("'{0}' is not a valid absolute URL")]
    InputMalformed(String),

    /// A scan is already running; the caller should retry once it finishes
    #[error("A scan is already in progress")]
    AlreadyRunning,

    /// A check unit faulted mid-scan. Results gathered before the fault are kept.
    #[error("Scan aborted: {0}")]
    ScanAborted(String),
}

impl ScanError {
    /// Stable machine-readable code used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            ScanError::InputEmpty => "INPUT_EMPTY",
            ScanError::InputMalformed(_) => "INPUT_MALFORMED",
            ScanError::AlreadyRunning => "SCAN_IN_PROGRESS",
            ScanError::ScanAborted(_) => "SCAN_ABORTED",
        }
    }

    pub fn is_input_error(&self) -> bool {
        matches!(self, ScanError::InputEmpty | ScanError::InputMalformed(_))
    }
}

/// Errors a check unit may return from `run`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// The real check logic could not complete (network failure, timeout).
    /// The orchestrator turns this into warning results and keeps going.
    #[error("check degraded: {0}")]
    Degraded(String),

    /// Unexpected internal failure. Aborts the scan.
    #[error("check fault: {0}")]
    Fault(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ScanError::InputEmpty.code(), "INPUT_EMPTY");
        assert_eq!(
            ScanError::InputMalformed("x".into()).code(),
            "INPUT_MALFORMED"
        );
        assert_eq!(ScanError::AlreadyRunning.code(), "SCAN_IN_PROGRESS");
        assert_eq!(ScanError::ScanAborted("boom".into()).code(), "SCAN_ABORTED");
    }

    #[test]
    fn test_input_errors_are_classified() {
        assert!(ScanError::InputEmpty.is_input_error());
        assert!(ScanError::InputMalformed("not a url".into()).is_input_error());
        assert!(!ScanError::AlreadyRunning.is_input_error());
        assert!(!ScanError::ScanAborted("boom".into()).is_input_error());
    }
}
