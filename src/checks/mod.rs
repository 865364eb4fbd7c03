//! Check units and the registry that orders them.
//!
//! Every unit implements [`CheckUnit`]. Units 2-4 come in two strategies:
//! a simulated one that draws outcomes from a seedable RNG, and a live one that
//! inspects real HTTP responses. The orchestrator only sees the trait, so the
//! two are interchangeable.

use async_trait::async_trait;
use url::Url;

use crate::errors::CheckError;
use crate::scan::model::CheckResult;

pub mod frame;
pub mod headers;
pub mod paths;
pub mod probe;
pub mod registry;
pub mod simulation;
pub mod tls;

pub use probe::HttpProbe;
pub use registry::{CheckRegistry, RegisteredCheck};
pub use simulation::Simulator;

#[async_trait]
pub trait CheckUnit: Send + Sync {
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    /// Labels of the results this unit produces, in output order
    fn labels(&self) -> Vec<String>;

    /// Whether outcomes are simulated rather than observed
    fn simulated(&self) -> bool {
        false
    }

    /// Run the check. `CheckError::Degraded` becomes warnings; `CheckError::Fault`
    /// aborts the scan.
    async fn run(&self, target: &Url) -> Result<Vec<CheckResult>, CheckError>;

    /// Warning results standing in for a unit that could not finish
    fn degraded(&self, reason: &str) -> Vec<CheckResult> {
        self.labels()
            .into_iter()
            .map(|label| {
                CheckResult::warning(label, "Check could not be completed").with_details(reason)
            })
            .collect()
    }
}

/// Paths probed for directory listing exposure
pub const SENSITIVE_PATHS: [&str; 7] = [
    "/admin", "/backup", "/.git", "/config", "/uploads", "/api", "/test",
];

pub struct SecurityHeader {
    pub name: &'static str,
    pub recommendation: &'static str,
    /// Chance the simulated header is reported present
    pub presence_rate: f64,
}

pub const SECURITY_HEADERS: [SecurityHeader; 4] = [
    SecurityHeader {
        name: "Content-Security-Policy",
        recommendation: "Define a Content-Security-Policy to restrict script and resource origins.",
        presence_rate: 0.6,
    },
    SecurityHeader {
        name: "Strict-Transport-Security",
        recommendation: "Send Strict-Transport-Security so browsers only connect over HTTPS.",
        presence_rate: 0.5,
    },
    SecurityHeader {
        name: "X-Content-Type-Options",
        recommendation: "Send X-Content-Type-Options: nosniff to disable MIME sniffing.",
        presence_rate: 0.4,
    },
    SecurityHeader {
        name: "Referrer-Policy",
        recommendation: "Set a Referrer-Policy such as strict-origin-when-cross-origin.",
        presence_rate: 0.3,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    #[async_trait]
    impl CheckUnit for Fixed {
        fn id(&self) -> &'static str {
            "fixed"
        }
        fn name(&self) -> &'static str {
            "Fixed"
        }
        fn labels(&self) -> Vec<String> {
            vec!["one".into(), "two".into()]
        }
        async fn run(&self, _target: &Url) -> Result<Vec<CheckResult>, CheckError> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_degraded_covers_every_label() {
        let results = Fixed.degraded("timed out");
        assert_eq!(results.len(), 2);
        assert!(
            results
                .iter()
                .all(|r| r.status == crate::scan::model::CheckStatus::Warning)
        );
        assert_eq!(results[1].test, "two");
        assert_eq!(results[0].details.as_deref(), Some("timed out"));
    }
}
