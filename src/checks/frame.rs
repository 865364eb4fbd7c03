// Clickjacking / frame-embedding protection

use async_trait::async_trait;
use url::Url;

use super::probe::{HttpProbe, ProbeResponse};
use super::simulation::Simulator;
use super::CheckUnit;
use crate::errors::CheckError;
use crate::scan::model::CheckResult;

pub const LABEL: &str = "Clickjacking Protection";

/// Simulated pass rate
const PROTECTED_RATE: f64 = 0.7;

fn protected(details: impl Into<String>) -> CheckResult {
    CheckResult::pass(LABEL, "Frame embedding is restricted").with_details(details)
}

fn unprotected() -> CheckResult {
    CheckResult::fail(LABEL, "Page can be embedded in frames").with_details(
        "Set X-Frame-Options: DENY or a Content-Security-Policy frame-ancestors directive.",
    )
}

/// Decide protection from response headers
pub fn analyze(response: &ProbeResponse) -> CheckResult {
    if let Some(xfo) = response.header("x-frame-options") {
        let xfo = xfo.trim().to_ascii_uppercase();
        if xfo == "DENY" || xfo == "SAMEORIGIN" {
            return protected(format!("X-Frame-Options: {}", xfo));
        }
    }

    if let Some(csp) = response.header("content-security-policy") {
        if csp.to_ascii_lowercase().contains("frame-ancestors") {
            return protected("Content-Security-Policy declares frame-ancestors.");
        }
    }

    unprotected()
}

pub struct SimulatedFrameCheck {
    simulator: Simulator,
}

impl SimulatedFrameCheck {
    pub fn new(simulator: Simulator) -> Self {
        Self { simulator }
    }
}

#[async_trait]
impl CheckUnit for SimulatedFrameCheck {
    fn id(&self) -> &'static str {
        "frame_protection"
    }

    fn name(&self) -> &'static str {
        "Clickjacking protection"
    }

    fn labels(&self) -> Vec<String> {
        vec![LABEL.to_string()]
    }

    fn simulated(&self) -> bool {
        true
    }

    async fn run(&self, _target: &Url) -> Result<Vec<CheckResult>, CheckError> {
        self.simulator.pause().await;
        let result = if self.simulator.chance(PROTECTED_RATE) {
            protected("Simulated outcome; response headers were not inspected.")
        } else {
            unprotected()
        };
        Ok(vec![result])
    }
}

pub struct LiveFrameCheck {
    probe: HttpProbe,
}

impl LiveFrameCheck {
    pub fn new(probe: HttpProbe) -> Self {
        Self { probe }
    }
}

#[async_trait]
impl CheckUnit for LiveFrameCheck {
    fn id(&self) -> &'static str {
        "frame_protection"
    }

    fn name(&self) -> &'static str {
        "Clickjacking protection"
    }

    fn labels(&self) -> Vec<String> {
        vec![LABEL.to_string()]
    }

    async fn run(&self, target: &Url) -> Result<Vec<CheckResult>, CheckError> {
        match self.probe.fetch(target).await {
            Ok(response) => Ok(vec![analyze(&response)]),
            Err(CheckError::Degraded(reason)) => {
                tracing::warn!("[Clickjacking] degraded for {}: {}", target, reason);
                Ok(self.degraded(&reason))
            }
            Err(e) => Err(e),
        }
    }
}
