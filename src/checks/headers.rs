// Security response header presence. Missing headers are warnings, never failures.

use async_trait::async_trait;
use url::Url;

use super::probe::{HttpProbe, ProbeResponse};
use super::simulation::Simulator;
use super::{CheckUnit, SECURITY_HEADERS, SecurityHeader};
use crate::errors::CheckError;
use crate::scan::model::CheckResult;

pub fn label(header: &SecurityHeader) -> String {
    format!("Security Header: {}", header.name)
}

fn present(header: &SecurityHeader) -> CheckResult {
    CheckResult::pass(label(header), format!("{} is present", header.name))
}

fn missing(header: &SecurityHeader) -> CheckResult {
    CheckResult::warning(label(header), format!("{} is missing", header.name))
        .with_details(header.recommendation)
}

/// One result per tracked header, in `SECURITY_HEADERS` order
pub fn analyze(response: &ProbeResponse) -> Vec<CheckResult> {
    SECURITY_HEADERS
        .iter()
        .map(|header| match response.header(header.name) {
            Some(value) if !value.trim().is_empty() => present(header),
            _ => missing(header),
        })
        .collect()
}

fn all_labels() -> Vec<String> {
    SECURITY_HEADERS.iter().map(label).collect()
}

pub struct SimulatedHeaderCheck {
    simulator: Simulator,
}

impl SimulatedHeaderCheck {
    pub fn new(simulator: Simulator) -> Self {
        Self { simulator }
    }
}

#[async_trait]
impl CheckUnit for SimulatedHeaderCheck {
    fn id(&self) -> &'static str {
        "security_headers"
    }

    fn name(&self) -> &'static str {
        "Security headers"
    }

    fn labels(&self) -> Vec<String> {
        all_labels()
    }

    fn simulated(&self) -> bool {
        true
    }

    async fn run(&self, _target: &Url) -> Result<Vec<CheckResult>, CheckError> {
        self.simulator.pause().await;
        Ok(SECURITY_HEADERS
            .iter()
            .map(|header| {
                if self.simulator.chance(header.presence_rate) {
                    present(header)
                } else {
                    missing(header)
                }
            })
            .collect())
    }
}

pub struct LiveHeaderCheck {
    probe: HttpProbe,
}

impl LiveHeaderCheck {
    pub fn new(probe: HttpProbe) -> Self {
        Self { probe }
    }
}

#[async_trait]
impl CheckUnit for LiveHeaderCheck {
    fn id(&self) -> &'static str {
        "security_headers"
    }

    fn name(&self) -> &'static str {
        "Security headers"
    }

    fn labels(&self) -> Vec<String> {
        all_labels()
    }

    async fn run(&self, target: &Url) -> Result<Vec<CheckResult>, CheckError> {
        match self.probe.fetch(target).await {
            Ok(response) => Ok(analyze(&response)),
            Err(CheckError::Degraded(reason)) => {
                tracing::warn!("[Security Headers] degraded for {}: {}", target, reason);
                Ok(self.degraded(&reason))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::model::CheckStatus;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_simulated_never_fails() {
        let check = SimulatedHeaderCheck::new(Simulator::seeded(9));
        let url = Url::parse("https://example.com").unwrap();
        for _ in 0..25 {
            let results = check.run(&url).await.unwrap();
            assert_eq!(results.len(), 4);
            assert!(results.iter().all(|r| r.status != CheckStatus::Fail));
        }
    }

    #[tokio::test]
    async fn test_live_reports_present_and_missing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Security-Policy", "default-src 'self'")
                    .insert_header("X-Content-Type-Options", "nosniff"),
            )
            .mount(&mock_server)
            .await;

        let probe = HttpProbe::with_private_targets(Duration::from_secs(5)).unwrap();
        let check = LiveHeaderCheck::new(probe);
        let url = Url::parse(&mock_server.uri()).unwrap();
        let results = check.run(&url).await.unwrap();

        let statuses: Vec<CheckStatus> = results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                CheckStatus::Pass,
                CheckStatus::Warning,
                CheckStatus::Pass,
                CheckStatus::Warning,
            ]
        );
        assert_eq!(results[1].test, "Security Header: Strict-Transport-Security");
    }

    #[tokio::test]
    async fn test_live_unreachable_degrades_to_warnings() {
        let probe = HttpProbe::with_private_targets(Duration::from_secs(2)).unwrap();
        let check = LiveHeaderCheck::new(probe);
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        let results = check.run(&url).await.unwrap();

        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.status == CheckStatus::Warning));
    }
}
