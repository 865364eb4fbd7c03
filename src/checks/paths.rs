// Directory listing exposure on well-known sensitive paths

use async_trait::async_trait;
use futures::future::join_all;
use url::Url;

use super::probe::{HttpProbe, ProbeResponse};
use super::simulation::Simulator;
use super::{CheckUnit, SENSITIVE_PATHS};
use crate::errors::CheckError;
use crate::scan::model::CheckResult;

/// Simulated chance a path is NOT browsable
const NOT_EXPOSED_RATE: f64 = 0.8;

/// Markers of auto-generated index pages (Apache, nginx, python http.server, IIS)
const LISTING_MARKERS: [&str; 4] = [
    "index of /",
    "directory listing for",
    "parent directory",
    "[to parent directory]",
];

pub fn label(path: &str) -> String {
    format!("Directory Listing: {}", path)
}

fn not_exposed(path: &str) -> CheckResult {
    CheckResult::pass(label(path), format!("{} is not browsable", path))
}

fn exposed(path: &str) -> CheckResult {
    CheckResult::fail(label(path), format!("{} exposes a directory listing", path))
        .with_details("Disable auto-indexing for this path or restrict access to it.")
}

/// Decide exposure of one path from its response
pub fn analyze(path: &str, response: &ProbeResponse) -> CheckResult {
    let body = response.body.to_ascii_lowercase();
    if response.is_success() && LISTING_MARKERS.iter().any(|m| body.contains(m)) {
        exposed(path)
    } else {
        not_exposed(path)
    }
}

fn all_labels() -> Vec<String> {
    SENSITIVE_PATHS.iter().map(|p| label(p)).collect()
}

pub struct SimulatedPathCheck {
    simulator: Simulator,
}

impl SimulatedPathCheck {
    pub fn new(simulator: Simulator) -> Self {
        Self { simulator }
    }
}

#[async_trait]
impl CheckUnit for SimulatedPathCheck {
    fn id(&self) -> &'static str {
        "path_exposure"
    }

    fn name(&self) -> &'static str {
        "Directory listing exposure"
    }

    fn labels(&self) -> Vec<String> {
        all_labels()
    }

    fn simulated(&self) -> bool {
        true
    }

    async fn run(&self, _target: &Url) -> Result<Vec<CheckResult>, CheckError> {
        self.simulator.pause().await;
        // Each path is drawn independently
        Ok(SENSITIVE_PATHS
            .iter()
            .map(|path| {
                if self.simulator.chance(NOT_EXPOSED_RATE) {
                    not_exposed(path)
                } else {
                    exposed(path)
                }
            })
            .collect())
    }
}

pub struct LivePathCheck {
    probe: HttpProbe,
}

impl LivePathCheck {
    pub fn new(probe: HttpProbe) -> Self {
        Self { probe }
    }

    async fn check_path(&self, target: &Url, path: &str) -> CheckResult {
        let url = match target.join(path) {
            Ok(url) => url,
            Err(e) => {
                return CheckResult::warning(label(path), "Check could not be completed")
                    .with_details(format!("cannot build URL for {}: {}", path, e));
            }
        };

        match self.probe.fetch(&url).await {
            Ok(response) => analyze(path, &response),
            Err(e) => {
                tracing::debug!("[Directory Listing] {} degraded: {}", url, e);
                CheckResult::warning(label(path), "Check could not be completed")
                    .with_details(e.to_string())
            }
        }
    }
}

#[async_trait]
impl CheckUnit for LivePathCheck {
    fn id(&self) -> &'static str {
        "path_exposure"
    }

    fn name(&self) -> &'static str {
        "Directory listing exposure"
    }

    fn labels(&self) -> Vec<String> {
        all_labels()
    }

    /// Paths are probed concurrently; results keep `SENSITIVE_PATHS` order.
    async fn run(&self, target: &Url) -> Result<Vec<CheckResult>, CheckError> {
        let probes = SENSITIVE_PATHS
            .iter()
            .map(|path| self.check_path(target, path));
        Ok(join_all(probes).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::CheckRegistry;
    use crate::scan::model::CheckStatus;
    use crate::scan::{ScanOrchestrator, ScanReporter};
    use std::collections::HashMap;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn response(status: u16, body: &str) -> ProbeResponse {
        ProbeResponse {
            status,
            headers: HashMap::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_listing_detected() {
        let result = analyze(
            "/backup",
            &response(200, "<html><title>Index of /backup</title></html>"),
        );
        assert_eq!(result.status, CheckStatus::Fail);
        assert_eq!(result.test, "Directory Listing: /backup");
    }

    #[test]
    fn test_not_found_is_not_exposed() {
        let result = analyze("/admin", &response(404, "Index of /admin"));
        assert_eq!(result.status, CheckStatus::Pass);
    }

    #[test]
    fn test_plain_page_is_not_exposed() {
        let result = analyze("/api", &response(200, "{\"ok\":true}"));
        assert_eq!(result.status, CheckStatus::Pass);
    }

    #[tokio::test]
    async fn test_simulated_emits_seven_ordered_results() {
        let check = SimulatedPathCheck::new(Simulator::seeded(3));
        let url = Url::parse("https://example.com").unwrap();
        let results = check.run(&url).await.unwrap();

        assert_eq!(results.len(), SENSITIVE_PATHS.len());
        for (result, path) in results.iter().zip(SENSITIVE_PATHS) {
            assert_eq!(result.test, label(path));
            assert_ne!(result.status, CheckStatus::Warning);
        }
    }

    #[tokio::test]
    async fn test_live_flags_only_listed_path() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/uploads"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<h1>Index of /uploads</h1><a href=\"../\">Parent Directory</a>"),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let probe = HttpProbe::with_private_targets(Duration::from_secs(5)).unwrap();
        let check = LivePathCheck::new(probe);
        let url = Url::parse(&format!("{}/app/index.html", mock_server.uri())).unwrap();
        let results = check.run(&url).await.unwrap();

        assert_eq!(results.len(), 7);
        let failing: Vec<&str> = results
            .iter()
            .filter(|r| r.status == CheckStatus::Fail)
            .map(|r| r.test.as_str())
            .collect();
        assert_eq!(failing, vec!["Directory Listing: /uploads"]);
    }

    #[tokio::test]
    async fn test_live_slow_paths_fit_in_one_unit_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_delay(Duration::from_millis(300)))
            .mount(&mock_server)
            .await;

        // One after another the seven requests would need ~2.1s
        let probe = HttpProbe::with_private_targets(Duration::from_millis(800)).unwrap();
        let registry = CheckRegistry::new().register(LivePathCheck::new(probe), 50);
        let orchestrator = ScanOrchestrator::new(registry, Duration::from_secs(1));

        let snap = orchestrator
            .run_scan(&mock_server.uri(), &ScanReporter::new())
            .await
            .unwrap();

        assert_eq!(snap.results.len(), 7);
        for (result, path) in snap.results.iter().zip(SENSITIVE_PATHS) {
            assert_eq!(result.test, label(path));
            assert_eq!(result.status, CheckStatus::Pass);
        }
    }
}
