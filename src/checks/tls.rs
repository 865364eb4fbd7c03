use async_trait::async_trait;
use url::Url;

use super::CheckUnit;
use crate::errors::CheckError;
use crate::scan::model::CheckResult;

pub const LABEL: &str = "HTTPS Usage";

/// Deterministic: passes iff the target uses the `https` scheme.
/// Identical in simulated and live registries.
pub struct TlsSchemeCheck;

#[async_trait]
impl CheckUnit for TlsSchemeCheck {
    fn id(&self) -> &'static str {
        "tls_scheme"
    }

    fn name(&self) -> &'static str {
        "HTTPS usage"
    }

    fn labels(&self) -> Vec<String> {
        vec![LABEL.to_string()]
    }

    async fn run(&self, target: &Url) -> Result<Vec<CheckResult>, CheckError> {
        let result = if target.scheme() == "https" {
            CheckResult::pass(LABEL, "Site uses HTTPS")
                .with_details("Traffic to this site is encrypted in transit.")
        } else {
            CheckResult::fail(LABEL, "Site does not use HTTPS").with_details(format!(
                "The '{}' scheme sends traffic unencrypted. Serve the site over HTTPS.",
                target.scheme()
            ))
        };
        Ok(vec![result])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::model::CheckStatus;

    #[tokio::test]
    async fn test_https_passes() {
        let url = Url::parse("https://example.com").unwrap();
        let results = TlsSchemeCheck.run(&url).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, CheckStatus::Pass);
        assert_eq!(results[0].test, LABEL);
    }

    #[tokio::test]
    async fn test_http_fails() {
        let url = Url::parse("http://example.com").unwrap();
        let results = TlsSchemeCheck.run(&url).await.unwrap();
        assert_eq!(results[0].status, CheckStatus::Fail);
    }

    #[tokio::test]
    async fn test_scheme_case_is_normalized() {
        let url = Url::parse("HTTPS://example.com").unwrap();
        let results = TlsSchemeCheck.run(&url).await.unwrap();
        assert_eq!(results[0].status, CheckStatus::Pass);
    }
}
