// Thin HTTP client used by live check strategies

use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use url::{Host, Url};

use crate::errors::CheckError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Maximum redirects followed before giving up on a target
const MAX_REDIRECTS: usize = 5;

/// Body bytes kept per response; listing markers appear near the top.
/// Reading stops once this much has been buffered.
const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: u16,
    /// Header names are lowercased
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ProbeResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Loopback, private, link-local, CGNAT, documentation and unspecified
/// ranges are not public.
pub fn is_public_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, ..] = v4.octets();
            let shared = a == 100 && (b & 0xc0) == 64;
            !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_documentation()
                || v4.is_unspecified()
                || shared
                || a == 0)
        }
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_public_ip(IpAddr::V4(v4));
            }
            let first = v6.segments()[0];
            let unique_local = (first & 0xfe00) == 0xfc00;
            let link_local = (first & 0xffc0) == 0xfe80;
            !(v6.is_loopback() || v6.is_unspecified() || unique_local || link_local)
        }
    }
}

/// IP literal in `url` that points at a non-public address
fn forbidden_literal(url: &Url) -> Option<IpAddr> {
    let ip = match url.host()? {
        Host::Ipv4(v4) => IpAddr::V4(v4),
        Host::Ipv6(v6) => IpAddr::V6(v6),
        Host::Domain(_) => return None,
    };
    (!is_public_ip(ip)).then_some(ip)
}

/// DNS resolver that drops non-public addresses, so host names pointing
/// inside the network (including after a redirect) cannot be reached
struct PublicOnlyResolver;

impl Resolve for PublicOnlyResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let host = name.as_str().to_string();
        Box::pin(async move {
            let public: Vec<SocketAddr> = tokio::net::lookup_host((host.as_str(), 0))
                .await?
                .filter(|addr| is_public_ip(addr.ip()))
                .collect();
            if public.is_empty() {
                return Err(BoxError::from(format!(
                    "{} resolves only to non-public addresses",
                    host
                )));
            }
            let addrs: Addrs = Box::new(public.into_iter());
            Ok::<Addrs, BoxError>(addrs)
        })
    }
}

#[derive(Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    allow_private: bool,
}

impl HttpProbe {
    /// Client that only reaches publicly routable addresses
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::build(timeout, false)
    }

    /// Client that may also reach loopback and private networks
    pub fn with_private_targets(timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::build(timeout, true)
    }

    fn build(timeout: Duration, allow_private: bool) -> Result<Self, reqwest::Error> {
        let redirect = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                attempt.error("too many redirects")
            } else if !allow_private && forbidden_literal(attempt.url()).is_some() {
                attempt.error("redirect to a non-public address")
            } else {
                attempt.follow()
            }
        });

        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(redirect)
            .user_agent(concat!("webcheck-api/", env!("CARGO_PKG_VERSION")));
        if !allow_private {
            builder = builder.dns_resolver(Arc::new(PublicOnlyResolver));
        }

        Ok(Self {
            client: builder.build()?,
            allow_private,
        })
    }

    /// GET `url`. Transport errors and refused targets come back as
    /// `CheckError::Degraded`.
    pub async fn fetch(&self, url: &Url) -> Result<ProbeResponse, CheckError> {
        if !self.allow_private {
            if let Some(ip) = forbidden_literal(url) {
                tracing::warn!("Refusing to probe non-public address {}", ip);
                return Err(CheckError::Degraded(format!(
                    "refusing to probe non-public address {}",
                    ip
                )));
            }
        }

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CheckError::Degraded(format!("request to {} failed: {}", url, e)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        let mut bytes = Vec::new();
        while bytes.len() < MAX_BODY_BYTES {
            let chunk = response.chunk().await.map_err(|e| {
                CheckError::Degraded(format!("reading body from {} failed: {}", url, e))
            })?;
            let Some(chunk) = chunk else { break };
            let take = chunk.len().min(MAX_BODY_BYTES - bytes.len());
            bytes.extend_from_slice(&chunk[..take]);
        }
        let body = String::from_utf8_lossy(&bytes).into_owned();

        tracing::debug!("Probed {} -> {}", url, status);

        Ok(ProbeResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_collects_headers_and_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("X-Frame-Options", "DENY")
                    .set_body_string("hello"),
            )
            .mount(&mock_server)
            .await;

        let probe = HttpProbe::with_private_targets(Duration::from_secs(5)).unwrap();
        let url = Url::parse(&mock_server.uri()).unwrap();
        let response = probe.fetch(&url).await.unwrap();

        assert_eq!(response.status, 200);
        assert!(response.is_success());
        assert_eq!(response.header("x-frame-options"), Some("DENY"));
        assert_eq!(response.header("X-Frame-Options"), Some("DENY"));
        assert_eq!(response.body, "hello");
    }

    #[tokio::test]
    async fn test_large_body_is_capped() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("a".repeat(1024 * 1024)))
            .mount(&mock_server)
            .await;

        let probe = HttpProbe::with_private_targets(Duration::from_secs(5)).unwrap();
        let url = Url::parse(&mock_server.uri()).unwrap();
        let response = probe.fetch(&url).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body.len(), MAX_BODY_BYTES);
    }

    #[tokio::test]
    async fn test_unreachable_host_degrades() {
        let probe = HttpProbe::with_private_targets(Duration::from_secs(2)).unwrap();
        // Port 9 (discard) on localhost is closed in test environments
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        let err = probe.fetch(&url).await.unwrap_err();
        assert!(matches!(err, CheckError::Degraded(_)));
    }

    #[tokio::test]
    async fn test_private_targets_are_refused() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let probe = HttpProbe::new(Duration::from_secs(2)).unwrap();

        let literal = Url::parse(&mock_server.uri()).unwrap();
        match probe.fetch(&literal).await.unwrap_err() {
            CheckError::Degraded(reason) => assert!(reason.contains("non-public")),
            other => panic!("unexpected error {:?}", other),
        }

        let metadata = Url::parse("http://169.254.169.254/latest/meta-data/").unwrap();
        assert!(matches!(
            probe.fetch(&metadata).await,
            Err(CheckError::Degraded(_))
        ));

        // Host names are filtered at resolution time
        let port = mock_server.address().port();
        let named = Url::parse(&format!("http://localhost:{}/", port)).unwrap();
        assert!(matches!(
            probe.fetch(&named).await,
            Err(CheckError::Degraded(_))
        ));

        let received = mock_server.received_requests().await.unwrap_or_default();
        assert!(received.is_empty());
    }

    #[test]
    fn test_public_address_classification() {
        let internal = [
            "127.0.0.1",
            "10.1.2.3",
            "172.16.0.1",
            "192.168.1.1",
            "169.254.169.254",
            "100.64.0.1",
            "0.0.0.0",
            "::1",
            "fd00::1",
            "fe80::1",
            "::ffff:127.0.0.1",
        ];
        for ip in internal {
            assert!(!is_public_ip(ip.parse().unwrap()), "{} should not be public", ip);
        }
        for ip in ["93.184.216.34", "1.1.1.1", "2606:4700:4700::1111"] {
            assert!(is_public_ip(ip.parse().unwrap()), "{} should be public", ip);
        }
    }
}
