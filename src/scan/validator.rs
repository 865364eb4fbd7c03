// URL syntax validation. Never touches the network.

use url::Url;

use crate::errors::ScanError;

/// True iff `input` is an absolute URL with a scheme and a host.
pub fn validate(input: &str) -> bool {
    parse_target(input).is_ok()
}

/// Parse user input into a scan target, telling blank input apart from
/// malformed input.
pub fn parse_target(input: &str) -> Result<Url, ScanError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ScanError::InputEmpty);
    }

    let url = Url::parse(trimmed).map_err(|_| ScanError::InputMalformed(trimmed.to_string()))?;

    // `mailto:`, `data:` and friends parse fine but have no authority
    let has_host = url.host_str().is_some_and(|h| !h.is_empty());
    if url.cannot_be_a_base() || !has_host {
        return Err(ScanError::InputMalformed(trimmed.to_string()));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(validate("https://example.com"));
        assert!(validate("http://example.com/path?q=1"));
        assert!(validate("  https://sub.example.co.uk:8443/  "));
        assert!(validate("http://127.0.0.1:8080"));
    }

    #[test]
    fn test_invalid_urls() {
        assert!(!validate(""));
        assert!(!validate("   "));
        assert!(!validate("not a url"));
        assert!(!validate("example.com"));
        assert!(!validate("mailto:someone@example.com"));
        assert!(!validate("https://"));
    }

    #[test]
    fn test_empty_and_malformed_are_distinguished() {
        assert_eq!(parse_target(" \t"), Err(ScanError::InputEmpty));
        assert_eq!(
            parse_target("not a url"),
            Err(ScanError::InputMalformed("not a url".to_string()))
        );
    }

    #[test]
    fn test_parse_target_trims_input() {
        let url = parse_target("  https://example.com  ").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("example.com"));
    }
}
