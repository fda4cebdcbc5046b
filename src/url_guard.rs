//! Outbound URL validation.
//!
//! Every URL this server fetches is either built from user input (search
//! queries) or taken from configuration (the auth provider). Both pass
//! through here first: HTTPS only, host on the allowlist.

use url::Url;

/// Hosts the explorer is allowed to call.
const ALLOWED_HOSTS: &[&str] = &["api.github.com", "github.com"];

#[derive(Debug, Clone)]
pub enum UrlGuardError {
    /// URL is malformed or cannot be parsed
    InvalidUrl(String),
    /// URL uses non-HTTPS scheme
    NotHttps,
    /// Host is not in the allowlist
    HostNotAllowed(String),
}

impl std::fmt::Display for UrlGuardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrlGuardError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            UrlGuardError::NotHttps => write!(f, "Only HTTPS URLs are allowed"),
            UrlGuardError::HostNotAllowed(host) => {
                write!(f, "Host not in allowlist: {}", host)
            }
        }
    }
}

impl std::error::Error for UrlGuardError {}

fn is_host_allowed(host: &str, extra_allowed: &[&str]) -> bool {
    let host_lower = host.to_lowercase();
    ALLOWED_HOSTS
        .iter()
        .chain(extra_allowed.iter())
        .any(|allowed| {
            host_lower == allowed.to_lowercase()
                || host_lower.ends_with(&format!(".{}", allowed.to_lowercase()))
        })
}

/// Validate an outbound URL. `extra_allowed` lets a caller whitelist hosts
/// it learned from configuration (the auth provider's host).
pub fn validate_outbound_url(url_str: &str, extra_allowed: &[&str]) -> Result<Url, UrlGuardError> {
    let url = Url::parse(url_str).map_err(|e| UrlGuardError::InvalidUrl(e.to_string()))?;

    if url.scheme() != "https" {
        return Err(UrlGuardError::NotHttps);
    }

    let host = url
        .host_str()
        .ok_or_else(|| UrlGuardError::InvalidUrl("No host in URL".to_string()))?;

    if !is_host_allowed(host, extra_allowed) {
        return Err(UrlGuardError::HostNotAllowed(host.to_string()));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_hosts() {
        assert!(is_host_allowed("api.github.com", &[]));
        assert!(is_host_allowed("github.com", &[]));
        assert!(!is_host_allowed("evil.com", &[]));
        assert!(!is_host_allowed("api.github.com.evil.com", &[]));
    }

    #[test]
    fn test_extra_allowed_hosts() {
        assert!(is_host_allowed(
            "example.supabase.co",
            &["example.supabase.co"]
        ));
        assert!(!is_host_allowed("other.supabase.co", &["example.supabase.co"]));
    }

    #[test]
    fn test_rejects_http() {
        let result = validate_outbound_url("http://api.github.com/search", &[]);
        assert!(matches!(result, Err(UrlGuardError::NotHttps)));
    }

    #[test]
    fn test_rejects_unknown_host() {
        let result = validate_outbound_url("https://evil.com/search", &[]);
        assert!(matches!(result, Err(UrlGuardError::HostNotAllowed(_))));
    }

    #[test]
    fn test_accepts_search_api() {
        assert!(validate_outbound_url(
            "https://api.github.com/search/repositories?q=topic:rust",
            &[]
        )
        .is_ok());
    }
}
