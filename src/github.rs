//! GitHub search API client.
//!
//! The explorer's only data source: tokenless queries against
//! `search/repositories`, filtered by topic and optional language, ordered
//! by stars descending. Result order is preserved all the way into the
//! graph store.

use crate::models::{RepoRecord, SearchResponse};
use crate::url_guard::validate_outbound_url;
use regex::Regex;
use std::time::Duration;

pub const SEARCH_API_URL: &str = "https://api.github.com/search/repositories";
pub const ACCEPT_HEADER: &str = "application/vnd.github+json";
pub const CLIENT_USER_AGENT: &str = "topograph-explorer";

/// Seed limits outside this range are clamped, never rejected.
pub const MIN_SEED_LIMIT: u32 = 10;
pub const MAX_SEED_LIMIT: u32 = 100;

/// Fixed page size for topic-node expansion.
pub const EXPAND_PAGE_SIZE: u32 = 30;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone)]
pub enum GithubError {
    /// Network failure or malformed response body
    Http(String),
    /// Non-success HTTP status; body carried as detail
    Api { status: u16, body: String },
    /// Topic or language input that cannot form a search qualifier
    InvalidQuery(String),
}

impl std::fmt::Display for GithubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GithubError::Http(msg) => write!(f, "GitHub request failed: {}", msg),
            GithubError::Api { status, body } => {
                write!(f, "GitHub API {}: {}", status, body)
            }
            GithubError::InvalidQuery(msg) => write!(f, "Invalid search input: {}", msg),
        }
    }
}

impl std::error::Error for GithubError {}

// ============================================================================
// Query Construction
// ============================================================================

/// Clamp a requested result count to the API's accepted window.
pub fn clamp_limit(requested: u32) -> u32 {
    requested.clamp(MIN_SEED_LIMIT, MAX_SEED_LIMIT)
}

/// GitHub topics: alphanumerics and hyphens, no leading hyphen.
pub fn is_valid_topic(topic: &str) -> bool {
    if topic.is_empty() || topic.len() > 50 {
        return false;
    }
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]*$")
        .map(|re| re.is_match(topic))
        .unwrap_or(false)
}

/// Language qualifiers allow a few extra characters ("c++", "c#", "f*").
pub fn is_valid_language(language: &str) -> bool {
    if language.is_empty() || language.len() > 50 {
        return false;
    }
    Regex::new(r"^[A-Za-z0-9+#*.][A-Za-z0-9+#*. -]*$")
        .map(|re| re.is_match(language))
        .unwrap_or(false)
}

/// Build the `q` parameter: `topic:<name>` plus an optional
/// `language:<lang>` qualifier.
pub fn build_search_query(topic: &str, language: &str) -> String {
    let mut parts = vec![format!("topic:{}", topic)];
    if !language.is_empty() {
        parts.push(format!("language:{}", language));
    }
    parts.join(" ")
}

/// Full search URL for a validated topic/language pair.
pub fn search_url(topic: &str, language: &str, per_page: u32) -> String {
    let query = urlencoding::encode(&build_search_query(topic, language)).into_owned();
    format!(
        "{}?q={}&sort=stars&order=desc&per_page={}",
        SEARCH_API_URL,
        query,
        clamp_limit(per_page)
    )
}

// ============================================================================
// Client
// ============================================================================

pub struct GithubClient {
    http: reqwest::Client,
}

impl GithubClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(GithubClient { http })
    }

    /// Query repositories carrying `topic`, optionally filtered by
    /// `language`, up to `per_page` results (clamped). Returns records in
    /// the API's relevance/stars order.
    pub async fn search_repos_by_topic(
        &self,
        topic: &str,
        language: &str,
        per_page: u32,
    ) -> Result<Vec<RepoRecord>, GithubError> {
        let topic = topic.trim();
        let language = language.trim();
        if !is_valid_topic(topic) {
            return Err(GithubError::InvalidQuery(format!(
                "not a valid topic name: {:?}",
                topic
            )));
        }
        if !language.is_empty() && !is_valid_language(language) {
            return Err(GithubError::InvalidQuery(format!(
                "not a valid language filter: {:?}",
                language
            )));
        }

        let url = search_url(topic, language, per_page);
        validate_outbound_url(&url, &[]).map_err(|e| GithubError::Http(e.to_string()))?;

        let response = self
            .http
            .get(&url)
            .header("Accept", ACCEPT_HEADER)
            .header("User-Agent", CLIENT_USER_AGENT)
            .send()
            .await
            .map_err(|e| GithubError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GithubError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| GithubError::Http(e.to_string()))?;
        Ok(parsed.items)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit_bounds() {
        assert_eq!(clamp_limit(0), 10);
        assert_eq!(clamp_limit(9), 10);
        assert_eq!(clamp_limit(10), 10);
        assert_eq!(clamp_limit(50), 50);
        assert_eq!(clamp_limit(100), 100);
        assert_eq!(clamp_limit(500), 100);
    }

    #[test]
    fn test_topic_validation() {
        assert!(is_valid_topic("threejs"));
        assert!(is_valid_topic("machine-learning"));
        assert!(is_valid_topic("3d"));
        assert!(!is_valid_topic(""));
        assert!(!is_valid_topic("-leading"));
        assert!(!is_valid_topic("has space"));
        assert!(!is_valid_topic("quo\"te"));
    }

    #[test]
    fn test_language_validation() {
        assert!(is_valid_language("rust"));
        assert!(is_valid_language("c++"));
        assert!(is_valid_language("c#"));
        assert!(!is_valid_language(""));
        assert!(!is_valid_language("ru\"st"));
    }

    #[test]
    fn test_build_search_query() {
        assert_eq!(build_search_query("threejs", ""), "topic:threejs");
        assert_eq!(
            build_search_query("threejs", "javascript"),
            "topic:threejs language:javascript"
        );
    }

    #[test]
    fn test_search_url_encodes_and_clamps() {
        let url = search_url("threejs", "c++", 500);
        assert!(url.starts_with(SEARCH_API_URL));
        assert!(url.contains("q=topic%3Athreejs%20language%3Ac%2B%2B"));
        assert!(url.ends_with("per_page=100"));
        assert!(url.contains("sort=stars&order=desc"));
    }

    #[test]
    fn test_parse_search_response() {
        let body = r#"{
            "total_count": 2,
            "incomplete_results": false,
            "items": [
                {
                    "full_name": "mrdoob/three.js",
                    "html_url": "https://github.com/mrdoob/three.js",
                    "description": "JavaScript 3D Library.",
                    "stargazers_count": 101000
                },
                {
                    "full_name": "pmndrs/react-three-fiber",
                    "html_url": "https://github.com/pmndrs/react-three-fiber"
                }
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.total_count, 2);
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].full_name, "mrdoob/three.js");
        assert_eq!(parsed.items[0].stargazers_count, Some(101000));
        assert!(parsed.items[1].description.is_none());
    }

    #[test]
    fn test_empty_items_when_missing() {
        let parsed: SearchResponse = serde_json::from_str(r#"{"total_count": 0}"#).unwrap();
        assert!(parsed.items.is_empty());
    }
}
