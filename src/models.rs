//! Data models for the topic explorer.
//!
//! Contains the graph node/edge structures shared between the in-memory
//! store and the D3 renderer, the GitHub search result records, the API
//! request/response shapes, and the auth session structures.

use serde::{Deserialize, Serialize};

// ============================================================================
// Graph Data Structures
// ============================================================================

/// What a graph node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Topic,
    Repo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    /// External page for repo nodes; topics have none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl GraphNode {
    pub fn topic(label: &str) -> Self {
        GraphNode {
            id: topic_id(label),
            kind: NodeKind::Topic,
            label: label.to_string(),
            url: None,
        }
    }

    pub fn repo(record: &RepoRecord) -> Self {
        GraphNode {
            id: repo_id(&record.full_name),
            kind: NodeKind::Repo,
            label: record.full_name.clone(),
            url: Some(record.html_url.clone()),
        }
    }
}

/// Node identity for a topic: `topic:<name>`.
pub fn topic_id(label: &str) -> String {
    format!("topic:{}", label)
}

/// Node identity for a repository: `repo:<full_name>`.
pub fn repo_id(full_name: &str) -> String {
    format!("repo:{}", full_name)
}

/// Directed in representation only: repo -> topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    pub topic_count: usize,
    pub repo_count: usize,
    pub edge_count: usize,
}

/// Everything the renderer needs for one full redraw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub stats: GraphStats,
}

// ============================================================================
// GitHub Search Results
// ============================================================================

/// One repository from the search API. Only the fields the explorer reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoRecord {
    pub full_name: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<RepoRecord>,
}

// ============================================================================
// Explorer API Shapes
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SeedRequest {
    pub topic: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpandRequest {
    pub id: String,
    /// Current language filter from the form, carried along on expansion.
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Info,
    Error,
}

/// Response to seed/expand calls: a human-readable status line plus the
/// snapshot the client should redraw from.
#[derive(Debug, Clone, Serialize)]
pub struct ExplorerResponse {
    pub status: String,
    pub level: StatusLevel,
    pub graph: GraphSnapshot,
}

impl ExplorerResponse {
    pub fn info(status: impl Into<String>, graph: GraphSnapshot) -> Self {
        ExplorerResponse {
            status: status.into(),
            level: StatusLevel::Info,
            graph,
        }
    }

    pub fn error(status: impl Into<String>, graph: GraphSnapshot) -> Self {
        ExplorerResponse {
            status: status.into(),
            level: StatusLevel::Error,
            graph,
        }
    }
}

// ============================================================================
// Auth Session Structures
// ============================================================================

/// Profile metadata the provider attaches to a user. Everything optional;
/// unknown keys ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// An authenticated session as this app sees it: the provider's opaque
/// access token plus the user it verified. Persistence and refresh are the
/// provider's responsibility.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub user: AuthUser,
}

impl Session {
    /// Display identity for the navbar: email, then profile name, then a
    /// generic fallback.
    pub fn display_name(&self) -> &str {
        if let Some(ref email) = self.user.email {
            return email;
        }
        if let Some(ref name) = self.user.user_metadata.name {
            return name;
        }
        "Signed in"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MagicLinkRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetSessionRequest {
    pub access_token: String,
}

/// Transition published on the auth event stream. Token refresh is carried
/// for observers but does not change visible state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStateChange {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_serialization_shape() {
        let topic = GraphNode::topic("threejs");
        let json = serde_json::to_value(&topic).unwrap();
        assert_eq!(json["id"], "topic:threejs");
        assert_eq!(json["kind"], "topic");
        assert_eq!(json["label"], "threejs");
        // Topic nodes carry no url key at all.
        assert!(json.get("url").is_none());

        let repo = GraphNode::repo(&RepoRecord {
            full_name: "mrdoob/three.js".to_string(),
            html_url: "https://github.com/mrdoob/three.js".to_string(),
            description: None,
            stargazers_count: None,
        });
        let json = serde_json::to_value(&repo).unwrap();
        assert_eq!(json["id"], "repo:mrdoob/three.js");
        assert_eq!(json["kind"], "repo");
        assert_eq!(json["url"], "https://github.com/mrdoob/three.js");
    }

    #[test]
    fn test_explorer_response_shape() {
        let resp = ExplorerResponse::error(
            "GitHub API 403: rate limited",
            GraphSnapshot {
                nodes: vec![],
                edges: vec![],
                stats: GraphStats {
                    topic_count: 0,
                    repo_count: 0,
                    edge_count: 0,
                },
            },
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["level"], "error");
        assert_eq!(json["status"], "GitHub API 403: rate limited");
        assert!(json["graph"]["nodes"].as_array().unwrap().is_empty());
    }
}
