//! topograph library - re-exports for testing and external use.
//!
//! An explorer for software-repository topics: seed a force-directed graph
//! from a GitHub topic search, expand topic nodes on click, and gate parts
//! of the UI behind a magic-link session from an external auth provider.
//!
//! - `models`: graph, search, and session data structures
//! - `graph`: deduplicated incremental graph store and explorer controller
//! - `github`: GitHub search API client
//! - `auth`: auth provider client, cookie sessions, auth-state events
//! - `gate`: registry of auth-gated page fragments
//! - `url_guard`: outbound URL allowlist
//! - `templates`: HTML/CSS and the generated D3 renderer
//! - `handlers`: HTTP route handlers

use std::env;
use std::sync::Mutex;

pub mod auth;
pub mod gate;
pub mod github;
pub mod graph;
pub mod handlers;
pub mod models;
pub mod templates;
pub mod url_guard;

// ============================================================================
// Configuration
// ============================================================================

/// Seed topic used when the form is blank.
pub const DEFAULT_TOPIC: &str = "threejs";

/// Seed result count used when the form gives none; clamped to [10, 100]
/// either way.
pub const DEFAULT_SEED_LIMIT: u32 = 50;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_PUBLIC_URL: &str = "http://127.0.0.1:3000/";

// ============================================================================
// Application State
// ============================================================================

pub struct AppState {
    /// The one graph store, owned here and shared by reference.
    pub explorer: Mutex<graph::Explorer>,
    pub github: github::GithubClient,
    pub auth: auth::AuthClient,
    pub gates: gate::GateRegistry,
    /// Where this deployment is reachable; magic-link redirects are
    /// computed from it.
    pub public_url: String,
}

impl AppState {
    pub fn new() -> Self {
        let github = github::GithubClient::new().expect("Failed to build HTTP client");
        let auth = auth::AuthClient::from_env().expect("Failed to build HTTP client");
        let public_url =
            env::var("PUBLIC_URL").unwrap_or_else(|_| DEFAULT_PUBLIC_URL.to_string());

        Self {
            explorer: Mutex::new(graph::Explorer::new()),
            github,
            auth,
            gates: gate::default_registry(),
            public_url,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

// Re-export commonly used types
pub use graph::{Explorer, MergeOutcome, TopicGraph};

pub use models::{
    repo_id, topic_id, AuthStateChange, ExpandRequest, ExplorerResponse, GraphEdge, GraphNode,
    GraphSnapshot, GraphStats, NodeKind, RepoRecord, SeedRequest, Session, StatusLevel,
};

pub use github::{
    clamp_limit, search_url, GithubClient, GithubError, EXPAND_PAGE_SIZE, MAX_SEED_LIMIT,
    MIN_SEED_LIMIT,
};

pub use auth::{
    avatar_url, compute_redirect_to, current_session, initials_avatar_data, AuthClient,
    AuthError, AuthEvents, AuthSubscription, SESSION_COOKIE,
};

pub use gate::{default_registry, gate_attr, GateRegistry, GateRequirement};

pub use templates::{auth_area, base_html, html_escape, render_explorer_js, STYLE};

pub use url_guard::{validate_outbound_url, UrlGuardError};
