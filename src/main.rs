//! topograph - explore software-repository topics as a force graph.
//!
//! This is the main entry point for the explorer web server.
//! The application is organized into the following modules:
//!
//! - `models`: graph, search, and session data structures
//! - `graph`: deduplicated incremental graph store and explorer controller
//! - `github`: GitHub search API client
//! - `auth`: auth provider client, cookie sessions, auth-state events
//! - `gate`: registry of auth-gated page fragments
//! - `templates`: HTML/CSS and the generated D3 renderer
//! - `handlers`: HTTP route handlers

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use topograph::{handlers, AppState, DEFAULT_BIND_ADDR};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "topograph=info".into()),
        )
        .init();

    let state = Arc::new(AppState::new());

    // Observe auth transitions for the lifetime of the server. The handle
    // keeps the subscription alive; dropping it would unsubscribe.
    let mut auth_events = state.auth.events().subscribe();
    tokio::spawn(async move {
        while let Some(change) = auth_events.next().await {
            info!(?change, "auth state changed");
        }
    });

    let app = Router::new()
        // Pages
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login_page))
        .route("/logout", get(handlers::logout))
        .route("/auth/callback", get(handlers::auth_callback))
        // Graph API
        .route("/api/graph", get(handlers::graph_api))
        .route("/api/graph/seed", post(handlers::seed_graph))
        .route("/api/graph/expand", post(handlers::expand_graph))
        // Auth API
        .route("/api/auth/magic-link", post(handlers::magic_link))
        .route("/api/auth/session", post(handlers::set_session))
        .with_state(state.clone());

    let bind_addr =
        std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind listener");

    info!("topograph running at http://{}", bind_addr);
    if state.auth.is_configured() {
        info!("Authentication: ENABLED (AUTH_URL set)");
    } else {
        info!("Authentication: DISABLED (set AUTH_URL and AUTH_ANON_KEY to enable sign-in)");
    }

    axum::serve(listener, app).await.expect("Server error");
}
