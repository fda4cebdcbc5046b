//! HTTP route handlers for the explorer.
//!
//! Page handlers render the full document (navbar auth area included) from
//! current session truth; API handlers mutate the graph store and return
//! status + snapshot payloads. Collaborator failures become error-level
//! status strings, never 5xx pages, and never touch the graph.

use crate::auth::{
    compute_redirect_to, current_session, session_token, SESSION_COOKIE, SESSION_TTL_SECS,
};
use crate::github::{clamp_limit, EXPAND_PAGE_SIZE};
use crate::models::{
    AuthStateChange, ExpandRequest, ExplorerResponse, MagicLinkRequest, NodeKind, SeedRequest,
    Session, SetSessionRequest,
};
use crate::templates::{auth_area, base_html, render_explorer_js, ExplorerJsConfig};
use crate::{AppState, DEFAULT_SEED_LIMIT, DEFAULT_TOPIC};
use axum::{
    extract::{Json, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tracing::warn;

fn current_snapshot(state: &AppState) -> crate::models::GraphSnapshot {
    state.explorer.lock().expect("explorer lock").graph().snapshot()
}

// ============================================================================
// Explorer Page
// ============================================================================

pub async fn index(State(state): State<Arc<AppState>>, jar: CookieJar) -> Html<String> {
    let session = current_session(&state.auth, &jar).await;
    let signed_in = session.is_some();

    let explorer_js = render_explorer_js(&ExplorerJsConfig {
        container_selector: "#graph".to_string(),
        graph_url: "/api/graph".to_string(),
        seed_url: "/api/graph/seed".to_string(),
        expand_url: "/api/graph/expand".to_string(),
        default_topic: DEFAULT_TOPIC.to_string(),
        default_limit: DEFAULT_SEED_LIMIT,
    });

    let content = format!(
        r#"<h1>Explore by Topic</h1>
        <p id="signin-cta" class="gated-note" data-requires-guest{cta_attr}>
            Sign in with a magic link to unlock graph downloads.
        </p>
        <form id="explore-form" class="explore-form">
            <label>Topic
                <input id="ex-topic" value="{default_topic}" autocomplete="off">
            </label>
            <label>Language
                <input id="ex-language" placeholder="optional" autocomplete="off">
            </label>
            <label>Limit
                <input id="ex-limit" type="number" min="10" max="100" value="{default_limit}">
            </label>
            <button class="btn" type="submit">Explore</button>
            <button class="btn" type="button" id="ex-clear">Clear</button>
        </form>
        <div id="ex-status" class="status-line"></div>
        <div class="graph-stats">
            <span><strong id="ex-stat-topics">0</strong> topics</span>
            <span><strong id="ex-stat-repos">0</strong> repos</span>
            <span><strong id="ex-stat-edges">0</strong> edges</span>
        </div>
        <div id="export-tools" class="gated-note" data-requires-auth{export_attr}>
            <a href="/api/graph" download="graph.json">Download current graph as JSON</a>
        </div>
        <div class="graph-container"><svg id="graph"></svg></div>
        {explorer_js}"#,
        cta_attr = state.gates.attr("signin-cta", signed_in),
        export_attr = state.gates.attr("export-tools", signed_in),
        default_topic = DEFAULT_TOPIC,
        default_limit = DEFAULT_SEED_LIMIT,
        explorer_js = explorer_js,
    );

    Html(base_html(
        "Explore by Topic",
        &content,
        &auth_area(session.as_ref(), state.auth.is_configured()),
    ))
}

// ============================================================================
// Graph API
// ============================================================================

pub async fn graph_api(State(state): State<Arc<AppState>>) -> Response {
    Json(current_snapshot(&state)).into_response()
}

pub async fn seed_graph(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SeedRequest>,
) -> Json<ExplorerResponse> {
    let topic = {
        let trimmed = req.topic.trim();
        if trimmed.is_empty() {
            DEFAULT_TOPIC.to_string()
        } else {
            trimmed.to_string()
        }
    };
    let language = req.language.trim().to_string();
    let limit = clamp_limit(req.limit.unwrap_or(DEFAULT_SEED_LIMIT));

    match state
        .github
        .search_repos_by_topic(&topic, &language, limit)
        .await
    {
        Ok(repos) => {
            let mut explorer = state.explorer.lock().expect("explorer lock");
            explorer.seed(&topic);
            let outcome = explorer.merge_repos(&topic, &repos);
            let graph = explorer.graph().snapshot();
            Json(ExplorerResponse::info(
                format!(
                    "Loaded {} repos for topic {}. Click a topic node to expand.",
                    outcome.new_nodes, topic
                ),
                graph,
            ))
        }
        Err(e) => {
            // Failed query: report, leave the graph exactly as it was.
            Json(ExplorerResponse::error(e.to_string(), current_snapshot(&state)))
        }
    }
}

pub async fn expand_graph(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ExpandRequest>,
) -> Json<ExplorerResponse> {
    // Read what we need under the lock, then query without holding it so
    // overlapping expansions only serialize on the merge itself.
    let node = {
        let explorer = state.explorer.lock().expect("explorer lock");
        explorer.graph().get(&req.id).cloned()
    };

    let node = match node {
        Some(n) => n,
        None => {
            return Json(ExplorerResponse::error(
                format!("Unknown node: {}", req.id),
                current_snapshot(&state),
            ));
        }
    };

    if node.kind != NodeKind::Topic {
        // Repo selection opens the repo page client-side; nothing to merge.
        return Json(ExplorerResponse::info(
            format!("{} opens on GitHub.", node.label),
            current_snapshot(&state),
        ));
    }

    match state
        .github
        .search_repos_by_topic(&node.label, req.language.trim(), EXPAND_PAGE_SIZE)
        .await
    {
        Ok(repos) => {
            let mut explorer = state.explorer.lock().expect("explorer lock");
            let outcome = explorer.merge_repos(&node.label, &repos);
            let graph = explorer.graph().snapshot();
            let status = if outcome.new_nodes > 0 {
                format!("Added {} repos for {}.", outcome.new_nodes, node.label)
            } else {
                "No new repos for this topic.".to_string()
            };
            Json(ExplorerResponse::info(status, graph))
        }
        Err(e) => {
            Json(ExplorerResponse::error(e.to_string(), current_snapshot(&state)))
        }
    }
}

// ============================================================================
// Login Page and Magic Link
// ============================================================================

pub async fn login_page(State(state): State<Arc<AppState>>, jar: CookieJar) -> Html<String> {
    let session = current_session(&state.auth, &jar).await;
    let signed_in = session.is_some();

    let configured_note = if state.auth.is_configured() {
        ""
    } else {
        r#"<p class="message error">Sign-in is not configured on this deployment.</p>"#
    };

    let content = format!(
        r#"<div class="login-card">
            <div id="login-form" data-requires-guest{form_attr}>
                <h1>Sign in</h1>
                <p>Enter your email and we'll send you a magic link.</p>
                <input id="login-email" type="email" placeholder="you@example.com" autocomplete="email">
                <button class="btn" id="login-send">Send magic link</button>
                {configured_note}
            </div>
            <div id="login-signed-in" data-requires-auth{signed_attr}>
                <h1>You're signed in</h1>
                <p><a href="/">Back to the explorer</a> or <a href="/logout">sign out</a>.</p>
            </div>
            <p class="message" id="login-status"></p>
        </div>
        <script>
        (function() {{
            const btn = document.getElementById('login-send');
            if (!btn) return;
            btn.addEventListener('click', async () => {{
                const email = (document.getElementById('login-email').value || '').trim();
                const status = document.getElementById('login-status');
                if (!email) {{ status.textContent = 'Enter an email address.'; return; }}
                try {{
                    const res = await fetch('/api/auth/magic-link', {{
                        method: 'POST',
                        headers: {{ 'Content-Type': 'application/json' }},
                        body: JSON.stringify({{ email: email }})
                    }});
                    const data = await res.json();
                    status.textContent = data.status;
                    status.className = data.level === 'error' ? 'message error' : 'message';
                }} catch (e) {{
                    status.textContent = 'Failed to request a magic link: ' + e.message;
                    status.className = 'message error';
                }}
            }});
        }})();
        </script>"#,
        form_attr = state.gates.attr("login-form", signed_in),
        signed_attr = state.gates.attr("login-signed-in", signed_in),
        configured_note = configured_note,
    );

    Html(base_html(
        "Sign in",
        &content,
        &auth_area(session.as_ref(), state.auth.is_configured()),
    ))
}

pub async fn magic_link(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MagicLinkRequest>,
) -> Json<serde_json::Value> {
    let email = req.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Json(serde_json::json!({
            "status": "Enter a valid email address.",
            "level": "error",
        }));
    }

    // Magic links come back to the page the login form lives under.
    let login_url = format!("{}/login", state.public_url.trim_end_matches('/'));
    let redirect_to = match compute_redirect_to(&login_url) {
        Some(r) => r,
        None => {
            return Json(serde_json::json!({
                "status": "Deployment PUBLIC_URL is misconfigured.",
                "level": "error",
            }));
        }
    };

    match state.auth.sign_in_with_otp(email, &redirect_to).await {
        Ok(()) => Json(serde_json::json!({
            "status": "Check your email for a sign-in link.",
            "level": "info",
        })),
        Err(e) => Json(serde_json::json!({
            "status": e.to_string(),
            "level": "error",
        })),
    }
}

// ============================================================================
// Magic Link Landing
// ============================================================================

/// Magic links land here with tokens in the URL fragment. Fragments never
/// reach the server, so a tiny page hands the access token to
/// `/api/auth/session` and then returns home.
pub async fn auth_callback() -> Html<String> {
    let content = r##"<div class="login-card">
        <h1>Completing sign-in…</h1>
        <p class="message" id="cb-status">One moment.</p>
        <script>
        (async function() {
            const status = document.getElementById('cb-status');
            const params = new URLSearchParams(window.location.hash.replace(/^#/, ''));
            const token = params.get('access_token');
            if (!token) {
                status.textContent = 'No sign-in token found in this link.';
                status.className = 'message error';
                return;
            }
            try {
                const res = await fetch('/api/auth/session', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({ access_token: token })
                });
                if (!res.ok) {
                    status.textContent = 'The sign-in link was rejected. Request a new one.';
                    status.className = 'message error';
                    return;
                }
                window.location.replace('/');
            } catch (e) {
                status.textContent = 'Failed to complete sign-in: ' + e.message;
                status.className = 'message error';
            }
        })();
        </script>
    </div>"##;

    Html(base_html("Signing in", content, ""))
}

pub async fn set_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetSessionRequest>,
) -> Response {
    // Only tokens the provider vouches for become cookie sessions.
    let session: Option<Session> = state.auth.get_session(&req.access_token).await;
    if session.is_none() {
        return (StatusCode::UNAUTHORIZED, "Token rejected").into_response();
    }

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE, req.access_token, SESSION_TTL_SECS
    );
    let mut headers = HeaderMap::new();
    match cookie.parse() {
        Ok(value) => {
            headers.insert(SET_COOKIE, value);
        }
        Err(_) => {
            return (StatusCode::BAD_REQUEST, "Malformed token").into_response();
        }
    }

    state.auth.events().notify(AuthStateChange::SignedIn);
    (headers, StatusCode::NO_CONTENT).into_response()
}

// ============================================================================
// Sign Out
// ============================================================================

pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    // Best-effort revocation; the local session ends regardless, and the
    // redirect re-renders and re-gates the page either way.
    if let Some(token) = session_token(&jar) {
        if let Err(e) = state.auth.sign_out(&token).await {
            warn!(error = %e, "provider sign-out failed; clearing session anyway");
        }
    }

    let cookie = format!("{}=; Path=/; HttpOnly; Secure; Max-Age=0", SESSION_COOKIE);
    let mut headers = HeaderMap::new();
    if let Ok(value) = cookie.parse() {
        headers.insert(SET_COOKIE, value);
    }

    state.auth.events().notify(AuthStateChange::SignedOut);
    (headers, Redirect::to("/")).into_response()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_format() {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age={}",
            SESSION_COOKIE, "tok123", SESSION_TTL_SECS
        );
        assert!(cookie.starts_with("topograph_session=tok123;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.parse::<axum::http::HeaderValue>().is_ok());
    }
}
