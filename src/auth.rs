//! Auth provider integration and session handling.
//!
//! Authentication is entirely delegated to a GoTrue-compatible provider
//! (magic links, token persistence, refresh). This module only: reads the
//! current session by verifying the cookie token against the provider,
//! requests magic links, performs best-effort sign-out, and publishes
//! auth-state transitions on an event stream. A provider that is not
//! configured or not reachable degrades to "no session" with a logged
//! warning; it never surfaces as a page error.

use crate::models::{AuthStateChange, AuthUser, Session};
use crate::url_guard::validate_outbound_url;
use axum_extra::extract::CookieJar;
use std::env;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::warn;
use url::Url;

/// Session cookie name; the value is the provider's opaque access token.
pub const SESSION_COOKIE: &str = "topograph_session";

/// Where magic links land, relative to the page that requested them.
pub const LANDING_PATH: &str = "auth/callback";

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub base_url: String,
    pub anon_key: String,
    /// Host extracted from `base_url`, for the outbound allowlist.
    pub host: String,
}

impl AuthConfig {
    /// Read AUTH_URL / AUTH_ANON_KEY. Returns None when either is missing
    /// or the URL fails the outbound guard, which disables auth entirely.
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("AUTH_URL").ok()?;
        let anon_key = env::var("AUTH_ANON_KEY").ok()?;
        let parsed = Url::parse(&base_url).ok()?;
        let host = parsed.host_str()?.to_string();
        if validate_outbound_url(&base_url, &[host.as_str()]).is_err() {
            warn!(url = %base_url, "AUTH_URL rejected by outbound guard; auth disabled");
            return None;
        }
        Some(AuthConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            host,
        })
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone)]
pub enum AuthError {
    /// Provider not configured (AUTH_URL / AUTH_ANON_KEY unset)
    NotConfigured,
    /// Network failure talking to the provider
    Http(String),
    /// Non-success provider status; body carried as detail
    Api { status: u16, body: String },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::NotConfigured => write!(f, "Auth provider not configured"),
            AuthError::Http(msg) => write!(f, "Auth request failed: {}", msg),
            AuthError::Api { status, body } => write!(f, "Auth provider {}: {}", status, body),
        }
    }
}

impl std::error::Error for AuthError {}

// ============================================================================
// Provider Client
// ============================================================================

pub struct AuthClient {
    config: Option<AuthConfig>,
    http: reqwest::Client,
    events: AuthEvents,
}

impl AuthClient {
    pub fn new(config: Option<AuthConfig>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(AuthClient {
            config,
            http,
            events: AuthEvents::new(),
        })
    }

    pub fn from_env() -> Result<Self, reqwest::Error> {
        let config = AuthConfig::from_env();
        if config.is_none() {
            warn!("auth provider not configured; sessions disabled");
        }
        AuthClient::new(config)
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub fn events(&self) -> &AuthEvents {
        &self.events
    }

    /// Ask the provider who the token belongs to. Any failure -- missing
    /// configuration, network error, rejected token -- reads as "no
    /// session"; the expired/invalid case is logged at debug, the
    /// collaborator-unavailable cases at warn.
    pub async fn get_session(&self, access_token: &str) -> Option<Session> {
        let config = match self.config {
            Some(ref c) => c,
            None => {
                warn!("session lookup with auth provider unavailable");
                return None;
            }
        };

        let url = format!("{}/auth/v1/user", config.base_url);
        let response = match self
            .http
            .get(&url)
            .header("apikey", &config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "auth provider unreachable; treating as signed out");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "token rejected by provider");
            return None;
        }

        let user: AuthUser = match response.json().await {
            Ok(u) => u,
            Err(e) => {
                warn!(error = %e, "unparseable user payload from provider");
                return None;
            }
        };

        Some(Session {
            access_token: access_token.to_string(),
            user,
        })
    }

    /// Request a magic link for `email`, returning the user to
    /// `redirect_to` once they click it.
    pub async fn sign_in_with_otp(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        let config = self.config.as_ref().ok_or(AuthError::NotConfigured)?;

        let url = format!(
            "{}/auth/v1/otp?redirect_to={}",
            config.base_url,
            urlencoding::encode(redirect_to)
        );
        let response = self
            .http
            .post(&url)
            .header("apikey", &config.anon_key)
            .json(&serde_json::json!({ "email": email, "create_user": true }))
            .send()
            .await
            .map_err(|e| AuthError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Revoke the token with the provider. Callers treat this as
    /// best-effort: the local session cookie is cleared either way.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let config = self.config.as_ref().ok_or(AuthError::NotConfigured)?;

        let url = format!("{}/auth/v1/logout", config.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Auth State Change Events
// ============================================================================

/// Broadcast stream of auth transitions. Handlers publish on sign-in and
/// sign-out completion; token refresh may be published but never changes
/// visible state.
#[derive(Debug, Clone)]
pub struct AuthEvents {
    tx: broadcast::Sender<AuthStateChange>,
}

impl AuthEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        AuthEvents { tx }
    }

    /// Publish a transition. Silently a no-op with no live subscribers.
    pub fn notify(&self, change: AuthStateChange) {
        let _ = self.tx.send(change);
    }

    /// Register an observer. Dropping the handle (or calling
    /// `unsubscribe`) removes the registration.
    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for AuthEvents {
    fn default() -> Self {
        AuthEvents::new()
    }
}

pub struct AuthSubscription {
    rx: broadcast::Receiver<AuthStateChange>,
}

impl AuthSubscription {
    /// Next transition, or None once the publishing side is gone. Lagged
    /// receivers skip to the oldest retained event rather than erroring.
    pub async fn next(&mut self) -> Option<AuthStateChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Explicit teardown; equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

// ============================================================================
// Cookie Session
// ============================================================================

/// How long the session cookie lives. The provider's token typically
/// expires sooner; an expired token just reads as signed out on the next
/// render.
pub const SESSION_TTL_SECS: i64 = 3600;

/// The provider token from the request's cookie jar, if any.
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// Session truth for one render pass: cookie token verified against the
/// provider. Called per request; nothing is cached between renders.
pub async fn current_session(client: &AuthClient, jar: &CookieJar) -> Option<Session> {
    let token = session_token(jar)?;
    client.get_session(&token).await
}

// ============================================================================
// Redirect and Avatar Helpers
// ============================================================================

/// Compute where a magic link should return to: the requesting page's URL
/// with the final path segment stripped and the fixed landing path
/// appended. Works under subpath deployments.
pub fn compute_redirect_to(page_url: &str) -> Option<String> {
    let mut url = Url::parse(page_url).ok()?;
    let path = url.path();
    let base = match path.rfind('/') {
        Some(i) => format!("{}{}", &path[..i + 1], LANDING_PATH),
        None => format!("/{}", LANDING_PATH),
    };
    url.set_path(&base);
    url.set_query(None);
    url.set_fragment(None);
    Some(url.to_string())
}

/// Fallback avatar: a rounded square with the first letter of `text`,
/// as an inline SVG data URI.
pub fn initials_avatar_data(text: &str) -> String {
    let ch = text
        .trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "?".to_string());
    let svg = format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='64' height='64'>\
         <rect width='100%' height='100%' rx='8' ry='8' fill='#111'/>\
         <text x='50%' y='54%' dominant-baseline='middle' text-anchor='middle' \
         font-family='sans-serif' font-size='32' fill='#fff'>{}</text></svg>",
        ch
    );
    format!("data:image/svg+xml;utf8,{}", urlencoding::encode(&svg))
}

/// Avatar for the user menu: provider metadata first, generated initial
/// otherwise.
pub fn avatar_url(session: &Session) -> String {
    let meta = &session.user.user_metadata;
    if let Some(ref avatar) = meta.avatar_url {
        return avatar.clone();
    }
    if let Some(ref picture) = meta.picture {
        return picture.clone();
    }
    initials_avatar_data(session.user.email.as_deref().unwrap_or("?"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserMetadata;

    fn session_with(email: Option<&str>, avatar: Option<&str>, picture: Option<&str>) -> Session {
        Session {
            access_token: "tok".to_string(),
            user: AuthUser {
                email: email.map(|s| s.to_string()),
                user_metadata: UserMetadata {
                    avatar_url: avatar.map(|s| s.to_string()),
                    picture: picture.map(|s| s.to_string()),
                    name: None,
                },
            },
        }
    }

    #[test]
    fn test_compute_redirect_strips_final_segment() {
        assert_eq!(
            compute_redirect_to("https://example.com/site/login").as_deref(),
            Some("https://example.com/site/auth/callback")
        );
        assert_eq!(
            compute_redirect_to("https://example.com/login?next=1#frag").as_deref(),
            Some("https://example.com/auth/callback")
        );
    }

    #[test]
    fn test_compute_redirect_at_root() {
        assert_eq!(
            compute_redirect_to("https://example.com/").as_deref(),
            Some("https://example.com/auth/callback")
        );
    }

    #[test]
    fn test_avatar_prefers_provider_metadata() {
        let s = session_with(Some("a@b.c"), Some("https://cdn/img.png"), None);
        assert_eq!(avatar_url(&s), "https://cdn/img.png");

        let s = session_with(Some("a@b.c"), None, Some("https://cdn/pic.png"));
        assert_eq!(avatar_url(&s), "https://cdn/pic.png");
    }

    #[test]
    fn test_avatar_falls_back_to_initial() {
        let s = session_with(Some("maria@example.com"), None, None);
        let data = avatar_url(&s);
        assert!(data.starts_with("data:image/svg+xml;utf8,"));
        assert!(data.contains("%3EM%3C"));
    }

    #[test]
    fn test_avatar_handles_missing_email() {
        let s = session_with(None, None, None);
        assert!(avatar_url(&s).starts_with("data:image/svg+xml;utf8,"));
    }

    #[test]
    fn test_display_name_order() {
        let s = session_with(Some("a@b.c"), None, None);
        assert_eq!(s.display_name(), "a@b.c");

        let mut s = session_with(None, None, None);
        s.user.user_metadata.name = Some("Maria".to_string());
        assert_eq!(s.display_name(), "Maria");

        let s = session_with(None, None, None);
        assert_eq!(s.display_name(), "Signed in");
    }

    #[tokio::test]
    async fn test_events_reach_subscribers() {
        let events = AuthEvents::new();
        let mut sub = events.subscribe();

        events.notify(AuthStateChange::SignedIn);
        events.notify(AuthStateChange::SignedOut);

        assert_eq!(sub.next().await, Some(AuthStateChange::SignedIn));
        assert_eq!(sub.next().await, Some(AuthStateChange::SignedOut));
    }

    #[tokio::test]
    async fn test_notify_without_subscribers_is_noop() {
        let events = AuthEvents::new();
        events.notify(AuthStateChange::TokenRefreshed);

        // A later subscriber only sees what is published after it joins.
        let mut sub = events.subscribe();
        events.notify(AuthStateChange::SignedIn);
        assert_eq!(sub.next().await, Some(AuthStateChange::SignedIn));
    }
}
