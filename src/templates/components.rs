//! Shared HTML components for the explorer.
//!
//! Contains the navigation bar, the session-dependent auth area, and the
//! base HTML template.

use crate::auth::avatar_url;
use crate::models::Session;

use super::html_escape;
use super::styles::STYLE;

// ============================================================================
// Auth Area
// ============================================================================

/// The navbar fragment that reflects sign-in state: a sign-in affordance
/// when no session exists, a user menu with a sign-out dropdown otherwise.
/// Rendered fresh on every page; never cached. `configured` is the
/// provider client's validated state, so the navbar and the login page
/// always agree on whether sign-in exists at all.
pub fn auth_area(session: Option<&Session>, configured: bool) -> String {
    if !configured {
        return String::new();
    }

    let session = match session {
        Some(s) => s,
        None => {
            return r#"<a class="btn btn-outline" href="/login">Sign in</a>"#.to_string();
        }
    };

    let avatar = avatar_url(session);
    format!(
        r#"<div class="user-menu">
            <button class="user-button" id="user-button" aria-haspopup="true" aria-expanded="false" title="{name}">
                <img class="user-avatar" src="{avatar}" alt="User avatar" />
                <span class="chev" aria-hidden="true">&#9662;</span>
            </button>
            <div class="user-dropdown" id="user-dropdown" role="menu" hidden>
                <a class="dropdown-item" href="/logout" role="menuitem">Sign out</a>
            </div>
        </div>"#,
        name = html_escape(session.display_name()),
        avatar = html_escape(&avatar),
    )
}

// ============================================================================
// Navigation Bar
// ============================================================================

pub fn nav_bar(auth_area_html: &str) -> String {
    format!(
        r#"<nav class="nav-bar">
            <a href="/"><strong>topograph</strong></a>
            <a href="/">Explore</a>
            <span class="spacer"></span>
            {}
        </nav>"#,
        auth_area_html
    )
}

// ============================================================================
// Base HTML Template
// ============================================================================

pub fn base_html(title: &str, content: &str, auth_area_html: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    {nav}
    <div class="container">
        {content}
    </div>
    <script>
    // User menu dropdown toggle, closed on outside click.
    (function() {{
        const btn = document.getElementById('user-button');
        const dd = document.getElementById('user-dropdown');
        if (!btn || !dd) return;
        btn.addEventListener('click', (e) => {{
            e.preventDefault();
            const isHidden = dd.hasAttribute('hidden');
            if (isHidden) {{
                dd.removeAttribute('hidden');
                btn.setAttribute('aria-expanded', 'true');
            }} else {{
                dd.setAttribute('hidden', '');
                btn.setAttribute('aria-expanded', 'false');
            }}
        }});
        document.addEventListener('click', (e) => {{
            if (dd.hasAttribute('hidden')) return;
            const within = e.target === btn || btn.contains(e.target) || dd.contains(e.target);
            if (!within) {{
                dd.setAttribute('hidden', '');
                btn.setAttribute('aria-expanded', 'false');
            }}
        }});
    }})();
    </script>
</body>
</html>"#,
        title = html_escape(title),
        STYLE = STYLE,
        nav = nav_bar(auth_area_html),
        content = content,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthUser, UserMetadata};

    fn signed_in_session() -> Session {
        Session {
            access_token: "tok".to_string(),
            user: AuthUser {
                email: Some("maria@example.com".to_string()),
                user_metadata: UserMetadata::default(),
            },
        }
    }

    #[test]
    fn test_auth_area_empty_when_not_configured() {
        assert_eq!(auth_area(None, false), "");
        let session = signed_in_session();
        assert_eq!(auth_area(Some(&session), false), "");
    }

    #[test]
    fn test_auth_area_signed_out_shows_sign_in() {
        let html = auth_area(None, true);
        assert!(html.contains("Sign in"));
        assert!(!html.contains("user-menu"));
    }

    #[test]
    fn test_auth_area_signed_in_shows_user_menu() {
        let session = signed_in_session();
        let html = auth_area(Some(&session), true);
        assert!(html.contains("user-menu"));
        assert!(html.contains("maria@example.com"));
        assert!(html.contains("/logout"));
        assert!(!html.contains(">Sign in<"));
    }
}
