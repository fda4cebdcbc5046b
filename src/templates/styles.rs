//! CSS styles for the explorer.
//!
//! Contains the main STYLE constant with all CSS for the web interface.

// ============================================================================
// CSS Styles
// ============================================================================

pub const STYLE: &str = r#"
:root {
    --bg: #ffffff;
    --fg: #111827;
    --muted: #6b7280;
    --border: #e5e7eb;
    --accent: #f3f4f6;
    --link: #0ea5e9;
    --link-hover: #0369a1;
    --error: #b91c1c;
    --topic: #0ea5e9;
    --repo: #111827;
}

* { box-sizing: border-box; margin: 0; padding: 0; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
    line-height: 1.6;
    color: var(--fg);
    background: var(--bg);
}

.container {
    max-width: 1000px;
    margin: 0 auto;
    padding: 1rem;
}

a { color: var(--link); text-decoration: none; }
a:hover { color: var(--link-hover); text-decoration: underline; }

h1, h2 { font-weight: 600; margin-top: 1.5em; margin-bottom: 0.5em; }
h1 { font-size: 1.5rem; }

.nav-bar {
    position: sticky;
    top: 0;
    background: var(--bg);
    border-bottom: 1px solid var(--border);
    padding: 0.5rem 1rem;
    display: flex;
    gap: 1rem;
    align-items: center;
    flex-wrap: wrap;
    z-index: 100;
}
.nav-bar a { font-size: 0.9rem; }
.nav-bar .spacer { flex: 1; }

.btn {
    display: inline-block;
    padding: 0.4rem 0.9rem;
    border: 1px solid var(--border);
    border-radius: 4px;
    background: var(--accent);
    color: var(--fg);
    cursor: pointer;
    font-size: 0.9rem;
    font-family: inherit;
}
.btn:hover { background: var(--border); text-decoration: none; }
.btn-outline { background: var(--bg); border-color: var(--link); color: var(--link); }

.explore-form {
    display: flex;
    gap: 0.5rem;
    align-items: flex-end;
    flex-wrap: wrap;
    margin-bottom: 0.75rem;
}
.explore-form label {
    display: flex;
    flex-direction: column;
    font-size: 0.8rem;
    color: var(--muted);
    gap: 0.2rem;
}
.explore-form input {
    padding: 0.4rem 0.6rem;
    border: 1px solid var(--border);
    border-radius: 4px;
    background: var(--bg);
    color: var(--fg);
    font-size: 0.9rem;
    width: 160px;
}
.explore-form input:focus { outline: none; border-color: var(--link); }

.status-line {
    min-height: 1.4rem;
    font-size: 0.85rem;
    margin-bottom: 0.5rem;
    color: var(--fg);
}
.status-line.error { color: var(--error); }

.graph-stats {
    display: flex;
    gap: 1.5rem;
    font-size: 0.85rem;
    color: var(--muted);
    margin-bottom: 0.5rem;
}

.graph-container {
    position: relative;
    border: 1px solid var(--border);
    border-radius: 4px;
    background: var(--accent);
    height: calc(100vh - 300px);
    min-height: 420px;
}
.graph-container svg { width: 100%; height: 100%; display: block; }

.gated-note {
    font-size: 0.85rem;
    color: var(--muted);
    padding: 0.5rem 0.75rem;
    border: 1px solid var(--border);
    border-radius: 4px;
    margin: 0.75rem 0;
    background: var(--accent);
}

.user-menu { position: relative; display: inline-block; }
.user-button {
    display: flex;
    align-items: center;
    gap: 0.3rem;
    background: none;
    border: none;
    cursor: pointer;
    font-family: inherit;
    color: var(--fg);
}
.user-avatar {
    width: 28px;
    height: 28px;
    border-radius: 6px;
    display: block;
}
.user-button .chev { font-size: 0.7rem; color: var(--muted); }
.user-dropdown {
    position: absolute;
    right: 0;
    top: calc(100% + 6px);
    background: var(--bg);
    border: 1px solid var(--border);
    border-radius: 6px;
    box-shadow: 0 4px 16px rgba(0,0,0,0.12);
    min-width: 140px;
    z-index: 200;
}
.dropdown-item {
    display: block;
    width: 100%;
    text-align: left;
    padding: 0.5rem 0.75rem;
    background: none;
    border: none;
    cursor: pointer;
    font-size: 0.85rem;
    font-family: inherit;
    color: var(--fg);
}
.dropdown-item:hover { background: var(--accent); text-decoration: none; }

.login-card {
    max-width: 420px;
    margin: 3rem auto;
    border: 1px solid var(--border);
    border-radius: 8px;
    padding: 1.5rem;
}
.login-card input {
    width: 100%;
    padding: 0.5rem 0.75rem;
    border: 1px solid var(--border);
    border-radius: 4px;
    font-size: 0.95rem;
    margin: 0.5rem 0 1rem;
}
.login-card .message { font-size: 0.85rem; margin-top: 0.75rem; }
.login-card .message.error { color: var(--error); }
"#;
