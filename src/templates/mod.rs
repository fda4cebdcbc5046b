//! HTML templates and styling for the explorer.
//!
//! - `styles` - CSS constants and theme definitions
//! - `components` - Shared HTML components (nav bar, auth area, base template)
//! - `explorer_js` - Generated D3 force-graph script

mod components;
mod explorer_js;
mod styles;

pub use components::{auth_area, base_html, nav_bar};
pub use explorer_js::{render_explorer_js, ExplorerJsConfig};
pub use styles::STYLE;

/// Minimal HTML escaping for interpolated text content and attributes.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
        assert_eq!(html_escape("plain"), "plain");
    }
}
