//! Auth gating for rendered page fragments.
//!
//! Instead of scanning the document for gating attributes on every pass,
//! gated elements are registered once at startup and consulted at render
//! time. A fragment marked requires-auth is visible iff a session exists;
//! requires-guest is its exact negation.

/// Which session state a gated element needs to be visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRequirement {
    RequiresAuth,
    RequiresGuest,
}

#[derive(Debug, Clone)]
pub struct GatedElement {
    pub id: String,
    pub requirement: GateRequirement,
}

/// Visibility verdict for one registered element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecision {
    pub id: String,
    pub visible: bool,
}

/// Registry of every gated fragment on the site, populated once when the
/// application state is built.
#[derive(Debug, Default)]
pub struct GateRegistry {
    elements: Vec<GatedElement>,
}

/// Visibility rule shared by the registry and ad-hoc call sites.
pub fn is_visible(requirement: GateRequirement, signed_in: bool) -> bool {
    match requirement {
        GateRequirement::RequiresAuth => signed_in,
        GateRequirement::RequiresGuest => !signed_in,
    }
}

/// HTML attribute suffix for a gated element: empty when visible, the
/// `hidden` attribute otherwise.
pub fn gate_attr(requirement: GateRequirement, signed_in: bool) -> &'static str {
    if is_visible(requirement, signed_in) {
        ""
    } else {
        " hidden"
    }
}

impl GateRegistry {
    pub fn new() -> Self {
        GateRegistry::default()
    }

    pub fn register(&mut self, id: &str, requirement: GateRequirement) {
        self.elements.push(GatedElement {
            id: id.to_string(),
            requirement,
        });
    }

    pub fn elements(&self) -> &[GatedElement] {
        &self.elements
    }

    /// Look up one element's gate attribute by id. Unregistered ids render
    /// visible.
    pub fn attr(&self, id: &str, signed_in: bool) -> &'static str {
        self.elements
            .iter()
            .find(|e| e.id == id)
            .map(|e| gate_attr(e.requirement, signed_in))
            .unwrap_or("")
    }

    /// Visibility of every registered element for the given session state.
    pub fn apply(&self, signed_in: bool) -> Vec<GateDecision> {
        self.elements
            .iter()
            .map(|e| GateDecision {
                id: e.id.clone(),
                visible: is_visible(e.requirement, signed_in),
            })
            .collect()
    }
}

/// The fragments this site gates, registered at startup.
pub fn default_registry() -> GateRegistry {
    let mut registry = GateRegistry::new();
    registry.register("export-tools", GateRequirement::RequiresAuth);
    registry.register("signin-cta", GateRequirement::RequiresGuest);
    registry.register("login-form", GateRequirement::RequiresGuest);
    registry.register("login-signed-in", GateRequirement::RequiresAuth);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_negation_holds_in_both_states() {
        for signed_in in [false, true] {
            assert_eq!(
                is_visible(GateRequirement::RequiresAuth, signed_in),
                !is_visible(GateRequirement::RequiresGuest, signed_in)
            );
        }
    }

    #[test]
    fn test_apply_signed_out() {
        let decisions = default_registry().apply(false);
        let export = decisions.iter().find(|d| d.id == "export-tools").unwrap();
        let cta = decisions.iter().find(|d| d.id == "signin-cta").unwrap();
        assert!(!export.visible);
        assert!(cta.visible);
    }

    #[test]
    fn test_apply_signed_in() {
        let decisions = default_registry().apply(true);
        let export = decisions.iter().find(|d| d.id == "export-tools").unwrap();
        let cta = decisions.iter().find(|d| d.id == "signin-cta").unwrap();
        assert!(export.visible);
        assert!(!cta.visible);
    }

    #[test]
    fn test_attr_emits_hidden_only_when_gated_off() {
        let registry = default_registry();
        assert_eq!(registry.attr("export-tools", true), "");
        assert_eq!(registry.attr("export-tools", false), " hidden");
        assert_eq!(registry.attr("signin-cta", false), "");
        assert_eq!(registry.attr("signin-cta", true), " hidden");
        // Unregistered ids are never hidden.
        assert_eq!(registry.attr("unknown", false), "");
    }
}
