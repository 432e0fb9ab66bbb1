pub mod builtin;

pub use builtin::BuiltInContext;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Tool name of the built-in trust graph query
pub const TRUST_GRAPH_QUERY: &str = "trust_graph_query";
/// Tool name of the built-in pairwise trust assessment
pub const TRUST_ASSESS: &str = "trust_assess";
/// Tool name of the built-in identity score lookup
pub const IDENTITY_SCORES: &str = "identity_scores";

/// Tools handled inside the engine instead of by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltInTool {
    TrustGraphQuery,
    TrustAssess,
    IdentityScores,
}

impl BuiltInTool {
    pub fn name(&self) -> &'static str {
        match self {
            BuiltInTool::TrustGraphQuery => TRUST_GRAPH_QUERY,
            BuiltInTool::TrustAssess => TRUST_ASSESS,
            BuiltInTool::IdentityScores => IDENTITY_SCORES,
        }
    }

    fn spec(&self) -> ToolSpec {
        let (description, trust_sensitive) = match self {
            BuiltInTool::TrustGraphQuery => (
                r#"Walk the trust graph from an identity. Input: {"root": "did:...", "dimension": "general", "max_depth": 4}"#,
                true,
            ),
            BuiltInTool::TrustAssess => (
                r#"Assess how far the user can trust an identity. Input: {"target": "did:...", "dimension": "general"}"#,
                false,
            ),
            BuiltInTool::IdentityScores => (
                r#"Read the reputation scores of an identity. Input: {"identity": "did:..."}"#,
                false,
            ),
        };
        ToolSpec::new(self.name(), description, trust_sensitive)
    }
}

/// Where a step with a given tool name is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolRoute {
    BuiltIn(BuiltInTool),
    Delegate,
}

/// Catalog entry the reasoner sees for one tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,

    /// Output of this tool names identities that must be trust-checked
    #[serde(default)]
    pub trust_sensitive: bool,
}

impl ToolSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        trust_sensitive: bool,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            trust_sensitive,
        }
    }
}

struct Entry {
    route: ToolRoute,
    spec: ToolSpec,
}

/// Registry of the tools a plan may name.
///
/// Built-ins are registered at construction. Delegate tools are added with
/// `register` and run through the `ToolExecutor`. Names that were never
/// registered still route to the executor, which decides whether it knows
/// them.
pub struct ToolRegistry {
    entries: HashMap<String, Entry>,
    order: Vec<String>,
}

impl ToolRegistry {
    /// Registry holding only the built-in trust tools.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: HashMap::new(),
            order: Vec::new(),
        };
        for tool in [
            BuiltInTool::TrustGraphQuery,
            BuiltInTool::TrustAssess,
            BuiltInTool::IdentityScores,
        ] {
            registry.insert(ToolRoute::BuiltIn(tool), tool.spec());
        }
        registry
    }

    /// Add a delegate tool to the catalog. Built-in names cannot be shadowed.
    pub fn register(&mut self, spec: ToolSpec) -> &mut Self {
        if matches!(self.route(&spec.name), ToolRoute::BuiltIn(_)) {
            debug!("Ignoring delegate registration for built-in '{}'", spec.name);
            return self;
        }
        self.insert(ToolRoute::Delegate, spec);
        self
    }

    fn insert(&mut self, route: ToolRoute, spec: ToolSpec) {
        if !self.entries.contains_key(&spec.name) {
            self.order.push(spec.name.clone());
        }
        self.entries.insert(spec.name.clone(), Entry { route, spec });
    }

    /// Route for a tool name; unknown names go to the executor.
    pub fn route(&self, name: &str) -> ToolRoute {
        self.entries
            .get(name)
            .map(|e| e.route)
            .unwrap_or(ToolRoute::Delegate)
    }

    /// Whether the catalog marks this tool's output as trust-sensitive.
    pub fn is_trust_sensitive(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .is_some_and(|e| e.spec.trust_sensitive)
    }

    /// Catalog in registration order, built-ins first.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name))
            .map(|e| e.spec.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.route(TRUST_GRAPH_QUERY),
            ToolRoute::BuiltIn(BuiltInTool::TrustGraphQuery)
        );
        assert_eq!(
            registry.route(TRUST_ASSESS),
            ToolRoute::BuiltIn(BuiltInTool::TrustAssess)
        );
        assert_eq!(
            registry.route(IDENTITY_SCORES),
            ToolRoute::BuiltIn(BuiltInTool::IdentityScores)
        );
    }

    #[test]
    fn test_unknown_tool_delegates() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.route("web_search"), ToolRoute::Delegate);
        assert!(!registry.is_trust_sensitive("web_search"));
    }

    #[test]
    fn test_register_delegate() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolSpec::new("search_profiles", "Find profiles", true))
            .register(ToolSpec::new("weather", "Forecast", false));

        assert_eq!(registry.route("search_profiles"), ToolRoute::Delegate);
        assert!(registry.is_trust_sensitive("search_profiles"));
        assert!(!registry.is_trust_sensitive("weather"));

        let names: Vec<String> = registry.specs().into_iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                TRUST_GRAPH_QUERY,
                TRUST_ASSESS,
                IDENTITY_SCORES,
                "search_profiles",
                "weather"
            ]
        );
    }

    #[test]
    fn test_builtin_cannot_be_shadowed() {
        let mut registry = ToolRegistry::new();
        registry.register(ToolSpec::new(TRUST_ASSESS, "fake", false));
        assert_eq!(
            registry.route(TRUST_ASSESS),
            ToolRoute::BuiltIn(BuiltInTool::TrustAssess)
        );
        assert_eq!(registry.len(), 3);
    }
}
