//! Tool registry — central index of all registered tools.
//!
//! The [`ToolRegistry`] maps tool names to their [`Tool`] implementations.
//! The runtime registers tools at startup and queries the registry to
//! resolve tool calls and to generate the model's tool schema. Unknown
//! names resolve to `None` and are handled as a first-class missing-executor
//! case, never an error path.

use std::collections::HashMap;
use std::sync::Arc;

use kiln_core::tools::ToolDefinition;
use tracing::debug;

use crate::traits::Tool;

/// Central registry mapping tool names to their implementations.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Overwrites any existing tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        debug!(tool_name = tool.name(), "tool registered");
        let _ = self.tools.insert(tool.name().to_owned(), tool);
    }

    /// Look up a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Return all tool schemas for the model.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Return all tool names, sorted alphabetically.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Whether a tool with the given name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Remove a tool by name, returning it if it existed.
    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.remove(name)
    }

    /// A registry restricted to the named subset.
    ///
    /// Names not present in this registry are silently skipped; `None`
    /// returns a full copy (no restriction configured).
    #[must_use]
    pub fn subset(&self, active: Option<&[String]>) -> Self {
        let tools = match active {
            Some(names) => names
                .iter()
                .filter_map(|n| self.tools.get(n).map(|t| (n.clone(), t.clone())))
                .collect(),
            None => self.tools.clone(),
        };
        Self { tools }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::errors::ToolError;
    use crate::traits::ToolContext;

    /// Minimal stub tool for registry tests.
    struct StubTool {
        tool_name: String,
    }

    impl StubTool {
        fn new(name: &str) -> Self {
            Self {
                tool_name: name.into(),
            }
        }
    }

    #[async_trait]
    impl Tool for StubTool {
        fn name(&self) -> &str {
            &self.tool_name
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new(&self.tool_name, format!("Stub {}", self.tool_name))
        }

        fn display(&self, _input: &Value) -> String {
            self.tool_name.clone()
        }

        async fn execute(
            &self,
            _input: Value,
            _ctx: &ToolContext,
        ) -> Result<Option<Value>, ToolError> {
            Ok(Some(Value::String("ok".into())))
        }
    }

    #[test]
    fn new_creates_empty_registry() {
        let reg = ToolRegistry::new();
        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn register_and_get() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(StubTool::new("read")));
        let tool = reg.get("read");
        assert!(tool.is_some());
        assert_eq!(tool.unwrap().name(), "read");
    }

    #[test]
    fn get_unknown_returns_none() {
        let reg = ToolRegistry::new();
        assert!(reg.get("nonexistent").is_none());
    }

    #[test]
    fn register_duplicate_overwrites() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(StubTool::new("read")));
        reg.register(Arc::new(StubTool::new("read")));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn definitions_returns_schemas() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(StubTool::new("read")));
        reg.register(Arc::new(StubTool::new("write")));
        let defs = reg.definitions();
        assert_eq!(defs.len(), 2);
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert!(names.contains(&"read"));
        assert!(names.contains(&"write"));
    }

    #[test]
    fn names_returns_sorted() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(StubTool::new("write")));
        reg.register(Arc::new(StubTool::new("bash")));
        reg.register(Arc::new(StubTool::new("read")));
        assert_eq!(reg.names(), vec!["bash", "read", "write"]);
    }

    #[test]
    fn remove_existing_returns_some() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(StubTool::new("read")));
        let removed = reg.remove("read");
        assert!(removed.is_some());
        assert!(reg.is_empty());
    }

    #[test]
    fn contains_true_and_false() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(StubTool::new("read")));
        assert!(reg.contains("read"));
        assert!(!reg.contains("write"));
    }

    #[test]
    fn subset_restricts_to_named_tools() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(StubTool::new("read")));
        reg.register(Arc::new(StubTool::new("write")));
        reg.register(Arc::new(StubTool::new("bash")));

        let active = vec!["read".to_owned(), "bash".to_owned()];
        let sub = reg.subset(Some(&active));
        assert_eq!(sub.names(), vec!["bash", "read"]);
        assert!(!sub.contains("write"));
    }

    #[test]
    fn subset_skips_unknown_names() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(StubTool::new("read")));
        let active = vec!["read".to_owned(), "ghost".to_owned()];
        let sub = reg.subset(Some(&active));
        assert_eq!(sub.len(), 1);
    }

    #[test]
    fn subset_none_is_full_copy() {
        let mut reg = ToolRegistry::new();
        reg.register(Arc::new(StubTool::new("read")));
        reg.register(Arc::new(StubTool::new("write")));
        let sub = reg.subset(None);
        assert_eq!(sub.len(), 2);
    }
}
