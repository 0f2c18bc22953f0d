//! Tool trait: the abstraction over agent capabilities.
//!
//! Tools are opaque callables identified by name. The loop hands each one
//! the raw `tool_input` string from the planner's action and feeds whatever
//! comes back (output or error) to the planner as an observation.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::error::ToolError;
use crate::run::RunContext;

/// The core Tool trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "calculator", "write_file").
    fn name(&self) -> &str;

    /// A description of what this tool does (shown to the planner).
    fn description(&self) -> &str;

    /// Execute the tool. Must not outlive `ctx.deadline`; the loop enforces it
    /// regardless.
    async fn call(&self, ctx: &RunContext, input: &str) -> std::result::Result<String, ToolError>;
}

/// A registry of available tools.
///
/// Re-registering a name replaces the earlier tool (last write wins).
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool under its own name, returning any tool it replaced.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Option<Arc<dyn Tool>> {
        let name = tool.name().to_string();
        let replaced = self.tools.insert(name.clone(), tool);
        if replaced.is_some() {
            warn!(tool = %name, "Tool re-registered, replacing previous implementation");
        }
        replaced
    }

    /// Look up a tool by name.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// All registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// `(name, description)` pairs sorted by name, for planner prompts.
    pub fn descriptions(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = self
            .tools
            .values()
            .map(|t| (t.name(), t.description()))
            .collect();
        out.sort_unstable_by(|a, b| a.0.cmp(b.0));
        out
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
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
    use std::time::Duration;

    /// A simple test tool for unit tests.
    struct EchoTool {
        prefix: &'static str,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        async fn call(&self, _ctx: &RunContext, input: &str) -> Result<String, ToolError> {
            Ok(format!("{}{}", self.prefix, input))
        }
    }

    #[test]
    fn registry_register_and_resolve() {
        let mut registry = ToolRegistry::new();
        assert!(registry.register(Arc::new(EchoTool { prefix: "" })).is_none());
        assert!(registry.resolve("echo").is_some());
        assert!(registry.resolve("nonexistent").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn reregistering_is_last_write_wins() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool { prefix: "first:" }));
        let replaced = registry.register(Arc::new(EchoTool { prefix: "second:" }));
        assert!(replaced.is_some());
        assert_eq!(registry.len(), 1);

        let ctx = RunContext::new(Duration::from_secs(5));
        let tool = registry.resolve("echo").unwrap();
        assert_eq!(tool.call(&ctx, "hi").await.unwrap(), "second:hi");
    }

    #[test]
    fn descriptions_sorted_by_name() {
        struct Named(&'static str);

        #[async_trait]
        impl Tool for Named {
            fn name(&self) -> &str {
                self.0
            }
            fn description(&self) -> &str {
                "test"
            }
            async fn call(&self, _ctx: &RunContext, _input: &str) -> Result<String, ToolError> {
                Ok(String::new())
            }
        }

        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Named("zeta")));
        registry.register(Arc::new(Named("alpha")));
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
        assert_eq!(registry.descriptions()[0].0, "alpha");
    }
}
