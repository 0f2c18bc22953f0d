//! Built-in tool implementations for planloop.
//!
//! Each tool takes the planner's raw `tool_input` string. `calculator` does
//! arithmetic; `write_file` writes text into the configured workspace;
//! `get_page` fetches a web page and returns its text (opt-in).

pub mod calculator;
pub mod get_page;
pub mod write_file;

use std::sync::Arc;

use planloop_config::ToolsConfig;
use planloop_core::tool::ToolRegistry;
use tracing::debug;

pub use calculator::CalculatorTool;
pub use get_page::GetPageTool;
pub use write_file::WriteFileTool;

/// Create a tool registry holding the tools enabled in `config`.
///
/// Names outside the built-in set are skipped; config validation rejects
/// them before this point.
pub fn default_registry(config: &ToolsConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for name in &config.enabled {
        match name.as_str() {
            "calculator" => {
                registry.register(Arc::new(CalculatorTool));
            }
            "write_file" => {
                registry.register(Arc::new(WriteFileTool::new(&config.workspace_dir)));
            }
            "get_page" => {
                registry.register(Arc::new(GetPageTool::new()));
            }
            other => debug!(tool = %other, "Skipping unknown built-in tool"),
        }
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_registers_all_builtins() {
        let registry = default_registry(&ToolsConfig::default());
        assert_eq!(registry.names(), vec!["calculator", "write_file"]);
    }

    #[test]
    fn only_enabled_tools_registered() {
        let config = ToolsConfig {
            enabled: vec!["calculator".into()],
            ..ToolsConfig::default()
        };
        let registry = default_registry(&config);
        assert!(registry.resolve("calculator").is_some());
        assert!(registry.resolve("write_file").is_none());
    }

    #[test]
    fn get_page_is_opt_in() {
        assert!(default_registry(&ToolsConfig::default()).resolve("get_page").is_none());

        let config = ToolsConfig {
            enabled: vec!["get_page".into(), "calculator".into()],
            ..ToolsConfig::default()
        };
        let registry = default_registry(&config);
        assert_eq!(registry.names(), vec!["calculator", "get_page"]);
    }
}
