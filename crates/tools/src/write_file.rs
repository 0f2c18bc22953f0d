//! Write file tool: write text to a file inside the workspace.
//!
//! Input is a JSON object: `{"file_path": "notes/summary.txt", "content": "..."}`.
//! Paths are relative to the workspace root; absolute paths and `..`
//! components are refused.

use async_trait::async_trait;
use planloop_core::error::ToolError;
use planloop_core::run::RunContext;
use planloop_core::tool::Tool;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

const TOOL_NAME: &str = "write_file";

#[derive(Debug, Deserialize)]
struct WriteFileArgs {
    file_path: String,
    content: String,
}

pub struct WriteFileTool {
    /// Every write lands under this directory.
    root: PathBuf,
}

impl WriteFileTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a relative path onto the workspace root, refusing escapes.
    fn resolve(&self, relative: &str) -> Result<PathBuf, ToolError> {
        let path = Path::new(relative);
        if relative.trim().is_empty() {
            return Err(ToolError::InvalidInput("file_path is empty".into()));
        }
        let escapes = path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(ToolError::PermissionDenied {
                tool_name: TOOL_NAME.into(),
                reason: format!("{relative} is outside the workspace"),
            });
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Write content to a file in the workspace. Input is JSON: \
         {\"file_path\": \"relative/path.txt\", \"content\": \"text\"}. \
         Overwrites existing files."
    }

    async fn call(&self, _ctx: &RunContext, input: &str) -> Result<String, ToolError> {
        let args: WriteFileArgs = serde_json::from_str(input.trim())
            .map_err(|e| ToolError::InvalidInput(format!("expected {{file_path, content}}: {e}")))?;

        let target = self.resolve(&args.file_path)?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::ExecutionFailed {
                    tool_name: TOOL_NAME.into(),
                    reason: format!("failed to create {}: {e}", parent.display()),
                })?;
        }

        tokio::fs::write(&target, &args.content)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: TOOL_NAME.into(),
                reason: format!("failed to write {}: {e}", target.display()),
            })?;

        debug!(path = %target.display(), bytes = args.content.len(), "write_file wrote content");
        Ok(format!("Content successfully written to {}.", args.file_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ctx() -> RunContext {
        RunContext::new(Duration::from_secs(5))
    }

    fn input(path: &str, content: &str) -> String {
        serde_json::json!({ "file_path": path, "content": content }).to_string()
    }

    #[tokio::test]
    async fn write_and_verify() {
        let dir = tempfile::tempdir().unwrap();
        let tool = WriteFileTool::new(dir.path());

        let out = tool
            .call(&ctx(), &input("summary.txt", "Hello from test!"))
            .await
            .unwrap();
        assert_eq!(out, "Content successfully written to summary.txt.");

        let content = std::fs::read_to_string(dir.path().join("summary.txt")).unwrap();
        assert_eq!(content, "Hello from test!");
    }

    #[tokio::test]
    async fn write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let tool = WriteFileTool::new(dir.path());

        tool.call(&ctx(), &input("nested/dir/file.txt", "nested content"))
            .await
            .unwrap();

        let content = std::fs::read_to_string(dir.path().join("nested/dir/file.txt")).unwrap();
        assert_eq!(content, "nested content");
    }

    #[tokio::test]
    async fn overwrite_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("overwrite.txt"), "old content").unwrap();
        let tool = WriteFileTool::new(dir.path());

        tool.call(&ctx(), &input("overwrite.txt", "new content"))
            .await
            .unwrap();

        let content = std::fs::read_to_string(dir.path().join("overwrite.txt")).unwrap();
        assert_eq!(content, "new content");
    }

    #[tokio::test]
    async fn malformed_input_rejected() {
        let tool = WriteFileTool::new("/tmp");
        let err = tool.call(&ctx(), "just some text").await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));

        let err = tool
            .call(&ctx(), r#"{"file_path": "a.txt"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn path_traversal_blocked() {
        let dir = tempfile::tempdir().unwrap();
        let tool = WriteFileTool::new(dir.path());
        let err = tool
            .call(&ctx(), &input("../../../etc/crontab", "malicious"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn absolute_path_blocked() {
        let dir = tempfile::tempdir().unwrap();
        let tool = WriteFileTool::new(dir.path());
        let err = tool
            .call(&ctx(), &input("/etc/shadow", "malicious"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::PermissionDenied { .. }));
    }
}
