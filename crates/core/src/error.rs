//! Error types for the planloop domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator of the loop (planner, tools, memory) has its own error
//! enum; [`Error`] is what a run surfaces to its caller.

use thiserror::Error;

use crate::run::RunState;

/// The top-level error type. Every variant ends a run in the FAILED state.
/// Memory failures are logged by the loop and never surface here.
#[derive(Debug, Error)]
pub enum Error {
    // --- Planner errors ---
    #[error("Planner error: {0}")]
    Planner(#[from] PlannerError),

    // --- Action resolution ---
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    // --- Deadline ---
    #[error("Run deadline of {timeout_secs}s exceeded while {stage}")]
    DeadlineExceeded { stage: RunState, timeout_secs: u64 },

    // --- Run input ---
    #[error("Invalid run input: {0}")]
    InvalidInput(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Collaborator errors ---

#[derive(Debug, Clone, Error)]
pub enum PlannerError {
    #[error("planner returned neither actions nor a finish signal")]
    EmptyPlan,

    #[error("could not parse planner output: {0}")]
    UnparseableOutput(String),

    #[error("completion request failed: {0}")]
    Completion(String),

    #[error("scripted planner exhausted after {calls} call(s)")]
    ScriptExhausted { calls: usize },

    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Invalid tool input: {0}")]
    InvalidInput(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Permission denied: {tool_name}: {reason}")]
    PermissionDenied { tool_name: String, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),
}
