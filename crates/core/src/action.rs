//! Action, Step and Plan: the values that flow around the loop.
//!
//! Planner proposes → Loop resolves the Action → Tool produces an
//! observation → Loop seals both into a Step and appends it to history.

use serde::{Deserialize, Serialize};

/// A proposed tool invocation, produced by the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Name of the tool to invoke
    pub tool: String,

    /// Raw input handed to the tool
    pub tool_input: String,

    /// Human-readable rationale
    #[serde(default)]
    pub log: String,
}

impl Action {
    pub fn new(
        tool: impl Into<String>,
        tool_input: impl Into<String>,
        log: impl Into<String>,
    ) -> Self {
        Self {
            tool: tool.into(),
            tool_input: tool_input.into(),
            log: log.into(),
        }
    }
}

/// One completed plan → act → observe cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub action: Action,
    pub observation: String,
}

/// The planner's declaration that the task is complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishSignal {
    /// The final answer
    pub log: String,
}

impl FinishSignal {
    pub fn new(log: impl Into<String>) -> Self {
        Self { log: log.into() }
    }
}

/// A single planning response: either actions to take, or a finish.
///
/// `Act` with an empty list is representable (a planner can get it wrong)
/// and is rejected by the loop as an unrecoverable planner error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Act(Vec<Action>),
    Finish(FinishSignal),
}

impl Plan {
    /// A plan with exactly one action.
    pub fn act(tool: impl Into<String>, tool_input: impl Into<String>) -> Self {
        Plan::Act(vec![Action::new(tool, tool_input, "")])
    }

    pub fn finish(log: impl Into<String>) -> Self {
        Plan::Finish(FinishSignal::new(log))
    }

    pub fn is_finish(&self) -> bool {
        matches!(self, Plan::Finish(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_helpers() {
        let plan = Plan::act("calculator", "3+5");
        match &plan {
            Plan::Act(actions) => {
                assert_eq!(actions.len(), 1);
                assert_eq!(actions[0].tool, "calculator");
                assert_eq!(actions[0].tool_input, "3+5");
            }
            Plan::Finish(_) => panic!("Expected Act"),
        }
        assert!(!plan.is_finish());
        assert!(Plan::finish("16").is_finish());
    }

    #[test]
    fn plan_serializes_with_tag() {
        let json = serde_json::to_string(&Plan::finish("done")).unwrap();
        assert!(json.contains("finish"));
        assert!(json.contains("done"));
    }

    #[test]
    fn action_log_defaults_to_empty() {
        let action: Action =
            serde_json::from_str(r#"{"tool":"calculator","tool_input":"1+1"}"#).unwrap();
        assert!(action.log.is_empty());
    }
}
