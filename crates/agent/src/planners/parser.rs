//! Parser for ReAct-style completions.
//!
//! A completion either ends the task:
//!
//! ```text
//! Thought: I now know the final answer
//! Final Answer: 16
//! ```
//!
//! or names exactly one tool call:
//!
//! ```text
//! Thought: I should add the numbers first
//! Action: calculator
//! Action Input: 3+5
//! ```

use planloop_core::action::{Action, Plan};
use planloop_core::error::PlannerError;

pub const FINAL_ANSWER: &str = "Final Answer:";
pub const ACTION: &str = "Action:";
pub const ACTION_INPUT: &str = "Action Input:";
pub const OBSERVATION: &str = "Observation:";

/// Turn raw completion text into a [`Plan`].
///
/// A final answer wins over an action when both appear. The action's `log`
/// keeps the completion text up to the end of the action input so the
/// scratchpad can replay the model's own reasoning.
pub fn parse_react_output(output: &str) -> Result<Plan, PlannerError> {
    if let Some(idx) = output.find(FINAL_ANSWER) {
        let answer = output[idx + FINAL_ANSWER.len()..].trim();
        return Ok(Plan::finish(answer));
    }

    let Some(action_idx) = output.rfind(ACTION) else {
        return Err(PlannerError::UnparseableOutput(snippet(output)));
    };
    let after_action = &output[action_idx + ACTION.len()..];

    let Some(input_rel) = after_action.find(ACTION_INPUT) else {
        return Err(PlannerError::UnparseableOutput(snippet(output)));
    };
    let tool = after_action[..input_rel].trim();
    if tool.is_empty() {
        return Err(PlannerError::UnparseableOutput(snippet(output)));
    }

    let input_start = action_idx + ACTION.len() + input_rel + ACTION_INPUT.len();
    let input_end = output[input_start..]
        .find(OBSERVATION)
        .map(|rel| input_start + rel)
        .unwrap_or(output.len());

    let tool_input = output[input_start..input_end]
        .trim()
        .trim_matches('"')
        .to_string();
    let log = output[..input_end].trim_end().to_string();

    Ok(Plan::Act(vec![Action {
        tool: tool.to_string(),
        tool_input,
        log,
    }]))
}

/// First line or so of the output, for error messages.
fn snippet(output: &str) -> String {
    const MAX: usize = 120;
    let trimmed = output.trim();
    if trimmed.chars().count() <= MAX {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX).collect();
    format!("{cut}…")
}
