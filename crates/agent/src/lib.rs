//! The agent loop for planloop.
//!
//! A run follows a **Plan → Act → Observe** cycle:
//!
//! 1. **Plan**: the planner sees the input and every completed step and
//!    either finishes or proposes an action
//! 2. **Act**: the loop resolves the named tool and executes it
//! 3. **Observe**: the tool's output (or error) is appended to the history
//!    and recorded in memory, then the loop plans again
//!
//! The loop stops when the planner finishes, the iteration budget runs out,
//! or a fatal error occurs (planner failure, unknown tool, expired deadline).

pub mod loop_runner;
pub mod planners;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use loop_runner::AgentLoop;
pub use planners::{ReactPlanner, ScriptedPlanner, TextCompletion, parse_react_output};
