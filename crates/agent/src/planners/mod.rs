//! Planner strategies shipped with planloop.
//!
//! 1. **Scripted**: replays a fixed list of responses (tests, offline CLI runs)
//! 2. **ReAct**: prompts a text model and parses Thought/Action/Final Answer

pub mod parser;
pub mod react;
pub mod scripted;

pub use parser::parse_react_output;
pub use react::{ReactPlanner, TextCompletion};
pub use scripted::ScriptedPlanner;
