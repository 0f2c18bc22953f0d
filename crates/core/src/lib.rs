//! # planloop Core
//!
//! Domain types, traits, and error definitions for the planloop
//! plan–act–observe runtime. Every collaborator of the loop is a trait
//! defined here; implementations live in their respective crates.
//!
//! - [`Planner`] decides the next move from the history so far
//! - [`Tool`]s are looked up by name in a [`ToolRegistry`]
//! - [`Memory`] keeps an append-only record across runs

pub mod action;
pub mod error;
pub mod event;
pub mod memory;
pub mod planner;
pub mod run;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use action::{Action, FinishSignal, Plan, Step};
pub use error::{Error, MemoryError, PlannerError, Result, ToolError};
pub use event::{DomainEvent, EventBus};
pub use memory::{Memory, MemoryRecord, Values};
pub use planner::Planner;
pub use run::{INPUT_KEY, RunContext, RunId, RunInput, RunOutcome, RunState};
pub use tool::{Tool, ToolRegistry};
