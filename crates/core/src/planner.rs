//! Planner trait: the policy that decides what the agent does next.
//!
//! The loop treats a planner as an opaque function from
//! `(history, run input)` to a [`Plan`]. Rule-based, scripted and
//! LLM-backed strategies all plug in behind this one method.

use async_trait::async_trait;

use crate::action::{Plan, Step};
use crate::error::PlannerError;
use crate::run::{RunContext, RunInput};

/// The core Planner trait.
#[async_trait]
pub trait Planner: Send + Sync {
    /// A human-readable name for this planner (e.g., "scripted", "react").
    fn name(&self) -> &str;

    /// Decide the next move given every completed step so far.
    ///
    /// Any retry policy belongs inside the implementation; an `Err` here
    /// ends the run.
    async fn plan(
        &self,
        ctx: &RunContext,
        history: &[Step],
        input: &RunInput,
    ) -> std::result::Result<Plan, PlannerError>;
}
