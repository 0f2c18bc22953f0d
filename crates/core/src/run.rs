//! Run-scoped types: input mapping, deadline context, state and outcome.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use crate::action::Step;
use crate::error::{Error, Result};

/// The key the built-in planners read the user's question from.
pub const INPUT_KEY: &str = "input";

/// Unique identifier for one run of the loop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable parameter mapping fixed for the lifetime of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunInput(BTreeMap<String, String>);

impl RunInput {
    /// Build a run input. The mapping and every key must be non-empty.
    pub fn new(values: BTreeMap<String, String>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::InvalidInput("input mapping is empty".into()));
        }
        if values.keys().any(|k| k.trim().is_empty()) {
            return Err(Error::InvalidInput("input keys must be non-empty".into()));
        }
        Ok(Self(values))
    }

    /// `{"input": question}`: the shape the built-in planners expect.
    pub fn question(text: impl Into<String>) -> Self {
        Self(BTreeMap::from([(INPUT_KEY.to_string(), text.into())]))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The mapping as a JSON object, for memory records.
    pub fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect()
    }
}

/// Context handed to every suspension point of a run.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: RunId,
    pub deadline: Instant,
    pub timeout: Duration,
}

impl RunContext {
    /// Start a context whose deadline is `timeout` from now.
    pub fn new(timeout: Duration) -> Self {
        Self {
            run_id: RunId::new(),
            deadline: Instant::now() + timeout,
            timeout,
        }
    }

    /// Time left before the deadline (zero once it has passed).
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }
}

/// Where a run is in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Planning,
    Executing,
    Finished,
    BudgetExhausted,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::Finished | RunState::BudgetExhausted | RunState::Failed
        )
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunState::Planning => "planning",
            RunState::Executing => "executing",
            RunState::Finished => "finished",
            RunState::BudgetExhausted => "budget_exhausted",
            RunState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A non-failed terminal outcome. FAILED runs surface as `Err(Error)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The planner returned a finish signal.
    Finished { output: String, steps: Vec<Step> },
    /// The iteration budget ran out before a finish signal.
    BudgetExhausted { steps: Vec<Step> },
}

impl RunOutcome {
    pub fn state(&self) -> RunState {
        match self {
            RunOutcome::Finished { .. } => RunState::Finished,
            RunOutcome::BudgetExhausted { .. } => RunState::BudgetExhausted,
        }
    }

    pub fn steps(&self) -> &[Step] {
        match self {
            RunOutcome::Finished { steps, .. } | RunOutcome::BudgetExhausted { steps } => steps,
        }
    }

    /// The final answer, if the run finished.
    pub fn output(&self) -> Option<&str> {
        match self {
            RunOutcome::Finished { output, .. } => Some(output),
            RunOutcome::BudgetExhausted { .. } => None,
        }
    }
}
