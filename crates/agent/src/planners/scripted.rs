//! Scripted planner: replays a fixed sequence of planning responses.
//!
//! Useful for tests, demos and offline runs of the CLI. Scripts can be
//! built in code or loaded from TOML:
//!
//! ```toml
//! [[turns]]
//! thought = "First add the numbers"
//! tool = "calculator"
//! input = "3+5"
//!
//! [[turns]]
//! finish = "16"
//! ```

use std::collections::VecDeque;
use std::path::Path;

use async_trait::async_trait;
use planloop_core::action::{Action, Plan, Step};
use planloop_core::error::{Error, PlannerError, Result};
use planloop_core::planner::Planner;
use planloop_core::run::{RunContext, RunInput};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

/// Replays scripted turns in order, one per `plan` call.
pub struct ScriptedPlanner {
    turns: Mutex<VecDeque<std::result::Result<Plan, PlannerError>>>,
    calls: Mutex<usize>,
}

impl ScriptedPlanner {
    pub fn new(plans: Vec<Plan>) -> Self {
        Self::from_results(plans.into_iter().map(Ok).collect())
    }

    /// Script that can also fail on chosen turns.
    pub fn from_results(turns: Vec<std::result::Result<Plan, PlannerError>>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            calls: Mutex::new(0),
        }
    }

    /// Parse a TOML script (see module docs for the format).
    pub fn from_toml(content: &str) -> Result<Self> {
        let script: ScriptFile = toml::from_str(content).map_err(|e| Error::Config {
            message: format!("invalid planner script: {e}"),
        })?;

        let plans = script
            .turns
            .into_iter()
            .enumerate()
            .map(|(i, turn)| turn.into_plan(i + 1))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(plans))
    }

    /// Load a TOML script from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read planner script {}: {e}", path.display()),
        })?;
        Self::from_toml(&content)
    }

    /// Number of `plan` calls served so far.
    pub async fn calls(&self) -> usize {
        *self.calls.lock().await
    }

    /// Turns not yet replayed.
    pub async fn remaining(&self) -> usize {
        self.turns.lock().await.len()
    }
}

#[async_trait]
impl Planner for ScriptedPlanner {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn plan(
        &self,
        _ctx: &RunContext,
        history: &[Step],
        _input: &RunInput,
    ) -> std::result::Result<Plan, PlannerError> {
        let mut calls = self.calls.lock().await;
        *calls += 1;
        debug!(call = *calls, history = history.len(), "Scripted planner turn");

        self.turns
            .lock()
            .await
            .pop_front()
            .unwrap_or(Err(PlannerError::ScriptExhausted { calls: *calls - 1 }))
    }
}

// ── Script file format ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ScriptFile {
    #[serde(default)]
    turns: Vec<ScriptTurn>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScriptTurn {
    #[serde(default)]
    finish: Option<String>,
    #[serde(default)]
    tool: Option<String>,
    #[serde(default)]
    input: Option<String>,
    #[serde(default)]
    thought: Option<String>,
    #[serde(default)]
    actions: Option<Vec<Action>>,
}

impl ScriptTurn {
    fn into_plan(self, index: usize) -> Result<Plan> {
        let invalid = |why: &str| Error::Config {
            message: format!("planner script turn {index}: {why}"),
        };

        match (self.finish, self.tool, self.actions) {
            (Some(answer), None, None) => Ok(Plan::finish(answer)),
            (None, Some(tool), None) => Ok(Plan::Act(vec![Action::new(
                tool,
                self.input.unwrap_or_default(),
                self.thought.unwrap_or_default(),
            )])),
            (None, None, Some(actions)) => Ok(Plan::Act(actions)),
            (None, None, None) => Err(invalid("needs one of `finish`, `tool` or `actions`")),
            _ => Err(invalid("`finish`, `tool` and `actions` are mutually exclusive")),
        }
    }
}
