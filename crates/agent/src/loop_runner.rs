//! The plan–act–observe loop controller.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use planloop_config::{AgentSettings, UnknownToolPolicy};
use planloop_core::action::{Action, Plan, Step};
use planloop_core::error::{Error, PlannerError, Result};
use planloop_core::event::{DomainEvent, EventBus};
use planloop_core::memory::{Memory, Values, values};
use planloop_core::planner::Planner;
use planloop_core::run::{RunContext, RunId, RunInput, RunOutcome, RunState};
use planloop_core::tool::ToolRegistry;
use tracing::{debug, info, warn};

/// Drives a planner, a tool registry and a memory until the planner
/// finishes, the iteration budget runs out, or something fatal happens.
///
/// One `AgentLoop` can serve many sequential runs; each run owns its own
/// history and counter.
pub struct AgentLoop {
    /// Decides the next move
    planner: Arc<dyn Planner>,

    /// Tools the planner may name
    tools: Arc<ToolRegistry>,

    /// Receives one record per step and one on finish
    memory: Arc<dyn Memory>,

    /// Maximum plan/act/observe iterations per run
    max_iterations: u32,

    /// Wall-clock budget shared by every planner and tool call in a run
    timeout: Duration,

    unknown_tool_policy: UnknownToolPolicy,

    /// Optional event bus for run progress
    event_bus: Option<Arc<EventBus>>,
}

impl AgentLoop {
    /// Create a loop with the default budget (5 iterations, 120 s).
    pub fn new(
        planner: Arc<dyn Planner>,
        tools: Arc<ToolRegistry>,
        memory: Arc<dyn Memory>,
    ) -> Self {
        Self::from_settings(planner, tools, memory, &AgentSettings::default())
    }

    /// Create a loop configured from the `[agent]` config section.
    pub fn from_settings(
        planner: Arc<dyn Planner>,
        tools: Arc<ToolRegistry>,
        memory: Arc<dyn Memory>,
        settings: &AgentSettings,
    ) -> Self {
        Self {
            planner,
            tools,
            memory,
            max_iterations: settings.max_iterations.max(1),
            timeout: settings.timeout(),
            unknown_tool_policy: settings.on_unknown_tool,
            event_bus: None,
        }
    }

    /// Set the maximum number of iterations. Values below 1 are raised to 1.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Set the run deadline, measured from the start of each run.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_unknown_tool_policy(mut self, policy: UnknownToolPolicy) -> Self {
        self.unknown_tool_policy = policy;
        self
    }

    /// Publish run progress on `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Execute one run.
    ///
    /// Returns `Finished` when the planner signals completion and
    /// `BudgetExhausted` when `max_iterations` pass without one. Planner
    /// failures, unknown tools and an expired deadline are returned as
    /// `Err` (the FAILED state). Tool errors are not: they become the step's
    /// observation and the loop carries on.
    pub async fn run(&self, input: &RunInput) -> Result<RunOutcome> {
        let ctx = RunContext::new(self.timeout);
        info!(
            run_id = %ctx.run_id,
            planner = self.planner.name(),
            max_iterations = self.max_iterations,
            timeout_secs = self.timeout.as_secs(),
            "Run starting"
        );
        self.publish(DomainEvent::RunStarted {
            run_id: ctx.run_id.to_string(),
            max_iterations: self.max_iterations,
            timestamp: Utc::now(),
        });

        let mut tracker = StateTracker::new(&ctx.run_id, self.event_bus.as_deref());
        let result = self.drive(&ctx, input, &mut tracker).await;

        match &result {
            Ok(outcome) => {
                tracker.transition(outcome.state());
                info!(
                    run_id = %ctx.run_id,
                    state = %outcome.state(),
                    steps = outcome.steps().len(),
                    "Run ended"
                );
            }
            Err(e) => {
                tracker.transition(RunState::Failed);
                warn!(run_id = %ctx.run_id, iteration = tracker.iteration, error = %e, "Run failed");
            }
        }

        self.publish(DomainEvent::RunEnded {
            run_id: ctx.run_id.to_string(),
            state: tracker.state,
            iterations: tracker.iteration,
            timestamp: Utc::now(),
        });

        result
    }

    async fn drive(
        &self,
        ctx: &RunContext,
        input: &RunInput,
        tracker: &mut StateTracker<'_>,
    ) -> Result<RunOutcome> {
        let mut history: Vec<Step> = Vec::new();

        while tracker.iteration < self.max_iterations {
            tracker.iteration += 1;
            tracker.transition(RunState::Planning);
            debug!(run_id = %ctx.run_id, iteration = tracker.iteration, "Planning");

            let actions = match self.plan(ctx, &history, input).await? {
                Plan::Finish(finish) => {
                    let output = values("output", finish.log.as_str());
                    self.remember(ctx, input.to_json_map(), output).await;
                    return Ok(RunOutcome::Finished {
                        output: finish.log,
                        steps: history,
                    });
                }
                Plan::Act(actions) => actions,
            };

            let mut proposed = actions.into_iter();
            let Some(action) = proposed.next() else {
                return Err(PlannerError::EmptyPlan.into());
            };
            let discarded = proposed.count();
            if discarded > 0 {
                debug!(
                    tool = %action.tool,
                    discarded,
                    "Planner proposed several actions, executing only the first"
                );
            }

            tracker.transition(RunState::Executing);
            let observation = self.act(ctx, &action).await?;

            self.remember(
                ctx,
                values("input", action.tool_input.as_str()),
                values("output", observation.as_str()),
            )
            .await;
            history.push(Step {
                action,
                observation,
            });
        }

        warn!(
            run_id = %ctx.run_id,
            iterations = self.max_iterations,
            "Max iterations reached without a final answer"
        );
        Ok(RunOutcome::BudgetExhausted { steps: history })
    }

    /// Ask the planner for the next move, bounded by the run deadline.
    async fn plan(&self, ctx: &RunContext, history: &[Step], input: &RunInput) -> Result<Plan> {
        self.check_deadline(ctx, RunState::Planning)?;
        let plan = match tokio::time::timeout_at(ctx.deadline, self.planner.plan(ctx, history, input))
            .await
        {
            Ok(Ok(plan)) => plan,
            Ok(Err(e)) => return Err(Error::Planner(e)),
            Err(_) => return Err(self.deadline_exceeded(RunState::Planning)),
        };
        // A planner that blocked without yielding can return past the deadline
        self.check_deadline(ctx, RunState::Planning)?;
        Ok(plan)
    }

    /// Resolve and execute one action, producing its observation.
    async fn act(&self, ctx: &RunContext, action: &Action) -> Result<String> {
        let Some(tool) = self.tools.resolve(&action.tool) else {
            return match self.unknown_tool_policy {
                UnknownToolPolicy::Fail => Err(Error::UnknownTool(action.tool.clone())),
                UnknownToolPolicy::Observe => {
                    warn!(tool = %action.tool, "Planner named an unknown tool, reporting back");
                    Ok(format!(
                        "Tool not found: {}. Available tools: {}",
                        action.tool,
                        self.tools.names().join(", ")
                    ))
                }
            };
        };

        self.check_deadline(ctx, RunState::Executing)?;
        debug!(tool = %action.tool, input = %action.tool_input, "Executing tool");
        let start = std::time::Instant::now();
        let result = tokio::time::timeout_at(ctx.deadline, tool.call(ctx, &action.tool_input))
            .await
            .map_err(|_| self.deadline_exceeded(RunState::Executing))?;
        let duration_ms = start.elapsed().as_millis() as u64;
        self.check_deadline(ctx, RunState::Executing)?;

        self.publish(DomainEvent::ToolExecuted {
            run_id: ctx.run_id.to_string(),
            tool_name: action.tool.clone(),
            success: result.is_ok(),
            duration_ms,
            timestamp: Utc::now(),
        });

        match result {
            Ok(output) => Ok(output),
            Err(e) => {
                // Report the error to the planner so it can recover
                warn!(tool = %action.tool, error = %e, "Tool execution failed");
                Ok(format!("Error executing tool: {e}"))
            }
        }
    }

    /// Memory writes never change the run's outcome.
    async fn remember(&self, ctx: &RunContext, input: Values, output: Values) {
        if let Err(e) = self.memory.record(ctx, input, output).await {
            warn!(memory = self.memory.name(), "Failed to record to memory: {e}");
        }
    }

    /// `timeout_at` only fires at an await point, so expiry is also checked
    /// around every call.
    fn check_deadline(&self, ctx: &RunContext, stage: RunState) -> Result<()> {
        if ctx.is_expired() {
            return Err(self.deadline_exceeded(stage));
        }
        Ok(())
    }

    fn deadline_exceeded(&self, stage: RunState) -> Error {
        Error::DeadlineExceeded {
            stage,
            timeout_secs: self.timeout.as_secs(),
        }
    }

    fn publish(&self, event: DomainEvent) {
        if let Some(bus) = &self.event_bus {
            bus.publish(event);
        }
    }
}

/// Current state and iteration of one run, announcing every change.
struct StateTracker<'a> {
    run_id: &'a RunId,
    bus: Option<&'a EventBus>,
    state: RunState,
    iteration: u32,
}

impl<'a> StateTracker<'a> {
    fn new(run_id: &'a RunId, bus: Option<&'a EventBus>) -> Self {
        Self {
            run_id,
            bus,
            state: RunState::Planning,
            iteration: 0,
        }
    }

    fn transition(&mut self, to: RunState) {
        if self.state == to {
            return;
        }
        debug!(run_id = %self.run_id, from = %self.state, to = %to, "Run state change");
        if let Some(bus) = self.bus {
            bus.publish(DomainEvent::RunStateChanged {
                run_id: self.run_id.to_string(),
                from: self.state,
                to,
                iteration: self.iteration,
                timestamp: Utc::now(),
            });
        }
        self.state = to;
    }
}
