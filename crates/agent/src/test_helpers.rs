//! Shared test doubles for loop and planner tests.

use async_trait::async_trait;
use planloop_core::action::{Plan, Step};
use planloop_core::error::{MemoryError, PlannerError, ToolError};
use planloop_core::memory::{Memory, MemoryRecord, Values};
use planloop_core::planner::Planner;
use planloop_core::run::{RunContext, RunInput};
use planloop_core::tool::Tool;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Wraps another planner and remembers every history it was shown.
pub struct ObservingPlanner<P> {
    inner: P,
    seen: Mutex<Vec<Vec<Step>>>,
}

impl<P: Planner> ObservingPlanner<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn histories(&self) -> Vec<Vec<Step>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl<P: Planner> Planner for ObservingPlanner<P> {
    fn name(&self) -> &str {
        "observing"
    }

    async fn plan(
        &self,
        ctx: &RunContext,
        history: &[Step],
        input: &RunInput,
    ) -> Result<Plan, PlannerError> {
        self.seen.lock().unwrap().push(history.to_vec());
        self.inner.plan(ctx, history, input).await
    }
}

/// A planner that always proposes the same action and never finishes.
pub struct LoopingPlanner {
    pub tool: String,
    pub input: String,
}

#[async_trait]
impl Planner for LoopingPlanner {
    fn name(&self) -> &str {
        "looping"
    }

    async fn plan(
        &self,
        _ctx: &RunContext,
        _history: &[Step],
        _input: &RunInput,
    ) -> Result<Plan, PlannerError> {
        Ok(Plan::act(&self.tool, &self.input))
    }
}

/// A planner that sleeps before answering.
pub struct SlowPlanner {
    pub delay: Duration,
}

#[async_trait]
impl Planner for SlowPlanner {
    fn name(&self) -> &str {
        "slow"
    }

    async fn plan(
        &self,
        _ctx: &RunContext,
        _history: &[Step],
        _input: &RunInput,
    ) -> Result<Plan, PlannerError> {
        tokio::time::sleep(self.delay).await;
        Ok(Plan::finish("too late"))
    }
}

/// A planner that holds its thread without yielding, then finishes.
pub struct BlockingPlanner {
    pub delay: Duration,
}

#[async_trait]
impl Planner for BlockingPlanner {
    fn name(&self) -> &str {
        "blocking"
    }

    async fn plan(
        &self,
        _ctx: &RunContext,
        _history: &[Step],
        _input: &RunInput,
    ) -> Result<Plan, PlannerError> {
        std::thread::sleep(self.delay);
        Ok(Plan::finish("too late"))
    }
}

/// How a [`CountingTool`] responds.
pub enum ToolBehavior {
    Echo,
    Fail(&'static str),
    Sleep(Duration),
    /// Holds the thread without ever reaching an await point.
    Block(Duration),
}

/// A tool that counts its calls.
pub struct CountingTool {
    name: String,
    behavior: ToolBehavior,
    calls: AtomicUsize,
}

impl CountingTool {
    pub fn new(name: &str, behavior: ToolBehavior) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tool for CountingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Counts calls for tests"
    }

    async fn call(&self, _ctx: &RunContext, input: &str) -> Result<String, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            ToolBehavior::Echo => Ok(format!("echo: {input}")),
            ToolBehavior::Fail(reason) => Err(ToolError::ExecutionFailed {
                tool_name: self.name.clone(),
                reason: reason.to_string(),
            }),
            ToolBehavior::Sleep(delay) => {
                tokio::time::sleep(*delay).await;
                Ok("finally".into())
            }
            ToolBehavior::Block(delay) => {
                std::thread::sleep(*delay);
                Ok("blocked".into())
            }
        }
    }
}

/// Memory that counts writes and always fails them.
#[derive(Default)]
pub struct FailingMemory {
    attempts: AtomicUsize,
}

impl FailingMemory {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Memory for FailingMemory {
    fn name(&self) -> &str {
        "failing"
    }

    async fn record(
        &self,
        _ctx: &RunContext,
        _input: Values,
        _output: Values,
    ) -> Result<(), MemoryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(MemoryError::Storage("disk full".into()))
    }

    async fn snapshot(&self) -> Result<Vec<MemoryRecord>, MemoryError> {
        Ok(Vec::new())
    }
}
