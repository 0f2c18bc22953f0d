//! `planloop run`: drive the agent loop on one question.

use std::path::PathBuf;
use std::sync::Arc;

use planloop_agent::{AgentLoop, ScriptedPlanner};
use planloop_config::AppConfig;
use planloop_core::event::{DomainEvent, EventBus};
use planloop_core::run::{RunInput, RunOutcome};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Command-line overrides applied on top of the loaded config.
pub struct Overrides {
    pub script: Option<PathBuf>,
    pub max_iterations: Option<u32>,
    pub timeout_secs: Option<u64>,
}

pub async fn run(
    mut config: AppConfig,
    overrides: Overrides,
    question: String,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(n) = overrides.max_iterations {
        config.agent.max_iterations = n;
    }
    if let Some(secs) = overrides.timeout_secs {
        config.agent.timeout_secs = secs;
    }
    config.validate()?;

    let script = overrides
        .script
        .unwrap_or_else(|| AppConfig::config_dir().join("plan.toml"));
    let planner = Arc::new(ScriptedPlanner::from_file(&script)?);
    debug!(script = %script.display(), "Loaded planner script");

    let memory = planloop_memory::from_name(&config.memory.backend)
        .ok_or_else(|| format!("Unknown memory backend: {}", config.memory.backend))?;
    let tools = Arc::new(planloop_tools::default_registry(&config.tools));

    let event_bus = Arc::new(EventBus::default());
    let printer = tokio::spawn(print_progress(event_bus.subscribe()));

    let agent = AgentLoop::from_settings(planner, tools, memory, &config.agent)
        .with_event_bus(event_bus);

    println!("❓ {question}");
    let result = agent.run(&RunInput::question(question)).await;

    // Dropping the loop closes the bus and lets the printer drain.
    drop(agent);
    join_printer(printer).await;

    match result {
        Ok(RunOutcome::Finished { output, steps }) => {
            print_steps(&steps);
            println!("✅ {output}");
            Ok(())
        }
        Ok(RunOutcome::BudgetExhausted { steps }) => {
            print_steps(&steps);
            println!(
                "⏹️  Stopped after {} iteration(s) without a final answer",
                config.agent.max_iterations
            );
            Ok(())
        }
        Err(e) => Err(format!("Run failed: {e}").into()),
    }
}

async fn print_progress(mut rx: tokio::sync::broadcast::Receiver<Arc<DomainEvent>>) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let DomainEvent::ToolExecuted {
                    tool_name,
                    success,
                    duration_ms,
                    ..
                } = event.as_ref()
                {
                    let mark = if *success { "→" } else { "✗" };
                    println!("   {mark} {tool_name} ({duration_ms} ms)");
                }
            }
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

/// Wait for the progress printer; its failure never changes the run's result.
async fn join_printer(printer: JoinHandle<()>) {
    if let Err(e) = printer.await {
        warn!("Progress printer failed: {e}");
    }
}

fn print_steps(steps: &[planloop_core::action::Step]) {
    for (i, step) in steps.iter().enumerate() {
        println!(
            "  [{}] {}({}) = {}",
            i + 1,
            step.action.tool,
            step.action.tool_input,
            step.observation
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn printer_panic_is_logged_not_propagated() {
        let printer = tokio::spawn(async { panic!("stdout closed") });
        join_printer(printer).await;
    }

    #[tokio::test]
    async fn printer_drains_until_bus_closes() {
        let bus = EventBus::new(8);
        let printer = tokio::spawn(print_progress(bus.subscribe()));
        drop(bus);
        join_printer(printer).await;
    }
}
