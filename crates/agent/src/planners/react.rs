//! ReAct planner: Thought → Action → Observation over a text model.
//!
//! Each `plan` call renders one prompt (tool list, prior conversation from
//! memory, the question, and a scratchpad replaying every completed step),
//! sends it to a [`TextCompletion`] backend and parses the reply with
//! [`parse_react_output`].

use std::sync::Arc;

use async_trait::async_trait;
use planloop_core::action::{Plan, Step};
use planloop_core::error::PlannerError;
use planloop_core::memory::{Memory, MemoryRecord};
use planloop_core::planner::Planner;
use planloop_core::run::{INPUT_KEY, RunContext, RunInput};
use planloop_core::tool::ToolRegistry;
use tracing::{debug, warn};

use super::parser::{OBSERVATION, parse_react_output};

/// An opaque text-in, text-out model.
///
/// Retries, rate limiting and model selection belong to the implementation.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    fn name(&self) -> &str;

    /// Complete `prompt`, stopping before any of `stop`.
    async fn complete(&self, prompt: &str, stop: &[String]) -> Result<String, PlannerError>;
}

/// Plans by prompting a text model in the ReAct format.
pub struct ReactPlanner {
    llm: Arc<dyn TextCompletion>,
    /// `(name, description)` of every tool the model may use
    tools: Vec<(String, String)>,
    memory: Option<Arc<dyn Memory>>,
    /// How many trailing memory records to include in the prompt
    memory_window: usize,
}

impl ReactPlanner {
    /// Create a planner offering every tool currently in `tools`.
    pub fn new(llm: Arc<dyn TextCompletion>, tools: &ToolRegistry) -> Self {
        Self {
            llm,
            tools: tools
                .descriptions()
                .into_iter()
                .map(|(n, d)| (n.to_string(), d.to_string()))
                .collect(),
            memory: None,
            memory_window: 10,
        }
    }

    /// Include the last `window` memory records as prior conversation.
    pub fn with_memory(mut self, memory: Arc<dyn Memory>, window: usize) -> Self {
        self.memory = Some(memory);
        self.memory_window = window;
        self
    }

    async fn prior_conversation(&self) -> Vec<MemoryRecord> {
        let Some(memory) = &self.memory else {
            return vec![];
        };
        match memory.snapshot().await {
            Ok(mut records) => {
                let skip = records.len().saturating_sub(self.memory_window);
                records.drain(..skip);
                records
            }
            Err(e) => {
                warn!("ReactPlanner memory snapshot failed: {e}");
                vec![]
            }
        }
    }

    /// Render the full prompt for one planning call.
    pub fn build_prompt(&self, question: &str, history: &[Step], prior: &[MemoryRecord]) -> String {
        let tool_lines: Vec<String> = self
            .tools
            .iter()
            .map(|(name, desc)| format!("{name}: {desc}"))
            .collect();
        let tool_names: Vec<&str> = self.tools.iter().map(|(n, _)| n.as_str()).collect();

        let mut prompt = String::from(
            "Answer the question as well as you can. You may use these tools:\n\n",
        );
        prompt.push_str(&tool_lines.join("\n"));
        prompt.push_str(&format!(
            "\n\nRespond in this format:\n\n\
             Question: the question to answer\n\
             Thought: what to do next\n\
             Action: the tool to use, one of [{}]\n\
             Action Input: the input for the tool\n\
             Observation: the tool's result\n\
             ... (Thought/Action/Action Input/Observation may repeat)\n\
             Thought: I now know the final answer\n\
             Final Answer: the answer to the original question\n",
            tool_names.join(", ")
        ));

        if !prior.is_empty() {
            prompt.push_str("\nPrevious conversation:\n");
            for rec in prior {
                prompt.push_str(&format!(
                    "Human: {}\nAI: {}\n",
                    render_values(&rec.input),
                    render_values(&rec.output)
                ));
            }
        }

        prompt.push_str(&format!("\nBegin!\n\nQuestion: {question}\nThought:"));
        prompt.push_str(&scratchpad(history));
        prompt
    }
}

/// Replay completed steps so the model continues where it left off.
fn scratchpad(history: &[Step]) -> String {
    let mut pad = String::new();
    for step in history {
        let log = step.action.log.trim();
        let log = log.strip_prefix("Thought:").unwrap_or(log);
        pad.push(' ');
        pad.push_str(log.trim());
        pad.push_str(&format!("\n{OBSERVATION} {}\nThought:", step.observation));
    }
    pad
}

fn render_values(values: &planloop_core::memory::Values) -> String {
    values
        .values()
        .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl Planner for ReactPlanner {
    fn name(&self) -> &str {
        "react"
    }

    async fn plan(
        &self,
        _ctx: &RunContext,
        history: &[Step],
        input: &RunInput,
    ) -> Result<Plan, PlannerError> {
        let question = input.get(INPUT_KEY).ok_or_else(|| {
            PlannerError::Failed(format!("run input has no '{INPUT_KEY}' key"))
        })?;

        let prior = self.prior_conversation().await;
        let prompt = self.build_prompt(question, history, &prior);
        let stop = vec![format!("\n{OBSERVATION}")];

        debug!(
            model = self.llm.name(),
            history = history.len(),
            prompt_chars = prompt.len(),
            "ReactPlanner requesting completion"
        );
        let completion = self.llm.complete(&prompt, &stop).await?;
        parse_react_output(&completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planloop_core::action::Action;
    use planloop_core::memory::values;
    use planloop_core::tool::Tool;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Returns canned completions and keeps every prompt it was sent.
    struct CannedCompletion {
        replies: Mutex<Vec<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedCompletion {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().rev().map(|s| s.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextCompletion for CannedCompletion {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, prompt: &str, stop: &[String]) -> Result<String, PlannerError> {
            assert_eq!(stop, ["\nObservation:".to_string()]);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| PlannerError::Completion("no more replies".into()))
        }
    }

    struct Calc;

    #[async_trait]
    impl Tool for Calc {
        fn name(&self) -> &str {
            "calculator"
        }
        fn description(&self) -> &str {
            "Does arithmetic"
        }
        async fn call(
            &self,
            _ctx: &RunContext,
            _input: &str,
        ) -> Result<String, planloop_core::error::ToolError> {
            Ok("8".into())
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Calc));
        registry
    }

    fn ctx() -> RunContext {
        RunContext::new(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn first_call_proposes_action() {
        let llm = Arc::new(CannedCompletion::new(&[
            " I should add first\nAction: calculator\nAction Input: 3+5",
        ]));
        let planner = ReactPlanner::new(llm.clone(), &registry());

        let plan = planner
            .plan(&ctx(), &[], &RunInput::question("What is 3 + 5, doubled?"))
            .await
            .unwrap();
        match plan {
            Plan::Act(actions) => assert_eq!(actions[0].tool_input, "3+5"),
            Plan::Finish(_) => panic!("Expected Act"),
        }

        let prompt = &llm.prompts.lock().unwrap()[0];
        assert!(prompt.contains("calculator: Does arithmetic"));
        assert!(prompt.contains("one of [calculator]"));
        assert!(prompt.ends_with("Question: What is 3 + 5, doubled?\nThought:"));
    }

    #[tokio::test]
    async fn scratchpad_replays_history() {
        let llm = Arc::new(CannedCompletion::new(&[" I now know\nFinal Answer: 16"]));
        let planner = ReactPlanner::new(llm.clone(), &registry());

        let history = vec![Step {
            action: Action::new(
                "calculator",
                "3+5",
                "Thought: add first\nAction: calculator\nAction Input: 3+5",
            ),
            observation: "8".into(),
        }];
        let plan = planner
            .plan(&ctx(), &history, &RunInput::question("q"))
            .await
            .unwrap();
        assert_eq!(plan, Plan::finish("16"));

        let prompt = &llm.prompts.lock().unwrap()[0];
        assert!(prompt.ends_with(
            "Thought: add first\nAction: calculator\nAction Input: 3+5\nObservation: 8\nThought:"
        ));
    }

    #[tokio::test]
    async fn memory_window_limits_prior_conversation() {
        use planloop_core::error::MemoryError;
        use planloop_core::memory::Values;

        struct Fixed(Vec<MemoryRecord>);

        #[async_trait]
        impl Memory for Fixed {
            fn name(&self) -> &str {
                "fixed"
            }
            async fn record(
                &self,
                _ctx: &RunContext,
                _i: Values,
                _o: Values,
            ) -> Result<(), MemoryError> {
                Ok(())
            }
            async fn snapshot(&self) -> Result<Vec<MemoryRecord>, MemoryError> {
                Ok(self.0.clone())
            }
        }

        let records = (0..5)
            .map(|i| MemoryRecord::new(values("input", format!("q{i}")), values("output", i)))
            .collect();
        let llm = Arc::new(CannedCompletion::new(&["Final Answer: ok"]));
        let planner =
            ReactPlanner::new(llm.clone(), &registry()).with_memory(Arc::new(Fixed(records)), 2);

        planner
            .plan(&ctx(), &[], &RunInput::question("next"))
            .await
            .unwrap();

        let prompt = &llm.prompts.lock().unwrap()[0];
        assert!(prompt.contains("Previous conversation:\nHuman: q3\nAI: 3\nHuman: q4\nAI: 4\n"));
        assert!(!prompt.contains("q2"));
    }

    #[tokio::test]
    async fn missing_input_key_fails() {
        let llm = Arc::new(CannedCompletion::new(&[]));
        let planner = ReactPlanner::new(llm, &registry());
        let input = RunInput::new(std::collections::BTreeMap::from([(
            "query".to_string(),
            "hi".to_string(),
        )]))
        .unwrap();

        let err = planner.plan(&ctx(), &[], &input).await.unwrap_err();
        assert!(err.to_string().contains("'input'"));
    }

    #[tokio::test]
    async fn completion_error_propagates() {
        let llm = Arc::new(CannedCompletion::new(&[]));
        let planner = ReactPlanner::new(llm, &registry());
        let err = planner
            .plan(&ctx(), &[], &RunInput::question("q"))
            .await
            .unwrap_err();
        assert!(matches!(err, PlannerError::Completion(_)));
    }
}
