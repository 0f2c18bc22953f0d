//! Conversation buffer: keeps every record in process, in order.

use async_trait::async_trait;
use planloop_core::error::MemoryError;
use planloop_core::memory::{Memory, MemoryRecord, Values};
use planloop_core::run::RunContext;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::trace;

/// An append-only buffer of memory records.
///
/// Writes take the lock, so one instance can be shared between runs.
pub struct ConversationBuffer {
    records: Arc<RwLock<Vec<MemoryRecord>>>,
    human_prefix: String,
    ai_prefix: String,
}

impl ConversationBuffer {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            human_prefix: "Human".into(),
            ai_prefix: "AI".into(),
        }
    }

    /// Override the speaker labels used by [`buffer_string`](Self::buffer_string).
    pub fn with_prefixes(mut self, human: impl Into<String>, ai: impl Into<String>) -> Self {
        self.human_prefix = human.into();
        self.ai_prefix = ai.into();
        self
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Render the buffer as alternating `Human: ...` / `AI: ...` lines.
    pub async fn buffer_string(&self) -> String {
        let records = self.records.read().await;
        let mut lines = Vec::with_capacity(records.len() * 2);
        for rec in records.iter() {
            lines.push(format!("{}: {}", self.human_prefix, render(&rec.input)));
            lines.push(format!("{}: {}", self.ai_prefix, render(&rec.output)));
        }
        lines.join("\n")
    }
}

impl Default for ConversationBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Join the values of a record side, unquoting plain strings.
fn render(values: &Values) -> String {
    values
        .values()
        .map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl Memory for ConversationBuffer {
    fn name(&self) -> &str {
        "buffer"
    }

    async fn record(
        &self,
        ctx: &RunContext,
        input: Values,
        output: Values,
    ) -> Result<(), MemoryError> {
        let mut records = self.records.write().await;
        records.push(MemoryRecord::new(input, output));
        trace!(run_id = %ctx.run_id, records = records.len(), "Buffer record appended");
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<MemoryRecord>, MemoryError> {
        Ok(self.records.read().await.clone())
    }
}
