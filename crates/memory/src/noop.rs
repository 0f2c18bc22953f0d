//! No-op memory backend: disables memory entirely.

use async_trait::async_trait;
use planloop_core::error::MemoryError;
use planloop_core::memory::{Memory, MemoryRecord, Values};
use planloop_core::run::RunContext;

/// A no-op memory backend that stores nothing.
pub struct NoopMemory;

#[async_trait]
impl Memory for NoopMemory {
    fn name(&self) -> &str {
        "none"
    }

    async fn record(
        &self,
        _ctx: &RunContext,
        _input: Values,
        _output: Values,
    ) -> Result<(), MemoryError> {
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<MemoryRecord>, MemoryError> {
        Ok(Vec::new())
    }
}
