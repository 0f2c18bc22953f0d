//! Memory trait: an append-only record of (input, output) pairs.
//!
//! The loop writes one record per completed step and one on finish.
//! Planners may read a snapshot to decide how much prior context to use.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;
use crate::run::RunContext;

/// JSON object used for both sides of a record.
pub type Values = serde_json::Map<String, serde_json::Value>;

/// A single recorded exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub input: Values,
    pub output: Values,
    pub recorded_at: DateTime<Utc>,
}

impl MemoryRecord {
    pub fn new(input: Values, output: Values) -> Self {
        Self {
            input,
            output,
            recorded_at: Utc::now(),
        }
    }
}

/// Build a one-entry [`Values`] map.
pub fn values(key: &str, value: impl Into<serde_json::Value>) -> Values {
    let mut map = Values::new();
    map.insert(key.to_string(), value.into());
    map
}

/// The core Memory trait.
///
/// Implementations: conversation buffer (in-process), none (no-op).
/// Implementations must be safe to share between sequential runs.
#[async_trait]
pub trait Memory: Send + Sync {
    /// The backend name (e.g., "buffer", "none").
    fn name(&self) -> &str;

    /// Append a record for the run in `ctx`. Never rewrites or removes
    /// earlier records.
    async fn record(
        &self,
        ctx: &RunContext,
        input: Values,
        output: Values,
    ) -> std::result::Result<(), MemoryError>;

    /// Every record so far, oldest first.
    async fn snapshot(&self) -> std::result::Result<Vec<MemoryRecord>, MemoryError>;
}
