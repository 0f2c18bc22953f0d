//! Memory backends for planloop.

pub mod buffer;
pub mod noop;

use std::sync::Arc;

use planloop_core::memory::Memory;

pub use buffer::ConversationBuffer;
pub use noop::NoopMemory;

/// Build a backend by its configured name ("buffer" or "none").
pub fn from_name(name: &str) -> Option<Arc<dyn Memory>> {
    match name {
        "buffer" => Some(Arc::new(ConversationBuffer::new())),
        "none" => Some(Arc::new(NoopMemory)),
        other => {
            tracing::warn!(backend = %other, "Unknown memory backend");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_known_backends() {
        assert_eq!(from_name("buffer").unwrap().name(), "buffer");
        assert_eq!(from_name("none").unwrap().name(), "none");
        assert!(from_name("sqlite").is_none());
    }
}
