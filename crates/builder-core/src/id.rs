//! Node id generation.
//!
//! The store never mints ids on its own; it asks an injected [`IdGenerator`]. Production hosts use
//! [`UuidIdGenerator`], tests and scripted runs use [`SequentialIdGenerator`] so that ids are
//! predictable.

use crate::node::NodeId;
use uuid::Uuid;

/// Source of fresh node ids.
pub trait IdGenerator {
    /// Produce the next id. Implementations should be collision-resistant; the repository still
    /// re-draws if an id is already taken.
    fn next_id(&mut self) -> NodeId;
}

/// Random UUID v4 ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> NodeId {
        NodeId::new(Uuid::new_v4().to_string())
    }
}

/// Deterministic `"{prefix}-{n}"` ids, starting at 1.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    /// Create a generator with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("node")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> NodeId {
        let id = NodeId::new(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

impl<F> IdGenerator for F
where
    F: FnMut() -> NodeId,
{
    fn next_id(&mut self) -> NodeId {
        self()
    }
}
