//! History Manager
//!
//! Bounded, linear snapshot history with a cursor.
//!
//! # Overview
//!
//! Every successful mutation pushes a [`HistoryEntry`] holding a full deep copy of the forest and
//! the selection at that moment. Undo and redo move the cursor and hand back the entry to restore;
//! restoration replaces the whole forest rather than applying a diff.
//!
//! | state      | cursor                      | undo | redo |
//! |------------|-----------------------------|------|------|
//! | empty      | `None`                      | no   | no   |
//! | mid-stream | `0 <= cursor < len - 1`     | if `cursor > 0` | yes |
//! | at tail    | `cursor == len - 1`         | if `cursor > 0` | no  |
//!
//! Pushing while mid-stream discards the stale redo entries first. When the history grows beyond
//! `max_size` the oldest entry is evicted; the cursor keeps pointing at the same (newest) snapshot.
//! The first entry, typically the state at page load, can be restored but never undone past.
//!
//! # Example
//!
//! ```rust
//! use builder_core::{HistoryManager, NodeRepository};
//!
//! let mut history = HistoryManager::new(2);
//! history.push(NodeRepository::new(), None);
//! history.push(NodeRepository::new(), None);
//! history.push(NodeRepository::new(), None);
//!
//! assert_eq!(history.len(), 2);
//! assert!(history.undo().is_some());
//! assert!(history.undo().is_none());
//! ```

use crate::node::NodeId;
use crate::repository::NodeRepository;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// One immutable snapshot of the document.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    seq: u64,
    forest: NodeRepository,
    selected: Option<NodeId>,
    timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Monotonic sequence number, unique for the lifetime of the manager.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The forest at snapshot time.
    pub fn forest(&self) -> &NodeRepository {
        &self.forest
    }

    /// The selected id at snapshot time.
    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    /// When the snapshot was taken.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Bounded linear undo/redo history.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    entries: VecDeque<HistoryEntry>,
    cursor: Option<usize>,
    max_size: usize,
    next_seq: u64,
}

impl HistoryManager {
    /// Create an empty history holding at most `max_size` entries (at least one).
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            entries: VecDeque::with_capacity(max_size.min(64)),
            cursor: None,
            max_size,
            next_seq: 0,
        }
    }

    /// Append a snapshot after the cursor. Returns the new entry's sequence number.
    pub fn push(&mut self, forest: NodeRepository, selected: Option<NodeId>) -> u64 {
        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push_back(HistoryEntry {
            seq,
            forest,
            selected,
            timestamp: Utc::now(),
        });

        while self.entries.len() > self.max_size {
            self.entries.pop_front();
        }
        self.cursor = Some(self.entries.len() - 1);
        seq
    }

    /// Step back one entry and return it, or `None` if there is no earlier entry.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        let cursor = self.cursor.filter(|&c| c > 0)? - 1;
        self.cursor = Some(cursor);
        self.entries.get(cursor)
    }

    /// Step forward one entry and return it, or `None` if already at the tail.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        let cursor = self.cursor.filter(|&c| c + 1 < self.entries.len())? + 1;
        self.cursor = Some(cursor);
        self.entries.get(cursor)
    }

    /// Whether an earlier entry exists.
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    /// Whether a later entry exists.
    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// The entry under the cursor.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor?)
    }

    /// Cursor position (`None` when empty).
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry has been pushed (or all were cleared).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of entries before the cursor.
    pub fn undo_depth(&self) -> usize {
        self.cursor.unwrap_or(0)
    }

    /// Number of entries after the cursor.
    pub fn redo_depth(&self) -> usize {
        self.cursor
            .map_or(0, |c| self.entries.len().saturating_sub(c + 1))
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}
