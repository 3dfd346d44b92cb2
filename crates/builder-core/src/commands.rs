//! Command Interface Layer
//!
//! A serializable command for every [`PageStore`] operation, so hosts and scripts can drive the
//! builder with plain JSON.
//!
//! # Overview
//!
//! Commands are internally tagged by `op`:
//!
//! ```json
//! [
//!   {"op": "add", "spec": {"type": "section"}},
//!   {"op": "add", "spec": {"type": "text", "props": {"text": "Hi"}}, "parent": "n-1"},
//!   {"op": "move", "id": "n-2", "parent": null, "index": 0},
//!   {"op": "undo"}
//! ]
//! ```
//!
//! Silent no-ops of the underlying operation surface as [`CommandResult::NoOp`]; only inputs that
//! cannot be interpreted at all produce a [`CommandError`].
//!
//! # Example
//!
//! ```rust
//! use builder_core::{Command, CommandResult, NodeId, NodeSpec, PageStore, BuilderConfig, SequentialIdGenerator};
//!
//! let mut store = PageStore::with_id_generator(BuilderConfig::default(), SequentialIdGenerator::new("n"));
//!
//! let result = store.execute(Command::Add { spec: NodeSpec::new("section"), parent: None }).unwrap();
//! assert_eq!(result, CommandResult::Created(NodeId::from("n-1")));
//!
//! let commands: Vec<Command> = serde_json::from_str(r#"[{"op":"undo"},{"op":"undo"}]"#).unwrap();
//! let results = store.execute_batch(commands).unwrap();
//! assert_eq!(results, vec![CommandResult::Success, CommandResult::NoOp]);
//! ```

use crate::drop_target::DropTargetError;
use crate::node::{NodeId, NodePatch, NodeSpec};
use crate::store::PageStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified command enum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Add a node (or template subtree) as the last child of `parent` (or last root).
    Add {
        /// What to create.
        spec: NodeSpec,
        /// Destination parent (`None` = root list).
        #[serde(default)]
        parent: Option<NodeId>,
    },
    /// Remove a node with its subtree.
    Remove {
        /// Node to remove.
        id: NodeId,
    },
    /// Merge a patch into a node.
    Update {
        /// Node to update.
        id: NodeId,
        /// Changes to apply.
        patch: NodePatch,
    },
    /// Move a node to `index` (post-detach) under `parent`.
    Move {
        /// Node to move.
        id: NodeId,
        /// Destination parent (`None` = root list).
        #[serde(default)]
        parent: Option<NodeId>,
        /// Destination sibling position.
        index: usize,
    },
    /// Duplicate a subtree next to the original.
    Duplicate {
        /// Node to duplicate.
        id: NodeId,
    },
    /// Copy a subtree into the clipboard.
    Copy {
        /// Node to copy.
        id: NodeId,
    },
    /// Paste the clipboard under `parent` (or at the end of the root list).
    Paste {
        /// Destination parent.
        #[serde(default)]
        parent: Option<NodeId>,
    },
    /// Set or clear the selection.
    Select {
        /// Selected id.
        #[serde(default)]
        id: Option<NodeId>,
    },
    /// Set or clear the hover cursor.
    Hover {
        /// Hovered id.
        #[serde(default)]
        id: Option<NodeId>,
    },
    /// Begin dragging a node.
    StartDrag {
        /// Dragged node.
        id: NodeId,
    },
    /// Abort the drag in progress.
    EndDrag,
    /// Drop a node on a drop-zone descriptor.
    Drop {
        /// Dragged node; defaults to the drag in progress.
        #[serde(default)]
        id: Option<NodeId>,
        /// `dropzone-{parent|root}-{index}`.
        target: String,
    },
    /// Undo the last mutation.
    Undo,
    /// Redo the last undone mutation.
    Redo,
}

/// Command execution result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "id", rename_all = "snake_case")]
pub enum CommandResult {
    /// The command took effect.
    Success,
    /// The command created a node (add, duplicate, paste).
    Created(NodeId),
    /// The command was a silent no-op (unknown id, empty clipboard, nothing to undo...).
    NoOp,
}

impl CommandResult {
    fn from_flag(applied: bool) -> Self {
        if applied { Self::Success } else { Self::NoOp }
    }

    fn from_created(created: Option<NodeId>) -> Self {
        created.map_or(Self::NoOp, Self::Created)
    }

    /// Whether the command had an effect.
    pub fn is_applied(&self) -> bool {
        !matches!(self, Self::NoOp)
    }
}

/// Command error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    /// The drop descriptor could not be decoded.
    DropTarget(#[from] DropTargetError),

    #[error("drop without a dragged node")]
    /// `Drop` named no node and no drag was in progress.
    NoDragInProgress,
}

impl PageStore {
    /// Execute command
    pub fn execute(&mut self, command: Command) -> Result<CommandResult, CommandError> {
        tracing::trace!(?command, "execute");
        let result = match command {
            Command::Add { spec, parent } => {
                CommandResult::from_created(self.add(spec, parent.as_ref()))
            }
            Command::Remove { id } => CommandResult::from_flag(self.remove(&id)),
            Command::Update { id, patch } => CommandResult::from_flag(self.update(&id, patch)),
            Command::Move { id, parent, index } => {
                CommandResult::from_flag(self.move_node(&id, parent.as_ref(), index))
            }
            Command::Duplicate { id } => CommandResult::from_created(self.duplicate(&id)),
            Command::Copy { id } => CommandResult::from_flag(self.copy(&id)),
            Command::Paste { parent } => CommandResult::from_created(self.paste(parent.as_ref())),
            Command::Select { id } => {
                self.select(id);
                CommandResult::Success
            }
            Command::Hover { id } => {
                self.hover(id);
                CommandResult::Success
            }
            Command::StartDrag { id } => {
                self.start_drag(id);
                CommandResult::Success
            }
            Command::EndDrag => CommandResult::from_flag({
                let dragging = self.is_dragging();
                self.end_drag();
                dragging
            }),
            Command::Drop { id, target } => {
                let dragged = id
                    .or_else(|| self.dragged_id().cloned())
                    .ok_or(CommandError::NoDragInProgress)?;
                CommandResult::from_flag(self.drop_node(&dragged, &target)?)
            }
            Command::Undo => CommandResult::from_flag(self.undo()),
            Command::Redo => CommandResult::from_flag(self.redo()),
        };
        Ok(result)
    }

    /// Batch execute commands, stopping at the first error.
    ///
    /// Commands before the failing one stay applied (each is its own undo step).
    pub fn execute_batch(
        &mut self,
        commands: Vec<Command>,
    ) -> Result<Vec<CommandResult>, CommandError> {
        let mut results = Vec::with_capacity(commands.len());

        for command in commands {
            let result = self.execute(command)?;
            results.push(result);
        }

        Ok(results)
    }
}
