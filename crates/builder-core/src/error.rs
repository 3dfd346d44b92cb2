use crate::commands::CommandError;
use crate::drop_target::DropTargetError;
use crate::node::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Structural problems found in a forest (on load or by [`crate::NodeRepository::check_invariants`]).
pub enum ForestError {
    #[error("duplicate node id '{0}'")]
    /// The same id appears twice in the forest.
    DuplicateId(NodeId),

    #[error("duplicate order {order} among children of {}", parent_label(.parent))]
    /// Two siblings share an `order` value.
    DuplicateOrder {
        /// Parent of the clashing siblings (`None` = root list).
        parent: Option<NodeId>,
        /// The clashing order value.
        order: i64,
    },

    #[error("node '{0}' is referenced but missing from the arena")]
    /// A child or root entry points at an id with no node record.
    DanglingId(NodeId),

    #[error("node '{0}' is not reachable from exactly one root")]
    /// Cycle, orphan or multiply-owned node.
    Unreachable(NodeId),

    #[error("node '{id}' has parent_id {} but is owned by {}", parent_label(.recorded), parent_label(.actual))]
    /// `parent_id` disagrees with the node that lists it as a child.
    ParentMismatch {
        /// Node whose back-reference is wrong.
        id: NodeId,
        /// Value stored in `parent_id`.
        recorded: Option<NodeId>,
        /// Actual owner.
        actual: Option<NodeId>,
    },

    #[error("children of {} are not sorted by order", parent_label(.0))]
    /// Sibling array order disagrees with `order` values.
    OrderMismatch(Option<NodeId>),
}

fn parent_label(parent: &Option<NodeId>) -> String {
    match parent {
        Some(id) => format!("'{id}'"),
        None => "root".to_string(),
    }
}

#[derive(Debug, Error)]
/// Failures of a [`crate::PersistenceGateway`].
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    /// The page could not be (de)serialized.
    Json(#[from] serde_json::Error),

    #[error("save rejected: {0}")]
    /// The backend refused the save.
    Rejected(String),
}

#[derive(Debug, Error)]
/// Configuration loading/validation failures.
pub enum ConfigError {
    #[error("I/O error: {0}")]
    /// The config file could not be read.
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    /// The config file is not valid TOML for [`crate::BuilderConfig`].
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    /// A value is out of range.
    Invalid(String),
}

#[derive(Debug, Error)]
/// Umbrella error for the kernel's fallible entry points.
pub enum BuilderError {
    #[error(transparent)]
    /// Structural validation failed.
    Forest(#[from] ForestError),

    #[error(transparent)]
    /// Persistence gateway failed.
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    /// Configuration is unusable.
    Config(#[from] ConfigError),

    #[error(transparent)]
    /// A drop-target descriptor could not be decoded.
    DropTarget(#[from] DropTargetError),

    #[error(transparent)]
    /// A command could not be executed.
    Command(CommandError),
}

impl From<CommandError> for BuilderError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::DropTarget(err) => Self::DropTarget(err),
            other => Self::Command(other),
        }
    }
}
