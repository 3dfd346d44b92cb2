//! Drop-Target Resolver
//!
//! Decodes the drop-zone descriptors rendered by the canvas into a destination slot.
//!
//! # Wire format
//!
//! ```text
//! dropzone-{parentId | "root"}-{index}
//! ```
//!
//! `index` names a gap in the destination's sibling list as rendered *before* the drag started:
//! gap `0` is before the first child, gap `n` after the `n`-th. Parent ids may themselves contain
//! `-` (UUIDs do); the index is always the last `-`-separated field. The `dropzone-` prefix is
//! optional on input and always emitted on output.
//!
//! # Example
//!
//! ```rust
//! use builder_core::{DropTarget, NodeId};
//!
//! let target: DropTarget = "dropzone-root-2".parse().unwrap();
//! assert_eq!(target, DropTarget::root(2));
//!
//! let target: DropTarget = "dropzone-5f1c-77aa-3".parse().unwrap();
//! assert_eq!(target.parent, Some(NodeId::from("5f1c-77aa")));
//! assert_eq!(target.to_string(), "dropzone-5f1c-77aa-3");
//! ```

use crate::node::NodeId;
use crate::repository::NodeRepository;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Sentinel used in descriptors for the forest root list.
pub const ROOT_SENTINEL: &str = "root";

static DESCRIPTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(dropzone-)?(.+)-([0-9]+)$").expect("drop-zone descriptor regex is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// A drop-zone descriptor that cannot be decoded.
pub enum DropTargetError {
    #[error("malformed drop-zone descriptor '{0}'")]
    /// The string does not match `dropzone-{parent}-{index}`.
    Malformed(String),

    #[error("drop-zone index out of range in '{0}'")]
    /// The index does not fit in `usize`.
    IndexOutOfRange(String),
}

/// A decoded drop destination: a gap in a sibling list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DropTarget {
    /// Destination parent (`None` = forest root list).
    pub parent: Option<NodeId>,
    /// Gap index in the pre-move sibling list.
    pub index: usize,
}

impl DropTarget {
    /// Gap `index` in the root list.
    pub fn root(index: usize) -> Self {
        Self {
            parent: None,
            index,
        }
    }

    /// Gap `index` under `parent`.
    pub fn under(parent: impl Into<NodeId>, index: usize) -> Self {
        Self {
            parent: Some(parent.into()),
            index,
        }
    }

    /// The descriptor of the slot `id` currently occupies.
    pub fn of(repo: &NodeRepository, id: &NodeId) -> Option<Self> {
        let (parent, index) = repo.position_of(id)?;
        Some(Self { parent, index })
    }

    /// Translate this drop target into the `(parent, index)` arguments of a move of `dragged`.
    ///
    /// Returns `None` when dropping would leave the node where it is (its own slot or the gap
    /// right after it) or when `dragged` is unknown. Gap indexes past the dragged node's own slot
    /// are shifted down by one, since the node is detached before it is reinserted.
    pub fn resolve(
        &self,
        repo: &NodeRepository,
        dragged: &NodeId,
    ) -> Option<(Option<NodeId>, usize)> {
        let source = Self::of(repo, dragged)?;
        if source.parent != self.parent {
            return Some((self.parent.clone(), self.index));
        }
        if self.index == source.index || self.index == source.index + 1 {
            return None;
        }
        let index = if self.index > source.index {
            self.index - 1
        } else {
            self.index
        };
        Some((self.parent.clone(), index))
    }
}

impl fmt::Display for DropTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent {
            Some(parent) => write!(f, "dropzone-{}-{}", parent, self.index),
            None => write!(f, "dropzone-{}-{}", ROOT_SENTINEL, self.index),
        }
    }
}

impl FromStr for DropTarget {
    type Err = DropTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = DESCRIPTOR
            .captures(s)
            .ok_or_else(|| DropTargetError::Malformed(s.to_string()))?;
        let parent = &captures[2];
        // "dropzone-3" has no parent field; the bare prefix is not a node id.
        if captures.get(1).is_none() && parent == "dropzone" {
            return Err(DropTargetError::Malformed(s.to_string()));
        }
        let index = captures[3]
            .parse::<usize>()
            .map_err(|_| DropTargetError::IndexOutOfRange(s.to_string()))?;

        Ok(Self {
            parent: (parent != ROOT_SENTINEL).then(|| NodeId::from(parent)),
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIdGenerator;
    use crate::node::NodeSpec;

    #[test]
    fn test_parse_descriptors() {
        assert_eq!(
            "dropzone-root-0".parse::<DropTarget>(),
            Ok(DropTarget::root(0))
        );
        assert_eq!("root-4".parse::<DropTarget>(), Ok(DropTarget::root(4)));
        assert_eq!(
            "dropzone-abc-12".parse::<DropTarget>(),
            Ok(DropTarget::under("abc", 12))
        );
        assert_eq!(
            "dropzone-1b4e28ba-2fa1-11d2-883f-0016d3cca427-1".parse::<DropTarget>(),
            Ok(DropTarget::under("1b4e28ba-2fa1-11d2-883f-0016d3cca427", 1))
        );
        assert_eq!(
            "dropzone-dropzone-3".parse::<DropTarget>(),
            Ok(DropTarget::under("dropzone", 3))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in [
            "",
            "dropzone-",
            "dropzone-root",
            "dropzone-root-x",
            "-3",
            "dropzone-root-1x",
            "dropzone-3",
        ] {
            assert_eq!(
                bad.parse::<DropTarget>(),
                Err(DropTargetError::Malformed(bad.to_string())),
                "{bad:?}"
            );
        }
        let huge = "dropzone-root-99999999999999999999999999";
        assert_eq!(
            huge.parse::<DropTarget>(),
            Err(DropTargetError::IndexOutOfRange(huge.to_string()))
        );
    }

    #[test]
    fn test_display_matches_wire_format() {
        assert_eq!(DropTarget::root(3).to_string(), "dropzone-root-3");
        assert_eq!(DropTarget::under("n-1", 0).to_string(), "dropzone-n-1-0");
        assert_eq!(
            "dropzone-n-1-0".parse::<DropTarget>(),
            Ok(DropTarget::under("n-1", 0))
        );
    }

    #[test]
    fn test_resolve_translates_gaps() {
        let mut ids = SequentialIdGenerator::new("n");
        let mut repo = NodeRepository::new();
        for _ in 0..3 {
            repo.insert_spec(&NodeSpec::new("box"), None, None, &mut ids);
        }
        let first = NodeId::from("n-1");

        // Own slot and the gap after it are no-ops.
        assert_eq!(DropTarget::root(0).resolve(&repo, &first), None);
        assert_eq!(DropTarget::root(1).resolve(&repo, &first), None);
        // Gap after the last root: index 3 before detaching, 2 after.
        assert_eq!(DropTarget::root(3).resolve(&repo, &first), Some((None, 2)));

        let last = NodeId::from("n-3");
        assert_eq!(DropTarget::root(0).resolve(&repo, &last), Some((None, 0)));

        assert_eq!(
            DropTarget::under("n-2", 0).resolve(&repo, &first),
            Some((Some(NodeId::from("n-2")), 0))
        );
        assert_eq!(DropTarget::root(0).resolve(&repo, &NodeId::from("x")), None);
        assert_eq!(DropTarget::of(&repo, &last), Some(DropTarget::root(2)));
    }
}
