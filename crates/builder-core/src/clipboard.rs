//! One-slot component clipboard.

use crate::node::{ComponentTree, NodeSpec};

/// Holds a deep copy of one subtree. Copying overwrites the slot; pasting leaves it intact so the
/// same contents can be pasted repeatedly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clipboard {
    slot: Option<ComponentTree>,
}

impl Clipboard {
    /// Replace the clipboard contents.
    pub fn copy(&mut self, tree: ComponentTree) {
        self.slot = Some(tree);
    }

    /// Contents as a spec ready to be instantiated with fresh ids. `None` when empty.
    pub fn paste(&self) -> Option<NodeSpec> {
        self.slot.as_ref().map(NodeSpec::from)
    }

    /// The copied subtree, with the ids it had when copied.
    pub fn contents(&self) -> Option<&ComponentTree> {
        self.slot.as_ref()
    }

    /// Whether nothing has been copied.
    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}
