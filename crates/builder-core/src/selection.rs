//! Selection / hover cursors and drag state.

use crate::node::NodeId;
use crate::repository::NodeRepository;

/// The selected and hovered node ids.
///
/// Setting a slot performs no validation: a UI flow may select an id before the node that carries
/// it has been created. Removal and history restoration keep the slots pointing at live nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    /// Currently selected node.
    pub selected: Option<NodeId>,
    /// Node under the pointer.
    pub hovered: Option<NodeId>,
}

impl SelectionState {
    /// Clear every slot that references one of `removed`.
    ///
    /// Returns `(selection_cleared, hover_cleared)`.
    pub fn forget(&mut self, removed: &[NodeId]) -> (bool, bool) {
        (
            clear_if(&mut self.selected, |id| removed.contains(id)),
            clear_if(&mut self.hovered, |id| removed.contains(id)),
        )
    }

    /// Clear the hover slot if it references a node absent from `repo`.
    pub fn retain_hover_in(&mut self, repo: &NodeRepository) -> bool {
        clear_if(&mut self.hovered, |id| !repo.contains(id))
    }
}

/// Drag-in-progress marker. Lets the host suppress contradictory interactions (hover highlighting)
/// while a node is being dragged; mutations do not consult it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragState {
    /// Node being dragged.
    pub dragged: Option<NodeId>,
}

impl DragState {
    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    /// Cancel the drag if the dragged node is gone from `repo`.
    pub fn retain_in(&mut self, repo: &NodeRepository) -> bool {
        clear_if(&mut self.dragged, |id| !repo.contains(id))
    }
}

fn clear_if(slot: &mut Option<NodeId>, predicate: impl FnOnce(&NodeId) -> bool) -> bool {
    if slot.as_ref().is_some_and(predicate) {
        *slot = None;
        true
    } else {
        false
    }
}
