//! Page Store
//!
//! The mutation API of the visual builder and the single owner of a page's document state.
//!
//! # Overview
//!
//! [`PageStore`] owns the [`NodeRepository`], the selection/hover cursors, the drag marker, the
//! clipboard and the [`HistoryManager`]. It is constructed explicitly and handed to whatever UI
//! component needs it; there is no global instance.
//!
//! Every operation runs to completion before it returns. Operations that change the forest:
//!
//! 1. mutate the repository,
//! 2. mark the page dirty,
//! 3. push a history snapshot (forest + selection),
//! 4. bump the version and notify subscribers.
//!
//! Subscribers are only called after step 3, so they never observe a half-applied mutation.
//!
//! Operations on unknown ids are silent no-ops; the `bool` / `Option<NodeId>` return values let
//! callers tell whether anything happened, but nothing is raised.
//!
//! # Example
//!
//! ```rust
//! use builder_core::{BuilderConfig, NodeSpec, PageStore, SequentialIdGenerator};
//!
//! let mut store = PageStore::with_id_generator(BuilderConfig::default(), SequentialIdGenerator::new("n"));
//!
//! let section = store.add(NodeSpec::new("section"), None).unwrap();
//! assert_eq!(store.selected_id(), Some(&section));
//! assert!(store.is_dirty());
//!
//! store.undo();
//! assert!(store.roots().is_empty());
//! assert_eq!(store.selected_id(), None);
//! assert!(!store.is_dirty());
//! ```

use crate::clipboard::Clipboard;
use crate::config::BuilderConfig;
use crate::drop_target::{DropTarget, DropTargetError};
use crate::error::{BuilderError, PersistenceError};
use crate::history::HistoryManager;
use crate::id::{IdGenerator, UuidIdGenerator};
use crate::node::{ComponentNode, ComponentTree, NodeId, NodePatch, NodeSpec};
use crate::persistence::PersistenceGateway;
use crate::repository::NodeRepository;
use crate::selection::{DragState, SelectionState};

/// State change type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChangeType {
    /// The forest was mutated (add/remove/update/move/duplicate/paste).
    ForestChanged,
    /// The selected id changed.
    SelectionChanged,
    /// The hovered id changed.
    HoverChanged,
    /// A drag started or ended.
    DragChanged,
    /// Undo/redo replaced the forest and selection.
    HistoryRestored,
    /// A page was opened, loaded or reset.
    PageOpened,
    /// The page was saved (dirty flag cleared).
    Saved,
}

/// State change record
#[derive(Debug, Clone)]
pub struct StateChange {
    /// Change type
    pub change_type: StateChangeType,
    /// Old version number
    pub old_version: u64,
    /// New version number
    pub new_version: u64,
    /// Nodes directly affected (created, removed, updated or moved ids). May be empty.
    pub affected: Vec<NodeId>,
}

/// State change callback function type
pub type StateChangeCallback = Box<dyn FnMut(&StateChange) + Send>;

/// Summary of a page's document state, for status bars and hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    /// Total number of nodes.
    pub node_count: usize,
    /// Number of root nodes.
    pub root_count: usize,
    /// Unsaved changes exist.
    pub is_dirty: bool,
    /// State version number.
    pub version: u64,
    /// Undo available.
    pub can_undo: bool,
    /// Redo available.
    pub can_redo: bool,
    /// Retained history entries.
    pub history_len: usize,
    /// Selected id.
    pub selected: Option<NodeId>,
    /// Hovered id.
    pub hovered: Option<NodeId>,
    /// Dragged id.
    pub dragged: Option<NodeId>,
}

/// The document state of one open page.
pub struct PageStore {
    config: BuilderConfig,
    repo: NodeRepository,
    selection: SelectionState,
    drag: DragState,
    clipboard: Clipboard,
    history: HistoryManager,
    ids: Box<dyn IdGenerator + Send>,
    is_dirty: bool,
    /// Sequence number of the history entry matching the last save.
    saved_seq: Option<u64>,
    state_version: u64,
    callbacks: Vec<StateChangeCallback>,
}

impl PageStore {
    /// Empty page with UUID ids.
    pub fn new(config: BuilderConfig) -> Self {
        Self::with_id_generator(config, UuidIdGenerator)
    }

    /// Empty page with a custom id generator.
    pub fn with_id_generator(
        config: BuilderConfig,
        ids: impl IdGenerator + Send + 'static,
    ) -> Self {
        let history = HistoryManager::new(config.history_limit);
        let mut store = Self {
            config,
            repo: NodeRepository::new(),
            selection: SelectionState::default(),
            drag: DragState::default(),
            clipboard: Clipboard::default(),
            history,
            ids: Box::new(ids),
            is_dirty: false,
            saved_seq: None,
            state_version: 0,
            callbacks: Vec::new(),
        };
        store.saved_seq = Some(store.history.push(NodeRepository::new(), None));
        store
    }

    // ---------------------------------------------------------------------
    // Page lifecycle
    // ---------------------------------------------------------------------

    /// Replace the document with a serialized forest and start a fresh history.
    ///
    /// The opened state is the first history entry (never undone past) and counts as saved.
    /// On a validation error the current document is left untouched.
    pub fn open_page(&mut self, forest: &[ComponentTree]) -> Result<(), BuilderError> {
        let repo = NodeRepository::from_forest(forest)?;
        tracing::info!(nodes = repo.len(), roots = repo.roots().len(), "page opened");
        self.install(repo);
        Ok(())
    }

    /// Discard the document and its history, leaving an empty clean page.
    pub fn reset(&mut self) {
        tracing::debug!("page reset");
        self.install(NodeRepository::new());
    }

    fn install(&mut self, repo: NodeRepository) {
        self.repo = repo;
        self.selection = SelectionState::default();
        self.drag = DragState::default();
        self.history.clear();
        self.saved_seq = Some(self.history.push(self.repo.clone(), None));
        self.is_dirty = false;
        self.bump(StateChangeType::PageOpened, Vec::new());
    }

    /// Load the page from a gateway (see [`Self::open_page`]).
    pub fn load(&mut self, gateway: &mut dyn PersistenceGateway) -> Result<(), BuilderError> {
        let forest = gateway.load()?;
        self.open_page(&forest)
    }

    /// Save the page through a gateway. On success the page becomes clean; on failure it stays dirty.
    pub fn save(&mut self, gateway: &mut dyn PersistenceGateway) -> Result<(), PersistenceError> {
        let forest = self.to_forest();
        gateway.save(&forest)?;
        tracing::info!(roots = forest.len(), "page saved");
        self.mark_saved();
        Ok(())
    }

    /// Mark the current state as saved (e.g. after the host persisted [`Self::to_forest`] itself).
    pub fn mark_saved(&mut self) {
        self.saved_seq = self.history.current().map(|entry| entry.seq());
        self.is_dirty = false;
        self.bump(StateChangeType::Saved, Vec::new());
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// The underlying repository.
    pub fn repository(&self) -> &NodeRepository {
        &self.repo
    }

    /// Find a node anywhere in the forest.
    pub fn find(&self, id: &NodeId) -> Option<&ComponentNode> {
        self.repo.get(id)
    }

    /// Ancestor chain root → `id` (inclusive). Empty if `id` is unknown.
    pub fn path_to(&self, id: &NodeId) -> Vec<&ComponentNode> {
        self.repo
            .path_to(id)
            .iter()
            .filter_map(|ancestor| self.repo.get(ancestor))
            .collect()
    }

    /// Root nodes in order.
    pub fn roots(&self) -> Vec<&ComponentNode> {
        self.repo
            .roots()
            .iter()
            .filter_map(|root| self.repo.get(root))
            .collect()
    }

    /// Deep copy of the forest in its serialized form.
    pub fn to_forest(&self) -> Vec<ComponentTree> {
        self.repo.to_forest()
    }

    /// Selected id, if any.
    pub fn selected_id(&self) -> Option<&NodeId> {
        self.selection.selected.as_ref()
    }

    /// Selected node, if the selected id resolves.
    pub fn selected_node(&self) -> Option<&ComponentNode> {
        self.selected_id().and_then(|id| self.repo.get(id))
    }

    /// Hovered id, if any.
    pub fn hovered_id(&self) -> Option<&NodeId> {
        self.selection.hovered.as_ref()
    }

    /// Id of the node being dragged.
    pub fn dragged_id(&self) -> Option<&NodeId> {
        self.drag.dragged.as_ref()
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// The clipboard.
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// The history.
    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// Unsaved changes exist.
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Active configuration.
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Can undo
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Can redo
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Get current version number
    pub fn version(&self) -> u64 {
        self.state_version
    }

    /// Check if state has changed since a version
    pub fn has_changed_since(&self, version: u64) -> bool {
        self.state_version > version
    }

    /// Summary of the document state.
    pub fn get_page_state(&self) -> PageState {
        PageState {
            node_count: self.repo.len(),
            root_count: self.repo.roots().len(),
            is_dirty: self.is_dirty,
            version: self.state_version,
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            history_len: self.history.len(),
            selected: self.selection.selected.clone(),
            hovered: self.selection.hovered.clone(),
            dragged: self.drag.dragged.clone(),
        }
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Add a node (or template subtree) as the last child of `parent` (or last root) and select it.
    ///
    /// No-op returning `None` if `parent` is given but does not exist; the node is not placed at
    /// the root instead.
    pub fn add(&mut self, spec: NodeSpec, parent: Option<&NodeId>) -> Option<NodeId> {
        let Some(id) = self
            .repo
            .insert_spec(&spec, parent, None, self.ids.as_mut())
        else {
            tracing::trace!(?parent, "add skipped: parent not found");
            return None;
        };
        tracing::debug!(%id, component_type = %spec.component_type, ?parent, "node added");
        self.selection.selected = Some(id.clone());
        self.commit(vec![id.clone()]);
        Some(id)
    }

    /// Remove a node and its subtree. Clears selection/hover/drag slots that pointed into it.
    pub fn remove(&mut self, id: &NodeId) -> bool {
        let removed = self.repo.remove_subtree(id);
        if removed.is_empty() {
            tracing::trace!(%id, "remove skipped: node not found");
            return false;
        }
        tracing::debug!(%id, count = removed.len(), "subtree removed");

        let (selection_cleared, hover_cleared) = self.selection.forget(&removed);
        let drag_cleared = self.drag.retain_in(&self.repo);
        self.commit(removed);

        if selection_cleared {
            self.bump(StateChangeType::SelectionChanged, Vec::new());
        }
        if hover_cleared {
            self.bump(StateChangeType::HoverChanged, Vec::new());
        }
        if drag_cleared {
            self.bump(StateChangeType::DragChanged, Vec::new());
        }
        true
    }

    /// Merge `patch` into a node. No-op if the node is unknown or nothing would change.
    pub fn update(&mut self, id: &NodeId, patch: NodePatch) -> bool {
        if !self.repo.update(id, &patch) {
            tracing::trace!(%id, "update skipped: node not found or unchanged");
            return false;
        }
        tracing::debug!(%id, "node updated");
        self.commit(vec![id.clone()]);
        true
    }

    /// Move a node (with its subtree) under `parent` (`None` = root list) at sibling position
    /// `index`, counted after the node has been detached.
    ///
    /// Works for reorders within a parent, reparenting and moves to/from the root list. No-op if
    /// either id is unknown, the destination lies inside the moved subtree, or the node is
    /// already there.
    pub fn move_node(&mut self, id: &NodeId, parent: Option<&NodeId>, index: usize) -> bool {
        if !self.repo.move_node(id, parent, index) {
            tracing::trace!(%id, ?parent, index, "move skipped");
            return false;
        }
        tracing::debug!(%id, ?parent, index, "node moved");
        self.commit(vec![id.clone()]);
        true
    }

    /// Deep-copy a subtree with fresh ids, insert it right after the original and select it.
    pub fn duplicate(&mut self, id: &NodeId) -> Option<NodeId> {
        let (Some(tree), Some((parent, index))) = (self.repo.to_tree(id), self.repo.position_of(id))
        else {
            tracing::trace!(%id, "duplicate skipped: node not found");
            return None;
        };
        let copy = self.repo.insert_spec(
            &NodeSpec::from(&tree),
            parent.as_ref(),
            Some(index + 1),
            self.ids.as_mut(),
        )?;
        tracing::debug!(%id, %copy, count = tree.node_count(), "subtree duplicated");
        self.selection.selected = Some(copy.clone());
        self.commit(vec![copy.clone()]);
        Some(copy)
    }

    /// Put a deep copy of a subtree in the clipboard, replacing its previous contents.
    pub fn copy(&mut self, id: &NodeId) -> bool {
        let Some(tree) = self.repo.to_tree(id) else {
            tracing::trace!(%id, "copy skipped: node not found");
            return false;
        };
        tracing::debug!(%id, count = tree.node_count(), "subtree copied");
        self.clipboard.copy(tree);
        true
    }

    /// Add a fresh-id copy of the clipboard contents under `parent` (see [`Self::add`]).
    ///
    /// No-op if the clipboard is empty. The clipboard keeps its contents, so pasting again yields
    /// another independent subtree.
    pub fn paste(&mut self, parent: Option<&NodeId>) -> Option<NodeId> {
        let Some(spec) = self.clipboard.paste() else {
            tracing::trace!("paste skipped: clipboard empty");
            return None;
        };
        self.add(spec, parent)
    }

    // ---------------------------------------------------------------------
    // Cursors
    // ---------------------------------------------------------------------

    /// Set or clear the selection. The id is not validated.
    pub fn select(&mut self, id: Option<NodeId>) {
        if self.selection.selected != id {
            self.selection.selected = id;
            self.bump(StateChangeType::SelectionChanged, Vec::new());
        }
    }

    /// Set or clear the hover cursor. The id is not validated.
    pub fn hover(&mut self, id: Option<NodeId>) {
        if self.selection.hovered != id {
            self.selection.hovered = id;
            self.bump(StateChangeType::HoverChanged, Vec::new());
        }
    }

    /// Mark `id` as being dragged.
    pub fn start_drag(&mut self, id: NodeId) {
        if self.drag.dragged.as_ref() != Some(&id) {
            self.drag.dragged = Some(id);
            self.bump(StateChangeType::DragChanged, Vec::new());
        }
    }

    /// Clear the drag marker.
    pub fn end_drag(&mut self) {
        if self.drag.dragged.take().is_some() {
            self.bump(StateChangeType::DragChanged, Vec::new());
        }
    }

    /// Decode a drop-zone descriptor and move `dragged` there. Ends any drag in progress.
    ///
    /// A malformed descriptor is an error; everything else (unknown ids, dropping a node where it
    /// already is, dropping into its own subtree) is a no-op returning `Ok(false)`.
    pub fn drop_node(&mut self, dragged: &NodeId, descriptor: &str) -> Result<bool, DropTargetError> {
        let target: DropTarget = descriptor.parse()?;
        Ok(self.drop_on(dragged, &target))
    }

    /// Move `dragged` to an already decoded drop target. Ends any drag in progress.
    pub fn drop_on(&mut self, dragged: &NodeId, target: &DropTarget) -> bool {
        self.end_drag();
        match target.resolve(&self.repo, dragged) {
            Some((parent, index)) => self.move_node(dragged, parent.as_ref(), index),
            None => {
                tracing::trace!(%dragged, %target, "drop onto own slot ignored");
                false
            }
        }
    }

    // ---------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------

    /// Restore the previous snapshot. No-op at the earliest entry.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.undo() else {
            return false;
        };
        let (repo, selected, seq) = (entry.forest().clone(), entry.selected().cloned(), entry.seq());
        tracing::debug!(seq, "undo");
        self.restore(repo, selected, seq);
        true
    }

    /// Restore the next snapshot. No-op at the latest entry.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.redo() else {
            return false;
        };
        let (repo, selected, seq) = (entry.forest().clone(), entry.selected().cloned(), entry.seq());
        tracing::debug!(seq, "redo");
        self.restore(repo, selected, seq);
        true
    }

    fn restore(&mut self, repo: NodeRepository, selected: Option<NodeId>, seq: u64) {
        self.repo = repo;
        self.selection.selected = selected;
        self.selection.retain_hover_in(&self.repo);
        self.drag.retain_in(&self.repo);
        self.is_dirty = self.saved_seq != Some(seq);
        self.bump(StateChangeType::HistoryRestored, Vec::new());
    }

    // ---------------------------------------------------------------------
    // Notifications
    // ---------------------------------------------------------------------

    /// Subscribe to state changes
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&StateChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    fn commit(&mut self, affected: Vec<NodeId>) {
        debug_assert!(
            self.repo.check_invariants().is_ok(),
            "forest invariants violated: {:?}",
            self.repo.check_invariants()
        );
        self.is_dirty = true;
        self.history
            .push(self.repo.clone(), self.selection.selected.clone());
        self.bump(StateChangeType::ForestChanged, affected);
    }

    fn bump(&mut self, change_type: StateChangeType, affected: Vec<NodeId>) {
        let old_version = self.state_version;
        self.state_version += 1;
        let change = StateChange {
            change_type,
            old_version,
            new_version: self.state_version,
            affected,
        };
        for callback in &mut self.callbacks {
            callback(&change);
        }
    }
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new(BuilderConfig::default())
    }
}

impl std::fmt::Debug for PageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageStore")
            .field("config", &self.config)
            .field("repo", &self.repo)
            .field("selection", &self.selection)
            .field("drag", &self.drag)
            .field("history_len", &self.history.len())
            .field("is_dirty", &self.is_dirty)
            .field("state_version", &self.state_version)
            .finish_non_exhaustive()
    }
}
