//! Node Repository
//!
//! Owns the canonical set of component nodes of one page.
//!
//! # Overview
//!
//! Nodes live in an id-indexed arena; a node's `children` is an ordered list of ids and each
//! non-root node carries its parent's id. Ownership is still exclusive: every id appears in exactly
//! one sibling list (a parent's `children` or the root list), and removing a node removes its whole
//! subtree from the arena.
//!
//! The repository keeps these invariants after every public method:
//!
//! - the graph is a forest (no cycles, every node reachable from exactly one root)
//! - ids are unique
//! - `parent_id` matches the node whose sibling list contains the id
//! - sibling `order` values equal their array position after any insertion or detachment
//!
//! [`NodeRepository::check_invariants`] verifies all of them and is used by tests.
//!
//! # Example
//!
//! ```rust
//! use builder_core::{NodeRepository, NodeSpec, SequentialIdGenerator};
//!
//! let mut ids = SequentialIdGenerator::new("n");
//! let mut repo = NodeRepository::new();
//!
//! let page = repo.insert_spec(&NodeSpec::new("section"), None, None, &mut ids).unwrap();
//! let text = repo.insert_spec(&NodeSpec::new("text"), Some(&page), None, &mut ids).unwrap();
//!
//! assert_eq!(repo.path_to(&text), vec![page.clone(), text.clone()]);
//! assert!(repo.move_node(&text, None, 0));
//! assert_eq!(repo.roots(), &[text, page]);
//! assert!(repo.check_invariants().is_ok());
//! ```

use crate::error::ForestError;
use crate::id::IdGenerator;
use crate::node::{ComponentNode, ComponentTree, NodeId, NodePatch, NodeSpec};
use std::collections::{HashMap, HashSet};

/// Id-indexed arena of component nodes plus the ordered root list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeRepository {
    nodes: HashMap<NodeId, ComponentNode>,
    roots: Vec<NodeId>,
}

impl NodeRepository {
    /// Create an empty forest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from its serialized form.
    ///
    /// Siblings are ordered by their `order` value, then renumbered to their position. When sibling
    /// orders are not unique (hand-written pages often omit them) the array position is used instead.
    pub fn from_forest(forest: &[ComponentTree]) -> Result<Self, ForestError> {
        let mut repo = Self::new();
        repo.roots = repo.load_siblings(forest, None)?;
        Ok(repo)
    }

    fn load_siblings(
        &mut self,
        trees: &[ComponentTree],
        parent: Option<&NodeId>,
    ) -> Result<Vec<NodeId>, ForestError> {
        let mut sorted: Vec<&ComponentTree> = trees.iter().collect();
        sorted.sort_by_key(|tree| tree.order);
        if sorted.windows(2).any(|pair| pair[0].order == pair[1].order) {
            tracing::debug!(
                parent = parent.map(NodeId::as_str),
                "sibling orders are not unique; using array position"
            );
            sorted = trees.iter().collect();
        }

        let mut ids = Vec::with_capacity(sorted.len());
        for (order, tree) in sorted.into_iter().enumerate() {
            let order = order as i64;
            if self.nodes.contains_key(&tree.id) {
                return Err(ForestError::DuplicateId(tree.id.clone()));
            }
            self.nodes.insert(
                tree.id.clone(),
                ComponentNode {
                    id: tree.id.clone(),
                    component_type: tree.component_type.clone(),
                    props: tree.props.clone(),
                    children: Vec::new(),
                    parent_id: parent.cloned(),
                    order,
                    locked: tree.locked,
                    hidden: tree.hidden,
                },
            );
            let children = self.load_siblings(&tree.children, Some(&tree.id))?;
            if let Some(node) = self.nodes.get_mut(&tree.id) {
                node.children = children;
            }
            ids.push(tree.id.clone());
        }
        Ok(ids)
    }

    /// Total number of nodes in the forest.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the forest is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a node with this id exists anywhere in the forest.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Find a node anywhere in the forest.
    pub fn get(&self, id: &NodeId) -> Option<&ComponentNode> {
        self.nodes.get(id)
    }

    /// Iterate over all nodes in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentNode> {
        self.nodes.values()
    }

    /// Root ids in sibling order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Sibling list under `parent` (`None` = root list). `None` if the parent does not exist.
    pub fn children_of(&self, parent: Option<&NodeId>) -> Option<&[NodeId]> {
        match parent {
            None => Some(self.roots.as_slice()),
            Some(id) => self.nodes.get(id).map(|node| node.children.as_slice()),
        }
    }

    /// Parent and sibling index of a node.
    pub fn position_of(&self, id: &NodeId) -> Option<(Option<NodeId>, usize)> {
        let node = self.nodes.get(id)?;
        let index = self
            .children_of(node.parent_id.as_ref())?
            .iter()
            .position(|sibling| sibling == id)?;
        Some((node.parent_id.clone(), index))
    }

    /// Ancestor chain from the root down to `id` (inclusive). Empty if `id` is unknown.
    pub fn path_to(&self, id: &NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = self.nodes.get(id);
        while let Some(node) = current {
            path.push(node.id.clone());
            if path.len() > self.nodes.len() {
                break;
            }
            current = node.parent_id.as_ref().and_then(|p| self.nodes.get(p));
        }
        path.reverse();
        path
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: &NodeId, id: &NodeId) -> bool {
        let mut current = self.nodes.get(id).and_then(|n| n.parent_id.as_ref());
        let mut steps = 0;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            current = self.nodes.get(parent).and_then(|n| n.parent_id.as_ref());
        }
        false
    }

    /// Ids of the subtree rooted at `id`, pre-order. Empty if `id` is unknown.
    pub fn subtree_ids(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.children.iter().rev().cloned());
                out.push(current);
            }
        }
        out
    }

    /// Instantiate `spec` (and its nested children) with fresh ids under `parent`.
    ///
    /// `index` is the sibling position (clamped); `None` appends. Returns `None` without touching
    /// the forest if `parent` does not exist.
    pub fn insert_spec(
        &mut self,
        spec: &NodeSpec,
        parent: Option<&NodeId>,
        index: Option<usize>,
        ids: &mut dyn IdGenerator,
    ) -> Option<NodeId> {
        let len = self.children_of(parent)?.len();
        let index = index.map_or(len, |i| i.min(len));

        let id = self.build_subtree(spec, parent.cloned(), ids);
        self.siblings_mut(parent)?.insert(index, id.clone());
        self.renumber(parent);
        Some(id)
    }

    fn build_subtree(
        &mut self,
        spec: &NodeSpec,
        parent_id: Option<NodeId>,
        ids: &mut dyn IdGenerator,
    ) -> NodeId {
        let id = self.fresh_id(ids);
        self.nodes.insert(
            id.clone(),
            ComponentNode {
                id: id.clone(),
                component_type: spec.component_type.clone(),
                props: spec.props.clone(),
                children: Vec::with_capacity(spec.children.len()),
                parent_id,
                order: 0,
                locked: spec.locked,
                hidden: spec.hidden,
            },
        );

        let mut children = Vec::with_capacity(spec.children.len());
        for (order, child) in spec.children.iter().enumerate() {
            let child_id = self.build_subtree(child, Some(id.clone()), ids);
            if let Some(node) = self.nodes.get_mut(&child_id) {
                node.order = order as i64;
            }
            children.push(child_id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.children = children;
        }
        id
    }

    fn fresh_id(&self, ids: &mut dyn IdGenerator) -> NodeId {
        loop {
            let id = ids.next_id();
            if !self.nodes.contains_key(&id) {
                return id;
            }
            tracing::trace!(%id, "generated id already in use");
        }
    }

    /// Detach `id` (with its subtree) and reinsert it under `parent` at sibling position `index`.
    ///
    /// `index` addresses the destination list *after* the node has been detached and is clamped to
    /// its length. Returns `false` (forest untouched) if the node or parent is unknown, if the move
    /// would put a node inside its own subtree, or if the node is already at that position.
    pub fn move_node(&mut self, id: &NodeId, parent: Option<&NodeId>, index: usize) -> bool {
        let Some((old_parent, old_index)) = self.position_of(id) else {
            return false;
        };
        if let Some(parent_id) = parent
            && (!self.contains(parent_id) || parent_id == id || self.is_ancestor(id, parent_id))
        {
            return false;
        }

        let same_parent = old_parent.as_ref() == parent;
        let Some(dest_len) = self.children_of(parent).map(<[NodeId]>::len) else {
            return false;
        };
        let dest_len = if same_parent { dest_len - 1 } else { dest_len };
        let target = index.min(dest_len);
        if same_parent && target == old_index {
            return false;
        }

        if let Some(siblings) = self.siblings_mut(old_parent.as_ref()) {
            siblings.remove(old_index);
        }
        self.renumber(old_parent.as_ref());

        if let Some(siblings) = self.siblings_mut(parent) {
            siblings.insert(target, id.clone());
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent_id = parent.cloned();
        }
        self.renumber(parent);
        true
    }

    /// Remove `id` and its whole subtree. Returns the removed ids (empty if `id` is unknown).
    pub fn remove_subtree(&mut self, id: &NodeId) -> Vec<NodeId> {
        let Some((parent, index)) = self.position_of(id) else {
            return Vec::new();
        };
        if let Some(siblings) = self.siblings_mut(parent.as_ref()) {
            siblings.remove(index);
        }
        self.renumber(parent.as_ref());

        let removed = self.subtree_ids(id);
        for removed_id in &removed {
            self.nodes.remove(removed_id);
        }
        removed
    }

    /// Apply a partial update. Returns `true` if the node exists and a field changed.
    pub fn update(&mut self, id: &NodeId, patch: &NodePatch) -> bool {
        self.nodes
            .get_mut(id)
            .is_some_and(|node| patch.apply(node))
    }

    /// Deep copy of the subtree rooted at `id`.
    pub fn to_tree(&self, id: &NodeId) -> Option<ComponentTree> {
        let node = self.nodes.get(id)?;
        Some(ComponentTree {
            id: node.id.clone(),
            component_type: node.component_type.clone(),
            props: node.props.clone(),
            children: node
                .children
                .iter()
                .filter_map(|child| self.to_tree(child))
                .collect(),
            order: node.order,
            locked: node.locked,
            hidden: node.hidden,
        })
    }

    /// Deep copy of the whole forest in its serialized form.
    pub fn to_forest(&self) -> Vec<ComponentTree> {
        self.roots
            .iter()
            .filter_map(|root| self.to_tree(root))
            .collect()
    }

    /// Verify the structural invariants of the forest.
    pub fn check_invariants(&self) -> Result<(), ForestError> {
        let mut seen: HashSet<&NodeId> = HashSet::with_capacity(self.nodes.len());
        let mut stack: Vec<(Option<&NodeId>, &[NodeId])> = vec![(None, self.roots.as_slice())];

        while let Some((parent, siblings)) = stack.pop() {
            let mut last_order: Option<i64> = None;
            for id in siblings {
                let node = self
                    .nodes
                    .get(id)
                    .ok_or_else(|| ForestError::DanglingId(id.clone()))?;
                if !seen.insert(id) {
                    return Err(ForestError::Unreachable(id.clone()));
                }
                if node.parent_id.as_ref() != parent {
                    return Err(ForestError::ParentMismatch {
                        id: id.clone(),
                        recorded: node.parent_id.clone(),
                        actual: parent.cloned(),
                    });
                }
                if let Some(previous) = last_order {
                    if node.order == previous {
                        return Err(ForestError::DuplicateOrder {
                            parent: parent.cloned(),
                            order: node.order,
                        });
                    }
                    if node.order < previous {
                        return Err(ForestError::OrderMismatch(parent.cloned()));
                    }
                }
                last_order = Some(node.order);
                stack.push((Some(id), node.children.as_slice()));
            }
        }

        if let Some(orphan) = self.nodes.keys().find(|id| !seen.contains(id)) {
            return Err(ForestError::Unreachable(orphan.clone()));
        }
        Ok(())
    }

    fn siblings_mut(&mut self, parent: Option<&NodeId>) -> Option<&mut Vec<NodeId>> {
        match parent {
            None => Some(&mut self.roots),
            Some(id) => self.nodes.get_mut(id).map(|node| &mut node.children),
        }
    }

    fn renumber(&mut self, parent: Option<&NodeId>) {
        let Some(ids) = self.children_of(parent).map(<[NodeId]>::to_vec) else {
            return;
        };
        for (index, id) in ids.iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(id) {
                node.order = index as i64;
            }
        }
    }
}
