//! Component node data model.
//!
//! # Overview
//!
//! The kernel keeps two shapes of the same data:
//!
//! - [`ComponentNode`] - the arena record stored in [`crate::NodeRepository`]. Children are held
//!   as an ordered list of [`NodeId`]s and every non-root node carries a `parent_id` back-reference.
//! - [`ComponentTree`] - the owned, nested form used on the wire (persistence), in the clipboard and
//!   at the code generation boundary. Parent ids are implied by nesting and are not serialized.
//!
//! [`NodeSpec`] describes a node (or template subtree) that does not have ids yet, and
//! [`NodePatch`] is a partial update applied by the inspector.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Opaque property payload of a component. Never interpreted by the kernel.
pub type Props = serde_json::Map<String, Value>;

/// Opaque, stable identifier of a component node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create an id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A node as stored in the repository arena.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentNode {
    /// Unique id, stable for the node's lifetime.
    pub id: NodeId,
    /// Renderer/schema tag (opaque to the kernel).
    pub component_type: String,
    /// Opaque property payload.
    pub props: Props,
    /// Ordered child ids. The node exclusively owns these subtrees.
    pub children: Vec<NodeId>,
    /// Id of the owning node; `None` for roots.
    pub parent_id: Option<NodeId>,
    /// Position among siblings.
    pub order: i64,
    /// UI lock flag.
    pub locked: bool,
    /// UI visibility flag.
    pub hidden: bool,
}

/// Nested, owned form of a component subtree.
///
/// This is the serialization format of a page: an ordered list of root `ComponentTree`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentTree {
    /// Node id.
    pub id: NodeId,
    /// Renderer/schema tag.
    #[serde(rename = "type")]
    pub component_type: String,
    /// Opaque property payload.
    #[serde(default)]
    pub props: Props,
    /// Child subtrees, in sibling order.
    #[serde(default)]
    pub children: Vec<ComponentTree>,
    /// Position among siblings.
    #[serde(default)]
    pub order: i64,
    /// UI lock flag.
    #[serde(default)]
    pub locked: bool,
    /// UI visibility flag.
    #[serde(default)]
    pub hidden: bool,
}

impl ComponentTree {
    /// Number of nodes in this subtree (including the root).
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// All ids in this subtree, pre-order.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.node_count());
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids(&self, out: &mut Vec<NodeId>) {
        out.push(self.id.clone());
        for child in &self.children {
            child.collect_ids(out);
        }
    }
}

/// Description of a node (or template subtree) to be added. Ids are assigned on insertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Renderer/schema tag.
    #[serde(rename = "type")]
    pub component_type: String,
    /// Initial properties.
    #[serde(default)]
    pub props: Props,
    /// Initial lock flag.
    #[serde(default)]
    pub locked: bool,
    /// Initial visibility flag.
    #[serde(default)]
    pub hidden: bool,
    /// Nested child specs, appended in order.
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    /// Spec for a bare node of the given type.
    pub fn new(component_type: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            ..Self::default()
        }
    }

    /// Set one property.
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Append a child spec.
    pub fn with_child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }
}

impl From<&ComponentTree> for NodeSpec {
    fn from(tree: &ComponentTree) -> Self {
        Self {
            component_type: tree.component_type.clone(),
            props: tree.props.clone(),
            locked: tree.locked,
            hidden: tree.hidden,
            children: tree.children.iter().map(NodeSpec::from).collect(),
        }
    }
}

/// Partial update of a node, as produced by the inspector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePatch {
    /// Replace the whole property map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Props>,
    /// Merge these keys into the existing property map (applied after `props`).
    #[serde(default, skip_serializing_if = "Props::is_empty")]
    pub merge_props: Props,
    /// New lock flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    /// New visibility flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}

impl NodePatch {
    /// Patch that merges a single property key.
    pub fn prop(key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut merge_props = Props::new();
        merge_props.insert(key.into(), value.into());
        Self {
            merge_props,
            ..Self::default()
        }
    }

    /// Patch that sets the lock flag.
    pub fn locked(locked: bool) -> Self {
        Self {
            locked: Some(locked),
            ..Self::default()
        }
    }

    /// Patch that sets the visibility flag.
    pub fn hidden(hidden: bool) -> Self {
        Self {
            hidden: Some(hidden),
            ..Self::default()
        }
    }

    /// Whether the patch carries no change at all.
    pub fn is_empty(&self) -> bool {
        self.props.is_none()
            && self.merge_props.is_empty()
            && self.locked.is_none()
            && self.hidden.is_none()
    }

    /// Apply to a node. Returns `true` if any field actually changed.
    pub(crate) fn apply(&self, node: &mut ComponentNode) -> bool {
        let before = (node.props.clone(), node.locked, node.hidden);

        if let Some(props) = &self.props {
            node.props = props.clone();
        }
        for (key, value) in &self.merge_props {
            node.props.insert(key.clone(), value.clone());
        }
        if let Some(locked) = self.locked {
            node.locked = locked;
        }
        if let Some(hidden) = self.hidden {
            node.hidden = hidden;
        }

        before != (node.props.clone(), node.locked, node.hidden)
    }
}
