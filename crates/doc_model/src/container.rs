//! Container node - a top-level region of the editing surface
//!
//! A container groups paragraphs into one region of the page: the editable
//! body, a title block, or chrome that belongs to tooling rather than to the
//! document itself. Word statistics are scoped to editable containers, and a
//! container can be designated as the excluded subtree on the tree so that
//! text search never matches against interface text.

use crate::{Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// A region container holding paragraphs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    id: NodeId,
    parent: Option<NodeId>,
    /// IDs of child paragraphs
    children: Vec<NodeId>,
    /// Whether this region accepts user edits (statistics scope)
    pub editable: bool,
    /// Optional label for diagnostics ("body", "title", "panel")
    pub label: Option<String>,
}

impl Container {
    /// Create a new container region
    pub fn new(editable: bool) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            children: Vec::new(),
            editable,
            label: None,
        }
    }

    /// Create an editable body region
    pub fn editable_region() -> Self {
        Self::new(true)
    }

    /// Create a non-editable region (headers, bylines, tooling chrome)
    pub fn static_region() -> Self {
        Self::new(false)
    }

    /// Attach a diagnostic label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Add a child paragraph at the end
    pub fn add_child(&mut self, child_id: NodeId) {
        self.children.push(child_id);
    }

    /// Insert a child paragraph at a specific index
    pub fn insert_child(&mut self, index: usize, child_id: NodeId) {
        self.children.insert(index, child_id);
    }

    /// Remove a child paragraph by ID
    pub fn remove_child(&mut self, child_id: NodeId) -> bool {
        if let Some(pos) = self.children.iter().position(|&id| id == child_id) {
            self.children.remove(pos);
            true
        } else {
            false
        }
    }
}

impl Node for Container {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Container
    }

    fn children(&self) -> &[NodeId] {
        &self.children
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    fn can_have_children(&self) -> bool {
        true
    }
}
