//! Document tree operations and storage

use crate::{Container, DocModelError, Document, Node, NodeId, Paragraph, Result, Run};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Storage for different node types
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeStorage {
    pub containers: HashMap<NodeId, Container>,
    pub paragraphs: HashMap<NodeId, Paragraph>,
    pub runs: HashMap<NodeId, Run>,
}

/// The complete document tree structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTree {
    /// The root document
    pub document: Document,
    /// Storage for all nodes
    pub nodes: NodeStorage,
    /// Root of the designated excluded subtree (tooling chrome), if any
    #[serde(default)]
    excluded: Option<NodeId>,
}

impl DocumentTree {
    /// Create a new empty document tree
    pub fn new() -> Self {
        Self {
            document: Document::new(),
            nodes: NodeStorage::default(),
            excluded: None,
        }
    }

    /// Create a tree with a single editable body region holding one empty paragraph
    pub fn with_body() -> Self {
        let mut tree = Self::new();
        let body = Container::editable_region().with_label("body");
        let body_id = tree.insert_container(body, None);
        let para = Paragraph::new();
        // Body container is always present, insert cannot fail here
        let _ = tree.insert_paragraph(para, body_id, None);
        tree
    }

    /// Get the document root ID
    pub fn root_id(&self) -> NodeId {
        self.document.id()
    }

    // =========================================================================
    // Excluded subtree
    // =========================================================================

    /// Designate a node as the root of the excluded (interface) subtree
    pub fn set_excluded_subtree(&mut self, node_id: Option<NodeId>) {
        self.excluded = node_id;
    }

    /// Get the designated excluded subtree root
    pub fn excluded_subtree(&self) -> Option<NodeId> {
        self.excluded
    }

    /// Check whether a node is the excluded root or has it as an ancestor
    pub fn is_under_excluded(&self, node_id: NodeId) -> bool {
        let Some(excluded) = self.excluded else {
            return false;
        };
        let mut current = Some(node_id);
        while let Some(id) = current {
            if id == excluded {
                return true;
            }
            current = self.parent_of(id);
        }
        false
    }

    /// Get the parent of any node in the tree
    pub fn parent_of(&self, node_id: NodeId) -> Option<NodeId> {
        if let Some(run) = self.nodes.runs.get(&node_id) {
            return run.parent();
        }
        if let Some(para) = self.nodes.paragraphs.get(&node_id) {
            return para.parent();
        }
        if let Some(container) = self.nodes.containers.get(&node_id) {
            return container.parent();
        }
        None
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get a container by ID
    pub fn get_container(&self, id: NodeId) -> Option<&Container> {
        self.nodes.containers.get(&id)
    }

    /// Get a mutable container by ID
    pub fn get_container_mut(&mut self, id: NodeId) -> Option<&mut Container> {
        self.nodes.containers.get_mut(&id)
    }

    /// Get a paragraph by ID
    pub fn get_paragraph(&self, id: NodeId) -> Option<&Paragraph> {
        self.nodes.paragraphs.get(&id)
    }

    /// Get a mutable paragraph by ID
    pub fn get_paragraph_mut(&mut self, id: NodeId) -> Option<&mut Paragraph> {
        self.nodes.paragraphs.get_mut(&id)
    }

    /// Get a run by ID
    pub fn get_run(&self, id: NodeId) -> Option<&Run> {
        self.nodes.runs.get(&id)
    }

    /// Get a mutable run by ID
    pub fn get_run_mut(&mut self, id: NodeId) -> Option<&mut Run> {
        self.nodes.runs.get_mut(&id)
    }

    /// Iterate over containers in document order
    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.document
            .children()
            .iter()
            .filter_map(|id| self.nodes.containers.get(id))
    }

    /// Iterate over a container's paragraphs in order
    pub fn paragraphs_in(&self, container_id: NodeId) -> impl Iterator<Item = &Paragraph> {
        self.nodes
            .containers
            .get(&container_id)
            .map(|c| c.children())
            .unwrap_or(&[])
            .iter()
            .filter_map(|id| self.nodes.paragraphs.get(id))
    }

    /// IDs of all text runs in document order
    pub fn leaf_runs(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        for container in self.containers() {
            for para in container
                .children()
                .iter()
                .filter_map(|id| self.nodes.paragraphs.get(id))
            {
                for &run_id in para.children() {
                    if self.nodes.runs.contains_key(&run_id) {
                        leaves.push(run_id);
                    }
                }
            }
        }
        leaves
    }

    /// Get the total text content of the document, paragraphs joined by newlines
    pub fn text_content(&self) -> String {
        let mut result = String::new();
        for container in self.containers() {
            for para in container
                .children()
                .iter()
                .filter_map(|id| self.nodes.paragraphs.get(id))
            {
                for &run_id in para.children() {
                    if let Some(run) = self.nodes.runs.get(&run_id) {
                        result.push_str(&run.text);
                    }
                }
                result.push('\n');
            }
        }
        result
    }

    // =========================================================================
    // Structural operations
    // =========================================================================

    /// Insert a container into the document body
    pub fn insert_container(&mut self, mut container: Container, index: Option<usize>) -> NodeId {
        let container_id = container.id();
        container.set_parent(Some(self.document.id()));

        match index {
            Some(idx) => self.document.insert_body_child(idx, container_id),
            None => self.document.add_body_child(container_id),
        }

        self.nodes.containers.insert(container_id, container);
        container_id
    }

    /// Insert a paragraph into a container
    pub fn insert_paragraph(
        &mut self,
        mut para: Paragraph,
        container_id: NodeId,
        index: Option<usize>,
    ) -> Result<NodeId> {
        let para_id = para.id();
        para.set_parent(Some(container_id));

        let container = self
            .nodes
            .containers
            .get_mut(&container_id)
            .ok_or(DocModelError::NodeNotFound(container_id.as_uuid()))?;

        match index {
            Some(idx) => container.insert_child(idx, para_id),
            None => container.add_child(para_id),
        }

        self.nodes.paragraphs.insert(para_id, para);
        self.document.increment_version();
        Ok(para_id)
    }

    /// Insert a run into a paragraph
    pub fn insert_run(&mut self, mut run: Run, para_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let run_id = run.id();
        run.set_parent(Some(para_id));

        let para = self
            .nodes
            .paragraphs
            .get_mut(&para_id)
            .ok_or(DocModelError::NodeNotFound(para_id.as_uuid()))?;

        match index {
            Some(idx) => para.insert_child(idx, run_id),
            None => para.add_child(run_id),
        }

        self.nodes.runs.insert(run_id, run);
        self.document.increment_version();
        Ok(run_id)
    }

    /// Remove a run from the tree
    pub fn remove_run(&mut self, run_id: NodeId) -> Result<Run> {
        let run = self
            .nodes
            .runs
            .remove(&run_id)
            .ok_or(DocModelError::NodeNotFound(run_id.as_uuid()))?;

        if let Some(parent_id) = run.parent() {
            if let Some(para) = self.nodes.paragraphs.get_mut(&parent_id) {
                para.remove_child(run_id);
            }
        }

        self.document.increment_version();
        Ok(run)
    }

    /// Remove a paragraph and all its runs from the tree
    pub fn remove_paragraph(&mut self, para_id: NodeId) -> Result<Paragraph> {
        let para = self
            .nodes
            .paragraphs
            .remove(&para_id)
            .ok_or(DocModelError::NodeNotFound(para_id.as_uuid()))?;

        for &run_id in para.children() {
            self.nodes.runs.remove(&run_id);
        }

        if let Some(parent_id) = para.parent() {
            if let Some(container) = self.nodes.containers.get_mut(&parent_id) {
                container.remove_child(para_id);
            }
        }

        self.document.increment_version();
        Ok(para)
    }

    /// Remove a container and everything under it
    pub fn remove_container(&mut self, container_id: NodeId) -> Result<Container> {
        let container = self
            .nodes
            .containers
            .remove(&container_id)
            .ok_or(DocModelError::NodeNotFound(container_id.as_uuid()))?;

        for &para_id in container.children() {
            if let Some(para) = self.nodes.paragraphs.remove(&para_id) {
                for &run_id in para.children() {
                    self.nodes.runs.remove(&run_id);
                }
            }
        }

        self.document.remove_body_child(container_id);
        if self.excluded == Some(container_id) {
            self.excluded = None;
        }
        Ok(container)
    }

    // =========================================================================
    // Text mutation
    // =========================================================================

    /// Replace the text of a run
    pub fn set_run_text(&mut self, run_id: NodeId, text: impl Into<String>) -> Result<()> {
        let run = self
            .nodes
            .runs
            .get_mut(&run_id)
            .ok_or(DocModelError::NodeNotFound(run_id.as_uuid()))?;
        run.text = text.into();
        self.document.increment_version();
        Ok(())
    }

    /// Split a run in two at a byte offset, as editors do when formatting is
    /// applied mid-span. The original keeps the head text; a new run holding
    /// the tail is inserted immediately after it. Returns the new run's ID.
    pub fn split_run(&mut self, run_id: NodeId, offset: usize) -> Result<NodeId> {
        let run = self
            .nodes
            .runs
            .get(&run_id)
            .ok_or(DocModelError::NodeNotFound(run_id.as_uuid()))?;

        if offset > run.text.len() || !run.text.is_char_boundary(offset) {
            return Err(DocModelError::InvalidOffset {
                node_id: run_id.as_uuid(),
                offset,
            });
        }

        let para_id = run.parent().ok_or_else(|| {
            DocModelError::InvalidOperation("cannot split a detached run".into())
        })?;
        let tail = run.text[offset..].to_string();

        let para = self
            .nodes
            .paragraphs
            .get(&para_id)
            .ok_or(DocModelError::NodeNotFound(para_id.as_uuid()))?;
        let position = para.child_index(run_id).ok_or_else(|| {
            DocModelError::InvalidOperation("run missing from its parent paragraph".into())
        })?;

        if let Some(run) = self.nodes.runs.get_mut(&run_id) {
            run.text.truncate(offset);
        }
        self.insert_run(Run::new(tail), para_id, Some(position + 1))
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::with_body()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tree_with_texts(texts: &[&str]) -> (DocumentTree, NodeId, Vec<NodeId>) {
        let mut tree = DocumentTree::new();
        let body_id = tree.insert_container(Container::editable_region().with_label("body"), None);
        let para_id = tree.insert_paragraph(Paragraph::new(), body_id, None).unwrap();
        let run_ids = texts
            .iter()
            .map(|t| tree.insert_run(Run::new(*t), para_id, None).unwrap())
            .collect();
        (tree, para_id, run_ids)
    }

    #[test]
    fn test_leaf_runs_document_order() {
        let (tree, _, run_ids) = tree_with_texts(&["one ", "two ", "three"]);
        assert_eq!(tree.leaf_runs(), run_ids);
        assert_eq!(tree.text_content(), "one two three\n");
    }

    #[test]
    fn test_excluded_subtree_ancestry() {
        let (mut tree, _, run_ids) = tree_with_texts(&["body text"]);
        let panel_id = tree.insert_container(Container::static_region().with_label("panel"), None);
        let panel_para = tree.insert_paragraph(Paragraph::new(), panel_id, None).unwrap();
        let panel_run = tree
            .insert_run(Run::new("Panel Controls"), panel_para, None)
            .unwrap();

        tree.set_excluded_subtree(Some(panel_id));

        assert!(tree.is_under_excluded(panel_id));
        assert!(tree.is_under_excluded(panel_para));
        assert!(tree.is_under_excluded(panel_run));
        assert!(!tree.is_under_excluded(run_ids[0]));
    }

    #[test]
    fn test_split_run_keeps_order_and_text() {
        let (mut tree, para_id, run_ids) = tree_with_texts(&["The cat sat on the mat."]);
        let tail_id = tree.split_run(run_ids[0], 15).unwrap();

        assert_eq!(tree.get_run(run_ids[0]).unwrap().text, "The cat sat on ");
        assert_eq!(tree.get_run(tail_id).unwrap().text, "the mat.");
        assert_eq!(
            tree.get_paragraph(para_id).unwrap().children(),
            &[run_ids[0], tail_id]
        );
        assert_eq!(tree.text_content(), "The cat sat on the mat.\n");
    }

    #[test]
    fn test_split_run_rejects_non_boundary_offset() {
        let (mut tree, _, run_ids) = tree_with_texts(&["héllo"]);
        // Offset 2 lands inside the two-byte 'é'
        let err = tree.split_run(run_ids[0], 2).unwrap_err();
        assert!(matches!(err, DocModelError::InvalidOffset { offset: 2, .. }));
    }

    #[test]
    fn test_remove_paragraph_cascades_runs() {
        let (mut tree, para_id, run_ids) = tree_with_texts(&["a", "b"]);
        tree.remove_paragraph(para_id).unwrap();
        assert!(tree.get_run(run_ids[0]).is_none());
        assert!(tree.get_run(run_ids[1]).is_none());
        assert!(tree.leaf_runs().is_empty());
    }

    #[test]
    fn test_remove_container_clears_excluded_designation() {
        let mut tree = DocumentTree::new();
        let panel_id = tree.insert_container(Container::static_region(), None);
        tree.set_excluded_subtree(Some(panel_id));
        tree.remove_container(panel_id).unwrap();
        assert_eq!(tree.excluded_subtree(), None);
    }

    #[test]
    fn test_set_run_text_bumps_version() {
        let (mut tree, _, run_ids) = tree_with_texts(&["draft"]);
        let before = tree.document.version();
        tree.set_run_text(run_ids[0], "final").unwrap();
        assert!(tree.document.version() > before);
        assert_eq!(tree.get_run(run_ids[0]).unwrap().text, "final");
    }

    #[test]
    fn test_tree_serialization_round_trip() {
        let (mut tree, _, _) = tree_with_texts(&["persisted"]);
        tree.document.metadata.title = Some("Draft".into());
        tree.document.metadata.source_url = Some("https://example.test/p/draft".into());
        let panel_id = tree.insert_container(Container::static_region(), None);
        tree.set_excluded_subtree(Some(panel_id));

        let json = serde_json::to_string(&tree).unwrap();
        let parsed: DocumentTree = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.root_id(), tree.root_id());
        assert_eq!(parsed.excluded_subtree(), Some(panel_id));
        assert_eq!(parsed.document.metadata.title.as_deref(), Some("Draft"));
        assert_eq!(parsed.text_content(), tree.text_content());
    }

    proptest! {
        #[test]
        fn split_preserves_concatenated_text(text in ".{0,60}", pick in any::<prop::sample::Index>()) {
            let (mut tree, _, run_ids) = tree_with_texts(&[text.as_str()]);
            let mut boundaries: Vec<usize> =
                text.char_indices().map(|(i, _)| i).collect();
            boundaries.push(text.len());
            let offset = boundaries[pick.index(boundaries.len())];

            tree.split_run(run_ids[0], offset).unwrap();
            prop_assert_eq!(tree.text_content(), format!("{text}\n"));
        }
    }
}
