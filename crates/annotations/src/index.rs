//! Search over the live document's text-bearing leaves
//!
//! The index is rebuilt from the tree on every call; nothing is cached, so a
//! query can never observe state from before a mutation. Leaves under the
//! designated excluded subtree are invisible to every query here: the tool
//! must never match annotations against, or count words in, its own
//! interface text.

use crate::normalize::{collapse_with_offsets, normalize, normalize_with_offsets};
use doc_model::{Container, DocumentTree, Node, NodeId};

/// A located snippet, anchored to a single leaf run
///
/// Offsets are byte offsets into the anchor leaf's raw text. A cross-node
/// match reports only its anchor leaf, with `end_offset` clipped to that
/// leaf's length; the match may continue into following leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLocation {
    pub node_id: NodeId,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// Queryable view of the document's live text
pub struct DocumentTextIndex<'a> {
    tree: &'a DocumentTree,
}

struct Segment {
    node_id: NodeId,
    start: usize,
    end: usize,
    map: Vec<usize>,
    raw_len: usize,
}

impl<'a> DocumentTextIndex<'a> {
    /// Create an index over a document tree
    pub fn new(tree: &'a DocumentTree) -> Self {
        Self { tree }
    }

    /// IDs of text-bearing leaves in document order, skipping whitespace-only
    /// runs and everything under the excluded subtree
    pub fn collect_text_nodes(&self) -> Vec<NodeId> {
        self.tree
            .leaf_runs()
            .into_iter()
            .filter(|&id| !self.tree.is_under_excluded(id))
            .filter(|&id| {
                self.tree
                    .get_run(id)
                    .is_some_and(|run| !run.text.trim().is_empty())
            })
            .collect()
    }

    /// Locate a normalized query in the document.
    ///
    /// Phase 1 tests each leaf on its own, which covers most selections.
    /// Phase 2 searches the concatenation of all leaves' collapsed text, so
    /// that a snippet an editor has fragmented across several runs (inline
    /// formatting splits a sentence into sibling nodes) is still found.
    pub fn find(&self, normalized_query: &str) -> Option<TextLocation> {
        if normalized_query.is_empty() {
            return None;
        }

        let nodes = self.collect_text_nodes();

        // Phase 1: per-node containment
        for &node_id in &nodes {
            let run = match self.tree.get_run(node_id) {
                Some(run) => run,
                None => continue,
            };
            let (norm, map) = normalize_with_offsets(&run.text);
            if let Some(pos) = norm.find(normalized_query) {
                let match_end = pos + normalized_query.len();
                let raw_start = map[pos];
                let raw_end = match map.get(match_end) {
                    Some(&raw) => raw,
                    None => run.text.trim_end().len(),
                };
                return Some(TextLocation {
                    node_id,
                    start_offset: raw_start,
                    end_offset: raw_end,
                });
            }
        }

        // Phase 2: cross-node containment over the concatenated leaves
        let mut combined = String::new();
        let mut segments: Vec<Segment> = Vec::new();
        for &node_id in &nodes {
            let run = match self.tree.get_run(node_id) {
                Some(run) => run,
                None => continue,
            };
            let (collapsed, map) = collapse_with_offsets(&run.text);
            let start = combined.len();
            combined.push_str(&collapsed);
            segments.push(Segment {
                node_id,
                start,
                end: start + collapsed.len(),
                map,
                raw_len: run.text.len(),
            });
        }

        let pos = combined.find(normalized_query)?;
        let segment = segments.iter().find(|s| pos >= s.start && pos < s.end)?;
        let local_start = pos - segment.start;
        let local_end = (pos + normalized_query.len() - segment.start).min(segment.map.len());
        let raw_start = segment.map[local_start];
        let raw_end = match segment.map.get(local_end) {
            Some(&raw) => raw,
            None => segment.raw_len,
        };
        Some(TextLocation {
            node_id: segment.node_id,
            start_offset: raw_start,
            end_offset: raw_end,
        })
    }

    /// Cheap existence check: does the normalized document text (full body
    /// minus excluded subtree, whitespace-collapsed) contain the query?
    pub fn contains_normalized(&self, normalized_query: &str) -> bool {
        if normalized_query.is_empty() {
            return false;
        }
        self.normalized_text().contains(normalized_query)
    }

    /// The whole document's text with the excluded subtree removed,
    /// whitespace-normalized. Leaf texts are concatenated directly, the way
    /// a flattened text extraction of the tree reads.
    pub fn normalized_text(&self) -> String {
        let mut raw = String::new();
        for node_id in self.collect_text_nodes() {
            if let Some(run) = self.tree.get_run(node_id) {
                raw.push_str(&run.text);
            }
        }
        normalize(&raw)
    }

    /// Raw text of the regions accepted by the predicate (still excluding
    /// the UI subtree), container texts joined by a single space
    pub fn editable_text(&self, predicate: impl Fn(&Container) -> bool) -> String {
        let mut total = String::new();
        for container in self.tree.containers() {
            if self.tree.is_under_excluded(container.id()) || !predicate(container) {
                continue;
            }
            let mut region = String::new();
            for para in self.tree.paragraphs_in(container.id()) {
                for &run_id in para.children() {
                    if let Some(run) = self.tree.get_run(run_id) {
                        region.push_str(&run.text);
                    }
                }
            }
            if !region.trim().is_empty() {
                total.push_str(&region);
                total.push(' ');
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{Container, Paragraph, Run};

    fn build_tree(texts: &[&str]) -> (DocumentTree, Vec<NodeId>) {
        let mut tree = DocumentTree::new();
        let body = tree.insert_container(Container::editable_region().with_label("body"), None);
        let para = tree.insert_paragraph(Paragraph::new(), body, None).unwrap();
        let ids = texts
            .iter()
            .map(|t| tree.insert_run(Run::new(*t), para, None).unwrap())
            .collect();
        (tree, ids)
    }

    fn add_panel(tree: &mut DocumentTree, text: &str) -> NodeId {
        let panel = tree.insert_container(Container::static_region().with_label("panel"), None);
        let para = tree.insert_paragraph(Paragraph::new(), panel, None).unwrap();
        tree.insert_run(Run::new(text), para, None).unwrap();
        tree.set_excluded_subtree(Some(panel));
        panel
    }

    #[test]
    fn test_collect_skips_whitespace_and_excluded_leaves() {
        let (mut tree, ids) = build_tree(&["visible", "   \n", "also visible"]);
        add_panel(&mut tree, "panel text");

        let index = DocumentTextIndex::new(&tree);
        assert_eq!(index.collect_text_nodes(), vec![ids[0], ids[2]]);
    }

    #[test]
    fn test_find_single_node_reports_raw_offsets() {
        let (tree, ids) = build_tree(&["  The\tcat sat on the mat.  "]);
        let index = DocumentTextIndex::new(&tree);

        let loc = index.find("cat sat").unwrap();
        assert_eq!(loc.node_id, ids[0]);
        let raw = &tree.get_run(ids[0]).unwrap().text;
        assert_eq!(&raw[loc.start_offset..loc.end_offset], "cat sat");
    }

    #[test]
    fn test_find_prefers_first_node_in_document_order() {
        let (tree, ids) = build_tree(&["repeat phrase here", "repeat phrase again"]);
        let index = DocumentTextIndex::new(&tree);

        let loc = index.find("repeat phrase").unwrap();
        assert_eq!(loc.node_id, ids[0]);
    }

    #[test]
    fn test_find_across_split_nodes_anchors_first_leaf() {
        // An editor split one sentence across two runs
        let (tree, ids) = build_tree(&["The cat sat on ", "the mat."]);
        let index = DocumentTextIndex::new(&tree);

        let loc = index.find("sat on the mat").unwrap();
        assert_eq!(loc.node_id, ids[0]);
        let raw = &tree.get_run(ids[0]).unwrap().text;
        assert_eq!(&raw[loc.start_offset..], "sat on ");
        // End offset is clipped to the anchor leaf
        assert!(loc.end_offset <= raw.len());
    }

    #[test]
    fn test_find_across_intra_word_split() {
        // Splits do not have to land on word boundaries
        let (tree, ids) = build_tree(&["transpar", "ency matters"]);
        let index = DocumentTextIndex::new(&tree);

        let loc = index.find("transparency").unwrap();
        assert_eq!(loc.node_id, ids[0]);
        assert_eq!(loc.start_offset, 0);
        assert_eq!(loc.end_offset, tree.get_run(ids[0]).unwrap().len());
    }

    #[test]
    fn test_find_absent_text_returns_none() {
        let (tree, _) = build_tree(&["some document text"]);
        let index = DocumentTextIndex::new(&tree);
        assert_eq!(index.find("never written"), None);
        assert_eq!(index.find(""), None);
    }

    #[test]
    fn test_find_never_matches_interface_text() {
        let (mut tree, _) = build_tree(&["document body"]);
        add_panel(&mut tree, "AI Assistance Tracker");

        let index = DocumentTextIndex::new(&tree);
        assert_eq!(index.find("AI Assistance Tracker"), None);
        assert!(!index.contains_normalized("AI Assistance Tracker"));
    }

    #[test]
    fn test_contains_normalized_spans_node_boundaries() {
        let (tree, _) = build_tree(&["The cat sat on ", "the mat."]);
        let index = DocumentTextIndex::new(&tree);

        assert!(index.contains_normalized("sat on the mat"));
        assert!(index.contains_normalized("The cat sat on the mat."));
        assert!(!index.contains_normalized("the dog"));
    }

    #[test]
    fn test_index_reflects_mutations_between_calls() {
        let (mut tree, ids) = build_tree(&["original wording"]);
        {
            let index = DocumentTextIndex::new(&tree);
            assert!(index.contains_normalized("original wording"));
        }
        tree.set_run_text(ids[0], "rewritten copy").unwrap();
        let index = DocumentTextIndex::new(&tree);
        assert!(!index.contains_normalized("original wording"));
        assert!(index.contains_normalized("rewritten copy"));
    }

    #[test]
    fn test_editable_text_respects_predicate_and_exclusion() {
        let mut tree = DocumentTree::new();
        let body = tree.insert_container(Container::editable_region().with_label("body"), None);
        let body_para = tree.insert_paragraph(Paragraph::new(), body, None).unwrap();
        tree.insert_run(Run::new("five words of body text"), body_para, None)
            .unwrap();

        let byline = tree.insert_container(Container::static_region().with_label("byline"), None);
        let byline_para = tree.insert_paragraph(Paragraph::new(), byline, None).unwrap();
        tree.insert_run(Run::new("by A. Writer"), byline_para, None)
            .unwrap();

        add_panel(&mut tree, "panel words never counted");

        let index = DocumentTextIndex::new(&tree);
        let editable = index.editable_text(|c| c.editable);
        assert_eq!(editable.trim(), "five words of body text");

        // A wider predicate still cannot reach the excluded subtree
        let everything = index.editable_text(|_| true);
        assert!(everything.contains("by A. Writer"));
        assert!(!everything.contains("panel"));
    }
}
