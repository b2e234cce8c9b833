//! Reconciliation - pruning annotations the document no longer contains
//!
//! An annotation whose normalized text cannot be found anywhere in the
//! excluded-subtree-free document text is gone: either the author deleted
//! the span or edited it beyond verbatim containment. The two cases are
//! indistinguishable without stable anchors, so both are dropped.

use crate::normalize::normalize;
use crate::{Annotation, AnnotationStore, DocumentTextIndex};

/// What a pruning pass removed
#[derive(Debug, Clone, Default)]
pub struct PruneReport {
    /// Annotations dropped because their text was not found, in their
    /// former collection order
    pub removed: Vec<Annotation>,
}

impl PruneReport {
    /// True when the pass removed nothing
    pub fn is_unchanged(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Drives pruning of an annotation store against the live document
pub struct ReconciliationEngine<'a> {
    index: &'a DocumentTextIndex<'a>,
}

impl<'a> ReconciliationEngine<'a> {
    /// Create an engine over a document text index
    pub fn new(index: &'a DocumentTextIndex<'a>) -> Self {
        Self { index }
    }

    /// Remove every annotation whose text no longer exists in the document.
    ///
    /// Survivors keep their relative order. Never fails: "not found" is the
    /// only outcome besides "kept". Running twice without an intervening
    /// mutation removes nothing the second time.
    pub fn prune(&self, store: &mut AnnotationStore) -> PruneReport {
        let document_text = self.index.normalized_text();
        let removed = store.retain_with_removed(|annotation| {
            // Stored text is already normalized; normalize again defensively
            // so pre-normalization records from older saves are comparable
            let needle = normalize(annotation.text());
            let found = document_text.contains(&needle);
            if !found {
                tracing::debug!(
                    annotation = %annotation.id(),
                    snippet = %annotation.preview(50),
                    "pruning stale annotation"
                );
            }
            found
        });
        PruneReport { removed }
    }
}
