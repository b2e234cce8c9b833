//! Store for the annotation collection of the open document

use crate::normalize::normalize;
use crate::{Annotation, AnnotationId, AnnotationKind};

/// Owns the authoritative, insertion-ordered annotation collection for the
/// document currently open. All mutation goes through these methods; callers
/// hold no other handle to the collection.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
}

impl AnnotationStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            annotations: Vec::new(),
        }
    }

    /// Normalize and add a selection as a new annotation.
    ///
    /// Selections that are empty after normalization are silently ignored
    /// and no annotation is created.
    pub fn add(&mut self, text: &str, kind: AnnotationKind) -> Option<&Annotation> {
        let annotation = Annotation::new(text, kind)?;
        self.annotations.push(annotation);
        self.annotations.last()
    }

    /// Remove exactly one annotation by ID; no-op when absent
    pub fn remove_by_id(&mut self, id: AnnotationId) -> Option<Annotation> {
        let pos = self.annotations.iter().position(|a| a.id() == id)?;
        Some(self.annotations.remove(pos))
    }

    /// Remove every annotation whose normalized text equals, contains, or is
    /// contained by the normalized input.
    ///
    /// The match is deliberately loose: an un-mark gesture re-selects live
    /// text that rarely matches the stored snippet exactly. Returns the
    /// removed annotations in their former order.
    pub fn remove_by_text(&mut self, text: &str) -> Vec<Annotation> {
        let needle = normalize(text);
        if needle.is_empty() {
            return Vec::new();
        }
        let mut removed = Vec::new();
        self.annotations.retain(|a| {
            let hit = a.text() == needle || a.text().contains(&needle) || needle.contains(a.text());
            if hit {
                removed.push(a.clone());
            }
            !hit
        });
        removed
    }

    /// Get an annotation by ID
    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }

    /// All annotations in insertion order
    pub fn as_slice(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Iterate over annotations in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    /// Iterate over annotations of one classification
    pub fn of_kind(&self, kind: AnnotationKind) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(move |a| a.kind() == kind)
    }

    /// Number of annotations
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Replace the whole collection (load path)
    pub fn replace_all(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
    }

    /// Retain only annotations accepted by the predicate, returning the
    /// rejected ones in their former order. Survivor order is preserved.
    pub(crate) fn retain_with_removed(
        &mut self,
        mut keep: impl FnMut(&Annotation) -> bool,
    ) -> Vec<Annotation> {
        let mut removed = Vec::new();
        self.annotations.retain(|a| {
            if keep(a) {
                true
            } else {
                removed.push(a.clone());
                false
            }
        });
        removed
    }
}
