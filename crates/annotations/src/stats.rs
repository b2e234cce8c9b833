//! Aggregate authorship statistics
//!
//! Total words come from the live editable regions; AI words come from the
//! creation-time snapshots stored on the annotations. The two sides move
//! independently on purpose: editing text around an annotated span must not
//! change an already-committed AI word total.

use crate::normalize::word_count;
use crate::{AnnotationKind, AnnotationStore, DocumentTextIndex};
use doc_model::Container;
use serde::{Deserialize, Serialize};

/// A derived statistics snapshot; always recomputable from the collection
/// and the live document, never authoritative on its own
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_words: usize,
    pub ai_words: usize,
    pub ai_percentage: u32,
}

/// Derives word totals and the AI-assisted percentage
pub struct StatisticsCalculator;

impl StatisticsCalculator {
    /// Count words across the editable regions selected by the predicate
    pub fn total_words(
        index: &DocumentTextIndex<'_>,
        predicate: impl Fn(&Container) -> bool,
    ) -> usize {
        word_count(&index.editable_text(predicate))
    }

    /// Sum the stored word-count snapshots of AI-assisted annotations
    pub fn ai_words(store: &AnnotationStore) -> usize {
        store
            .of_kind(AnnotationKind::AiAssisted)
            .map(|a| a.word_count())
            .sum()
    }

    /// Compute a full snapshot.
    ///
    /// The percentage is rounded half-up and deliberately not clamped:
    /// duplicated or overlapping annotated text can push AI words past the
    /// live total, and hiding that would misreport the collection.
    pub fn snapshot(
        index: &DocumentTextIndex<'_>,
        predicate: impl Fn(&Container) -> bool,
        store: &AnnotationStore,
    ) -> StatsSnapshot {
        let total_words = Self::total_words(index, predicate);
        let ai_words = Self::ai_words(store);
        let ai_percentage = if total_words > 0 {
            ((ai_words as f64 / total_words as f64) * 100.0).round() as u32
        } else {
            0
        };
        StatsSnapshot {
            total_words,
            ai_words,
            ai_percentage,
        }
    }
}
