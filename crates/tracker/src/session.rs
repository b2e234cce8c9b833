//! Tracking session - explicit lifecycle over one open document
//!
//! The session owns the annotation collection and persistence for a single
//! document identity. It consumes a bounded set of input events and emits
//! stats/collection changes through an observer seam. Reconciliation after
//! content mutations is deferred behind a debounce deadline; a newer
//! mutation replaces the pending deadline instead of scheduling a second
//! pass, so passes for successive mutation batches never overlap.

use crate::DocumentIdentity;
use annotations::{
    normalize, Annotation, AnnotationId, AnnotationKind, AnnotationStore, DocumentTextIndex,
    ReconciliationEngine, StatisticsCalculator, StatsSnapshot, TextLocation,
};
use doc_model::{Container, DocumentTree};
use std::time::{Duration, Instant};
use store::{PersistedRecord, PersistenceAdapter};

/// Session tuning knobs
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Quiet period after a content mutation before reconciliation runs
    pub debounce: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
        }
    }
}

impl TrackerConfig {
    /// Set a custom debounce interval
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// The bounded set of input events a session consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The user's text selection changed; `within_excluded` marks selections
    /// made inside the tool's own interface subtree
    SelectionChanged {
        text: String,
        within_excluded: bool,
    },
    /// Classify the pending selection as AI-assisted
    MarkAiAssisted,
    /// Un-mark the pending selection: drop annotations it overlaps
    MarkHumanWritten,
    /// The document content changed (coarse signal, no diff payload)
    DocumentMutated,
    /// Run reconciliation now, e.g. before producing a report
    ExplicitCleanup,
    /// Delete one annotation from its list entry
    RemoveAnnotation(AnnotationId),
    /// Find an annotation's current position in the document
    LocateAnnotation(AnnotationId),
}

/// Output seam toward display and notification collaborators
pub trait SessionObserver: Send {
    /// Statistics were recomputed
    fn stats_changed(&self, _stats: &StatsSnapshot) {}

    /// The annotation collection changed
    fn annotations_changed(&self, _annotations: &[Annotation]) {}

    /// A locate request resolved (or didn't)
    fn annotation_located(&self, _id: AnnotationId, _location: Option<TextLocation>) {}

    /// Every persistence tier failed; in-memory state is intact
    fn persistence_degraded(&self, _notice: &str) {}
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct NullObserver;

impl SessionObserver for NullObserver {}

/// A tracking session bound to one document identity
pub struct TrackerSession {
    identity: Option<DocumentIdentity>,
    url: String,
    config: TrackerConfig,
    store: AnnotationStore,
    adapter: PersistenceAdapter,
    observer: Box<dyn SessionObserver>,
    region_filter: Box<dyn Fn(&Container) -> bool + Send>,
    pending_selection: Option<String>,
    pending_reconcile: Option<Instant>,
}

impl TrackerSession {
    /// Open a session for a document.
    ///
    /// Loads the persisted collection for the identity and emits the initial
    /// stats WITHOUT pruning: the document may not have fully rendered yet,
    /// and a premature pass would discard every just-loaded annotation.
    /// Without an identity the session still works, minus persistence.
    pub fn open(
        identity: Option<DocumentIdentity>,
        url: impl Into<String>,
        adapter: PersistenceAdapter,
        observer: Box<dyn SessionObserver>,
        config: TrackerConfig,
        tree: &DocumentTree,
    ) -> Self {
        let mut session = Self {
            identity,
            url: url.into(),
            config,
            store: AnnotationStore::new(),
            adapter,
            observer,
            region_filter: Box::new(|c: &Container| c.editable),
            pending_selection: None,
            pending_reconcile: None,
        };
        session.load(tree);
        session
    }

    /// Replace the editable-region predicate used for word totals
    pub fn set_region_filter(&mut self, filter: impl Fn(&Container) -> bool + Send + 'static) {
        self.region_filter = Box::new(filter);
    }

    fn load(&mut self, tree: &DocumentTree) {
        if let Some(identity) = &self.identity {
            match self.adapter.load(identity.as_str()) {
                Ok(Some(record)) => {
                    tracing::debug!(
                        identity = identity.as_str(),
                        count = record.annotations.len(),
                        "loaded persisted annotations"
                    );
                    self.store.replace_all(record.annotations);
                }
                Ok(None) => {}
                Err(e) => {
                    // Safe default: start from an empty collection
                    tracing::warn!(error = %e, "could not load persisted annotations");
                    self.observer.persistence_degraded(&e.to_string());
                }
            }
        }
        self.emit(tree);
    }

    /// Dispatch one input event
    pub fn handle_event(&mut self, event: SessionEvent, tree: &DocumentTree, now: Instant) {
        match event {
            SessionEvent::SelectionChanged {
                text,
                within_excluded,
            } => self.selection_changed(text, within_excluded),
            SessionEvent::MarkAiAssisted => self.mark_pending(AnnotationKind::AiAssisted, tree),
            SessionEvent::MarkHumanWritten => self.unmark_pending(tree),
            SessionEvent::DocumentMutated => self.note_mutation(now),
            SessionEvent::ExplicitCleanup => self.cleanup(tree),
            SessionEvent::RemoveAnnotation(id) => self.remove_annotation(id, tree),
            SessionEvent::LocateAnnotation(id) => self.locate(id, tree),
        }
    }

    /// Track the user's selection; interface-text selections are ignored
    pub fn selection_changed(&mut self, text: String, within_excluded: bool) {
        if within_excluded || normalize(&text).is_empty() {
            self.pending_selection = None;
        } else {
            self.pending_selection = Some(text);
        }
    }

    /// The current pending selection, if any
    pub fn pending_selection(&self) -> Option<&str> {
        self.pending_selection.as_deref()
    }

    fn mark_pending(&mut self, kind: AnnotationKind, tree: &DocumentTree) {
        let Some(text) = self.pending_selection.take() else {
            return;
        };
        if self.store.add(&text, kind).is_some() {
            self.after_mutation(tree);
        }
    }

    fn unmark_pending(&mut self, tree: &DocumentTree) {
        let Some(text) = self.pending_selection.take() else {
            return;
        };
        self.store.remove_by_text(&text);
        self.after_mutation(tree);
    }

    /// Record a content mutation: the pending reconciliation deadline is
    /// replaced, never queued alongside the old one
    pub fn note_mutation(&mut self, now: Instant) {
        self.pending_reconcile = Some(now + self.config.debounce);
    }

    /// Deadline of the scheduled reconciliation pass, if one is pending
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.pending_reconcile
    }

    /// Run the scheduled pass if its deadline has arrived. Returns whether
    /// a pass ran.
    pub fn run_pending(&mut self, tree: &DocumentTree, now: Instant) -> bool {
        match self.pending_reconcile {
            Some(deadline) if deadline <= now => {
                self.pending_reconcile = None;
                self.reconcile_now(tree);
                true
            }
            _ => false,
        }
    }

    /// Run the scheduled pass immediately regardless of its deadline.
    /// Returns whether a pass was pending.
    pub fn flush(&mut self, tree: &DocumentTree) -> bool {
        if self.pending_reconcile.take().is_some() {
            self.reconcile_now(tree);
            true
        } else {
            false
        }
    }

    /// Reconcile now, superseding any scheduled pass
    pub fn cleanup(&mut self, tree: &DocumentTree) {
        self.pending_reconcile = None;
        self.reconcile_now(tree);
    }

    fn reconcile_now(&mut self, tree: &DocumentTree) {
        let report = {
            let index = DocumentTextIndex::new(tree);
            ReconciliationEngine::new(&index).prune(&mut self.store)
        };
        if !report.is_unchanged() {
            tracing::debug!(removed = report.removed.len(), "reconciliation pruned annotations");
        }
        self.save();
        self.emit(tree);
    }

    fn remove_annotation(&mut self, id: AnnotationId, tree: &DocumentTree) {
        if self.store.remove_by_id(id).is_some() {
            self.after_mutation(tree);
        }
    }

    fn locate(&self, id: AnnotationId, tree: &DocumentTree) {
        let location = self
            .store
            .get(id)
            .and_then(|a| DocumentTextIndex::new(tree).find(a.text()));
        self.observer.annotation_located(id, location);
    }

    /// Read-only statistics: computes from the live tree and the current
    /// collection without pruning or persisting anything
    pub fn current_stats(&self, tree: &DocumentTree) -> StatsSnapshot {
        let index = DocumentTextIndex::new(tree);
        StatisticsCalculator::snapshot(&index, |c| (self.region_filter)(c), &self.store)
    }

    /// The collection in insertion order
    pub fn annotations(&self) -> &[Annotation] {
        self.store.as_slice()
    }

    fn after_mutation(&mut self, tree: &DocumentTree) {
        // In-memory state is already updated; persistence is best-effort
        self.save();
        self.emit(tree);
    }

    fn save(&mut self) {
        let Some(identity) = &self.identity else {
            // No identity: skip persistence, keep working in memory
            return;
        };
        let record = PersistedRecord::new(
            identity.as_str(),
            self.url.clone(),
            self.store.as_slice().to_vec(),
        );
        if let Err(e) = self.adapter.save(identity.as_str(), &record) {
            tracing::warn!(error = %e, "annotation persistence unavailable");
            self.observer.persistence_degraded(&e.to_string());
        }
    }

    fn emit(&self, tree: &DocumentTree) {
        let stats = self.current_stats(tree);
        self.observer.stats_changed(&stats);
        self.observer.annotations_changed(self.store.as_slice());
    }
}
