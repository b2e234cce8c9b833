//! Background worker driving a session from an event channel
//!
//! Events from the editing surface (selection changes, mutation
//! notifications, user actions) arrive on an unbounded channel and are
//! applied to the session one at a time; there is no preemption within an
//! event. The debounce deadline the session exposes becomes a resettable
//! sleep: a newer mutation moves the deadline, which simply re-arms the
//! timer on the next loop turn. Queued events always win over an elapsed
//! timer, so a pass superseded by a fresher mutation never runs.

use crate::{SessionEvent, TrackerSession};
use doc_model::DocumentTree;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::sync::RwLock;

/// Handle used by the editing surface to feed events to a worker
pub type SessionSender = mpsc::UnboundedSender<SessionEvent>;

/// Drives a [`TrackerSession`] until its event channel closes
pub struct SessionWorker {
    session: TrackerSession,
    tree: Arc<RwLock<DocumentTree>>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionWorker {
    /// Pair a session with a shared tree; returns the worker and the sender
    /// its events arrive on
    pub fn new(
        session: TrackerSession,
        tree: Arc<RwLock<DocumentTree>>,
    ) -> (Self, SessionSender) {
        let (sender, events) = mpsc::unbounded_channel();
        let worker = Self {
            session,
            tree,
            events,
        };
        (worker, sender)
    }

    /// Consume events until every sender is dropped, then run any still
    /// pending reconciliation pass and hand the session back
    pub async fn run(mut self) -> TrackerSession {
        loop {
            match self.session.pending_deadline() {
                Some(deadline) => {
                    tokio::select! {
                        // Events outrank an elapsed timer: a queued mutation
                        // must replace the pending pass, not race it
                        biased;
                        maybe_event = self.events.recv() => match maybe_event {
                            Some(event) => self.apply(event).await,
                            None => break,
                        },
                        _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {
                            let tree = self.tree.read().await;
                            self.session.flush(&tree);
                        }
                    }
                }
                None => match self.events.recv().await {
                    Some(event) => self.apply(event).await,
                    None => break,
                },
            }
        }

        // Channel closed with a pass still scheduled: run it before
        // handing the session back so no mutation goes unreconciled
        let tree = self.tree.read().await;
        self.session.flush(&tree);
        drop(tree);
        self.session
    }

    /// Spawn the worker onto the runtime
    pub fn spawn(self) -> tokio::task::JoinHandle<TrackerSession> {
        tokio::spawn(self.run())
    }

    async fn apply(&mut self, event: SessionEvent) {
        let tree = self.tree.read().await;
        self.session.handle_event(event, &tree, Instant::now());
    }
}
