use std::time::Duration;

use kanal::AsyncReceiver;
use tokio::time::Instant;

use crate::document::{Document, MutationBatch, MutationRecord, NodeId, ObserverId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    PendingRescan { deadline: Instant },
    Scanning,
    /// Terminal
    Closed,
}

/// Debounced rescan scheduling for one content root.
///
/// Every trigger pushes the deadline out to `now + debounce`, so a burst of
/// triggers yields one rescan.
pub struct MutationWatcher {
    state: WatcherState,
    debounce: Duration,
    observer: Option<ObserverId>,
}

impl MutationWatcher {
    pub fn new(debounce: Duration) -> Self {
        Self {
            state: WatcherState::Idle,
            debounce,
            observer: None,
        }
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == WatcherState::Closed
    }

    /// Subscribe to insertions under `root`
    pub fn attach(&mut self, doc: &mut Document, root: NodeId) -> AsyncReceiver<MutationBatch> {
        if let Some(previous) = self.observer.take() {
            doc.disconnect(previous);
        }
        let (id, rx) = doc.observe(root);
        self.observer = Some(id);
        rx
    }

    /// True when the batch added something still alive that is not annotation output
    pub fn qualifies(doc: &Document, batch: &[MutationRecord]) -> bool {
        batch.iter().flat_map(|r| r.added.iter()).any(|&added| {
            doc.is_alive(added)
                && !doc
                    .ancestors(added)
                    .any(|n| doc.kind(n).is_some_and(|k| k.is_own_output()))
        })
    }

    /// Feed one delivered batch; returns whether it scheduled a rescan
    pub fn on_mutations(&mut self, doc: &Document, batch: &[MutationRecord], now: Instant) -> bool {
        if self.is_closed() || !Self::qualifies(doc, batch) {
            return false;
        }
        self.trigger(now);
        true
    }

    pub fn trigger(&mut self, now: Instant) {
        match self.state {
            WatcherState::Closed => {}
            _ => {
                self.state = WatcherState::PendingRescan {
                    deadline: now + self.debounce,
                };
            }
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            WatcherState::PendingRescan { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// Move to `Scanning` once the deadline has passed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.state {
            WatcherState::PendingRescan { deadline } if deadline <= now => {
                self.state = WatcherState::Scanning;
                true
            }
            _ => false,
        }
    }

    pub fn finish(&mut self) {
        if self.state == WatcherState::Scanning {
            self.state = WatcherState::Idle;
        }
    }

    /// Stop for good and drop the subscription if the document is still around
    pub fn close(&mut self, doc: Option<&mut Document>) {
        self.state = WatcherState::Closed;
        if let (Some(id), Some(doc)) = (self.observer.take(), doc) {
            doc.disconnect(id);
        }
    }
}
