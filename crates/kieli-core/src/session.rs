use std::sync::{Arc, Weak};
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use kieli_config::Config;
use kieli_types::{Suggestion, VocabularyEntry};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::annotator::{Annotator, RescanReport};
use crate::document::{Document, MutationBatch};
use crate::error::SessionError;
use crate::layout::{LayoutProvider, ListenerId, Viewport};
use crate::tooltip::{MarkerEvent, TooltipChange, TooltipController};
use crate::watcher::MutationWatcher;

pub type SharedDocument = Arc<RwLock<Document>>;

#[derive(Debug, Clone)]
pub enum SessionCommand {
    VocabularyChanged(Vec<VocabularyEntry>),
    SuggestionsChanged(Vec<Suggestion>),
    Marker(MarkerEvent),
    Scroll { dx: f32, dy: f32 },
    Resize { width: f32, height: f32 },
    /// Undo all markers now; the next trigger annotates again
    Restore,
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    Rescanned(RescanReport),
    Tooltip(TooltipChange),
    Restored(usize),
    Closed,
}

/// Owner-side handle; dropping it without `shutdown` leaves the task to
/// notice the closed command channel.
pub struct SessionHandle {
    pub id: Uuid,
    commands: AsyncSender<SessionCommand>,
    events: AsyncReceiver<SessionEvent>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed(self.id))
    }

    pub fn events(&self) -> &AsyncReceiver<SessionEvent> {
        &self.events
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel and wait for the restore/teardown to finish
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::error!("Session {} task failed: {}", self.id, e);
        }
    }
}

/// Everything one live region needs
pub struct Session {
    id: Uuid,
    document: Weak<RwLock<Document>>,
    annotator: Annotator,
    watcher: MutationWatcher,
    tooltip: TooltipController,
    viewport: Viewport,
    layout: Box<dyn LayoutProvider>,
    events: AsyncSender<SessionEvent>,
}

/// Start a live session for the annotator's region of `document`
pub fn spawn_session(
    document: &SharedDocument,
    annotator: Annotator,
    config: &Config,
    layout: Box<dyn LayoutProvider>,
) -> SessionHandle {
    let id = Uuid::new_v4();
    let (command_tx, command_rx) = kanal::bounded_async(64);
    let (event_tx, event_rx) = kanal::unbounded_async();
    let cancel = CancellationToken::new();

    let session = Session {
        id,
        document: Arc::downgrade(document),
        annotator,
        watcher: MutationWatcher::new(Duration::from_millis(config.annotator.debounce_ms)),
        tooltip: TooltipController::new(config.tooltip.clone()),
        viewport: Viewport::new(config.viewport.width, config.viewport.height),
        layout,
        events: event_tx,
    };

    let task = tokio::spawn(session.run(command_rx, cancel.child_token()));

    SessionHandle {
        id,
        commands: command_tx,
        events: event_rx,
        cancel,
        task,
    }
}

impl Session {
    async fn run(mut self, commands: AsyncReceiver<SessionCommand>, cancel: CancellationToken) {
        tracing::info!("Session {} starting on region {}", self.id, self.annotator.root());

        let Some(mutations) = self.mount().await else {
            tracing::debug!("Session {} document gone before mount", self.id);
            return;
        };

        loop {
            let deadline = self.watcher.deadline();

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                batch = mutations.recv() => match batch {
                    Ok(batch) => self.on_mutations(batch).await,
                    // the document dropped its observers
                    Err(_) => break,
                },
                command = commands.recv() => match command {
                    Ok(command) => self.on_command(command).await,
                    Err(_) => break,
                },
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if self.watcher.poll(Instant::now()) {
                        self.rescan(&mutations).await;
                        self.watcher.finish();
                    }
                }
            }
        }

        self.teardown().await;
        tracing::info!("Session {} closed", self.id);
    }

    /// Subscribe and run the initial pass
    async fn mount(&mut self) -> Option<AsyncReceiver<MutationBatch>> {
        let document = self.document.upgrade()?;
        let mut doc = document.write().await;
        let rx = self.watcher.attach(&mut doc, self.annotator.root());
        let report = self.annotator.rescan(&mut doc);
        drop(doc);
        self.emit(SessionEvent::Rescanned(report));
        Some(rx)
    }

    async fn on_mutations(&mut self, batch: MutationBatch) {
        let Some(document) = self.document.upgrade() else {
            return;
        };
        let doc = document.read().await;
        if !doc.is_connected(self.annotator.root()) {
            return;
        }
        if self.watcher.on_mutations(&doc, &batch, Instant::now()) {
            tracing::debug!("Session {}: qualifying mutation, rescan scheduled", self.id);
        }
    }

    async fn on_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::VocabularyChanged(entries) => {
                if self.annotator.set_vocabulary(entries) {
                    self.watcher.trigger(Instant::now());
                }
            }
            SessionCommand::SuggestionsChanged(suggestions) => {
                if self.annotator.set_suggestions(suggestions) {
                    self.watcher.trigger(Instant::now());
                }
            }
            SessionCommand::Marker(event) => {
                let Some(document) = self.document.upgrade() else {
                    return;
                };
                let mut doc = document.write().await;
                let change = self
                    .tooltip
                    .handle(&mut doc, self.layout.as_ref(), &mut self.viewport, event);
                doc.flush_records();
                drop(doc);
                if change != TooltipChange::Unchanged {
                    self.emit(SessionEvent::Tooltip(change));
                }
            }
            SessionCommand::Scroll { dx, dy } => {
                let fired = self.viewport.scroll_by(dx, dy);
                self.reposition(fired).await;
            }
            SessionCommand::Resize { width, height } => {
                let fired = self.viewport.resize(width, height);
                self.reposition(fired).await;
            }
            SessionCommand::Restore => {
                let Some(document) = self.document.upgrade() else {
                    return;
                };
                let mut doc = document.write().await;
                let change = self.tooltip.hide(&mut doc, &mut self.viewport);
                doc.flush_records();
                let restored = self.annotator.restore(&mut doc);
                doc.take_records();
                drop(doc);
                if change != TooltipChange::Unchanged {
                    self.emit(SessionEvent::Tooltip(change));
                }
                self.emit(SessionEvent::Restored(restored));
            }
        }
    }

    async fn reposition(&mut self, fired: Vec<ListenerId>) {
        if fired.is_empty() {
            return;
        }
        let Some(document) = self.document.upgrade() else {
            return;
        };
        let mut doc = document.write().await;
        let change = self
            .tooltip
            .on_viewport_change(&mut doc, self.layout.as_ref(), &mut self.viewport, &fired);
        doc.flush_records();
        drop(doc);
        if change != TooltipChange::Unchanged {
            self.emit(SessionEvent::Tooltip(change));
        }
    }

    async fn rescan(&mut self, mutations: &AsyncReceiver<MutationBatch>) {
        let Some(document) = self.document.upgrade() else {
            return;
        };
        let mut doc = document.write().await;
        let report = self.annotator.rescan(&mut doc);

        // everything queued so far happened before this pass and is covered by it
        let mut covered = 0;
        while let Ok(Some(_)) = mutations.as_sync().try_recv() {
            covered += 1;
        }
        if covered > 0 {
            tracing::debug!("Session {} dropped {} batches covered by the rescan", self.id, covered);
        }

        let change = self.release_orphaned_popup(&mut doc);
        drop(doc);

        tracing::debug!("Session {} rescan: {} markers", self.id, report.markers);
        self.emit(SessionEvent::Rescanned(report));
        if change != TooltipChange::Unchanged {
            self.emit(SessionEvent::Tooltip(change));
        }
    }

    /// Hide a popup whose marker no longer exists in the tree
    fn release_orphaned_popup(&mut self, doc: &mut Document) -> TooltipChange {
        let orphaned = self
            .tooltip
            .popup()
            .is_some_and(|popup| !doc.is_connected(popup.marker));
        if !orphaned {
            return TooltipChange::Unchanged;
        }
        let change = self.tooltip.hide(doc, &mut self.viewport);
        doc.flush_records();
        change
    }

    async fn teardown(&mut self) {
        let document = self.document.upgrade();
        match document {
            Some(document) => {
                let mut doc = document.write().await;
                self.watcher.close(Some(&mut doc));
                self.tooltip.hide(&mut doc, &mut self.viewport);
                let restored = self.annotator.restore(&mut doc);
                doc.take_records();
                drop(doc);
                self.emit(SessionEvent::Restored(restored));
            }
            None => self.watcher.close(None),
        }
        self.emit(SessionEvent::Closed);
    }

    fn emit(&self, event: SessionEvent) {
        // nobody listening is fine
        let _ = self.events.try_send(event);
    }
}
