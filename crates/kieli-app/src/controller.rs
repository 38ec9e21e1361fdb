use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender, Sender};
use kieli_core::annotator::{Annotator, RescanReport};
use kieli_core::layout::FlowLayout;
use kieli_core::session::{SessionHandle, spawn_session};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::{AppEvent, event_loop};
use crate::io::spawn_stdin_reader;
use crate::render::{append_paragraphs, render_region};
use crate::state::AppState;
use crate::ui::ui_loop;

/// Centralized channel management
pub struct ChannelSet {
    pub input: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            input: kanal::bounded_async(64),
        }
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn input_sender(&self) -> Sender<AppEvent> {
        self.channels.input.0.as_sync().clone()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn spawn_tasks(&self, session: SessionHandle) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();
        let session_events = session.events().clone();

        // Event loop
        tasks.spawn(event_loop(
            self.state.clone(),
            self.channels.input.1.clone(),
            session,
            self.cancel_token.clone(),
        ));

        // Terminal output
        tasks.spawn(ui_loop(self.state.clone(), session_events));

        spawn_stdin_reader(self.input_sender(), self.cancel_token.child_token());

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

/// Live session over the app's region with the current active vocabulary
pub async fn start_session(state: &AppState) -> SessionHandle {
    let config = state.config.read().await.clone();
    let mut annotator = Annotator::new(state.region, config.annotator.clone());
    annotator.set_vocabulary(state.active_entries().await);

    let layout = FlowLayout::new(config.tooltip.char_width, config.tooltip.line_height);
    spawn_session(&state.document, annotator, &config, Box::new(layout))
}

/// Single pass for `kieli annotate`; no observers, no debounce
pub async fn annotate_once(state: &AppState, text: &str) -> anyhow::Result<(String, RescanReport)> {
    let config = state.config.read().await.clone();
    let mut annotator = Annotator::new(state.region, config.annotator.clone());
    annotator.set_vocabulary(state.active_entries().await);

    let mut doc = state.document.write().await;
    append_paragraphs(&mut doc, state.region, text)?;
    let report = annotator.rescan(&mut doc);
    Ok((render_region(&doc, state.region, state.color), report))
}
