use std::sync::Arc;

use kanal::AsyncReceiver;
use kieli_core::document::NodeId;
use kieli_core::session::{SessionCommand, SessionHandle};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

pub mod pointer;
pub mod text_input;
pub mod vocabulary;

use pointer::{handle_hover, handle_leave};
use text_input::handle_text_input;
use vocabulary::{handle_add_word, handle_remove_word, handle_toggle_word};

/// One line of user input in watch mode
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Plain line, appended as a paragraph
    TextInput(String),
    /// 1-based marker number from the legend
    Hover(usize),
    Leave,
    Scroll(f32),
    Resize { width: f32, height: f32 },
    AddWord { native: String, learning: String },
    ToggleWord(String),
    RemoveWord(String),
    Restore,
    Quit,
}

impl AppEvent {
    /// `None` for blank lines
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let line = line.trim_end();
        if line.trim().is_empty() {
            return Ok(None);
        }
        let Some(command) = line.strip_prefix(':') else {
            return Ok(Some(AppEvent::TextInput(line.to_string())));
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        let event = match (name, args.as_slice()) {
            ("hover", [n]) => AppEvent::Hover(n.parse()?),
            ("leave", []) => AppEvent::Leave,
            ("scroll", [dy]) => AppEvent::Scroll(dy.parse()?),
            ("resize", [w, h]) => AppEvent::Resize {
                width: w.parse()?,
                height: h.parse()?,
            },
            ("add", [native, learning @ ..]) if !learning.is_empty() => AppEvent::AddWord {
                native: native.to_string(),
                learning: learning.join(" "),
            },
            ("toggle", [native]) => AppEvent::ToggleWord(native.to_string()),
            ("remove", [native]) => AppEvent::RemoveWord(native.to_string()),
            ("restore", []) => AppEvent::Restore,
            ("quit", []) | ("q", []) => AppEvent::Quit,
            _ => anyhow::bail!("Unknown command: :{command}"),
        };
        Ok(Some(event))
    }
}

/// App's main loop; owns the session and shuts it down on exit
pub async fn event_loop(
    state: Arc<AppState>,
    input_rx: AsyncReceiver<AppEvent>,
    session: SessionHandle,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut hovered: Option<NodeId> = None;

    tracing::info!("Session {} ready, waiting for input", session.id);
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = input_rx.recv() => match event {
                Ok(event) => event,
                Err(_) => break,
            },
        };

        if event == AppEvent::Quit {
            break;
        }

        // a bad command never ends the session
        if let Err(e) = handle_events(&state, &session, &mut hovered, event).await {
            tracing::warn!("{}", e);
        }
    }

    cancel.cancel();
    session.shutdown().await;
    Ok(())
}

pub async fn handle_events(
    state: &AppState,
    session: &SessionHandle,
    hovered: &mut Option<NodeId>,
    event: AppEvent,
) -> anyhow::Result<()> {
    tracing::debug!("Handling {:?}", event);
    match event {
        AppEvent::TextInput(text) => handle_text_input(state, &text).await?,
        AppEvent::Hover(index) => handle_hover(state, session, hovered, index).await?,
        AppEvent::Leave => handle_leave(session, hovered).await?,
        AppEvent::Scroll(dy) => session.send(SessionCommand::Scroll { dx: 0.0, dy }).await?,
        AppEvent::Resize { width, height } => {
            {
                let mut config = state.config.write().await;
                config.viewport.width = width;
                config.viewport.height = height;
            }
            session.send(SessionCommand::Resize { width, height }).await?
        }
        AppEvent::AddWord { native, learning } => {
            handle_add_word(state, session, native, learning).await?
        }
        AppEvent::ToggleWord(native) => handle_toggle_word(state, session, &native).await?,
        AppEvent::RemoveWord(native) => handle_remove_word(state, session, &native).await?,
        AppEvent::Restore => {
            *hovered = None;
            session.send(SessionCommand::Restore).await?
        }
        AppEvent::Quit => {}
    }
    Ok(())
}
