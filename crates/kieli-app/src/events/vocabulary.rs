use std::time::{SystemTime, UNIX_EPOCH};

use kieli_core::session::{SessionCommand, SessionHandle};
use kieli_core::vocabulary::VocabularyStore;
use kieli_types::{VocabularyEntry, VocabularySource};

use crate::state::AppState;

fn now_millis() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_millis() as u64)
}

pub async fn handle_add_word(
    state: &AppState,
    session: &SessionHandle,
    native: String,
    learning: String,
) -> anyhow::Result<()> {
    let mut entry = {
        let config = state.config.read().await;
        VocabularyEntry::new(
            native,
            learning,
            config.vocabulary.native_lang.clone(),
            config.vocabulary.learning_lang.clone(),
        )
    };
    entry.source = Some(VocabularySource::Manual);
    entry.added_at = now_millis();

    tracing::info!("Adding '{}' -> '{}'", entry.native_word, entry.learning_word);
    state.vocabulary.write().await.add(entry)?;
    sync_vocabulary(state, session).await
}

pub async fn handle_toggle_word(state: &AppState, session: &SessionHandle, native: &str) -> anyhow::Result<()> {
    let enabled = state.vocabulary.write().await.toggle(native)?;
    tracing::info!("'{}' is now {}", native, if enabled { "enabled" } else { "disabled" });
    sync_vocabulary(state, session).await
}

pub async fn handle_remove_word(state: &AppState, session: &SessionHandle, native: &str) -> anyhow::Result<()> {
    let removed = state.vocabulary.write().await.remove(native)?;
    tracing::info!("Removed '{}'", removed.native_word);
    sync_vocabulary(state, session).await
}

/// Persist, then hand the new active set to the session
async fn sync_vocabulary(state: &AppState, session: &SessionHandle) -> anyhow::Result<()> {
    if let Err(e) = state.save_vocabulary().await {
        tracing::warn!("Failed to save vocabulary: {}", e);
    }
    let entries = state.active_entries().await;
    session.send(SessionCommand::VocabularyChanged(entries)).await?;
    Ok(())
}
