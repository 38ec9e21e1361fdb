use crate::render::append_paragraphs;
use crate::state::AppState;

/// Append the line to the region; the session picks it up through the observer
pub async fn handle_text_input(state: &AppState, text: &str) -> anyhow::Result<()> {
    let mut doc = state.document.write().await;
    let added = append_paragraphs(&mut doc, state.region, text)?;
    doc.flush_records();
    tracing::debug!("Appended {} paragraphs", added.len());
    Ok(())
}
