use kieli_core::document::NodeId;
use kieli_core::session::{SessionCommand, SessionHandle};
use kieli_core::tooltip::MarkerEvent;

use crate::state::AppState;

/// Move the pointer onto marker `index` (1-based), leaving the previous one
pub async fn handle_hover(
    state: &AppState,
    session: &SessionHandle,
    hovered: &mut Option<NodeId>,
    index: usize,
) -> anyhow::Result<()> {
    let marker = {
        let doc = state.document.read().await;
        index
            .checked_sub(1)
            .and_then(|i| doc.markers(state.region).get(i).copied())
    };
    let Some(marker) = marker else {
        anyhow::bail!("No marker #{index}");
    };

    if let Some(previous) = hovered.take() {
        if previous != marker {
            session
                .send(SessionCommand::Marker(MarkerEvent::Leave(previous)))
                .await?;
        }
    }
    session
        .send(SessionCommand::Marker(MarkerEvent::Enter(marker)))
        .await?;
    *hovered = Some(marker);
    Ok(())
}

pub async fn handle_leave(session: &SessionHandle, hovered: &mut Option<NodeId>) -> anyhow::Result<()> {
    if let Some(marker) = hovered.take() {
        session
            .send(SessionCommand::Marker(MarkerEvent::Leave(marker)))
            .await?;
    }
    Ok(())
}
