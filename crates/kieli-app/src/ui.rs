use std::sync::Arc;

use kanal::AsyncReceiver;
use kieli_core::session::SessionEvent;
use kieli_core::tooltip::TooltipChange;

use crate::render::{marker_legend, render_popup, render_region};
use crate::state::AppState;

/// Print session output until the session closes
pub async fn ui_loop(state: Arc<AppState>, events: AsyncReceiver<SessionEvent>) -> anyhow::Result<()> {
    while let Ok(event) = events.recv().await {
        match event {
            SessionEvent::Rescanned(report) => {
                let doc = state.document.read().await;
                println!("{}", render_region(&doc, state.region, state.color));
                if report.markers > 0 {
                    for line in marker_legend(&doc, state.region) {
                        println!("  {line}");
                    }
                }
            }
            SessionEvent::Tooltip(TooltipChange::Shown(popup))
            | SessionEvent::Tooltip(TooltipChange::Moved(popup)) => {
                println!("{}", render_popup(&popup));
            }
            SessionEvent::Tooltip(TooltipChange::Hidden(_)) => println!("popup hidden"),
            SessionEvent::Tooltip(TooltipChange::Unchanged) => {}
            SessionEvent::Restored(count) => println!("restored {count} markers"),
            SessionEvent::Closed => break,
        }
    }
    Ok(())
}
