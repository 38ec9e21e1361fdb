use kieli_config::tooltip::TooltipConfig;
use kieli_types::{Point, Rect, Size};

use crate::document::{AnnotationMarker, Document, NodeId};
use crate::layout::{LayoutProvider, ListenerId, ListenerKind, Viewport};

/// Pointer or keyboard activity on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerEvent {
    Enter(NodeId),
    Leave(NodeId),
    Focus(NodeId),
    Blur(NodeId),
}

/// What the popup says about one marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupContent {
    pub languages: String,
    pub original: String,
    pub replacement: String,
}

impl PopupContent {
    pub fn for_marker(marker: &AnnotationMarker) -> Self {
        Self {
            languages: format!("{} → {}", marker.native_lang, marker.learning_lang),
            original: marker.original.clone(),
            replacement: marker.replacement.clone(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            self.languages.clone(),
            format!("\"{}\" → \"{}\"", self.original, self.replacement),
        ]
    }

    pub fn estimate_size(&self, config: &TooltipConfig) -> Size {
        let lines = self.lines();
        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        Size {
            width: widest as f32 * config.char_width + 2.0 * config.padding,
            height: lines.len() as f32 * config.line_height + 2.0 * config.padding,
        }
    }
}

/// Top-left corner for a popup anchored to `anchor`.
///
/// Above the anchor when it fits, otherwise below; centered horizontally and
/// clamped to the viewport margins. `None` for an anchor with no area.
pub fn place_popup(anchor: Rect, popup: Size, viewport: Size, config: &TooltipConfig) -> Option<Point> {
    if anchor.is_empty() {
        return None;
    }

    let mut top = anchor.top() - popup.height - config.gap;
    if top < config.margin {
        top = anchor.bottom() + config.gap;
    }

    let mut left = anchor.left() + (anchor.width - popup.width) / 2.0;
    if left + popup.width > viewport.width - config.margin {
        left = viewport.width - popup.width - config.margin;
    }
    if left < config.margin {
        left = config.margin;
    }

    Some(Point {
        x: left.round(),
        y: top.round(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupState {
    pub marker: NodeId,
    pub position: Point,
    pub size: Size,
    pub content: PopupContent,
}

#[derive(Debug)]
struct ActivePopup {
    state: PopupState,
    node: NodeId,
    scroll: ListenerId,
    resize: ListenerId,
}

/// The one place a popup may live. Acquiring releases any previous holder first.
#[derive(Debug, Default)]
pub struct PopupSlot {
    active: Option<ActivePopup>,
}

impl PopupSlot {
    pub fn is_occupied(&self) -> bool {
        self.active.is_some()
    }

    pub fn state(&self) -> Option<&PopupState> {
        self.active.as_ref().map(|a| &a.state)
    }

    fn acquire(&mut self, doc: &mut Document, viewport: &mut Viewport, state: PopupState) {
        self.release(doc, viewport);

        let overlay = doc.ensure_overlay();
        let node = doc.create_element("div");
        let _ = doc.set_attribute(node, "class", "kieli-popup");
        for line in state.content.lines() {
            let text = doc.create_text(line);
            let _ = doc.append_child(node, text);
        }
        if let Err(e) = doc.append_child(overlay, node) {
            tracing::warn!("Failed to attach popup: {}", e);
            let _ = doc.release(node);
            return;
        }

        let scroll = viewport.add_listener(ListenerKind::Scroll);
        let resize = viewport.add_listener(ListenerKind::Resize);
        self.active = Some(ActivePopup {
            state,
            node,
            scroll,
            resize,
        });
    }

    fn release(&mut self, doc: &mut Document, viewport: &mut Viewport) -> Option<NodeId> {
        let active = self.active.take()?;
        viewport.remove_listener(active.scroll);
        viewport.remove_listener(active.resize);
        if doc.parent(active.node).is_some() {
            let _ = doc.remove(active.node);
        }
        if let Err(e) = doc.release(active.node) {
            tracing::debug!("Popup {} not released: {}", active.node, e);
        }
        Some(active.state.marker)
    }
}

/// Outcome of one controller call, for hosts that render popups themselves
#[derive(Debug, Clone, PartialEq)]
pub enum TooltipChange {
    Shown(PopupState),
    Moved(PopupState),
    Hidden(NodeId),
    Unchanged,
}

/// Hover/focus behavior for annotation markers
pub struct TooltipController {
    config: TooltipConfig,
    slot: PopupSlot,
}

impl TooltipController {
    pub fn new(config: TooltipConfig) -> Self {
        Self {
            config,
            slot: PopupSlot::default(),
        }
    }

    pub fn popup(&self) -> Option<&PopupState> {
        self.slot.state()
    }

    pub fn handle(
        &mut self,
        doc: &mut Document,
        layout: &dyn LayoutProvider,
        viewport: &mut Viewport,
        event: MarkerEvent,
    ) -> TooltipChange {
        match event {
            MarkerEvent::Enter(node) | MarkerEvent::Focus(node) => self.show(doc, layout, viewport, node),
            MarkerEvent::Leave(node) | MarkerEvent::Blur(node) => {
                // a stale leave from a superseded marker must not hide the new popup
                if self.slot.state().map(|s| s.marker) != Some(node) {
                    return TooltipChange::Unchanged;
                }
                self.hide(doc, viewport)
            }
        }
    }

    fn show(&mut self, doc: &mut Document, layout: &dyn LayoutProvider, viewport: &mut Viewport, node: NodeId) -> TooltipChange {
        let Some(marker) = doc.annotation(node) else {
            return TooltipChange::Unchanged;
        };
        let content = PopupContent::for_marker(marker);
        let size = content.estimate_size(&self.config);

        let position = layout
            .bounding_box(doc, node, viewport)
            .and_then(|anchor| place_popup(anchor, size, viewport.size(), &self.config));

        let Some(position) = position else {
            tracing::debug!("Marker {} has no visible box, popup suppressed", node);
            // last hover still wins: an older popup goes away
            return match self.slot.release(doc, viewport) {
                Some(previous) => TooltipChange::Hidden(previous),
                None => TooltipChange::Unchanged,
            };
        };

        let state = PopupState {
            marker: node,
            position,
            size,
            content,
        };
        self.slot.acquire(doc, viewport, state.clone());
        tracing::debug!("Popup for {} at ({}, {})", node, position.x, position.y);
        TooltipChange::Shown(state)
    }

    pub fn hide(&mut self, doc: &mut Document, viewport: &mut Viewport) -> TooltipChange {
        match self.slot.release(doc, viewport) {
            Some(marker) => TooltipChange::Hidden(marker),
            None => TooltipChange::Unchanged,
        }
    }

    /// Re-anchor after scroll/resize if one of our listeners fired
    pub fn on_viewport_change(
        &mut self,
        doc: &mut Document,
        layout: &dyn LayoutProvider,
        viewport: &mut Viewport,
        fired: &[ListenerId],
    ) -> TooltipChange {
        let Some(active) = self.slot.active.as_ref() else {
            return TooltipChange::Unchanged;
        };
        if !fired.iter().any(|id| *id == active.scroll || *id == active.resize) {
            return TooltipChange::Unchanged;
        }

        let marker = active.state.marker;
        let size = active.state.size;
        let position = layout
            .bounding_box(doc, marker, viewport)
            .and_then(|anchor| place_popup(anchor, size, viewport.size(), &self.config));

        // marker scrolled out of layout or vanished
        let Some(position) = position else {
            return self.hide(doc, viewport);
        };

        match self.slot.active.as_mut() {
            Some(active) => {
                active.state.position = position;
                TooltipChange::Moved(active.state.clone())
            }
            None => TooltipChange::Unchanged,
        }
    }
}
