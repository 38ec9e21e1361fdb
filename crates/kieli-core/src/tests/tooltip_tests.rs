use kieli_config::annotator::AnnotatorConfig;
use kieli_config::tooltip::TooltipConfig;
use kieli_types::{Point, Rect, Size};

use super::{entry, paragraph};
use crate::annotator::Annotator;
use crate::document::{AnnotationMarker, Document, NodeId};
use crate::layout::{FlowLayout, Viewport};
use crate::tooltip::{MarkerEvent, TooltipChange, TooltipController, place_popup};

const VIEWPORT: Size = Size {
    width: 800.0,
    height: 600.0,
};

const POPUP: Size = Size {
    width: 120.0,
    height: 60.0,
};

fn overlay_children(doc: &Document) -> usize {
    doc.overlay().map_or(0, |o| doc.children(o).len())
}

/// Region with "hot day, cold night" annotated; returns (doc, markers)
fn annotated() -> (Document, Vec<NodeId>) {
    let mut doc = Document::new();
    let root = doc.root();
    let (p, _) = paragraph(&mut doc, root, "hot day, cold night");

    let mut annotator = Annotator::new(p, AnnotatorConfig::default());
    annotator.set_vocabulary(vec![entry("hot", "kuuma"), entry("cold", "kylmä")]);
    annotator.rescan(&mut doc);

    let markers = doc.markers(p);
    (doc, markers)
}

#[test]
fn test_popup_above_and_centered() {
    let anchor = Rect::new(100.0, 100.0, 40.0, 18.0);
    let position = place_popup(anchor, POPUP, VIEWPORT, &TooltipConfig::default());
    assert_eq!(position, Some(Point { x: 60.0, y: 32.0 }));
}

#[test]
fn test_popup_flips_below_near_top() {
    let anchor = Rect::new(100.0, 20.0, 40.0, 18.0);
    let position = place_popup(anchor, POPUP, VIEWPORT, &TooltipConfig::default());
    assert_eq!(position, Some(Point { x: 60.0, y: 46.0 }));
}

#[test]
fn test_popup_clamped_to_margins() {
    let config = TooltipConfig::default();

    let right = place_popup(Rect::new(780.0, 200.0, 20.0, 18.0), POPUP, VIEWPORT, &config).unwrap();
    assert_eq!(right.x, 672.0);

    let left = place_popup(Rect::new(0.0, 200.0, 20.0, 18.0), POPUP, VIEWPORT, &config).unwrap();
    assert_eq!(left.x, 8.0);
}

#[test]
fn test_zero_size_anchor_suppresses_popup() {
    let anchor = Rect::new(100.0, 100.0, 0.0, 0.0);
    assert_eq!(place_popup(anchor, POPUP, VIEWPORT, &TooltipConfig::default()), None);
}

#[test]
fn test_hover_shows_then_leave_hides() {
    let (mut doc, markers) = annotated();
    let layout = FlowLayout::default();
    let mut viewport = Viewport::new(VIEWPORT.width, VIEWPORT.height);
    let mut tooltip = TooltipController::new(TooltipConfig::default());

    let change = tooltip.handle(&mut doc, &layout, &mut viewport, MarkerEvent::Enter(markers[0]));
    let TooltipChange::Shown(state) = change else {
        panic!("expected popup, got {change:?}");
    };
    assert_eq!(state.marker, markers[0]);
    assert_eq!(state.content.lines(), vec!["English → Finnish", "\"hot\" → \"kuuma\""]);
    // first line has no room above, so the popup sits below it
    assert_eq!(state.position, Point { x: 8.0, y: 26.0 });
    assert_eq!(viewport.listener_count(), 2);
    assert_eq!(overlay_children(&doc), 1);

    let change = tooltip.handle(&mut doc, &layout, &mut viewport, MarkerEvent::Leave(markers[0]));
    assert_eq!(change, TooltipChange::Hidden(markers[0]));
    assert!(tooltip.popup().is_none());
    assert_eq!(viewport.listener_count(), 0);
    assert_eq!(overlay_children(&doc), 0);
}

#[test]
fn test_last_hover_wins() {
    let (mut doc, markers) = annotated();
    let layout = FlowLayout::default();
    let mut viewport = Viewport::new(VIEWPORT.width, VIEWPORT.height);
    let mut tooltip = TooltipController::new(TooltipConfig::default());

    tooltip.handle(&mut doc, &layout, &mut viewport, MarkerEvent::Enter(markers[0]));
    tooltip.handle(&mut doc, &layout, &mut viewport, MarkerEvent::Enter(markers[1]));

    // late leave from the first marker
    let change = tooltip.handle(&mut doc, &layout, &mut viewport, MarkerEvent::Leave(markers[0]));
    assert_eq!(change, TooltipChange::Unchanged);
    assert_eq!(tooltip.popup().map(|p| p.marker), Some(markers[1]));
    assert_eq!(viewport.listener_count(), 2);
    assert_eq!(overlay_children(&doc), 1);
}

#[test]
fn test_repeated_hover_does_not_leak_listeners() {
    let (mut doc, markers) = annotated();
    let layout = FlowLayout::default();
    let mut viewport = Viewport::new(VIEWPORT.width, VIEWPORT.height);
    let mut tooltip = TooltipController::new(TooltipConfig::default());

    for _ in 0..5 {
        tooltip.handle(&mut doc, &layout, &mut viewport, MarkerEvent::Focus(markers[0]));
        tooltip.handle(&mut doc, &layout, &mut viewport, MarkerEvent::Blur(markers[0]));
    }
    assert_eq!(viewport.listener_count(), 0);
    assert_eq!(overlay_children(&doc), 0);
}

#[test]
fn test_hidden_marker_gets_no_popup() {
    let mut doc = Document::new();
    let root = doc.root();
    let hidden = doc.create_element("div");
    doc.set_attribute(hidden, "hidden", "").unwrap();
    doc.append_child(root, hidden).unwrap();
    let marker = doc.create_annotation(AnnotationMarker::new("hot", &entry("hot", "kuuma")));
    doc.append_child(hidden, marker).unwrap();

    let layout = FlowLayout::default();
    let mut viewport = Viewport::new(VIEWPORT.width, VIEWPORT.height);
    let mut tooltip = TooltipController::new(TooltipConfig::default());

    let change = tooltip.handle(&mut doc, &layout, &mut viewport, MarkerEvent::Enter(marker));
    assert_eq!(change, TooltipChange::Unchanged);
    assert_eq!(viewport.listener_count(), 0);
    assert_eq!(overlay_children(&doc), 0);
}

#[test]
fn test_plain_text_is_not_a_marker() {
    let mut doc = Document::new();
    let root = doc.root();
    let (_, text) = paragraph(&mut doc, root, "plain");

    let layout = FlowLayout::default();
    let mut viewport = Viewport::new(VIEWPORT.width, VIEWPORT.height);
    let mut tooltip = TooltipController::new(TooltipConfig::default());

    let change = tooltip.handle(&mut doc, &layout, &mut viewport, MarkerEvent::Enter(text));
    assert_eq!(change, TooltipChange::Unchanged);
}

#[test]
fn test_scroll_repositions_popup() {
    let (mut doc, markers) = annotated();
    let layout = FlowLayout::default();
    let mut viewport = Viewport::new(VIEWPORT.width, VIEWPORT.height);
    let mut tooltip = TooltipController::new(TooltipConfig::default());

    tooltip.handle(&mut doc, &layout, &mut viewport, MarkerEvent::Enter(markers[0]));

    let fired = viewport.scroll_by(0.0, 10.0);
    assert_eq!(fired.len(), 1);
    let change = tooltip.on_viewport_change(&mut doc, &layout, &mut viewport, &fired);
    let TooltipChange::Moved(state) = change else {
        panic!("expected move, got {change:?}");
    };
    assert_eq!(state.position, Point { x: 8.0, y: 16.0 });

    // nothing registered for listeners we do not own
    let stranger = viewport.add_listener(crate::layout::ListenerKind::Scroll);
    let change = tooltip.on_viewport_change(&mut doc, &layout, &mut viewport, &[stranger]);
    assert_eq!(change, TooltipChange::Unchanged);
}

#[test]
fn test_arena_reuses_slots_across_hover_and_rescan() {
    let mut doc = Document::new();
    let root = doc.root();
    let (p, _) = paragraph(&mut doc, root, "hot day");

    let layout = FlowLayout::default();
    let mut viewport = Viewport::new(VIEWPORT.width, VIEWPORT.height);
    let mut tooltip = TooltipController::new(TooltipConfig::default());
    let mut annotator = Annotator::new(p, AnnotatorConfig::default());

    for round in 0..500 {
        // alternate so every round restores the previous marker first
        let word = if round % 2 == 0 { "hot" } else { "day" };
        annotator.set_vocabulary(vec![entry(word, "sana")]);
        assert_eq!(annotator.rescan(&mut doc).markers, 1);

        let marker = doc.markers(p)[0];
        tooltip.handle(&mut doc, &layout, &mut viewport, MarkerEvent::Enter(marker));
        tooltip.handle(&mut doc, &layout, &mut viewport, MarkerEvent::Leave(marker));
    }

    // body, paragraph, overlay, one text fragment and one marker
    assert_eq!(doc.live_nodes(), 5);
    assert!(doc.capacity() < 16, "arena grew to {}", doc.capacity());
    assert_eq!(doc.source_text(p), "hot day");
    assert_eq!(viewport.listener_count(), 0);
}
