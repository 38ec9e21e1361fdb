use std::time::Duration;

use tokio::time::Instant;

use super::{entry, paragraph};
use crate::document::{AnnotationMarker, Document, MutationRecord};
use crate::watcher::{MutationWatcher, WatcherState};

const DEBOUNCE: Duration = Duration::from_millis(100);

#[test]
fn test_debounce_resets_on_every_trigger() {
    let t0 = Instant::now();
    let mut watcher = MutationWatcher::new(DEBOUNCE);
    assert_eq!(watcher.state(), WatcherState::Idle);

    watcher.trigger(t0);
    assert_eq!(watcher.deadline(), Some(t0 + DEBOUNCE));

    watcher.trigger(t0 + Duration::from_millis(50));
    assert_eq!(watcher.deadline(), Some(t0 + Duration::from_millis(150)));

    assert!(!watcher.poll(t0 + Duration::from_millis(120)));
    assert!(watcher.poll(t0 + Duration::from_millis(150)));
    assert_eq!(watcher.state(), WatcherState::Scanning);
    assert_eq!(watcher.deadline(), None);

    watcher.finish();
    assert_eq!(watcher.state(), WatcherState::Idle);
}

#[test]
fn test_trigger_during_scan_schedules_another() {
    let t0 = Instant::now();
    let mut watcher = MutationWatcher::new(DEBOUNCE);
    watcher.trigger(t0);
    assert!(watcher.poll(t0 + DEBOUNCE));

    watcher.trigger(t0 + DEBOUNCE);
    // finish must not swallow the new pending rescan
    watcher.finish();
    assert_eq!(watcher.deadline(), Some(t0 + DEBOUNCE * 2));
}

#[test]
fn test_only_foreign_insertions_qualify() {
    let mut doc = Document::new();
    let root = doc.root();
    let (p, text) = paragraph(&mut doc, root, "new content");

    let marker = doc.create_annotation(AnnotationMarker::new("hot", &entry("hot", "kuuma")));
    doc.append_child(p, marker).unwrap();

    let overlay = doc.ensure_overlay();
    let popup = doc.create_element("div");
    doc.append_child(overlay, popup).unwrap();

    let record = |target, added| MutationRecord {
        target,
        added: vec![added],
        removed: Vec::new(),
    };

    assert!(MutationWatcher::qualifies(&doc, &[record(p, text)]));
    assert!(!MutationWatcher::qualifies(&doc, &[record(p, marker)]));
    assert!(!MutationWatcher::qualifies(&doc, &[record(overlay, popup)]));
    assert!(MutationWatcher::qualifies(&doc, &[record(p, marker), record(p, text)]));

    let removal = MutationRecord {
        target: p,
        added: Vec::new(),
        removed: vec![text],
    };
    assert!(!MutationWatcher::qualifies(&doc, &[removal]));
}

#[test]
fn test_closed_is_terminal() {
    let t0 = Instant::now();
    let mut doc = Document::new();
    let root = doc.root();
    let (p, text) = paragraph(&mut doc, root, "late");

    let mut watcher = MutationWatcher::new(DEBOUNCE);
    let _rx = watcher.attach(&mut doc, root);
    watcher.trigger(t0);
    watcher.close(Some(&mut doc));

    assert!(watcher.is_closed());
    assert_eq!(doc.observer_count(), 0);

    watcher.trigger(t0);
    let batch = vec![MutationRecord {
        target: p,
        added: vec![text],
        removed: Vec::new(),
    }];
    assert!(!watcher.on_mutations(&doc, &batch, t0));
    assert!(!watcher.poll(t0 + DEBOUNCE));
    assert_eq!(watcher.state(), WatcherState::Closed);
}

#[test]
fn test_reattach_replaces_subscription() {
    let mut doc = Document::new();
    let root = doc.root();
    let mut watcher = MutationWatcher::new(DEBOUNCE);

    let _first = watcher.attach(&mut doc, root);
    let _second = watcher.attach(&mut doc, root);
    assert_eq!(doc.observer_count(), 1);
}

#[test]
fn test_records_reach_only_covering_observers() {
    let mut doc = Document::new();
    let root = doc.root();
    let (left, _) = paragraph(&mut doc, root, "left");
    let (right, _) = paragraph(&mut doc, root, "right");

    let (_, left_rx) = doc.observe(left);
    let (_, right_rx) = doc.observe(right);

    let added = doc.create_text(" more");
    doc.append_child(left, added).unwrap();
    doc.flush_records();

    let left_rx = left_rx.as_sync();
    let batch = left_rx.try_recv().unwrap().unwrap();
    assert_eq!(batch[0].added, vec![added]);
    assert!(right_rx.as_sync().try_recv().unwrap().is_none());

    // own writes can be dropped instead of delivered
    let quiet = doc.create_text(" quiet");
    doc.append_child(left, quiet).unwrap();
    assert_eq!(doc.take_records().len(), 1);
    doc.flush_records();
    assert!(left_rx.try_recv().unwrap().is_none());
}
