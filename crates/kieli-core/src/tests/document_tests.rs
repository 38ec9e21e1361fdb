use super::paragraph;
use crate::document::Document;
use crate::error::DocumentError;

#[test]
fn test_released_ids_go_dead() {
    let mut doc = Document::new();
    let root = doc.root();
    let (p, text) = paragraph(&mut doc, root, "gone");

    assert!(matches!(doc.release(p), Err(DocumentError::Attached(_))));
    assert!(matches!(doc.release(root), Err(DocumentError::Attached(_))));

    doc.remove(p).unwrap();
    assert_eq!(doc.release(p).unwrap(), 2);
    assert!(!doc.is_alive(p));
    assert!(!doc.is_alive(text));
    assert_eq!(doc.text(text), None);

    // the slot is reused under a new id
    let fresh = doc.create_text("new");
    assert_ne!(fresh, p);
    assert_ne!(fresh, text);
    assert_eq!(doc.text(fresh), Some("new"));
    assert_eq!(doc.text(text), None);
    assert!(doc.append_child(p, fresh).is_err());
}

#[test]
fn test_normalize_releases_merged_nodes() {
    let mut doc = Document::new();
    let root = doc.root();
    let (p, first) = paragraph(&mut doc, root, "one ");
    let second = doc.create_text("two");
    let empty = doc.create_text("");
    doc.append_child(p, second).unwrap();
    doc.append_child(p, empty).unwrap();
    let live = doc.live_nodes();

    doc.normalize(p).unwrap();

    assert_eq!(doc.children(p), &[first]);
    assert_eq!(doc.text(first), Some("one two"));
    assert!(!doc.is_alive(second));
    assert!(!doc.is_alive(empty));
    assert_eq!(doc.live_nodes(), live - 2);
}
