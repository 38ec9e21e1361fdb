use kieli_types::VocabularyEntry;

use crate::document::{Document, NodeId};

mod document_tests;
mod scanner_tests;
mod tooltip_tests;
mod vocabulary_tests;
mod watcher_tests;

pub fn entry(native: &str, learning: &str) -> VocabularyEntry {
    VocabularyEntry::new(native, learning, "English", "Finnish")
}

/// `<p>text</p>` appended to `parent`; returns (p, text node)
pub fn paragraph(doc: &mut Document, parent: NodeId, text: &str) -> (NodeId, NodeId) {
    let p = doc.create_element("p");
    let t = doc.create_text(text);
    doc.append_child(p, t).unwrap();
    doc.append_child(parent, p).unwrap();
    (p, t)
}

/// `<tag>text</tag>` appended to `parent`; returns the element
pub fn wrapped(doc: &mut Document, parent: NodeId, tag: &str, text: &str) -> NodeId {
    let el = doc.create_element(tag);
    let t = doc.create_text(text);
    doc.append_child(el, t).unwrap();
    doc.append_child(parent, el).unwrap();
    el
}
