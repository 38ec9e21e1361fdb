use kieli_config::annotator::AnnotatorConfig;

use super::{entry, paragraph, wrapped};
use crate::dictionary::CompiledDictionary;
use crate::document::{AnnotationMarker, Document, NodeId};
use crate::scanner::ContentScanner;

fn hot_dictionary() -> CompiledDictionary {
    CompiledDictionary::compile(&[entry("hot", "kuuma")], &[])
}

#[test]
fn test_excluded_containers_are_pruned() {
    let mut doc = Document::new();
    let root = doc.root();
    let region = doc.create_element("div");
    doc.append_child(root, region).unwrap();

    let (_, visible) = paragraph(&mut doc, region, "hot tea");
    wrapped(&mut doc, region, "script", "var hot = 1;");
    wrapped(&mut doc, region, "style", ".hot { }");
    wrapped(&mut doc, region, "textarea", "hot draft");
    let editable = wrapped(&mut doc, region, "div", "hot notes");
    doc.set_attribute(editable, "contenteditable", "true").unwrap();
    let plain = wrapped(&mut doc, region, "div", "plaintext hot");
    doc.set_attribute(plain, "contenteditable", "plaintext-only").unwrap();
    paragraph(&mut doc, region, "nothing to see");

    let config = AnnotatorConfig::default();
    let units = ContentScanner::new(&config).scan(&doc, region, &hot_dictionary());
    assert_eq!(units, vec![visible]);
}

#[test]
fn test_markers_and_overlay_are_skipped() {
    let mut doc = Document::new();
    let root = doc.root();
    let (p, _) = paragraph(&mut doc, root, "cold ");
    let marker = doc.create_annotation(AnnotationMarker::new("hot", &entry("hot", "kuuma")));
    doc.append_child(p, marker).unwrap();

    let overlay = doc.ensure_overlay();
    let popup = doc.create_text("hot popup");
    doc.append_child(overlay, popup).unwrap();

    let config = AnnotatorConfig::default();
    let units = ContentScanner::new(&config).scan(&doc, root, &hot_dictionary());
    assert!(units.is_empty());
}

#[test]
fn test_units_in_document_order() {
    let mut doc = Document::new();
    let root = doc.root();
    let (_, first) = paragraph(&mut doc, root, "hot one");
    let list = doc.create_element("ul");
    doc.append_child(root, list).unwrap();
    let item = wrapped(&mut doc, list, "li", "hot two");
    let second = doc.children(item)[0];
    let (_, third) = paragraph(&mut doc, root, "hot three");

    let config = AnnotatorConfig::default();
    let units = ContentScanner::new(&config).scan(&doc, root, &hot_dictionary());
    assert_eq!(units, vec![first, second, third]);
}

#[test]
fn test_root_inside_excluded_content() {
    let mut doc = Document::new();
    let root = doc.root();
    let script = wrapped(&mut doc, root, "script", "");
    let (inner, _) = paragraph(&mut doc, script, "hot");

    let config = AnnotatorConfig::default();
    let units = ContentScanner::new(&config).scan(&doc, inner, &hot_dictionary());
    assert!(units.is_empty());
}

#[test]
fn test_empty_dictionary_scans_nothing() {
    let mut doc = Document::new();
    let root = doc.root();
    paragraph(&mut doc, root, "hot");

    let config = AnnotatorConfig::default();
    let units = ContentScanner::new(&config).scan(&doc, root, &CompiledDictionary::empty());
    assert!(units.is_empty());
}

#[test]
fn test_caller_exclusion() {
    let mut doc = Document::new();
    let root = doc.root();
    let (_, kept) = paragraph(&mut doc, root, "hot kept");
    let (quoted, _) = paragraph(&mut doc, root, "hot quoted");
    doc.set_attribute(quoted, "data-no-annotate", "").unwrap();

    let exclude = |doc: &Document, node: NodeId| {
        doc.ancestors(node)
            .filter_map(|n| doc.element(n))
            .any(|e| e.attribute("data-no-annotate").is_some())
    };

    let config = AnnotatorConfig::default();
    let units = ContentScanner::new(&config)
        .with_exclusion(&exclude)
        .scan(&doc, root, &hot_dictionary());
    assert_eq!(units, vec![kept]);
}
