use kieli_config::annotator::AnnotatorConfig;

use crate::dictionary::CompiledDictionary;
use crate::document::{Document, NodeId, NodeKind};

/// Extra caller-supplied rejection rule for text units
pub type ExcludeFn = dyn Fn(&Document, NodeId) -> bool + Send + Sync;

/// Selects text units that may be annotated.
///
/// One preorder walk. Element subtrees that can never hold eligible text
/// (skip tags, editable surfaces, markers, the overlay) are pruned on entry,
/// so each text node is tested exactly once.
pub struct ContentScanner<'a> {
    config: &'a AnnotatorConfig,
    exclude: Option<&'a ExcludeFn>,
}

impl<'a> ContentScanner<'a> {
    pub fn new(config: &'a AnnotatorConfig) -> Self {
        Self {
            config,
            exclude: None,
        }
    }

    pub fn with_exclusion(mut self, exclude: &'a ExcludeFn) -> Self {
        self.exclude = Some(exclude);
        self
    }

    /// Eligible units under `root` in document order. Never mutates.
    pub fn scan(&self, doc: &Document, root: NodeId, dictionary: &CompiledDictionary) -> Vec<NodeId> {
        let mut units = Vec::new();
        if dictionary.is_empty() {
            return units;
        }

        // a root that itself sits in excluded content yields nothing
        if doc
            .ancestors(root)
            .skip(1)
            .any(|ancestor| self.prunes(doc, ancestor))
        {
            return units;
        }

        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match doc.kind(node) {
                Some(NodeKind::Text(text)) => {
                    if self.accepts(doc, node, text, dictionary) {
                        units.push(node);
                    }
                }
                Some(_) => {
                    if self.prunes(doc, node) {
                        continue;
                    }
                    stack.extend(doc.children(node).iter().rev().copied());
                }
                None => {}
            }
        }

        tracing::debug!("Scanner found {} eligible units", units.len());
        units
    }

    fn accepts(&self, doc: &Document, node: NodeId, text: &str, dictionary: &CompiledDictionary) -> bool {
        if let Some(exclude) = self.exclude {
            if exclude(doc, node) {
                return false;
            }
        }
        dictionary.is_match(text)
    }

    /// Whether nothing inside `node` may be annotated
    fn prunes(&self, doc: &Document, node: NodeId) -> bool {
        match doc.kind(node) {
            Some(NodeKind::Annotation(_)) | Some(NodeKind::Overlay) => true,
            Some(NodeKind::Element(element)) => {
                self.config.is_skip_tag(&element.tag)
                    || self.config.is_editable_tag(&element.tag)
                    || element.is_content_editable()
            }
            _ => false,
        }
    }
}
