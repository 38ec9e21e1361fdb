use std::collections::BTreeMap;
use std::fmt;

use kanal::{AsyncReceiver, Sender};
use kieli_types::VocabularyEntry;

use crate::error::DocumentError;

pub type Result<T> = std::result::Result<T, DocumentError>;

/// Generational arena index of a node.
///
/// A removed node stays addressable until it is released; after that the id
/// is dead and never aliases whatever reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "#{}", self.index)
        } else {
            write!(f, "#{}v{}", self.index, self.generation)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Inline replacement for a matched word. Everything needed to undo it lives here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationMarker {
    /// Text exactly as it appeared before replacement
    pub original: String,
    /// Learning word displayed in place of the original
    pub replacement: String,
    /// Canonical native word of the matched entry
    pub native_word: String,
    pub native_lang: String,
    pub learning_lang: String,
}

impl AnnotationMarker {
    pub fn new(original: impl Into<String>, entry: &VocabularyEntry) -> Self {
        Self {
            original: original.into(),
            replacement: entry.learning_word.clone(),
            native_word: entry.native_word.clone(),
            native_lang: entry.native_lang.clone(),
            learning_lang: entry.learning_lang.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// `contenteditable`, `contenteditable=""`, `="true"` and `="plaintext-only"`
    pub fn is_content_editable(&self) -> bool {
        match self.attribute("contenteditable") {
            Some(value) => {
                let value = value.trim();
                value.is_empty()
                    || value.eq_ignore_ascii_case("true")
                    || value.eq_ignore_ascii_case("plaintext-only")
            }
            None => false,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.attributes.contains_key("hidden")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
    Annotation(AnnotationMarker),
    /// Floating container for popups; never annotated, never watched
    Overlay,
}

impl NodeKind {
    pub fn can_have_children(&self) -> bool {
        matches!(self, NodeKind::Element(_) | NodeKind::Overlay)
    }

    /// Annotation output or overlay content
    pub fn is_own_output(&self) -> bool {
        matches!(self, NodeKind::Annotation(_) | NodeKind::Overlay)
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// One structural change, shaped like a DOM `childList` mutation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

pub type MutationBatch = Vec<MutationRecord>;

struct Observer {
    id: ObserverId,
    root: NodeId,
    tx: Sender<MutationBatch>,
}

/// Content tree. Node `0` is the body element every connected node hangs from.
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: NodeId,
    overlay: Option<NodeId>,
    records: Vec<MutationRecord>,
    observers: Vec<Observer>,
    next_observer: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let body = Node {
            kind: NodeKind::Element(Element::new("body")),
            parent: None,
            children: Vec::new(),
        };

        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(body),
            }],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            overlay: None,
            records: Vec::new(),
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or(DocumentError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(DocumentError::NodeNotFound(id))
    }

    fn create(&mut self, kind: NodeKind) -> NodeId {
        let node = Node {
            kind,
            parent: None,
            children: Vec::new(),
        };

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }

        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    /// Free a detached subtree so its slots can be reused. Ids into it go dead.
    ///
    /// Returns how many nodes were freed.
    pub fn release(&mut self, id: NodeId) -> Result<usize> {
        let node = self.node(id)?;
        if node.parent.is_some() {
            return Err(DocumentError::Attached(id));
        }
        if id == self.root || Some(id) == self.overlay {
            return Err(DocumentError::Attached(id));
        }

        let doomed: Vec<NodeId> = self.descendants(id).collect();
        for &dead in &doomed {
            let slot = &mut self.slots[dead.index];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(dead.index);
        }
        Ok(doomed.len())
    }

    /// Nodes currently allocated, attached or not
    pub fn live_nodes(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Slots ever allocated
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.create(NodeKind::Element(Element::new(tag)))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.create(NodeKind::Text(text.into()))
    }

    pub fn create_annotation(&mut self, marker: AnnotationMarker) -> NodeId {
        self.create(NodeKind::Annotation(marker))
    }

    /// The single overlay container, appended to the body on first use
    pub fn ensure_overlay(&mut self) -> NodeId {
        if let Some(overlay) = self.overlay {
            return overlay;
        }

        let overlay = self.create(NodeKind::Overlay);
        let root = self.root;
        // body always accepts children and the overlay is fresh
        let _ = self.append_child(root, overlay);
        self.overlay = Some(overlay);
        overlay
    }

    pub fn overlay(&self) -> Option<NodeId> {
        self.overlay
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|n| &n.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn annotation(&self, id: NodeId) -> Option<&AnnotationMarker> {
        match self.kind(id) {
            Some(NodeKind::Annotation(marker)) => Some(marker),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(element) => {
                element
                    .attributes
                    .insert(name.to_ascii_lowercase(), value.to_string());
                Ok(())
            }
            _ => Err(DocumentError::NotContainer(id)),
        }
    }

    /// Node itself first, then parents up to the detached top
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.get(id).map(|_| id),
        }
    }

    /// Preorder, document order, `root` included
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        let stack = if self.get(root).is_some() {
            vec![root]
        } else {
            Vec::new()
        };
        Descendants { doc: self, stack }
    }

    /// Inclusive containment
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|n| n == ancestor)
    }

    /// Reachable from the body
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self.children(parent).len();
        self.insert_at(parent, index, child)
    }

    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> Result<()> {
        let index = self.child_index(parent, reference)?;
        self.insert_at(parent, index, child)
    }

    /// Insert `child` right after `sibling` under the same parent
    pub fn insert_after(&mut self, sibling: NodeId, child: NodeId) -> Result<()> {
        let parent = self.parent(sibling).ok_or(DocumentError::Detached(sibling))?;
        let index = self.child_index(parent, sibling)? + 1;
        self.insert_at(parent, index, child)
    }

    fn child_index(&self, parent: NodeId, child: NodeId) -> Result<usize> {
        self.node(parent)?
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(DocumentError::NotAChild {
                parent,
                reference: child,
            })
    }

    fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        if !self.node(parent)?.kind.can_have_children() {
            return Err(DocumentError::NotContainer(parent));
        }
        self.node(child)?;
        if self.contains(child, parent) {
            return Err(DocumentError::HierarchyRequest { parent, child });
        }

        let mut index = index;
        if let Some(old_parent) = self.parent(child) {
            if old_parent == parent {
                // removing shifts the insertion point left
                if let Ok(old_index) = self.child_index(parent, child) {
                    if old_index < index {
                        index -= 1;
                    }
                }
            }
            self.detach(child)?;
        }

        let node = self.node_mut(parent)?;
        let index = index.min(node.children.len());
        node.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.record(parent, vec![child], Vec::new());
        Ok(())
    }

    fn detach(&mut self, child: NodeId) -> Result<()> {
        let parent = self.parent(child).ok_or(DocumentError::Detached(child))?;
        self.node_mut(parent)?.children.retain(|&c| c != child);
        self.node_mut(child)?.parent = None;
        self.record(parent, Vec::new(), vec![child]);
        Ok(())
    }

    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        self.detach(id)
    }

    /// Put `new` where `old` is; `old` ends up detached
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        let parent = self.parent(old).ok_or(DocumentError::Detached(old))?;
        self.insert_before(parent, new, old)?;
        self.detach(old)
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Text(current) => {
                *current = text.into();
                Ok(())
            }
            _ => Err(DocumentError::NotText(id)),
        }
    }

    /// Truncate a text node at byte `offset`, moving the tail into a new sibling.
    /// Mirrors DOM `Text.splitText`; the original node keeps its identity.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId> {
        let tail = match &mut self.node_mut(id)?.kind {
            NodeKind::Text(text) => {
                if offset > text.len() || !text.is_char_boundary(offset) {
                    return Err(DocumentError::InvalidOffset { node: id, offset });
                }
                text.split_off(offset)
            }
            _ => return Err(DocumentError::NotText(id)),
        };

        let new = self.create_text(tail);
        if self.parent(id).is_some() {
            self.insert_after(id, new)?;
        }
        Ok(new)
    }

    /// Merge adjacent text children and drop empty ones, recursively.
    /// Merged-away nodes are released.
    pub fn normalize(&mut self, id: NodeId) -> Result<()> {
        self.merge_text_children(id, true)
    }

    /// Like [`Document::normalize`] but only for direct children of `id`
    pub fn normalize_shallow(&mut self, id: NodeId) -> Result<()> {
        self.merge_text_children(id, false)
    }

    fn merge_text_children(&mut self, id: NodeId, recursive: bool) -> Result<()> {
        let children = self.node(id)?.children.clone();
        let mut previous_text: Option<NodeId> = None;

        for child in children {
            match self.kind(child) {
                Some(NodeKind::Text(text)) if text.is_empty() => {
                    self.detach(child)?;
                    self.release(child)?;
                }
                Some(NodeKind::Text(text)) => {
                    if let Some(prev) = previous_text {
                        let text = text.clone();
                        if let NodeKind::Text(prev_text) = &mut self.node_mut(prev)?.kind {
                            prev_text.push_str(&text);
                        }
                        self.detach(child)?;
                        self.release(child)?;
                    } else {
                        previous_text = Some(child);
                    }
                }
                Some(NodeKind::Element(_)) | Some(NodeKind::Overlay) => {
                    previous_text = None;
                    if recursive {
                        self.merge_text_children(child, true)?;
                    }
                }
                _ => previous_text = None,
            }
        }
        Ok(())
    }

    /// Visible text; markers show their replacement
    pub fn text_content(&self, id: NodeId) -> String {
        self.collect_text(id, |marker| &marker.replacement)
    }

    /// Text as it was before annotation; markers show their original
    pub fn source_text(&self, id: NodeId) -> String {
        self.collect_text(id, |marker| &marker.original)
    }

    fn collect_text<F>(&self, id: NodeId, marker_text: F) -> String
    where
        F: Fn(&AnnotationMarker) -> &str,
    {
        let mut out = String::new();
        for node in self.descendants(id) {
            match self.kind(node) {
                Some(NodeKind::Text(text)) => out.push_str(text),
                Some(NodeKind::Annotation(marker)) => out.push_str(marker_text(marker)),
                _ => {}
            }
        }
        out
    }

    /// Every marker under `root`, document order
    pub fn markers(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&n| matches!(self.kind(n), Some(NodeKind::Annotation(_))))
            .collect()
    }

    fn record(&mut self, target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        if self.observers.is_empty() {
            return;
        }
        self.records.push(MutationRecord {
            target,
            added,
            removed,
        });
    }

    /// Subscribe to structural changes under `root`
    pub fn observe(&mut self, root: NodeId) -> (ObserverId, AsyncReceiver<MutationBatch>) {
        let (tx, rx) = kanal::unbounded();
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push(Observer { id, root, tx });
        (id, rx.to_async())
    }

    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.id != id);
        before != self.observers.len()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn has_pending_records(&self) -> bool {
        !self.records.is_empty()
    }

    /// Drain buffered records without delivering them
    pub fn take_records(&mut self) -> MutationBatch {
        std::mem::take(&mut self.records)
    }

    /// Deliver buffered records to every observer whose root contains the target
    pub fn flush_records(&mut self) {
        if self.records.is_empty() {
            return;
        }
        let records = std::mem::take(&mut self.records);

        let mut closed = Vec::new();
        for observer in &self.observers {
            let batch: MutationBatch = records
                .iter()
                .filter(|r| self.contains(observer.root, r.target))
                .cloned()
                .collect();
            if batch.is_empty() {
                continue;
            }
            if observer.tx.send(batch).is_err() {
                closed.push(observer.id);
            }
        }

        if !closed.is_empty() {
            tracing::debug!("Dropping {} closed observers", closed.len());
            self.observers.retain(|o| !closed.contains(&o.id));
        }
    }
}

pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(current).iter().rev().copied());
        Some(current)
    }
}
