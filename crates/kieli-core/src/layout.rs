use std::collections::BTreeMap;

use kieli_types::{Rect, Size};

use crate::document::{Document, NodeId, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    Scroll,
    Resize,
}

/// Visible window onto the document, plus its scroll/resize subscriptions
#[derive(Debug)]
pub struct Viewport {
    size: Size,
    scroll_x: f32,
    scroll_y: f32,
    listeners: BTreeMap<ListenerId, ListenerKind>,
    next_listener: u64,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Size { width, height },
            scroll_x: 0.0,
            scroll_y: 0.0,
            listeners: BTreeMap::new(),
            next_listener: 0,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn scroll_offset(&self) -> (f32, f32) {
        (self.scroll_x, self.scroll_y)
    }

    pub fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, kind);
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn fire(&self, kind: ListenerKind) -> Vec<ListenerId> {
        self.listeners
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Scroll the content; returns the listeners to notify
    pub fn scroll_by(&mut self, dx: f32, dy: f32) -> Vec<ListenerId> {
        self.scroll_x = (self.scroll_x + dx).max(0.0);
        self.scroll_y = (self.scroll_y + dy).max(0.0);
        self.fire(ListenerKind::Scroll)
    }

    pub fn resize(&mut self, width: f32, height: f32) -> Vec<ListenerId> {
        self.size = Size { width, height };
        self.fire(ListenerKind::Resize)
    }
}

/// Where a node currently is on screen
pub trait LayoutProvider: Send + Sync {
    /// Viewport-relative box; `None` when the node is not laid out at all
    fn bounding_box(&self, doc: &Document, node: NodeId, viewport: &Viewport) -> Option<Rect>;
}

fn default_block_tags() -> Vec<String> {
    [
        "body", "div", "p", "li", "ul", "ol", "pre", "blockquote", "h1", "h2", "h3", "h4", "h5",
        "h6", "section", "article",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Monospace flow layout: block elements start a new line, text wraps per character.
/// Elements with a `hidden` attribute and their content get zero-size boxes.
pub struct FlowLayout {
    pub char_width: f32,
    pub line_height: f32,
    pub block_tags: Vec<String>,
}

impl Default for FlowLayout {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            line_height: 18.0,
            block_tags: default_block_tags(),
        }
    }
}

struct Cursor {
    x: f32,
    y: f32,
    width: f32,
}

impl FlowLayout {
    pub fn new(char_width: f32, line_height: f32) -> Self {
        Self {
            char_width,
            line_height,
            ..Self::default()
        }
    }

    fn is_block(&self, tag: &str) -> bool {
        self.block_tags.iter().any(|t| t == tag)
    }

    fn newline(&self, cursor: &mut Cursor) {
        if cursor.x > 0.0 {
            cursor.x = 0.0;
            cursor.y += self.line_height;
        }
    }

    /// Lay out `text` at the cursor; returns the box of its first line fragment
    fn flow(&self, cursor: &mut Cursor, text: &str) -> Rect {
        let mut first: Option<Rect> = None;
        let mut start_x = cursor.x;

        for _ in text.chars() {
            if cursor.x + self.char_width > cursor.width && cursor.x > 0.0 {
                if first.is_none() {
                    first = Some(Rect::new(start_x, cursor.y, cursor.x - start_x, self.line_height));
                }
                cursor.x = 0.0;
                cursor.y += self.line_height;
                start_x = 0.0;
            }
            cursor.x += self.char_width;
        }

        first.unwrap_or(Rect::new(start_x, cursor.y, cursor.x - start_x, self.line_height))
    }

    fn walk(&self, doc: &Document, node: NodeId, target: NodeId, hidden: bool, cursor: &mut Cursor) -> Option<Rect> {
        match doc.kind(node)? {
            NodeKind::Text(text) => {
                if hidden {
                    return (node == target).then(Rect::default);
                }
                let rect = self.flow(cursor, text);
                (node == target).then_some(rect)
            }
            NodeKind::Annotation(marker) => {
                if hidden {
                    return (node == target).then(Rect::default);
                }
                let rect = self.flow(cursor, &marker.replacement);
                (node == target).then_some(rect)
            }
            // popups float above the flow
            NodeKind::Overlay => None,
            NodeKind::Element(element) => {
                let hidden = hidden || element.is_hidden();
                let block = self.is_block(&element.tag);
                if block && !hidden {
                    self.newline(cursor);
                }
                let start = (cursor.x, cursor.y);

                for &child in doc.children(node) {
                    if let Some(rect) = self.walk(doc, child, target, hidden, cursor) {
                        return Some(rect);
                    }
                }

                if node == target {
                    if hidden {
                        return Some(Rect::default());
                    }
                    let height = cursor.y - start.1 + self.line_height;
                    let width = if cursor.y > start.1 {
                        cursor.width
                    } else {
                        cursor.x - start.0
                    };
                    return Some(Rect::new(start.0, start.1, width, height));
                }

                if block && !hidden {
                    self.newline(cursor);
                }
                None
            }
        }
    }
}

impl LayoutProvider for FlowLayout {
    fn bounding_box(&self, doc: &Document, node: NodeId, viewport: &Viewport) -> Option<Rect> {
        if !doc.is_connected(node) {
            return None;
        }

        let mut cursor = Cursor {
            x: 0.0,
            y: 0.0,
            width: viewport.size().width,
        };
        let rect = self.walk(doc, doc.root(), node, false, &mut cursor)?;
        let (scroll_x, scroll_y) = viewport.scroll_offset();
        Some(rect.translate(-scroll_x, -scroll_y))
    }
}
