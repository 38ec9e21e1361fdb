use kieli_core::document::{Document, NodeId, NodeKind};
use kieli_core::tooltip::PopupState;

const HIGHLIGHT: &str = "\x1b[1;36m";
const RESET: &str = "\x1b[0m";

/// One `<p>` per non-blank line of `text`
pub fn append_paragraphs(doc: &mut Document, region: NodeId, text: &str) -> anyhow::Result<Vec<NodeId>> {
    let mut added = Vec::new();
    for line in text.lines().map(str::trim_end).filter(|l| !l.trim().is_empty()) {
        let p = doc.create_element("p");
        let t = doc.create_text(line);
        doc.append_child(p, t)?;
        doc.append_child(region, p)?;
        added.push(p);
    }
    Ok(added)
}

/// Region as terminal text, one line per block child. Markers are
/// highlighted when `color` is set and bracketed otherwise.
pub fn render_region(doc: &Document, region: NodeId, color: bool) -> String {
    doc.children(region)
        .iter()
        .map(|&child| render_inline(doc, child, color))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_inline(doc: &Document, node: NodeId, color: bool) -> String {
    let mut out = String::new();
    for n in doc.descendants(node) {
        match doc.kind(n) {
            Some(NodeKind::Text(text)) => out.push_str(text),
            Some(NodeKind::Annotation(marker)) if color => {
                out.push_str(HIGHLIGHT);
                out.push_str(&marker.replacement);
                out.push_str(RESET);
            }
            Some(NodeKind::Annotation(marker)) => {
                out.push('[');
                out.push_str(&marker.replacement);
                out.push(']');
            }
            _ => {}
        }
    }
    out
}

/// `1. project → projekti` for every marker, numbered for `:hover N`
pub fn marker_legend(doc: &Document, region: NodeId) -> Vec<String> {
    doc.markers(region)
        .iter()
        .enumerate()
        .filter_map(|(i, &m)| {
            doc.annotation(m)
                .map(|marker| format!("{}. {} → {}", i + 1, marker.original, marker.replacement))
        })
        .collect()
}

pub fn render_popup(popup: &PopupState) -> String {
    let mut lines = vec![format!(
        "popup at ({}, {}) {}x{}",
        popup.position.x, popup.position.y, popup.size.width, popup.size.height
    )];
    lines.extend(popup.content.lines().into_iter().map(|l| format!("  {l}")));
    lines.join("\n")
}
