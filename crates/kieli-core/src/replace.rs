use std::collections::BTreeMap;

use kieli_types::VocabularyEntry;

use crate::dictionary::CompiledDictionary;
use crate::document::{AnnotationMarker, Document, NodeId};
use crate::error::DocumentError;

/// A match inside one unit; offsets are bytes into that unit's text
#[derive(Debug, Clone)]
pub struct MatchSpan<'d> {
    pub unit: NodeId,
    pub start: usize,
    pub len: usize,
    pub matched: String,
    pub entry: Option<&'d VocabularyEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementReport {
    /// Units that had at least one match
    pub units: usize,
    pub markers: usize,
    /// Matches left as plain text
    pub skipped: usize,
    /// Lowercased native word -> replacements made
    pub counts: BTreeMap<String, usize>,
}

impl ReplacementReport {
    pub fn is_empty(&self) -> bool {
        self.markers == 0
    }
}

/// Every match in every unit, document order. Each unit gets its own iterator.
pub fn collect_matches<'d>(
    doc: &Document,
    units: &[NodeId],
    dictionary: &'d CompiledDictionary,
) -> Vec<MatchSpan<'d>> {
    let mut spans = Vec::new();
    for &unit in units {
        let Some(text) = doc.text(unit) else {
            continue;
        };
        for m in dictionary.find_iter(text) {
            spans.push(MatchSpan {
                unit,
                start: m.start,
                len: m.end - m.start,
                matched: m.text.to_string(),
                entry: m.entry,
            });
        }
    }
    spans
}

/// Rewrite units in place, last match first.
///
/// Applying a span truncates its unit at the match start, so offsets of
/// earlier spans in the same unit stay valid.
pub fn apply_matches(doc: &mut Document, spans: Vec<MatchSpan<'_>>) -> ReplacementReport {
    let mut report = ReplacementReport::default();
    let mut last_unit = None;

    for span in spans.into_iter().rev() {
        if last_unit != Some(span.unit) {
            report.units += 1;
            last_unit = Some(span.unit);
        }

        let Some(entry) = span.entry else {
            tracing::debug!("No entry for '{}', leaving it as text", span.matched);
            report.skipped += 1;
            continue;
        };

        match apply_span(doc, &span, entry) {
            Ok(()) => {
                report.markers += 1;
                *report.counts.entry(span.matched.to_lowercase()).or_insert(0) += 1;
            }
            Err(e) => {
                tracing::warn!("Skipping '{}' in {}: {}", span.matched, span.unit, e);
                report.skipped += 1;
            }
        }
    }

    report
}

fn apply_span(doc: &mut Document, span: &MatchSpan<'_>, entry: &VocabularyEntry) -> Result<(), DocumentError> {
    let end = span.start + span.len;
    let text = doc.text(span.unit).ok_or(DocumentError::NotText(span.unit))?;

    // the unit may have been edited since it was scanned
    if text.get(span.start..end) != Some(span.matched.as_str()) {
        return Err(DocumentError::InvalidOffset {
            node: span.unit,
            offset: span.start,
        });
    }
    let text_len = text.len();
    if doc.parent(span.unit).is_none() {
        return Err(DocumentError::Detached(span.unit));
    }

    if end < text_len {
        doc.split_text(span.unit, end)?;
    }
    let word = if span.start > 0 {
        doc.split_text(span.unit, span.start)?
    } else {
        span.unit
    };

    let marker = doc.create_annotation(AnnotationMarker::new(span.matched.clone(), entry));
    doc.replace(word, marker)?;
    doc.release(word)?;
    Ok(())
}

/// Collect then apply in reverse
pub fn replace_units(doc: &mut Document, units: &[NodeId], dictionary: &CompiledDictionary) -> ReplacementReport {
    let spans = collect_matches(doc, units, dictionary);
    apply_matches(doc, spans)
}
