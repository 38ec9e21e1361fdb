use std::collections::BTreeMap;

use kieli_config::annotator::AnnotatorConfig;
use kieli_types::{AssistantResponse, Suggestion, VocabularyEntry};

use crate::dictionary::CompiledDictionary;
use crate::document::{Document, NodeId};
use crate::replace::replace_units;
use crate::restore::restore_original_text;
use crate::scanner::{ContentScanner, ExcludeFn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RescanReport {
    /// Markers restored first because the word set changed
    pub restored: usize,
    pub units: usize,
    pub markers: usize,
    pub skipped: usize,
    pub counts: BTreeMap<String, usize>,
}

/// Pipeline state for one content region
pub struct Annotator {
    root: NodeId,
    config: AnnotatorConfig,
    vocabulary: Vec<VocabularyEntry>,
    /// Only ever applied to this region
    suggestions: Vec<Suggestion>,
    superimpose: bool,
    /// Markers in the tree were built from an older word set
    stale: bool,
    exclude: Option<Box<ExcludeFn>>,
}

impl Annotator {
    pub fn new(root: NodeId, config: AnnotatorConfig) -> Self {
        Self {
            root,
            config,
            vocabulary: Vec::new(),
            suggestions: Vec::new(),
            superimpose: true,
            stale: false,
            exclude: None,
        }
    }

    /// Region rendering one assistant reply, with that reply's suggestions
    pub fn for_response(root: NodeId, config: AnnotatorConfig, response: &AssistantResponse) -> Self {
        let mut annotator = Self::new(root, config);
        annotator.suggestions = response.suggestions.clone();
        annotator.superimpose = response.should_superimpose;
        annotator
    }

    pub fn with_exclusion<F>(mut self, exclude: F) -> Self
    where
        F: Fn(&Document, NodeId) -> bool + Send + Sync + 'static,
    {
        self.exclude = Some(Box::new(exclude));
        self
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Replace the word set; only enabled entries are kept.
    /// Returns whether the active set actually changed.
    pub fn set_vocabulary(&mut self, entries: Vec<VocabularyEntry>) -> bool {
        let active: Vec<VocabularyEntry> = entries.into_iter().filter(|e| e.enabled).collect();
        if active == self.vocabulary {
            return false;
        }
        self.vocabulary = active;
        self.stale = true;
        true
    }

    pub fn set_suggestions(&mut self, suggestions: Vec<Suggestion>) -> bool {
        if suggestions == self.suggestions {
            return false;
        }
        self.suggestions = suggestions;
        self.stale = true;
        true
    }

    pub fn set_superimpose(&mut self, superimpose: bool) -> bool {
        if superimpose == self.superimpose {
            return false;
        }
        self.superimpose = superimpose;
        self.stale = true;
        true
    }

    pub fn vocabulary(&self) -> &[VocabularyEntry] {
        &self.vocabulary
    }

    /// Fresh dictionary for one cycle
    pub fn compile(&self) -> CompiledDictionary {
        if !self.superimpose {
            return CompiledDictionary::empty();
        }
        CompiledDictionary::compile(&self.vocabulary, &self.suggestions)
    }

    /// One full Scanner -> Engine pass over the region.
    ///
    /// Pending external records are delivered first; the records produced by
    /// this pass are then swallowed so the pass never retriggers itself.
    pub fn rescan(&mut self, doc: &mut Document) -> RescanReport {
        let mut report = RescanReport::default();
        if doc.kind(self.root).is_none() || !doc.is_connected(self.root) {
            tracing::debug!("Region {} is gone, skipping rescan", self.root);
            return report;
        }

        doc.flush_records();

        if self.stale {
            report.restored = self.restore(doc);
            self.stale = false;
        }

        let dictionary = self.compile();
        let mut scanner = ContentScanner::new(&self.config);
        if let Some(exclude) = self.exclude.as_deref() {
            scanner = scanner.with_exclusion(exclude);
        }
        let units = scanner.scan(doc, self.root, &dictionary);
        let replaced = replace_units(doc, &units, &dictionary);
        doc.take_records();

        report.units = replaced.units;
        report.markers = replaced.markers;
        report.skipped = replaced.skipped;
        report.counts = replaced.counts;

        if report.markers > 0 {
            tracing::info!(
                "Annotated {} words in {} units: {:?}",
                report.markers,
                report.units,
                report.counts
            );
        }
        report
    }

    /// Undo every marker in the region
    pub fn restore(&mut self, doc: &mut Document) -> usize {
        restore_original_text(doc, self.root, self.config.normalize_on_restore)
    }
}
