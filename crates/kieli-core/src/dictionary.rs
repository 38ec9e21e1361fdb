use std::collections::{HashMap, HashSet};

use kieli_types::{Suggestion, VocabularyEntry};
use regex::{Regex, RegexBuilder};

/// Compiled matcher for one scan cycle.
///
/// The pattern is `\b(w1|w2|...)\b` followed by a guard that consumes one
/// non-letter or the end of input. `regex` has no lookahead, so the guard is
/// consumed and the search resumes at the end of the captured word, which
/// behaves like a trailing `(?![A-Za-z])`.
pub struct CompiledDictionary {
    pattern: Option<Regex>,
    lookup: HashMap<String, VocabularyEntry>,
    words: Vec<String>,
}

impl CompiledDictionary {
    /// Dictionary that matches nothing
    pub fn empty() -> Self {
        Self {
            pattern: None,
            lookup: HashMap::new(),
            words: Vec::new(),
        }
    }

    /// Merge active vocabulary with suggestions and compile.
    ///
    /// Disabled and blank entries are dropped. Vocabulary beats a suggestion
    /// with the same case-insensitive key; within one source the last entry wins.
    pub fn compile(entries: &[VocabularyEntry], suggestions: &[Suggestion]) -> Self {
        let mut words: Vec<String> = Vec::new();
        let mut lookup: HashMap<String, VocabularyEntry> = HashMap::new();

        for entry in entries
            .iter()
            .filter(|e| e.enabled && !e.native_word.trim().is_empty())
        {
            let key = entry.key();
            if lookup.insert(key, entry.clone()).is_none() {
                words.push(entry.native_word.clone());
            }
        }

        let vocabulary_keys: HashSet<String> = lookup.keys().cloned().collect();
        for suggestion in suggestions
            .iter()
            .filter(|s| !s.native_word.trim().is_empty())
        {
            let key = suggestion.key();
            if vocabulary_keys.contains(&key) {
                continue;
            }
            let entry = VocabularyEntry::from(suggestion.clone());
            if lookup.insert(key, entry).is_none() {
                words.push(suggestion.native_word.clone());
            }
        }

        if words.is_empty() {
            return Self::empty();
        }

        let pattern = match build_pattern(&words) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                tracing::warn!("Failed to compile word pattern, annotating nothing: {}", e);
                None
            }
        };

        tracing::debug!("Compiled dictionary with {} words", words.len());

        Self {
            pattern,
            lookup,
            words,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    /// Native words in alternation order
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Existence check, no cursor involved
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(text))
    }

    /// Fresh iterator over every match in `text`
    pub fn find_iter<'d, 't>(&'d self, text: &'t str) -> Matches<'d, 't> {
        Matches {
            dictionary: self,
            text,
            pos: 0,
        }
    }

    /// Entry for a matched word, case-insensitive
    pub fn lookup(&self, matched: &str) -> Option<&VocabularyEntry> {
        self.lookup.get(&matched.to_lowercase())
    }
}

/// `\b` here is Unicode-aware: "café," ends on a word boundary, "hotä" does not.
fn build_pattern(words: &[String]) -> Result<Regex, regex::Error> {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");

    RegexBuilder::new(&format!(r"\b({alternation})\b(?:[^A-Za-z]|$)"))
        .case_insensitive(true)
        .size_limit(64 * (1 << 20))
        .build()
}

#[derive(Debug, Clone, Copy)]
pub struct WordMatch<'d, 't> {
    /// Byte offset into the scanned text
    pub start: usize,
    pub end: usize,
    pub text: &'t str,
    pub entry: Option<&'d VocabularyEntry>,
}

/// Position-tracking match loop; each scan owns its own cursor
pub struct Matches<'d, 't> {
    dictionary: &'d CompiledDictionary,
    text: &'t str,
    pos: usize,
}

impl<'d, 't> Iterator for Matches<'d, 't> {
    type Item = WordMatch<'d, 't>;

    fn next(&mut self) -> Option<Self::Item> {
        let pattern = self.dictionary.pattern.as_ref()?;
        if self.pos > self.text.len() {
            return None;
        }

        let captures = pattern.captures_at(self.text, self.pos)?;
        let word = captures.get(1)?;

        // never loop on an empty capture
        self.pos = if word.end() > word.start() {
            word.end()
        } else {
            word.end() + 1
        };

        Some(WordMatch {
            start: word.start(),
            end: word.end(),
            text: word.as_str(),
            entry: self.dictionary.lookup(word.as_str()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(native: &str, learning: &str) -> VocabularyEntry {
        VocabularyEntry::new(native, learning, "English", "Finnish")
    }

    #[test]
    fn test_empty_dictionary_matches_nothing() {
        let dict = CompiledDictionary::compile(&[], &[]);
        assert!(dict.is_empty());
        assert!(!dict.is_match("anything at all"));
        assert_eq!(dict.find_iter("anything").count(), 0);
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let dict = CompiledDictionary::compile(&[entry("c.o", "x"), entry("a+b", "y")], &[]);
        assert!(!dict.is_match("cxo"));
        assert!(dict.is_match("say c.o now"));
    }

    #[test]
    fn test_repeated_scans_do_not_share_a_cursor() {
        let dict = CompiledDictionary::compile(&[entry("hot", "kuuma")], &[]);
        let first: Vec<_> = dict.find_iter("hot hot").map(|m| m.start).collect();
        let second: Vec<_> = dict.find_iter("hot").map(|m| m.start).collect();
        assert_eq!(first, vec![0, 4]);
        assert_eq!(second, vec![0]);
    }
}
