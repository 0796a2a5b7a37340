//! Matcher: locate keyword occurrences in one text unit
//!
//! 1. Overlapping Aho-Corasick scan yields every candidate occurrence
//! 2. Candidates not sitting on word boundaries are dropped
//! 3. Greedy selection: longest first (in chars), then earliest start, then registration order
//! 4. Selected spans are returned sorted by start
//!
//! Boundary filtering happens before selection, so a rejected candidate
//! never blocks an overlapping valid one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::index::KeywordIndex;

// =============================================================================
// Types
// =============================================================================

/// A located, resolved keyword occurrence: `[start, end)` byte offsets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    /// Canonical keyword the occurrence resolves to
    pub keyword: String,
    /// Registered surface form that matched
    pub surface: String,
    /// Verbatim slice of the input (original casing)
    pub matched_text: String,
}

impl MatchSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &MatchSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    start: usize,
    end: usize,
    /// Length in chars, so non-ASCII surface forms rank by visible length
    chars: usize,
    pattern_id: usize,
}

// =============================================================================
// Matching
// =============================================================================

/// Word characters are Unicode alphanumerics
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// True when `text[start..end]` is not glued to a word character on either side
fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start].chars().next_back().map_or(true, |c| !is_word_char(c));
    let after_ok = text[end..].chars().next().map_or(true, |c| !is_word_char(c));
    before_ok && after_ok
}

/// Find all keyword occurrences in `text`.
///
/// Output is sorted by `start`, pairwise non-overlapping and deterministic
/// for a given text and index.
pub fn find_matches(text: &str, index: &KeywordIndex) -> Vec<MatchSpan> {
    if text.is_empty() {
        return vec![];
    }

    let mut candidates: Vec<Candidate> = index
        .automaton()
        .find_overlapping_iter(text)
        .filter(|m| is_word_bounded(text, m.start(), m.end()))
        .map(|m| Candidate {
            start: m.start(),
            end: m.end(),
            chars: text[m.start()..m.end()].chars().count(),
            pattern_id: m.pattern().as_usize(),
        })
        .collect();

    if candidates.is_empty() {
        return vec![];
    }

    candidates.sort_by(|a, b| {
        b.chars
            .cmp(&a.chars)
            .then_with(|| a.start.cmp(&b.start))
            .then_with(|| a.pattern_id.cmp(&b.pattern_id))
    });

    // start -> (end, pattern_id); accepted spans never overlap, so the
    // nearest accepted span starting before `end` is the only one to check
    let mut accepted: BTreeMap<usize, (usize, usize)> = BTreeMap::new();
    for cand in candidates {
        let blocked = accepted
            .range(..cand.end)
            .next_back()
            .map_or(false, |(_, &(end, _))| end > cand.start);
        if !blocked {
            accepted.insert(cand.start, (cand.end, cand.pattern_id));
        }
    }

    accepted
        .into_iter()
        .filter_map(|(start, (end, pattern_id))| {
            let surface = index.surface(pattern_id)?;
            Some(MatchSpan {
                start,
                end,
                keyword: surface.keyword.clone(),
                surface: surface.text.clone(),
                matched_text: text[start..end].to_string(),
            })
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
