//! KeywordIndex: surface forms → canonical keywords
//!
//! Expands the dictionary's canonical keywords with the variants table into a
//! flat set of lower-case surface forms and compiles them into one
//! Aho-Corasick automaton.
//!
//! Registration order is: every canonical keyword in dictionary order, then
//! every variant in table order. A surface form keeps the first canonical
//! keyword it was registered for, so "find" stays the `find` keyword even
//! though the table also lists it as a variant of `search`.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::console::console_log;
use crate::dictionary::{Dictionary, VariantsTable};
use crate::error::HintError;

// =============================================================================
// Types
// =============================================================================

/// A registered surface form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceForm {
    /// Lower-case text that triggers a match
    pub text: String,
    /// Canonical keyword it resolves to
    pub keyword: String,
    /// False when the surface form is the canonical keyword itself
    pub is_variant: bool,
}

// =============================================================================
// KeywordIndex
// =============================================================================

/// Searchable surface-form set; pattern id == registration order
#[derive(Debug, Clone)]
pub struct KeywordIndex {
    automaton: AhoCorasick,
    surfaces: Vec<SurfaceForm>,
    by_surface: HashMap<String, usize>,
}

/// Collects surface forms before the automaton is compiled
#[derive(Default)]
struct IndexBuilder {
    surfaces: Vec<SurfaceForm>,
    by_surface: HashMap<String, usize>,
}

impl IndexBuilder {
    fn register(&mut self, surface: &str, keyword: &str, is_variant: bool) {
        let text = surface.trim().to_lowercase();
        if text.is_empty() || self.by_surface.contains_key(&text) {
            return;
        }
        self.by_surface.insert(text.clone(), self.surfaces.len());
        self.surfaces.push(SurfaceForm {
            text,
            keyword: keyword.to_string(),
            is_variant,
        });
    }
}

impl KeywordIndex {
    /// Build the index. Variants of keywords missing from the dictionary are ignored.
    pub fn build(dictionary: &Dictionary, variants: &VariantsTable) -> Result<Self, HintError> {
        let mut builder = IndexBuilder::default();

        for keyword in dictionary.keywords() {
            builder.register(keyword, keyword, false);
        }

        for row in variants.rows() {
            let canonical = match dictionary.get(&row.keyword) {
                Some(record) => record.keyword.as_str(),
                None => continue,
            };
            for variant in &row.variants {
                builder.register(variant, canonical, true);
            }
        }

        if builder.surfaces.is_empty() {
            return Err(HintError::IndexBuild("no surface forms to index".to_string()));
        }

        // Standard semantics: the matcher needs every overlapping candidate
        let automaton = AhoCorasickBuilder::new()
            .match_kind(MatchKind::Standard)
            .ascii_case_insensitive(true)
            .build(builder.surfaces.iter().map(|s| s.text.as_str()))
            .map_err(|e| HintError::IndexBuild(e.to_string()))?;

        console_log!("Keyword index built with {} surface forms", builder.surfaces.len());

        Ok(Self {
            automaton,
            surfaces: builder.surfaces,
            by_surface: builder.by_surface,
        })
    }

    pub(crate) fn automaton(&self) -> &AhoCorasick {
        &self.automaton
    }

    /// Surface form by pattern id
    pub fn surface(&self, pattern_id: usize) -> Option<&SurfaceForm> {
        self.surfaces.get(pattern_id)
    }

    /// All surface forms in registration order
    pub fn surfaces(&self) -> &[SurfaceForm] {
        &self.surfaces
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Whether `surface` is registered (case-insensitive)
    pub fn contains(&self, surface: &str) -> bool {
        self.resolve(surface).is_some()
    }

    /// Canonical keyword for a surface form (case-insensitive)
    pub fn resolve(&self, surface: &str) -> Option<&str> {
        let idx = self.by_surface.get(&surface.trim().to_lowercase())?;
        self.surfaces.get(*idx).map(|s| s.keyword.as_str())
    }
}

// =============================================================================
// Tests
// =============================================================================
