//! PatternRecord and Dictionary: the hint payload behind every keyword.
//!
//! The dictionary is immutable once loaded. Keys are canonical lower-case
//! keywords; iteration follows load order so index registration is stable.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::HintError;

// =============================================================================
// Types
// =============================================================================

/// Visual category marker shown in the popover header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorTag {
    #[serde(rename = "🔴")]
    Red,
    #[serde(rename = "🔵")]
    Blue,
    #[serde(rename = "🟡")]
    Yellow,
    #[serde(rename = "🟢")]
    Green,
    #[serde(rename = "🟠")]
    Orange,
    #[serde(rename = "🟣")]
    Purple,
    #[serde(rename = "🟤")]
    Brown,
    #[serde(rename = "⚫")]
    Black,
}

impl ColorTag {
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Red => "🔴",
            Self::Blue => "🔵",
            Self::Yellow => "🟡",
            Self::Green => "🟢",
            Self::Orange => "🟠",
            Self::Purple => "🟣",
            Self::Brown => "🟤",
            Self::Black => "⚫",
        }
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.emoji())
    }
}

/// One entry per canonical keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    /// Canonical lower-case keyword (unique)
    pub keyword: String,
    /// Category label, e.g. "Sliding Window"
    #[serde(rename = "pattern")]
    pub pattern_name: String,
    pub algorithm: String,
    pub complexity: String,
    /// Illustrative code skeleton, displayed as-is
    pub template: String,
    #[serde(rename = "color")]
    pub color_tag: ColorTag,
    /// Ordered advisory strings, never empty
    pub hints: Vec<String>,
}

/// Summary numbers for the control popup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DictionaryStats {
    /// Number of canonical keywords
    pub keywords: usize,
    /// Number of distinct pattern names
    pub patterns: usize,
}

/// Keywords sharing one pattern name, for the popup's pattern list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternGroup {
    pub pattern: String,
    /// Color of the first record in the group
    pub color: ColorTag,
    /// Member keywords in load order
    pub keywords: Vec<String>,
}

// =============================================================================
// Dictionary
// =============================================================================

/// Canonical keyword → PatternRecord, in load order
#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary {
    records: Vec<PatternRecord>,
    by_keyword: HashMap<String, usize>,
}

impl Dictionary {
    /// Validate and index a record set.
    ///
    /// Keywords are lower-cased. Fails on an empty set, an empty keyword,
    /// a duplicate keyword or a record without hints; nothing is built on failure.
    pub fn from_records(records: Vec<PatternRecord>) -> Result<Self, HintError> {
        if records.is_empty() {
            return Err(HintError::DictionaryParse("dictionary is empty".to_string()));
        }

        let mut normalized = Vec::with_capacity(records.len());
        let mut by_keyword = HashMap::with_capacity(records.len());

        for mut record in records {
            let keyword = record.keyword.trim().to_lowercase();
            if keyword.is_empty() {
                return Err(HintError::InvalidRecord {
                    keyword: record.keyword,
                    reason: "keyword must not be empty".to_string(),
                });
            }
            if record.hints.is_empty() {
                return Err(HintError::InvalidRecord {
                    keyword,
                    reason: "hints must not be empty".to_string(),
                });
            }
            if by_keyword.contains_key(&keyword) {
                return Err(HintError::InvalidRecord {
                    keyword,
                    reason: "duplicate keyword".to_string(),
                });
            }
            by_keyword.insert(keyword.clone(), normalized.len());
            record.keyword = keyword;
            normalized.push(record);
        }

        Ok(Self {
            records: normalized,
            by_keyword,
        })
    }

    /// Parse a JSON array of records
    pub fn from_json(json: &str) -> Result<Self, HintError> {
        let records: Vec<PatternRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Look up a record by keyword (case-insensitive)
    pub fn get(&self, keyword: &str) -> Option<&PatternRecord> {
        let idx = match self.by_keyword.get(keyword) {
            Some(idx) => *idx,
            None => *self.by_keyword.get(&keyword.to_lowercase())?,
        };
        self.records.get(idx)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.get(keyword).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Canonical keywords in load order
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.keyword.as_str())
    }

    pub fn records(&self) -> &[PatternRecord] {
        &self.records
    }

    /// Keywords grouped by pattern name, groups ordered by first appearance
    pub fn pattern_groups(&self) -> Vec<PatternGroup> {
        let mut groups: Vec<PatternGroup> = Vec::new();
        let mut by_pattern: HashMap<&str, usize> = HashMap::new();

        for record in &self.records {
            match by_pattern.get(record.pattern_name.as_str()) {
                Some(&idx) => groups[idx].keywords.push(record.keyword.clone()),
                None => {
                    by_pattern.insert(record.pattern_name.as_str(), groups.len());
                    groups.push(PatternGroup {
                        pattern: record.pattern_name.clone(),
                        color: record.color_tag,
                        keywords: vec![record.keyword.clone()],
                    });
                }
            }
        }
        groups
    }

    pub fn stats(&self) -> DictionaryStats {
        let patterns: HashSet<&str> = self
            .records
            .iter()
            .map(|r| r.pattern_name.as_str())
            .collect();
        DictionaryStats {
            keywords: self.records.len(),
            patterns: patterns.len(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
