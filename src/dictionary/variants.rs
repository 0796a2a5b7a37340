//! Synonym/variant table: extra surface forms per canonical keyword.

use serde::{Deserialize, Serialize};

use crate::error::HintError;

/// Variant phrases declared for one canonical keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRow {
    pub keyword: String,
    pub variants: Vec<String>,
}

/// Ordered list of variant rows.
///
/// Rows may name keywords the dictionary does not contain; the index builder
/// ignores those.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantsTable {
    rows: Vec<VariantRow>,
}

impl VariantsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of `{ "keyword": ..., "variants": [...] }`
    pub fn from_json(json: &str) -> Result<Self, HintError> {
        let rows: Vec<VariantRow> = serde_json::from_str(json)?;
        Ok(Self { rows })
    }

    /// Append a row (builder style, mostly for tests and hosts that assemble tables in code)
    pub fn with(mut self, keyword: &str, variants: &[&str]) -> Self {
        self.rows.push(VariantRow {
            keyword: keyword.to_string(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    pub fn rows(&self) -> &[VariantRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let table = VariantsTable::from_json(
            r#"[{"keyword": "linked list", "variants": ["linkedlist", "linked-list"]}]"#,
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].variants, vec!["linkedlist", "linked-list"]);
    }

    #[test]
    fn test_builder_preserves_order() {
        let table = VariantsTable::new()
            .with("sum", &["sums", "total"])
            .with("array", &["arrays"]);
        let keys: Vec<_> = table.rows().iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(keys, vec!["sum", "array"]);
    }
}
