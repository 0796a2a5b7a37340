// hintcore/src/config.rs
//
// Configuration types for scanning, rendering and popover placement

use serde::{Deserialize, Serialize};

use crate::error::HintError;

/// Popover placement parameters (CSS pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopoverConfig {
    /// Vertical gap between the highlighted term and the popover
    pub gap: f64,
    /// Minimum distance kept from the right viewport edge when shifting left
    pub edge_margin: f64,
    /// Stacking order of the overlay
    pub z_index: u32,
}

impl Default for PopoverConfig {
    fn default() -> Self {
        Self {
            gap: 5.0,
            edge_margin: 10.0,
            z_index: 10000,
        }
    }
}

/// Scanner and renderer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HintConfig {
    /// Class applied to every highlighted keyword span
    pub marker_class: String,

    /// Class a host puts on containers it has already processed
    pub processed_class: String,

    /// Attribute carrying the canonical keyword on a marker
    pub keyword_attr: String,

    /// Element tags whose content is never scanned
    pub verbatim_tags: Vec<String>,

    /// Element classes whose content is never scanned (embedded editors etc.)
    pub verbatim_classes: Vec<String>,

    /// Popover placement
    pub popover: PopoverConfig,

    /// Value of the persisted enabled flag when the host has none stored
    pub enabled_by_default: bool,
}

impl Default for HintConfig {
    fn default() -> Self {
        Self {
            marker_class: "leetcode-hint-keyword".to_string(),
            processed_class: "leetcode-hint-processed".to_string(),
            keyword_attr: "data-keyword".to_string(),
            verbatim_tags: ["code", "pre", "script", "style", "textarea"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            verbatim_classes: vec!["monaco-editor".to_string()],
            popover: PopoverConfig::default(),
            enabled_by_default: true,
        }
    }
}

impl HintConfig {
    /// Parse a (possibly partial) JSON configuration; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, HintError> {
        let config: HintConfig = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Whether an element with this tag is a verbatim region
    pub fn is_verbatim_tag(&self, tag: &str) -> bool {
        self.verbatim_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Whether any of these classes marks a verbatim region
    pub fn has_verbatim_class<'a>(&self, mut classes: impl Iterator<Item = &'a str>) -> bool {
        classes.any(|c| self.verbatim_classes.iter().any(|v| v == c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HintConfig::default();
        assert_eq!(config.marker_class, "leetcode-hint-keyword");
        assert!(config.is_verbatim_tag("pre"));
        assert!(config.is_verbatim_tag("CODE"));
        assert!(config.is_verbatim_tag("SCRIPT"));
        assert!(config.is_verbatim_tag("style"));
        assert!(config.is_verbatim_tag("textarea"));
        assert!(!config.is_verbatim_tag("p"));
        assert!(config.enabled_by_default);
        assert_eq!(config.popover.gap, 5.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = HintConfig::from_json(r#"{"marker_class": "hl", "popover": {"gap": 8.0}}"#).unwrap();
        assert_eq!(config.marker_class, "hl");
        assert_eq!(config.popover.gap, 8.0);
        assert_eq!(config.popover.edge_margin, 10.0);
        assert_eq!(config.verbatim_tags, vec!["code", "pre", "script", "style", "textarea"]);
    }

    #[test]
    fn test_verbatim_class() {
        let config = HintConfig::default();
        assert!(config.has_verbatim_class(["view-lines", "monaco-editor"].into_iter()));
        assert!(!config.has_verbatim_class(["description"].into_iter()));
    }

    #[test]
    fn test_invalid_json() {
        assert!(HintConfig::from_json("{").is_err());
    }
}
