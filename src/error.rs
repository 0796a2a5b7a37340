//! Error types shared across the hint pipeline.

use crate::scanner::content::UnitId;

/// Errors surfaced by dictionary loading, index construction and the control surface.
///
/// None of these cross the WASM boundary as panics: the facade converts them
/// into `JsValue` strings and the host stays in a consistent state.
#[derive(Debug, Clone, PartialEq)]
pub enum HintError {
    /// The dictionary provider has not delivered (or failed to deliver) a dictionary
    DictionaryUnavailable,
    /// Dictionary or variants JSON could not be parsed
    DictionaryParse(String),
    /// A pattern record failed validation
    InvalidRecord { keyword: String, reason: String },
    /// Aho-Corasick automaton construction failed
    IndexBuild(String),
    /// The host referenced a unit the tree does not know about
    UnknownUnit(UnitId),
    /// Malformed control message
    InvalidControl(String),
}

impl std::fmt::Display for HintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HintError::DictionaryUnavailable => write!(f, "Pattern dictionary unavailable"),
            HintError::DictionaryParse(msg) => write!(f, "Failed to parse pattern data: {}", msg),
            HintError::InvalidRecord { keyword, reason } => {
                write!(f, "Invalid pattern record '{}': {}", keyword, reason)
            }
            HintError::IndexBuild(msg) => write!(f, "Failed to build keyword index: {}", msg),
            HintError::UnknownUnit(id) => write!(f, "Unknown text unit: {}", id.0),
            HintError::InvalidControl(msg) => write!(f, "Invalid control message: {}", msg),
        }
    }
}

impl std::error::Error for HintError {}

impl From<serde_json::Error> for HintError {
    fn from(e: serde_json::Error) -> Self {
        HintError::DictionaryParse(e.to_string())
    }
}
