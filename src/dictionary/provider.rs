//! Dictionary provider: one-time load with an explicit readiness state.
//!
//! # State machine
//! `Pending → Ready(Dictionary)` or `Pending → Failed(HintError)`.
//! A failed load stays failed; scanning never starts against a partial dictionary.

use super::Dictionary;
use crate::console::{console_error, console_log};
use crate::error::HintError;

/// Supplies the dictionary once it has been loaded
pub trait DictionaryProvider {
    fn is_ready(&self) -> bool;

    /// The loaded dictionary, or `DictionaryUnavailable` before/after a failed load
    fn get(&self) -> Result<&Dictionary, HintError>;
}

/// Load progress of the pattern data
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Pending,
    Ready(Dictionary),
    Failed(HintError),
}

/// Provider backed by data handed over by the host (fetched JSON, bundled data)
#[derive(Debug, Clone, PartialEq)]
pub struct StaticDictionary {
    state: LoadState,
}

impl Default for StaticDictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticDictionary {
    /// A provider still waiting for its data
    pub fn new() -> Self {
        Self {
            state: LoadState::Pending,
        }
    }

    /// A provider that is ready immediately
    pub fn ready(dictionary: Dictionary) -> Self {
        Self {
            state: LoadState::Ready(dictionary),
        }
    }

    /// Complete the load with raw JSON. Only the first completion counts.
    pub fn complete_json(&mut self, json: &str) -> Result<(), HintError> {
        self.complete(Dictionary::from_json(json))
    }

    /// Complete the load with a parse result. Only the first completion counts.
    pub fn complete(&mut self, result: Result<Dictionary, HintError>) -> Result<(), HintError> {
        if !matches!(self.state, LoadState::Pending) {
            return match &self.state {
                LoadState::Failed(e) => Err(e.clone()),
                _ => Ok(()),
            };
        }

        match result {
            Ok(dictionary) => {
                console_log!("Pattern dictionary loaded with {} keywords", dictionary.len());
                self.state = LoadState::Ready(dictionary);
                Ok(())
            }
            Err(e) => {
                console_error!("Failed to load pattern dictionary: {}", e);
                self.state = LoadState::Failed(e.clone());
                Err(e)
            }
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// The load failure, for user-visible display
    pub fn failure(&self) -> Option<&HintError> {
        match &self.state {
            LoadState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl DictionaryProvider for StaticDictionary {
    fn is_ready(&self) -> bool {
        matches!(self.state, LoadState::Ready(_))
    }

    fn get(&self) -> Result<&Dictionary, HintError> {
        match &self.state {
            LoadState::Ready(dictionary) => Ok(dictionary),
            _ => Err(HintError::DictionaryUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::record::tests::record;

    #[test]
    fn test_pending_is_unavailable() {
        let provider = StaticDictionary::new();
        assert!(!provider.is_ready());
        assert_eq!(provider.get().unwrap_err(), HintError::DictionaryUnavailable);
    }

    #[test]
    fn test_complete_makes_ready() {
        let mut provider = StaticDictionary::new();
        provider
            .complete(Dictionary::from_records(vec![record("sum", "Prefix Sum")]))
            .unwrap();
        assert!(provider.is_ready());
        assert_eq!(provider.get().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_load_stays_failed() {
        let mut provider = StaticDictionary::new();
        assert!(provider.complete_json("not json").is_err());
        assert!(!provider.is_ready());
        assert!(provider.failure().is_some());

        // A late success does not resurrect a failed load
        let late = Dictionary::from_records(vec![record("sum", "Prefix Sum")]);
        assert!(provider.complete(late).is_err());
        assert!(!provider.is_ready());
    }

    #[test]
    fn test_ready_constructor() {
        let dict = Dictionary::from_records(vec![record("stack", "Stack")]).unwrap();
        let provider = StaticDictionary::ready(dict);
        assert!(provider.is_ready());
        assert!(matches!(provider.state(), LoadState::Ready(_)));
    }
}
