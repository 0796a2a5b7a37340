//! Bundled pattern database and variants table.
//!
//! Shipped as JSON next to the crate and embedded at compile time, so a host
//! that has no data of its own can still start scanning.

use super::{Dictionary, VariantsTable};
use crate::error::HintError;

const PATTERNS_JSON: &str = include_str!("../../data/patterns.json");
const VARIANTS_JSON: &str = include_str!("../../data/variants.json");

/// The bundled coding-interview pattern dictionary
pub fn dictionary() -> Result<Dictionary, HintError> {
    Dictionary::from_json(PATTERNS_JSON)
}

/// The bundled synonym table
pub fn variants() -> Result<VariantsTable, HintError> {
    VariantsTable::from_json(VARIANTS_JSON)
}
