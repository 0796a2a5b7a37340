//! HintCore: Algorithm-Pattern Hints for Problem Statements
//!
//! A Rust/WASM engine that finds algorithm-pattern keywords in problem text,
//! wraps them in hoverable markers and reverts the page on demand.
//!
//! # Architecture
//!
//! ## Dictionary
//! - `dictionary/record.rs` - PatternRecord, Dictionary: keyword → pattern hint
//! - `dictionary/variants.rs` - VariantsTable: alternate surface forms per keyword
//! - `dictionary/provider.rs` - StaticDictionary: one-shot async load gate
//! - `dictionary/builtin.rs` - Bundled 44-keyword data set
//!
//! ## Scanner Components
//! - `index.rs` - KeywordIndex: surface forms compiled into Aho-Corasick
//! - `matcher.rs` - find_matches: word-bounded, longest-first span selection
//! - `annotate.rs` - Segments + marker markup, exactly reversible
//! - `content.rs` - ContentHost seam + ContentTree arena document
//! - `driver.rs` - ScanDriver: per-unit state machine, incremental scans, revert
//!
//! ## Surfaces
//! - `presentation/` - Popover placement and hint card markup
//! - `control.rs` - Persisted enabled flag, toggle/getStatus messages
//! - `wasm.rs` - HintEngine JS facade
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { HintEngine } from 'hintcore';
//!
//! await init();
//!
//! const engine = HintEngine.withBuiltin(localStorage.getItem('hints'));
//!
//! // Report each text node with an id and its ancestor context
//! const html = engine.annotateUnit(id, node.data, ['div', 'p'], ['description']);
//! if (html) replaceWithMarkup(node, html);
//!
//! // Popover content when a marker is hovered
//! const card = engine.hintHtml(marker.dataset.keyword);
//!
//! // Popup toggle: apply the returned reverts/rewrites, persist settings
//! engine.handleMessage('{"action":"toggle"}');  // '{"enabled":false}'
//! applyUpdates(engine.takeUpdates());
//! localStorage.setItem('hints', engine.settings());
//! ```

pub mod config;
pub mod console;
pub mod control;
pub mod dictionary;
pub mod error;
pub mod presentation;
pub mod scanner;
pub mod wasm;

pub use config::*;
pub use control::*;
pub use dictionary::*;
pub use error::*;
pub use presentation::*;
pub use scanner::*;
pub use wasm::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("hintcore v{}", env!("CARGO_PKG_VERSION"))
}
