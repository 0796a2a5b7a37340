use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use wasm_bindgen::prelude::*;

use crate::config::HintConfig;
use crate::control::{ControlMessage, Controller, MemoryStore, Settings};
use crate::dictionary::{builtin, Dictionary, PatternGroup, StaticDictionary, VariantsTable};
use crate::error::HintError;
use crate::presentation::{escape_html, position_popover, HintCard, Rect, Size, Viewport};
use crate::scanner::{render_html, ContentHost, ContentTree, NodeId, ScanDriver, UnitId};

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EngineStats {
    keywords: usize,
    patterns: usize,
    surfaces: usize,
    hints_shown: u64,
    annotated_units: usize,
    pattern_groups: Vec<PatternGroup>,
}

/// DOM change the page script has to apply for one host text node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UnitUpdate {
    /// Replace the text node with this marker markup
    Annotated { id: u32, html: String },
    /// Put the original text back
    Reverted { id: u32, original: String },
}

/// A host text node mirrored into the engine's tree
#[derive(Debug, Clone, Copy)]
struct MirroredUnit {
    unit: UnitId,
    /// Outermost mirrored node (ancestor chain or the unit itself)
    top: NodeId,
}

/// Matcher, annotator and scan bookkeeping for a page script that owns the real DOM.
///
/// The page reports each text node with a numeric id and its ancestor
/// context; the engine mirrors it, lets the ScanDriver decide, and answers
/// with markup. Enable/disable and revert come back as `UnitUpdate`s keyed
/// by the same ids.
#[wasm_bindgen]
pub struct HintEngine {
    controller: Controller<MemoryStore>,
    tree: ContentTree,
    units: HashMap<u32, MirroredUnit>,
    ids: HashMap<UnitId, u32>,
    /// Updates produced by popup messages, drained by `takeUpdates`
    pending: Vec<UnitUpdate>,
}

impl HintEngine {
    fn build(
        dictionary: Result<Dictionary, HintError>,
        variants: &VariantsTable,
        config: HintConfig,
        settings: Option<String>,
    ) -> Result<Self, HintError> {
        let settings = match settings {
            Some(json) => Settings::from_json(&json)?,
            None => Settings::default(),
        };
        let mut provider = StaticDictionary::new();
        provider.complete(dictionary)?;
        let driver = ScanDriver::new(&provider, variants, config)?;
        let mut tree = ContentTree::new();
        let (controller, _) = Controller::start(driver, MemoryStore::from_settings(settings), &mut tree);
        Ok(Self {
            controller,
            tree,
            units: HashMap::new(),
            ids: HashMap::new(),
            pending: Vec::new(),
        })
    }

    fn driver(&self) -> &ScanDriver {
        self.controller.driver()
    }

    fn marker_html(&self, unit: UnitId) -> Option<String> {
        self.tree
            .annotation(unit)
            .map(|annotated| render_html(annotated, self.driver().config()))
    }

    /// Mirror a host text node under its ancestor chain; classes go on the innermost element
    fn mirror(&mut self, text: &str, tags: &[String], classes: &[String]) -> Result<MirroredUnit, HintError> {
        let classes: Vec<&str> = classes.iter().map(String::as_str).collect();
        let mut parent = self.tree.root();
        let mut top = None;

        let mut chain: Vec<&str> = tags.iter().map(String::as_str).collect();
        if chain.is_empty() && !classes.is_empty() {
            chain.push("div");
        }
        for (i, tag) in chain.iter().enumerate() {
            let own_classes: &[&str] = if i + 1 == chain.len() { &classes } else { &[] };
            parent = self.tree.append_element(parent, tag, own_classes)?;
            top.get_or_insert(parent);
        }

        let unit = self.tree.append_text(parent, text)?;
        Ok(MirroredUnit {
            unit,
            top: top.unwrap_or(unit),
        })
    }

    fn forget(&mut self, id: u32) {
        if let Some(mirrored) = self.units.remove(&id) {
            self.ids.remove(&mirrored.unit);
            self.controller.driver_mut().on_subtree_detached(&self.tree, mirrored.top);
            // top is never the root, so removal cannot fail
            let _ = self.tree.remove(mirrored.top);
        }
    }

    /// Register a host text node and annotate it if eligible.
    /// Returns marker markup only when the unit was annotated by this call.
    pub fn register_unit(
        &mut self,
        id: u32,
        text: &str,
        tags: &[String],
        classes: &[String],
    ) -> Result<Option<String>, HintError> {
        if let Some(known) = self.units.get(&id) {
            let current = match self.tree.annotation(known.unit) {
                Some(annotated) => Some(annotated.plain_text()),
                None => self.tree.unit_text(known.unit).map(str::to_string),
            };
            if current.as_deref() == Some(text) {
                return Ok(None);
            }
            // The host reused the id for different content
            self.forget(id);
        }

        let mirrored = self.mirror(text, tags, classes)?;
        self.units.insert(id, mirrored);
        self.ids.insert(mirrored.unit, id);

        let (tree, controller) = (&mut self.tree, &mut self.controller);
        controller.driver_mut().on_subtree_attached(tree, mirrored.top);
        Ok(self.marker_html(mirrored.unit))
    }

    /// Run a state change and collect the DOM updates it implies
    fn track<R>(&mut self, op: impl FnOnce(&mut Controller<MemoryStore>, &mut ContentTree) -> R) -> (R, Vec<UnitUpdate>) {
        let before: Vec<(UnitId, String)> = {
            let driver = self.controller.driver();
            driver
                .annotated_units()
                .filter_map(|unit| driver.original_text(unit).map(|t| (unit, t.to_string())))
                .collect()
        };
        let was_annotated: BTreeSet<UnitId> = before.iter().map(|(unit, _)| *unit).collect();

        let result = op(&mut self.controller, &mut self.tree);

        let mut updates = Vec::new();
        for (unit, original) in before {
            if self.driver().original_text(unit).is_none() {
                if let Some(&id) = self.ids.get(&unit) {
                    updates.push(UnitUpdate::Reverted { id, original });
                }
            }
        }
        let fresh: Vec<UnitId> = self
            .driver()
            .annotated_units()
            .filter(|unit| !was_annotated.contains(unit))
            .collect();
        for unit in fresh {
            if let (Some(&id), Some(html)) = (self.ids.get(&unit), self.marker_html(unit)) {
                updates.push(UnitUpdate::Annotated { id, html });
            }
        }
        (result, updates)
    }

    /// Restore every annotated unit; the engine stays enabled
    pub fn revert_units(&mut self) -> Vec<UnitUpdate> {
        self.track(|controller, tree| controller.driver_mut().revert_all(tree)).1
    }

    /// Set the persisted enabled flag; returns the rewrites or restores it caused
    pub fn apply_enabled(&mut self, enabled: bool) -> Vec<UnitUpdate> {
        if self.driver().is_enabled() == enabled {
            return Vec::new();
        }
        self.track(|controller, tree| controller.handle(ControlMessage::Toggle, tree)).1
    }

    /// Popup message; the resulting updates are queued for `drain_updates`
    pub fn handle_control(&mut self, json: &str) -> Result<String, HintError> {
        let (response, updates) = self.track(|controller, tree| controller.handle_json(json, tree));
        self.pending.extend(updates);
        response
    }

    pub fn drain_updates(&mut self) -> Vec<UnitUpdate> {
        std::mem::take(&mut self.pending)
    }

    fn engine_stats(&self) -> EngineStats {
        let driver = self.driver();
        let dict = driver.dictionary().stats();
        EngineStats {
            keywords: dict.keywords,
            patterns: dict.patterns,
            surfaces: driver.index().surface_count(),
            hints_shown: driver.hints_shown(),
            annotated_units: driver.annotated_count(),
            pattern_groups: driver.dictionary().pattern_groups(),
        }
    }
}

#[wasm_bindgen]
impl HintEngine {
    /// Build from dictionary JSON, variants JSON, and optional config and saved-settings JSON
    #[wasm_bindgen(constructor)]
    pub fn new(
        dictionary_json: &str,
        variants_json: &str,
        config_json: Option<String>,
        settings_json: Option<String>,
    ) -> Result<HintEngine, JsValue> {
        let variants = VariantsTable::from_json(variants_json).map_err(to_js)?;
        let config = match config_json {
            Some(json) => HintConfig::from_json(&json).map_err(to_js)?,
            None => HintConfig::default(),
        };
        Self::build(Dictionary::from_json(dictionary_json), &variants, config, settings_json).map_err(to_js)
    }

    /// Engine over the bundled 44-keyword dictionary
    #[wasm_bindgen(js_name = withBuiltin)]
    pub fn with_builtin(settings_json: Option<String>) -> Result<HintEngine, JsValue> {
        let variants = builtin::variants().map_err(to_js)?;
        Self::build(builtin::dictionary(), &variants, HintConfig::default(), settings_json).map_err(to_js)
    }

    /// Non-overlapping matches as `[{ start, end, keyword, surface, matched_text }]`
    #[wasm_bindgen(js_name = findMatches)]
    pub fn find_matches(&self, text: &str) -> Result<JsValue, JsValue> {
        let matches = self.driver().find_matches(text);
        serde_wasm_bindgen::to_value(&matches).map_err(to_js)
    }

    /// Stateless marker markup for arbitrary text (previews). Page content goes through `annotateUnit`.
    #[wasm_bindgen(js_name = annotateHtml)]
    pub fn annotate_html(&self, text: &str) -> String {
        if !self.driver().is_enabled() {
            return escape_html(text);
        }
        match self.driver().annotate_text(text) {
            Some(unit) => render_html(&unit, self.driver().config()),
            None => escape_html(text),
        }
    }

    /// Report a host text node with its ancestor tags (outermost first) and the
    /// classes found on them. Returns marker markup when the node should be replaced.
    #[wasm_bindgen(js_name = annotateUnit)]
    pub fn annotate_unit(
        &mut self,
        id: u32,
        text: &str,
        ancestor_tags: Vec<String>,
        ancestor_classes: Vec<String>,
    ) -> Result<Option<String>, JsValue> {
        self.register_unit(id, text, &ancestor_tags, &ancestor_classes)
            .map_err(to_js)
    }

    /// The host removed a text node
    #[wasm_bindgen(js_name = unitRemoved)]
    pub fn unit_removed(&mut self, id: u32) {
        self.forget(id);
    }

    /// Restore every annotated unit: `[{ type: "reverted", id, original }]`
    #[wasm_bindgen(js_name = revertAll)]
    pub fn revert_all(&mut self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.revert_units()).map_err(to_js)
    }

    /// Popover card markup for a marker's keyword
    #[wasm_bindgen(js_name = hintHtml)]
    pub fn hint_html(&self, keyword: &str) -> Option<String> {
        self.driver()
            .hint_for(keyword)
            .map(|record| HintCard::from_record(record).render_html())
    }

    /// Popover placement `{ top, left, z_index, above }` in document coordinates
    #[wasm_bindgen(js_name = positionPopover)]
    pub fn position_popover(&self, anchor: JsValue, size: JsValue, viewport: JsValue) -> Result<JsValue, JsValue> {
        let anchor: Rect = serde_wasm_bindgen::from_value(anchor)?;
        let size: Size = serde_wasm_bindgen::from_value(size)?;
        let viewport: Viewport = serde_wasm_bindgen::from_value(viewport)?;
        let placement = position_popover(anchor, size, viewport, &self.driver().config().popover);
        serde_wasm_bindgen::to_value(&placement).map_err(to_js)
    }

    /// Popover opened for `keyword`; returns the card markup
    #[wasm_bindgen(js_name = showHint)]
    pub fn show_hint(&mut self, keyword: &str, anchor: JsValue, size: JsValue, viewport: JsValue) -> Result<Option<String>, JsValue> {
        let anchor: Rect = serde_wasm_bindgen::from_value(anchor)?;
        let size: Size = serde_wasm_bindgen::from_value(size)?;
        let viewport: Viewport = serde_wasm_bindgen::from_value(viewport)?;
        Ok(self
            .controller
            .show_hint(keyword, anchor, size, viewport)
            .map(|active| active.card.render_html()))
    }

    #[wasm_bindgen(js_name = hideHint)]
    pub fn hide_hint(&mut self) -> bool {
        self.controller.driver_mut().hide_hint()
    }

    /// Counts plus the per-pattern keyword groups for the popup
    #[wasm_bindgen]
    pub fn stats(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.engine_stats()).map_err(to_js)
    }

    /// Settings snapshot `{ enabled, hintsShown }` for the host to persist
    #[wasm_bindgen]
    pub fn settings(&self) -> Result<String, JsValue> {
        self.controller.store().settings().to_json().map_err(to_js)
    }

    #[wasm_bindgen(js_name = isEnabled)]
    pub fn is_enabled(&self) -> bool {
        self.driver().is_enabled()
    }

    /// Returns the `UnitUpdate`s the page has to apply
    #[wasm_bindgen(js_name = setEnabled)]
    pub fn set_enabled(&mut self, enabled: bool) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.apply_enabled(enabled)).map_err(to_js)
    }

    /// Popup message `{ "action": "toggle" | "getStatus" }`, answered with `{ "enabled": bool }`.
    /// DOM updates caused by a toggle are fetched with `takeUpdates`.
    #[wasm_bindgen(js_name = handleMessage)]
    pub fn handle_message(&mut self, json: &str) -> Result<String, JsValue> {
        self.handle_control(json).map_err(to_js)
    }

    #[wasm_bindgen(js_name = takeUpdates)]
    pub fn take_updates(&mut self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.drain_updates()).map_err(to_js)
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_find_matches_to_js() {
        let engine = HintEngine::with_builtin(None).unwrap();
        let value = engine.find_matches("a sorted array").unwrap();
        let matches: Vec<crate::scanner::MatchSpan> = serde_wasm_bindgen::from_value(value).unwrap();
        let keywords: Vec<_> = matches.iter().map(|m| m.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["sorted", "array"]);
    }

    #[wasm_bindgen_test]
    fn test_constructor_rejects_bad_json() {
        assert!(HintEngine::new("not json", "[]", None, None).is_err());
    }
}
