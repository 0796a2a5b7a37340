//! ScanDriver: applies Matcher + Annotator across a changing content tree
//!
//! # Per-unit state machine
//! - `Unvisited → ScannedNoMatch`: no keyword, left as-is and not re-attempted
//! - `Unvisited → ScannedAnnotated`: rewritten and tracked for reversion
//! - `Unvisited → Skipped`: ineligible (verbatim or already annotated), not tracked
//!
//! Only `revert_all` moves units back to `Unvisited`. Skipped units are
//! re-evaluated on later visits since a host may lift a verbatim designation.
//!
//! # Usage
//! ```ignore
//! let provider = StaticDictionary::ready(builtin::dictionary()?);
//! let mut driver = ScanDriver::new(&provider, &builtin::variants()?, HintConfig::default())?;
//! let report = driver.scan_all(&mut tree);
//! // later, when the host attaches new content:
//! driver.on_subtree_attached(&mut tree, new_node);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::annotate::{annotate, AnnotatedUnit};
use super::content::{ContentHost, NodeId, UnitId};
use super::index::KeywordIndex;
use super::matcher::{find_matches, MatchSpan};
use crate::config::HintConfig;
use crate::console::{console_error, console_log};
use crate::dictionary::{Dictionary, DictionaryProvider, PatternRecord, VariantsTable};
use crate::error::HintError;
use crate::presentation::{position_popover, ActivePopover, HintCard, PopoverState, Rect, Size, Viewport};

// =============================================================================
// Types
// =============================================================================

/// Scan state of one text unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitState {
    Unvisited,
    ScannedNoMatch,
    ScannedAnnotated,
    Skipped,
}

/// Outcome of one scan or toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScanReport {
    /// Units examined for matches
    pub visited: usize,
    /// Units rewritten with markers
    pub annotated: usize,
    /// Units without any keyword
    pub no_match: usize,
    /// Ineligible units (verbatim, already annotated)
    pub skipped: usize,
    /// Markers produced
    pub matches: usize,
    /// Units the host refused to rewrite (left untouched)
    pub failed: usize,
    /// Units restored to plain text
    pub reverted: usize,
    pub elapsed_us: u64,
}

// =============================================================================
// ScanDriver
// =============================================================================

/// Single owner of the index, the enabled flag and annotation bookkeeping
#[derive(Debug, Clone)]
pub struct ScanDriver {
    dictionary: Dictionary,
    index: KeywordIndex,
    config: HintConfig,
    enabled: bool,
    states: BTreeMap<UnitId, UnitState>,
    /// Original text of every ScannedAnnotated unit
    originals: BTreeMap<UnitId, String>,
    popover: PopoverState,
    hints_shown: u64,
}

impl ScanDriver {
    /// Build the driver. Fails with `DictionaryUnavailable` until the provider is ready.
    pub fn new(
        provider: &impl DictionaryProvider,
        variants: &VariantsTable,
        config: HintConfig,
    ) -> Result<Self, HintError> {
        let dictionary = provider.get()?.clone();
        let index = KeywordIndex::build(&dictionary, variants)?;
        let enabled = config.enabled_by_default;
        Ok(Self {
            dictionary,
            index,
            config,
            enabled,
            states: BTreeMap::new(),
            originals: BTreeMap::new(),
            popover: PopoverState::new(),
            hints_shown: 0,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn config(&self) -> &HintConfig {
        &self.config
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn index(&self) -> &KeywordIndex {
        &self.index
    }

    pub fn state_of(&self, unit: UnitId) -> UnitState {
        self.states.get(&unit).copied().unwrap_or(UnitState::Unvisited)
    }

    /// Units currently tracked as annotated
    pub fn annotated_units(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.originals.keys().copied()
    }

    pub fn annotated_count(&self) -> usize {
        self.originals.len()
    }

    // -------------------------------------------------------------------------
    // Per-unit processing
    // -------------------------------------------------------------------------

    /// Matches for a piece of text against this driver's index
    pub fn find_matches(&self, text: &str) -> Vec<MatchSpan> {
        find_matches(text, &self.index)
    }

    /// Annotate free-standing text; `None` when it holds no keyword
    pub fn annotate_text(&self, text: &str) -> Option<AnnotatedUnit> {
        let matches = self.find_matches(text);
        if matches.is_empty() {
            return None;
        }
        Some(annotate(text, &matches))
    }

    // -------------------------------------------------------------------------
    // Scanning
    // -------------------------------------------------------------------------

    /// Initial scan of the whole tree
    pub fn scan_all(&mut self, host: &mut impl ContentHost) -> ScanReport {
        let root = host.root();
        self.scan_subtree(host, root)
    }

    /// Structural-change notification: scan only the newly attached subtree.
    /// Ignored while disabled.
    pub fn on_subtree_attached(&mut self, host: &mut impl ContentHost, node: NodeId) -> ScanReport {
        self.scan_subtree(host, node)
    }

    /// The host removed a subtree; forget its units without touching them
    pub fn on_subtree_detached(&mut self, host: &impl ContentHost, node: NodeId) {
        for unit in host.units_in(node) {
            self.forget(unit);
        }
    }

    /// The host removed a single unit
    pub fn on_unit_removed(&mut self, unit: UnitId) {
        self.forget(unit);
    }

    fn forget(&mut self, unit: UnitId) {
        self.states.remove(&unit);
        self.originals.remove(&unit);
    }

    fn scan_subtree(&mut self, host: &mut impl ContentHost, node: NodeId) -> ScanReport {
        let mut report = ScanReport::default();
        if !self.enabled {
            return report;
        }
        let start = instant::Instant::now();

        for unit in host.units_in(node) {
            match self.state_of(unit) {
                UnitState::ScannedAnnotated | UnitState::ScannedNoMatch => continue,
                UnitState::Unvisited | UnitState::Skipped => {}
            }

            if host.is_annotated(unit) || host.is_verbatim(unit, &self.config) {
                self.states.insert(unit, UnitState::Skipped);
                report.skipped += 1;
                continue;
            }

            let text = match host.unit_text(unit) {
                Some(text) => text.to_string(),
                None => {
                    report.skipped += 1;
                    continue;
                }
            };
            report.visited += 1;

            let matches = self.find_matches(&text);
            if matches.is_empty() {
                self.states.insert(unit, UnitState::ScannedNoMatch);
                report.no_match += 1;
                continue;
            }

            // All-or-nothing: bookkeeping only after the host accepted the rewrite
            let annotated = annotate(&text, &matches);
            match host.replace_unit(unit, annotated) {
                Ok(()) => {
                    self.states.insert(unit, UnitState::ScannedAnnotated);
                    self.originals.insert(unit, text);
                    report.annotated += 1;
                    report.matches += matches.len();
                }
                Err(e) => {
                    console_error!("Failed to annotate unit {}: {}", unit.0, e);
                    report.failed += 1;
                }
            }
        }

        report.elapsed_us = start.elapsed().as_micros() as u64;
        report
    }

    // -------------------------------------------------------------------------
    // Disable / revert
    // -------------------------------------------------------------------------

    /// Restore every annotated unit to its original text and drop the popover.
    /// Units the host refuses to restore stay tracked and are counted as `failed`.
    pub fn revert_all(&mut self, host: &mut impl ContentHost) -> ScanReport {
        self.popover.hide();
        let mut report = ScanReport::default();
        let units: Vec<UnitId> = self.originals.keys().copied().collect();

        for unit in units {
            let result = match self.originals.get(&unit) {
                Some(original) => host.restore_unit(unit, original),
                None => continue,
            };
            match result {
                Ok(()) => {
                    self.originals.remove(&unit);
                    self.states.remove(&unit);
                    report.reverted += 1;
                }
                Err(e) => {
                    console_error!("Failed to restore unit {}: {}", unit.0, e);
                    report.failed += 1;
                }
            }
        }

        if report.reverted > 0 {
            console_log!("Reverted {} annotated units", report.reverted);
        }
        report
    }

    /// Original text of an annotated unit
    pub fn original_text(&self, unit: UnitId) -> Option<&str> {
        self.originals.get(&unit).map(String::as_str)
    }

    /// Set the enabled flag: enabling rescans the tree, disabling reverts it
    pub fn set_enabled(&mut self, host: &mut impl ContentHost, enabled: bool) -> ScanReport {
        if self.enabled == enabled {
            return ScanReport::default();
        }
        self.enabled = enabled;
        console_log!("Hints {}", if enabled { "enabled" } else { "disabled" });

        if enabled {
            self.scan_all(host)
        } else {
            self.revert_all(host)
        }
    }

    pub fn toggle(&mut self, host: &mut impl ContentHost) -> ScanReport {
        let target = !self.enabled;
        self.set_enabled(host, target)
    }

    // -------------------------------------------------------------------------
    // Hint lookup for the presentation layer
    // -------------------------------------------------------------------------

    /// Pattern record behind a marker's keyword
    pub fn hint_for(&self, keyword: &str) -> Option<&PatternRecord> {
        self.dictionary.get(keyword)
    }

    /// Pointer entered or clicked a marker: open its popover.
    /// Returns `None` while disabled or for an unknown keyword.
    pub fn show_hint(
        &mut self,
        keyword: &str,
        anchor: Rect,
        popover_size: Size,
        viewport: Viewport,
    ) -> Option<&ActivePopover> {
        if !self.enabled {
            return None;
        }
        let card = HintCard::from_record(self.dictionary.get(keyword)?);
        let placement = position_popover(anchor, popover_size, viewport, &self.config.popover);
        self.hints_shown += 1;
        Some(self.popover.show(card, placement))
    }

    /// Pointer left the marker or the user clicked elsewhere
    pub fn hide_hint(&mut self) -> bool {
        self.popover.hide()
    }

    pub fn active_hint(&self) -> Option<&ActivePopover> {
        self.popover.active()
    }

    pub fn hints_shown(&self) -> u64 {
        self.hints_shown
    }

    /// Seed the shown counter from a persisted value
    pub fn restore_hints_shown(&mut self, count: u64) {
        self.hints_shown = count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::record::tests::record;
    use crate::dictionary::StaticDictionary;
    use crate::scanner::content::ContentTree;

    fn driver(keywords: &[&str]) -> ScanDriver {
        let dict = Dictionary::from_records(keywords.iter().map(|k| record(k, "Pattern")).collect()).unwrap();
        ScanDriver::new(&StaticDictionary::ready(dict), &VariantsTable::new(), HintConfig::default()).unwrap()
    }

    #[test]
    fn test_new_requires_ready_dictionary() {
        let err = ScanDriver::new(&StaticDictionary::new(), &VariantsTable::new(), HintConfig::default())
            .unwrap_err();
        assert_eq!(err, HintError::DictionaryUnavailable);
    }

    #[test]
    fn test_scan_all_state_transitions() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let p = tree.append_element(root, "p", &[]).unwrap();
        let hit = tree.append_text(p, "Find the sum").unwrap();
        let miss = tree.append_text(p, " of nothing").unwrap();
        let code = tree.append_element(root, "code", &[]).unwrap();
        let verbatim = tree.append_text(code, "sum()").unwrap();

        let mut driver = driver(&["sum"]);
        let report = driver.scan_all(&mut tree);

        assert_eq!(report.visited, 2);
        assert_eq!(report.annotated, 1);
        assert_eq!(report.no_match, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.matches, 1);
        assert_eq!(driver.state_of(hit), UnitState::ScannedAnnotated);
        assert_eq!(driver.state_of(miss), UnitState::ScannedNoMatch);
        assert_eq!(driver.state_of(verbatim), UnitState::Skipped);
        assert_eq!(driver.annotated_count(), 1);
    }

    #[test]
    fn test_rescan_is_noop() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let unit = tree.append_text(root, "binary search").unwrap();
        let mut driver = driver(&["binary search"]);
        driver.scan_all(&mut tree);
        let before = tree.annotation(unit).cloned();

        let second = driver.scan_all(&mut tree);
        assert_eq!(second.annotated, 0);
        assert_eq!(second.visited, 0);
        assert_eq!(tree.annotation(unit).cloned(), before);
    }

    #[test]
    fn test_disabled_ignores_notifications() {
        let mut tree = ContentTree::new();
        let mut driver = driver(&["array"]);
        driver.set_enabled(&mut tree, false);

        let root = tree.root();
        let div = tree.append_element(root, "div", &[]).unwrap();
        tree.append_text(div, "an array").unwrap();
        let report = driver.on_subtree_attached(&mut tree, div);
        assert_eq!(report, ScanReport::default());
        assert_eq!(driver.annotated_count(), 0);
    }

    #[test]
    fn test_toggle_reverts_and_rescans() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let unit = tree.append_text(root, "Use a Stack here").unwrap();
        let mut driver = driver(&["stack"]);
        driver.scan_all(&mut tree);
        assert!(tree.annotation(unit).is_some());

        let off = driver.toggle(&mut tree);
        assert!(!driver.is_enabled());
        assert_eq!(off.reverted, 1);
        assert_eq!(tree.unit_text(unit), Some("Use a Stack here"));
        assert_eq!(driver.state_of(unit), UnitState::Unvisited);

        let on = driver.toggle(&mut tree);
        assert!(driver.is_enabled());
        assert_eq!(on.annotated, 1);
    }

    #[test]
    fn test_revert_without_annotations_is_noop() {
        let mut tree = ContentTree::new();
        let mut driver = driver(&["stack"]);
        assert_eq!(driver.revert_all(&mut tree).reverted, 0);
    }

    #[test]
    fn test_removed_units_are_forgotten() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let div = tree.append_element(root, "div", &[]).unwrap();
        tree.append_text(div, "a heap").unwrap();
        let mut driver = driver(&["heap"]);
        driver.scan_all(&mut tree);
        assert_eq!(driver.annotated_count(), 1);

        tree.remove(div).unwrap();
        driver.on_subtree_detached(&tree, div);
        assert_eq!(driver.annotated_count(), 0);
        assert_eq!(driver.revert_all(&mut tree).reverted, 0);
    }

    #[test]
    fn test_show_hint_counts_and_revert_drops_popover() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        tree.append_text(root, "a queue").unwrap();
        let mut driver = driver(&["queue"]);
        driver.scan_all(&mut tree);

        let viewport = Viewport { width: 800.0, height: 600.0, scroll_x: 0.0, scroll_y: 0.0 };
        let size = Size { width: 200.0, height: 100.0 };
        let shown = driver.show_hint("queue", Rect::new(10.0, 10.0, 40.0, 16.0), size, viewport);
        assert_eq!(shown.unwrap().card.keyword, "queue");
        assert!(driver.show_hint("unknown", Rect::default(), size, viewport).is_none());
        assert_eq!(driver.hints_shown(), 1);

        driver.revert_all(&mut tree);
        assert!(driver.active_hint().is_none());
    }

    #[test]
    fn test_show_hint_disabled() {
        let mut tree = ContentTree::new();
        let mut driver = driver(&["queue"]);
        driver.set_enabled(&mut tree, false);
        let shown = driver.show_hint("queue", Rect::default(), Size::default(), Viewport::default());
        assert!(shown.is_none());
        assert_eq!(driver.hints_shown(), 0);
    }

    /// Host that refuses to restore one unit
    struct StickyHost {
        tree: ContentTree,
        stuck: UnitId,
    }

    impl ContentHost for StickyHost {
        fn root(&self) -> NodeId {
            self.tree.root()
        }

        fn units_in(&self, node: NodeId) -> Vec<UnitId> {
            self.tree.units_in(node)
        }

        fn unit_text(&self, unit: UnitId) -> Option<&str> {
            self.tree.unit_text(unit)
        }

        fn is_annotated(&self, unit: UnitId) -> bool {
            self.tree.is_annotated(unit)
        }

        fn is_verbatim(&self, unit: UnitId, config: &HintConfig) -> bool {
            self.tree.is_verbatim(unit, config)
        }

        fn replace_unit(&mut self, unit: UnitId, annotated: AnnotatedUnit) -> Result<(), HintError> {
            self.tree.replace_unit(unit, annotated)
        }

        fn restore_unit(&mut self, unit: UnitId, original: &str) -> Result<(), HintError> {
            if unit == self.stuck {
                return Err(HintError::UnknownUnit(unit));
            }
            self.tree.restore_unit(unit, original)
        }
    }

    #[test]
    fn test_failed_restore_stays_tracked() {
        let mut tree = ContentTree::new();
        let root = tree.root();
        let stuck = tree.append_text(root, "a stack").unwrap();
        let fine = tree.append_text(root, " and a queue").unwrap();
        let mut host = StickyHost { tree, stuck };
        let mut driver = driver(&["stack", "queue"]);
        driver.scan_all(&mut host);

        let report = driver.revert_all(&mut host);
        assert_eq!(report.reverted, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(driver.state_of(stuck), UnitState::ScannedAnnotated);
        assert_eq!(driver.original_text(stuck), Some("a stack"));
        assert_eq!(driver.state_of(fine), UnitState::Unvisited);
        assert_eq!(driver.annotated_units().collect::<Vec<_>>(), vec![stuck]);

        // once the host cooperates, the next revert finishes the job
        host.stuck = NodeId(usize::MAX);
        assert_eq!(driver.revert_all(&mut host).reverted, 1);
        assert_eq!(host.tree.unit_text(stuck), Some("a stack"));
        assert_eq!(driver.annotated_count(), 0);
    }

    #[test]
    fn test_restore_hints_shown() {
        let mut driver = driver(&["queue"]);
        driver.restore_hints_shown(7);
        let size = Size { width: 100.0, height: 50.0 };
        let viewport = Viewport { width: 800.0, height: 600.0, scroll_x: 0.0, scroll_y: 0.0 };
        driver.show_hint("queue", Rect::new(0.0, 0.0, 10.0, 10.0), size, viewport);
        assert_eq!(driver.hints_shown(), 8);
    }
}
