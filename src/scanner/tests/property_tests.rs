//! Invariants that must hold for every text
//!
//! Runs the bundled dictionary over a corpus of problem statements.

use super::{builtin_driver, builtin_index, SAMPLE_TEXTS};
use crate::config::HintConfig;
use crate::scanner::{annotate, find_matches, strip_markers, ContentHost, ContentTree, UnitState};

fn word_char(c: Option<char>) -> bool {
    c.map_or(false, |c| c.is_alphanumeric())
}

#[test]
fn test_round_trip_is_exact() {
    let index = builtin_index();
    for text in SAMPLE_TEXTS {
        let matches = find_matches(text, &index);
        let unit = annotate(text, &matches);
        assert_eq!(strip_markers(&unit), *text, "round trip broke for {:?}", text);
        assert_eq!(unit.marker_count(), matches.len());
    }
}

#[test]
fn test_spans_sorted_and_disjoint() {
    let index = builtin_index();
    for text in SAMPLE_TEXTS {
        let matches = find_matches(text, &index);
        for pair in matches.windows(2) {
            assert!(pair[0].end <= pair[1].start, "overlap in {:?}: {:?}", text, pair);
            assert!(!pair[0].overlaps(&pair[1]));
        }
    }
}

#[test]
fn test_spans_sit_on_word_boundaries() {
    let index = builtin_index();
    for text in SAMPLE_TEXTS {
        for m in find_matches(text, &index) {
            assert!(!word_char(text[..m.start].chars().next_back()), "{:?} in {:?}", m, text);
            assert!(!word_char(text[m.end..].chars().next()), "{:?} in {:?}", m, text);
        }
    }
}

#[test]
fn test_spans_resolve_to_dictionary_keywords() {
    let index = builtin_index();
    let dictionary = crate::dictionary::builtin::dictionary().unwrap();
    for text in SAMPLE_TEXTS {
        for m in find_matches(text, &index) {
            assert!(dictionary.contains(&m.keyword), "unknown keyword {:?}", m.keyword);
            assert_eq!(index.resolve(&m.surface), Some(m.keyword.as_str()));
            assert_eq!(m.matched_text, &text[m.start..m.end]);
            assert_eq!(m.matched_text.to_ascii_lowercase(), m.surface);
        }
    }
}

#[test]
fn test_matching_is_deterministic() {
    let index = builtin_index();
    for text in SAMPLE_TEXTS {
        assert_eq!(find_matches(text, &index), find_matches(text, &index));
    }
}

fn corpus_tree() -> ContentTree {
    let mut tree = ContentTree::new();
    let root = tree.root();
    for (i, text) in SAMPLE_TEXTS.iter().enumerate() {
        let tag = if i % 4 == 3 { "pre" } else { "p" };
        let el = tree.append_element(root, tag, &[]).unwrap();
        tree.append_text(el, text).unwrap();
    }
    tree
}

#[test]
fn test_scan_preserves_visible_text() {
    let mut tree = corpus_tree();
    let before = tree.render_text();
    let mut driver = builtin_driver();
    let report = driver.scan_all(&mut tree);
    assert!(report.annotated > 0);
    assert_eq!(tree.render_text(), before);
}

#[test]
fn test_second_scan_is_noop() {
    let mut tree = corpus_tree();
    let mut driver = builtin_driver();
    driver.scan_all(&mut tree);
    let snapshot = tree.clone();
    let annotated = driver.annotated_count();

    let report = driver.scan_all(&mut tree);
    assert_eq!(report.annotated, 0);
    assert_eq!(report.matches, 0);
    assert_eq!(tree, snapshot);
    assert_eq!(driver.annotated_count(), annotated);
}

#[test]
fn test_full_reversion_restores_markup() {
    let config = HintConfig::default();
    let mut tree = corpus_tree();
    let before_html = tree.render_html(&config);
    let before = tree.clone();

    let mut driver = builtin_driver();
    driver.scan_all(&mut tree);
    assert_ne!(tree.render_html(&config), before_html);

    let annotated: Vec<_> = driver.annotated_units().collect();
    let restored = driver.revert_all(&mut tree).reverted;
    assert_eq!(restored, annotated.len());
    assert_eq!(tree.render_html(&config), before_html);
    assert_eq!(tree, before);
    assert_eq!(driver.annotated_count(), 0);
    for unit in annotated {
        assert_eq!(driver.state_of(unit), UnitState::Unvisited);
    }
}

#[test]
fn test_verbatim_units_never_annotated() {
    let config = HintConfig::default();
    let mut tree = corpus_tree();
    let mut driver = builtin_driver();
    driver.scan_all(&mut tree);
    let root = tree.root();
    for unit in tree.units_in(root) {
        if tree.is_verbatim(unit, &config) {
            assert!(!tree.is_annotated(unit));
            assert_eq!(driver.state_of(unit), UnitState::Skipped);
        }
    }
}
