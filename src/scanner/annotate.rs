//! Annotator: rewrite a text unit into plain and marked segments
//!
//! Pure function of (text, matches). Marker text keeps the original casing,
//! and concatenating all segments gives back the input byte for byte.

use serde::{Deserialize, Serialize};

use super::matcher::MatchSpan;
use crate::config::HintConfig;
use crate::presentation::escape_html;

/// One piece of an annotated unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Segment {
    /// Unmatched text, passed through unchanged
    Text { text: String },
    /// Highlighted occurrence of a canonical keyword
    Marker { keyword: String, text: String },
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Text { text } | Segment::Marker { text, .. } => text,
        }
    }
}

/// A text unit carrying zero or more inline markers
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnnotatedUnit {
    pub segments: Vec<Segment>,
}

impl AnnotatedUnit {
    pub fn marker_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Marker { .. }))
            .count()
    }

    /// Canonical keywords of the markers, in text order
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Marker { keyword, .. } => Some(keyword.as_str()),
            Segment::Text { .. } => None,
        })
    }

    /// Original text with markers removed
    pub fn plain_text(&self) -> String {
        strip_markers(self)
    }
}

/// Wrap every match in a marker.
///
/// `matches` must be sorted and non-overlapping (as `find_matches` returns
/// them); spans that fall behind the cursor, run past the text or split a
/// UTF-8 sequence are left unmarked so the round trip always holds.
pub fn annotate(text: &str, matches: &[MatchSpan]) -> AnnotatedUnit {
    let mut segments = Vec::with_capacity(matches.len() * 2 + 1);
    let mut cursor = 0;

    for m in matches {
        let valid = m.start >= cursor
            && m.start < m.end
            && m.end <= text.len()
            && text.is_char_boundary(m.start)
            && text.is_char_boundary(m.end);
        if !valid {
            continue;
        }

        if m.start > cursor {
            segments.push(Segment::Text {
                text: text[cursor..m.start].to_string(),
            });
        }
        segments.push(Segment::Marker {
            keyword: m.keyword.clone(),
            text: text[m.start..m.end].to_string(),
        });
        cursor = m.end;
    }

    if cursor < text.len() {
        segments.push(Segment::Text {
            text: text[cursor..].to_string(),
        });
    }

    AnnotatedUnit { segments }
}

/// Inverse of `annotate`
pub fn strip_markers(unit: &AnnotatedUnit) -> String {
    unit.segments.iter().map(Segment::text).collect()
}

/// Render as HTML: markers become keyword spans, everything is escaped
pub fn render_html(unit: &AnnotatedUnit, config: &HintConfig) -> String {
    let mut html = String::new();
    for segment in &unit.segments {
        match segment {
            Segment::Text { text } => html.push_str(&escape_html(text)),
            Segment::Marker { keyword, text } => {
                html.push_str(&format!(
                    "<span class=\"{}\" {}=\"{}\">{}</span>",
                    escape_html(&config.marker_class),
                    config.keyword_attr,
                    escape_html(keyword),
                    escape_html(text)
                ));
            }
        }
    }
    html
}
