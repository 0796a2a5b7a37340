//! Hint popover: card content and viewport-clamped placement
//!
//! Geometry follows the browser's conventions: anchor rects are
//! viewport-relative (as from `getBoundingClientRect`), placements are
//! document coordinates ready for `position: absolute`.

use serde::{Deserialize, Serialize};

use super::escape_html;
use crate::config::PopoverConfig;
use crate::dictionary::PatternRecord;

// =============================================================================
// Geometry
// =============================================================================

/// Viewport-relative rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Visible window size and scroll offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

/// Popover dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Where to put the popover (document coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub top: f64,
    pub left: f64,
    pub z_index: u32,
    /// True when the popover was flipped above its anchor
    pub above: bool,
}

/// Place a popover below `anchor`, shifting left or flipping above when it
/// would overflow, then clamp it into the visible viewport.
pub fn position_popover(anchor: Rect, popover: Size, viewport: Viewport, config: &PopoverConfig) -> Placement {
    let view_left = viewport.scroll_x;
    let view_top = viewport.scroll_y;
    let view_right = viewport.scroll_x + viewport.width;
    let view_bottom = viewport.scroll_y + viewport.height;

    let mut top = anchor.bottom() + viewport.scroll_y + config.gap;
    let mut left = anchor.left + viewport.scroll_x;
    let mut above = false;

    if left + popover.width > view_right {
        left = view_right - popover.width - config.edge_margin;
    }

    if top + popover.height > view_bottom {
        top = anchor.top + viewport.scroll_y - popover.height - config.gap;
        above = true;
    }

    // Clamp; an oversized popover sticks to the top-left edge
    left = left.min(view_right - popover.width).max(view_left);
    top = top.min(view_bottom - popover.height).max(view_top);

    Placement {
        top,
        left,
        z_index: config.z_index,
        above,
    }
}

// =============================================================================
// Hint card
// =============================================================================

/// Popover content for one keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HintCard {
    pub keyword: String,
    pub color: String,
    pub pattern: String,
    pub algorithm: String,
    pub complexity: String,
    pub template: String,
    pub hints: Vec<String>,
}

impl HintCard {
    pub fn from_record(record: &PatternRecord) -> Self {
        Self {
            keyword: record.keyword.clone(),
            color: record.color_tag.emoji().to_string(),
            pattern: record.pattern_name.clone(),
            algorithm: record.algorithm.clone(),
            complexity: record.complexity.clone(),
            template: record.template.clone(),
            hints: record.hints.clone(),
        }
    }

    pub fn render_html(&self) -> String {
        let hints: String = self
            .hints
            .iter()
            .map(|h| format!("<li>{}</li>", escape_html(h)))
            .collect();

        format!(
            concat!(
                "<div class=\"leetcode-hint-header\">",
                "<span class=\"leetcode-hint-color\">{color}</span>",
                "<span class=\"leetcode-hint-keyword-name\">{keyword}</span>",
                "<button class=\"leetcode-hint-close\">&times;</button>",
                "</div>",
                "<div class=\"leetcode-hint-content\">",
                "<div class=\"leetcode-hint-pattern\"><strong>Pattern:</strong> {pattern}</div>",
                "<div class=\"leetcode-hint-algorithm\"><strong>Algorithm:</strong> {algorithm}</div>",
                "<div class=\"leetcode-hint-complexity\"><strong>Complexity:</strong> {complexity}</div>",
                "<div class=\"leetcode-hint-template\"><strong>Template:</strong>",
                "<pre><code>{template}</code></pre></div>",
                "<div class=\"leetcode-hint-hints\"><strong>Hints:</strong><ul>{hints}</ul></div>",
                "</div>"
            ),
            color = escape_html(&self.color),
            keyword = escape_html(&self.keyword),
            pattern = escape_html(&self.pattern),
            algorithm = escape_html(&self.algorithm),
            complexity = escape_html(&self.complexity),
            template = escape_html(&self.template),
            hints = hints,
        )
    }
}

// =============================================================================
// Active popover
// =============================================================================

/// The single popover currently on screen
#[derive(Debug, Clone, PartialEq)]
pub struct ActivePopover {
    pub card: HintCard,
    pub placement: Placement,
}

/// At most one popover at a time; showing a new one replaces the old
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopoverState {
    active: Option<ActivePopover>,
}

impl PopoverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, card: HintCard, placement: Placement) -> &ActivePopover {
        self.active.insert(ActivePopover { card, placement })
    }

    /// Remove the popover; returns whether one was showing
    pub fn hide(&mut self) -> bool {
        self.active.take().is_some()
    }

    pub fn active(&self) -> Option<&ActivePopover> {
        self.active.as_ref()
    }
}
