//! Core editor types: carets, selections, and formatting parameters.
//!
//! These types are host-agnostic; nothing here knows about a browser DOM.

use smol_str::SmolStr;

use crate::tree::NodeId;

/// Zero-width space used as the style carrier for collapsed-selection
/// formatting (typed text lands inside the carrier and inherits the style).
pub const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// Zero-width non-joiner, accepted as an equivalent invisible carrier when
/// content arrives from outside (some editors emit this instead).
pub const ZERO_WIDTH_NON_JOINER: char = '\u{200C}';

/// Check whether a character is invisible carrier content.
pub fn is_zero_width(c: char) -> bool {
    c == ZERO_WIDTH_SPACE || c == ZERO_WIDTH_NON_JOINER
}

/// Check whether a string contains nothing but carrier characters.
pub fn is_zero_width_only(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_zero_width)
}

/// A position inside the buffer tree.
///
/// For text nodes `offset` is a character offset into the text; for element
/// nodes it is a child index (the caret sits before that child).
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct Caret {
    pub node: NodeId,
    pub offset: usize,
}

impl Caret {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A selection with anchor and head carets.
///
/// The anchor is where the selection started, the head is where the cursor
/// is now. They may be in either document order; commands order them through
/// the global offset space before mutating.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Where selection started
    pub anchor: Caret,
    /// Where cursor is now
    pub head: Caret,
}

impl Selection {
    /// Create a new selection.
    pub fn new(anchor: Caret, head: Caret) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (caret only).
    pub fn collapsed(caret: Caret) -> Self {
        Self {
            anchor: caret,
            head: caret,
        }
    }

    /// Check if the selection is collapsed (caret only).
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }
}

/// Block-level text alignment.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_css(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }

    pub fn from_css(s: &str) -> Option<Self> {
        match s.trim() {
            "left" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" => Some(Alignment::Right),
            _ => None,
        }
    }
}

/// Which color a `SetColor` command targets.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum ColorRole {
    /// Foreground text color.
    Text,
    /// Background highlight color.
    Highlight,
}

/// A CSS hex color like `#1e293b`. Stored as given; [`is_hex_color`]
/// gates it when a color command executes.
pub type HexColor = SmolStr;

/// `#` followed by 3 or 6 hex digits.
pub fn is_hex_color(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color_validation() {
        assert!(is_hex_color("#1e293b"));
        assert!(is_hex_color("#fff"));
        assert!(!is_hex_color("1e293b"));
        assert!(!is_hex_color("#ff"));
        assert!(!is_hex_color("#gggggg"));
        assert!(!is_hex_color("red"));
    }

    #[test]
    fn test_zero_width_detection() {
        assert!(is_zero_width(ZERO_WIDTH_SPACE));
        assert!(is_zero_width(ZERO_WIDTH_NON_JOINER));
        assert!(!is_zero_width('a'));

        assert!(is_zero_width_only("\u{200B}"));
        assert!(is_zero_width_only("\u{200B}\u{200C}"));
        assert!(!is_zero_width_only(""));
        assert!(!is_zero_width_only("\u{200B}x"));
    }

    #[test]
    fn test_alignment_css_round_trip() {
        for a in [Alignment::Left, Alignment::Center, Alignment::Right] {
            assert_eq!(Alignment::from_css(a.as_css()), Some(a));
        }
        assert_eq!(Alignment::from_css("justify"), None);
    }
}
