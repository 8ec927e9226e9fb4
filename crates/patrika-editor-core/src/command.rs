//! The editing command vocabulary.

use crate::types::{Alignment, ColorRole, HexColor};

/// Everything a toolbar can ask the editor to do. Commands are applied
/// through [`execute`](crate::execute::execute), which owns the snapshot,
/// validate, apply, normalize cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    ToggleBold,
    ToggleItalic,
    ToggleUnderline,
    ToggleStrike,
    /// Convert the caret's textblock to a heading of the given level (1-6).
    SetHeading(u8),
    /// Convert the caret's textblock back to a paragraph.
    SetParagraph,
    SetAlignment(Alignment),
    ToggleBlockquote,
    /// Wrap the caret's textblock in a list, switch list kind, or lift it
    /// out when it is already in a list of that kind.
    InsertList { ordered: bool },
    /// `Some(href)` applies a link, `None` removes one.
    SetLink(Option<String>),
    /// Insert an image at the selection, replacing any selected content.
    InsertImage(String),
    SetFontSize(u8),
    SetColor { role: ColorRole, hex: HexColor },
    Undo,
    Redo,
}
