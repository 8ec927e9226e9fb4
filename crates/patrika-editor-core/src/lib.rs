//! patrika-editor-core: Pure Rust rich-content editing logic without
//! framework dependencies.
//!
//! This crate provides:
//! - `DocTree` - the arena-backed buffer tree holding the content value
//! - `Editor` - document, selection, and snapshot history in one place
//! - `Command` / `execute` - the full toolbar command vocabulary
//! - `markup` - lenient reader and canonical writer for the value format
//! - `EditableSurface` - host-facing value/change/placeholder contract
//! - Paste sanitization, content synchronization, and the
//!   secondary-language authoring assist

pub mod command;
pub mod document;
pub mod error;
pub mod execute;
pub mod history;
pub mod markup;
pub mod paste;
pub mod selection;
pub mod surface;
pub mod sync;
pub mod translate;
pub mod tree;
pub mod types;

pub use command::Command;
pub use document::Editor;
pub use error::CommandError;
pub use execute::execute;
pub use history::{History, Snapshot};
pub use markup::{parse, parse_fragment, serialize};
pub use paste::{PasteEvent, apply_paste, sanitize};
pub use selection::{CapturedCaret, capture, ensure_selection, restore};
pub use smol_str::SmolStr;
pub use surface::EditableSurface;
pub use sync::{ContentSink, SinkError, SyncBridge};
pub use translate::{
    AssistError, Clipboard, Reimported, ReimportFidelity, TranslationSession, ViewOpener,
    ViewingContext, export_for_translation, reimport,
};
pub use tree::{Attrs, DocTree, NodeId, NodeKind, Tag};
pub use types::{
    Alignment, Caret, ColorRole, HexColor, Selection, ZERO_WIDTH_NON_JOINER, ZERO_WIDTH_SPACE,
    is_hex_color, is_zero_width, is_zero_width_only,
};
