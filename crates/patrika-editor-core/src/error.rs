use thiserror::Error;

/// Why a command could not be applied. Failed commands leave the document
/// untouched and push nothing onto history.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// A link command needs either a non-empty selection or a caret inside
    /// an existing link.
    #[error("nothing to link: selection is collapsed outside a link")]
    NothingToLink,

    /// No textblock to act on at the selection.
    #[error("no textblock at the selection")]
    NoTextblock,

    /// Argument outside the supported range.
    #[error("invalid command argument: {0}")]
    InvalidArgument(&'static str),
}
