//! Secondary-language authoring assist.
//!
//! Authors write in one language and need a translated draft for the
//! secondary-language fields. The assist opens the current content in an
//! external machine-translation view, reads the mutated markup back, strips
//! the artifacts such views inject (wrapper `font` elements,
//! `vertical-align: inherit` styles, `dir` attributes), and hands the
//! cleaned result to the clipboard so it can be pasted into the other
//! field. When the clipboard cannot take rich content the plain text goes
//! out instead, flagged so the caller can tell the author formatting was
//! lost.
//!
//! The host environment is abstracted behind traits; tests drive the flow
//! with in-memory doubles.

use thiserror::Error;
use tracing::{debug, info};

use crate::markup;

#[derive(Debug, Error)]
pub enum AssistError {
    /// The translation view could not be opened (blocked popup, missing
    /// host capability).
    #[error("translation view blocked: {0}")]
    ViewBlocked(String),

    /// The view was closed or its content is unavailable.
    #[error("could not read translated content back: {0}")]
    ReadBack(String),

    /// Neither rich nor plain clipboard write succeeded.
    #[error("clipboard write failed: {0}")]
    Clipboard(String),
}

/// An open translation view holding a mutated copy of the content.
pub trait ViewingContext {
    /// The view's current markup, translation artifacts included.
    fn read_back(&mut self) -> Result<String, AssistError>;

    fn close(&mut self);
}

/// Opens translation views for a target language.
pub trait ViewOpener {
    type View: ViewingContext;

    fn open(&self, content: &str, target_lang: &str) -> Result<Self::View, AssistError>;
}

/// Host clipboard with an optional rich flavor.
pub trait Clipboard {
    fn supports_rich(&self) -> bool;

    fn write_rich(&mut self, html: &str, text: &str) -> Result<(), AssistError>;

    fn write_plain(&mut self, text: &str) -> Result<(), AssistError>;
}

/// What made it to the clipboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReimportFidelity {
    /// Markup preserved.
    Rich,
    /// Formatting was dropped; only text survived.
    PlainText,
}

/// The cleaned result of a translation round-trip.
#[derive(Clone, Debug)]
pub struct Reimported {
    /// Canonical markup with view artifacts stripped.
    pub markup: String,
    pub plain: String,
    pub fidelity: ReimportFidelity,
}

/// An in-flight translation: the open view plus the source it was fed.
pub struct TranslationSession<V: ViewingContext> {
    view: V,
    source: String,
}

impl<V: ViewingContext> TranslationSession<V> {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Close the view without touching anything. The content under edit
    /// never changed, so there is nothing to roll back.
    pub fn abandon(mut self) {
        debug!("translation session abandoned");
        self.view.close();
    }
}

/// Open a translation view over the given content. No session exists if the
/// view fails to open.
pub fn export_for_translation<O: ViewOpener>(
    opener: &O,
    content: &str,
    target_lang: &str,
) -> Result<TranslationSession<O::View>, AssistError> {
    let view = opener.open(content, target_lang)?;
    info!(target_lang, "translation view opened");
    Ok(TranslationSession {
        view,
        source: content.to_string(),
    })
}

/// Read the translated content back, strip view artifacts, and put the
/// result on the clipboard. Falls back to plain text when the clipboard has
/// no rich flavor or the rich write fails.
pub fn reimport<V: ViewingContext>(
    mut session: TranslationSession<V>,
    clipboard: &mut dyn Clipboard,
) -> Result<Reimported, AssistError> {
    let raw = session.view.read_back()?;
    session.view.close();

    // The lenient reader is the artifact filter: font wrappers are
    // transparent, unknown attributes drop, vertical-align styles vanish.
    let tree = markup::parse(&raw);
    let cleaned = markup::serialize(&tree);
    let plain = tree.plain_text();

    if clipboard.supports_rich() {
        match clipboard.write_rich(&cleaned, &plain) {
            Ok(()) => {
                return Ok(Reimported {
                    markup: cleaned,
                    plain,
                    fidelity: ReimportFidelity::Rich,
                });
            }
            Err(err) => {
                debug!(error = %err, "rich clipboard write failed, trying plain");
            }
        }
    }
    clipboard.write_plain(&plain)?;
    Ok(Reimported {
        markup: cleaned,
        plain,
        fidelity: ReimportFidelity::PlainText,
    })
}
