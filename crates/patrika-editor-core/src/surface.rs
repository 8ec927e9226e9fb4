//! The editable surface: the host-facing wrapper around the editor.
//!
//! The surface owns the value/change contract. Every local edit emits the
//! serialized value through the change callback; an external value push via
//! [`EditableSurface::set_value`] emits nothing and is idempotent, which is
//! what breaks the host-to-editor-to-host feedback loop.

use smol_str::SmolStr;
use tracing::trace;

use crate::command::Command;
use crate::document::Editor;
use crate::execute::execute;
use crate::markup;
use crate::paste::{self, PasteEvent};

type ChangeFn = Box<dyn FnMut(&str)>;

/// An editor bound to a host: placeholder, change notification, and a
/// single funnel for edits.
pub struct EditableSurface {
    editor: Editor,
    placeholder: SmolStr,
    on_change: Option<ChangeFn>,
}

impl std::fmt::Debug for EditableSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditableSurface")
            .field("editor", &self.editor)
            .field("placeholder", &self.placeholder)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl Default for EditableSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl EditableSurface {
    pub fn new() -> Self {
        Self {
            editor: Editor::new(),
            placeholder: SmolStr::default(),
            on_change: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<SmolStr>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Register the change callback. It fires after every local edit with
    /// the canonical serialized value, never after an external push.
    pub fn on_change(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    /// Current value. The placeholder is presentation only and never
    /// appears here.
    pub fn value(&self) -> String {
        self.editor.value()
    }

    /// What the host should render: the value, or the placeholder when the
    /// content is visibly empty.
    pub fn display_text(&self) -> String {
        if self.editor.is_visibly_empty() && !self.placeholder.is_empty() {
            self.placeholder.to_string()
        } else {
            self.editor.plain_text()
        }
    }

    /// Push a value from outside (load, autosave restore, collaborative
    /// refresh). Idempotent: a value whose canonical form equals the current
    /// content is a no-op, preserving selection and history. No change
    /// notification fires either way.
    pub fn set_value(&mut self, value: &str) {
        let incoming = markup::serialize(&markup::parse(value));
        if incoming == self.editor.value() {
            trace!("external value identical, keeping editor state");
            return;
        }
        self.editor.set_content(value);
    }

    pub fn insert_text(&mut self, text: &str) -> bool {
        let changed = self.editor.insert_text(text);
        if changed {
            self.emit();
        }
        changed
    }

    pub fn delete_backward(&mut self) -> bool {
        let changed = self.editor.delete_backward();
        if changed {
            self.emit();
        }
        changed
    }

    /// Run a toolbar command through the executor.
    pub fn run(&mut self, command: &Command) -> bool {
        let changed = execute(&mut self.editor, command);
        if changed {
            self.emit();
        }
        changed
    }

    pub fn paste(&mut self, event: &PasteEvent) -> bool {
        let changed = paste::apply_paste(&mut self.editor, event);
        if changed {
            self.emit();
        }
        changed
    }

    fn emit(&mut self) {
        if let Some(callback) = &mut self.on_change {
            callback(&self.editor.value());
        }
    }
}
