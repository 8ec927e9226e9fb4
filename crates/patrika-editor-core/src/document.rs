//! The editor document: buffer tree, selection, and history in one place.

use crate::history::{History, Snapshot};
use crate::markup;
use crate::selection::{self, ensure_selection};
use crate::tree::DocTree;
use crate::types::{Caret, Selection};

/// A rich-content document under edit.
///
/// All mutation entry points follow the same discipline: snapshot the
/// pre-edit state, apply, normalize, restore the selection from global
/// offsets, and push the snapshot only if something actually changed.
#[derive(Debug, Default)]
pub struct Editor {
    pub(crate) tree: DocTree,
    pub(crate) selection: Option<Selection>,
    pub(crate) history: History,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an editor from markup. Parsing is lenient and never fails;
    /// unsupported input degrades to its surviving content.
    pub fn from_markup(input: &str) -> Self {
        Self {
            tree: markup::parse(input),
            selection: None,
            history: History::new(),
        }
    }

    /// Current value in canonical serialized form.
    pub fn value(&self) -> String {
        markup::serialize(&self.tree)
    }

    /// Visible text with blocks separated by newlines.
    pub fn plain_text(&self) -> String {
        self.tree.plain_text()
    }

    /// No visible text and no images. Zero-width carriers do not count.
    pub fn is_visibly_empty(&self) -> bool {
        self.tree.is_visibly_empty()
    }

    /// Replace the whole content from outside the editing loop. History is
    /// cleared: the new value is a fresh baseline, not an edit.
    pub fn set_content(&mut self, input: &str) {
        self.tree = markup::parse(input);
        self.selection = None;
        self.history.clear();
    }

    pub fn tree(&self) -> &DocTree {
        &self.tree
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Selection) {
        if selection::is_valid(&self.tree, &selection) {
            self.selection = Some(selection);
        }
    }

    /// The active selection as ordered global offsets.
    pub fn selection_offsets(&self) -> Option<(usize, usize)> {
        let sel = self.selection.as_ref()?;
        let a = self.tree.caret_to_offset(sel.anchor);
        let b = self.tree.caret_to_offset(sel.head);
        Some((a.min(b), a.max(b)))
    }

    /// Place the selection from global offsets, clamped to the content.
    pub fn select_offsets(&mut self, start: usize, end: usize) {
        let anchor = self.tree.offset_to_caret(start);
        let head = self.tree.offset_to_caret(end);
        self.selection = Some(Selection::new(anchor, head));
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            markup: self.value(),
            selection: self.selection_offsets(),
        }
    }

    pub(crate) fn load_snapshot(&mut self, snapshot: &Snapshot) {
        self.tree = markup::parse(&snapshot.markup);
        self.selection = None;
        if let Some((start, end)) = snapshot.selection {
            self.select_offsets(start, end);
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Restore the previous snapshot, content and selection both.
    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(snapshot) => {
                self.load_snapshot(&snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(snapshot) => {
                self.load_snapshot(&snapshot);
                true
            }
            None => false,
        }
    }

    /// Type text at the selection, replacing any selected range. In an
    /// empty document a paragraph is synthesized first, so typing always
    /// lands in a textblock.
    pub fn insert_text(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let before = self.snapshot();
        let sel = ensure_selection(&mut self.tree, self.selection.as_ref());
        let a = self.tree.caret_to_offset(sel.anchor);
        let b = self.tree.caret_to_offset(sel.head);
        let (start, end) = (a.min(b), a.max(b));
        // A collapsed selection keeps its exact caret node. Resolving
        // through global offsets would snap boundary carets to the next
        // node, which matters when the caret sits inside a formatting
        // carrier.
        let caret = if start < end {
            self.delete_offsets(start, end);
            self.tree.offset_to_caret(start)
        } else {
            sel.head
        };
        let pinned = match self.tree.text_mut(caret.node) {
            Some(s) => {
                let byte = byte_at(s, caret.offset);
                s.insert_str(byte, text);
                Caret::new(caret.node, caret.offset + text.chars().count())
            }
            None => {
                let node = self.tree.create_text(text);
                self.tree.insert_child(caret.node, caret.offset, node);
                Caret::new(node, text.chars().count())
            }
        };
        let after = start + text.chars().count();
        self.tree.normalize();
        if selection::is_valid(&self.tree, &Selection::collapsed(pinned)) {
            self.selection = Some(Selection::collapsed(pinned));
        } else {
            self.select_offsets(after, after);
        }
        self.history.push(before);
        true
    }

    /// Delete the selected range, or the character before a collapsed caret.
    pub fn delete_backward(&mut self) -> bool {
        let before = self.snapshot();
        let sel = ensure_selection(&mut self.tree, self.selection.as_ref());
        let a = self.tree.caret_to_offset(sel.anchor);
        let b = self.tree.caret_to_offset(sel.head);
        let (mut start, end) = (a.min(b), a.max(b));
        if start == end {
            if start == 0 {
                // Nothing to delete. Undo whatever selection repair did so a
                // refused delete leaves the buffer untouched.
                self.load_snapshot(&before);
                return false;
            }
            start -= 1;
        }
        self.delete_offsets(start, end.max(start + 1));
        self.tree.normalize();
        self.select_offsets(start, start);
        self.history.push(before);
        true
    }

    /// Remove the global range `[start, end)`: text characters and inline
    /// voids. Block boundaries inside the range collapse via normalization.
    pub(crate) fn delete_offsets(&mut self, start: usize, end: usize) {
        // Resolve text slices before touching voids: removing a void shifts
        // global offsets, but node-local character ranges stay valid.
        let slices = self.tree.text_slices(start, end);
        for void in self.tree.voids_in_range(start, end) {
            self.tree.remove(void);
        }
        for (node, lo, hi) in slices {
            if let Some(s) = self.tree.text_mut(node) {
                let lo_b = byte_at(s, lo);
                let hi_b = byte_at(s, hi);
                s.replace_range(lo_b..hi_b, "");
            }
        }
    }
}

fn byte_at(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{NodeId, Tag};

    #[test]
    fn test_value_round_trip() {
        let editor = Editor::from_markup("<p>hello <strong>world</strong></p>");
        assert_eq!(editor.value(), "<p>hello <strong>world</strong></p>");
    }

    #[test]
    fn test_insert_text_at_caret() {
        let mut editor = Editor::from_markup("<p>held</p>");
        let t = editor.tree.text_nodes(NodeId::ROOT)[0];
        editor.set_selection(Selection::collapsed(crate::types::Caret::new(t, 3)));

        assert!(editor.insert_text("lo wor"));
        assert_eq!(editor.value(), "<p>hello world</p>");
        assert_eq!(editor.selection_offsets(), Some((9, 9)));
    }

    #[test]
    fn test_insert_text_replaces_selection() {
        let mut editor = Editor::from_markup("<p>hello world</p>");
        editor.select_offsets(6, 11);

        assert!(editor.insert_text("there"));
        assert_eq!(editor.value(), "<p>hello there</p>");
    }

    #[test]
    fn test_typing_into_empty_document_creates_paragraph() {
        let mut editor = Editor::new();
        assert!(editor.is_visibly_empty());

        assert!(editor.insert_text("Hello"));
        assert_eq!(editor.value(), "<p>Hello</p>");
        let blocks = editor.tree.children(NodeId::ROOT);
        assert_eq!(blocks.len(), 1);
        assert_eq!(editor.tree.tag(blocks[0]), Some(Tag::Paragraph));
    }

    #[test]
    fn test_delete_backward_single_char() {
        let mut editor = Editor::from_markup("<p>hi</p>");
        editor.select_offsets(2, 2);

        assert!(editor.delete_backward());
        assert_eq!(editor.value(), "<p>h</p>");

        assert!(editor.delete_backward());
        assert!(editor.is_visibly_empty());
    }

    #[test]
    fn test_delete_backward_at_start_is_noop() {
        let mut editor = Editor::from_markup("<p>hi</p>");
        editor.select_offsets(0, 0);

        assert!(!editor.delete_backward());
        assert_eq!(editor.value(), "<p>hi</p>");
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_delete_backward_on_empty_editor_leaves_it_empty() {
        let mut editor = Editor::new();

        assert!(!editor.delete_backward());
        assert_eq!(editor.value(), "");
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_delete_backward_removes_selection() {
        let mut editor = Editor::from_markup("<p>hello world</p>");
        editor.select_offsets(5, 11);

        assert!(editor.delete_backward());
        assert_eq!(editor.value(), "<p>hello</p>");
        assert_eq!(editor.selection_offsets(), Some((5, 5)));
    }

    #[test]
    fn test_delete_removes_image() {
        let mut editor = Editor::from_markup("<p>a<img src=\"/x.png\">b</p>");
        editor.select_offsets(2, 2);

        assert!(editor.delete_backward());
        assert_eq!(editor.value(), "<p>ab</p>");
    }

    #[test]
    fn test_undo_restores_content_and_selection() {
        let mut editor = Editor::from_markup("<p>hello</p>");
        editor.select_offsets(5, 5);
        editor.insert_text("!");
        assert_eq!(editor.value(), "<p>hello!</p>");

        assert!(editor.undo());
        assert_eq!(editor.value(), "<p>hello</p>");
        assert_eq!(editor.selection_offsets(), Some((5, 5)));

        assert!(editor.redo());
        assert_eq!(editor.value(), "<p>hello!</p>");
    }

    #[test]
    fn test_undo_on_empty_history() {
        let mut editor = Editor::from_markup("<p>x</p>");
        assert!(!editor.undo());
        assert!(!editor.redo());
    }

    #[test]
    fn test_set_content_clears_history() {
        let mut editor = Editor::from_markup("<p>a</p>");
        editor.select_offsets(1, 1);
        editor.insert_text("b");
        assert!(editor.can_undo());

        editor.set_content("<p>new</p>");
        assert!(!editor.can_undo());
        assert_eq!(editor.value(), "<p>new</p>");
    }

    #[test]
    fn test_edit_clears_redo_branch() {
        let mut editor = Editor::from_markup("<p>a</p>");
        editor.select_offsets(1, 1);
        editor.insert_text("b");
        editor.undo();
        assert!(editor.can_redo());

        editor.select_offsets(1, 1);
        editor.insert_text("c");
        assert!(!editor.can_redo());
        assert_eq!(editor.value(), "<p>ac</p>");
    }

    #[test]
    fn test_multibyte_insert_and_delete() {
        let mut editor = Editor::from_markup("<p>नमस्ते</p>");
        let len = editor.plain_text().chars().count();
        editor.select_offsets(len, len);
        editor.insert_text("!");
        assert_eq!(editor.plain_text(), "नमस्ते!");

        editor.delete_backward();
        assert_eq!(editor.plain_text(), "नमस्ते");
    }
}
