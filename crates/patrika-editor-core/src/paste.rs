//! Clipboard ingestion.
//!
//! Pasted payloads carry whatever markup the source application produced.
//! Sanitization funnels them through the lenient reader, which keeps the
//! supported vocabulary, unwraps foreign wrappers, and drops non-content
//! subtrees. Plain-text payloads become paragraphs per line.

use tracing::debug;

use crate::document::Editor;
use crate::markup;
use crate::selection::ensure_selection;
use crate::tree::{DocTree, NodeId, Tag};

/// A clipboard payload: rich markup, plain text, or both.
#[derive(Clone, Debug, Default)]
pub struct PasteEvent {
    pub html: Option<String>,
    pub plain: Option<String>,
}

impl PasteEvent {
    pub fn html(html: impl Into<String>) -> Self {
        Self {
            html: Some(html.into()),
            plain: None,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            html: None,
            plain: Some(text.into()),
        }
    }
}

/// Reduce a payload to a clean fragment tree. Markup is preferred when
/// present; plain text becomes one paragraph per non-empty line, except a
/// single line, which stays a loose text run so it splices inline. Returns
/// `None` when the payload has no usable content.
pub fn sanitize(event: &PasteEvent) -> Option<DocTree> {
    if let Some(html) = &event.html
        && !html.trim().is_empty()
    {
        let fragment = markup::parse_fragment(html);
        if !fragment.children(NodeId::ROOT).is_empty() {
            return Some(fragment);
        }
    }
    let plain = event.plain.as_deref()?.trim_end_matches('\n');
    if plain.trim().is_empty() {
        return None;
    }
    let mut fragment = DocTree::new();
    let lines: Vec<&str> = plain.lines().collect();
    if lines.len() == 1 {
        let text = fragment.create_text(lines[0]);
        fragment.append_child(NodeId::ROOT, text);
    } else {
        for line in lines {
            let p = fragment.create_element(Tag::Paragraph, Default::default());
            let text = fragment.create_text(line);
            fragment.append_child(p, text);
            fragment.append_child(NodeId::ROOT, p);
        }
    }
    Some(fragment)
}

/// Paste a payload at the selection. Any selected range is replaced; the
/// caret collapses after the inserted content. Returns whether the document
/// changed.
pub fn apply_paste(editor: &mut Editor, event: &PasteEvent) -> bool {
    let Some(fragment) = sanitize(event) else {
        debug!("paste discarded: no usable content");
        return false;
    };
    let before = editor.snapshot();
    let sel = ensure_selection(&mut editor.tree, editor.selection.as_ref());
    let a = editor.tree.caret_to_offset(sel.anchor);
    let b = editor.tree.caret_to_offset(sel.head);
    let (start, end) = (a.min(b), a.max(b));
    if start < end {
        editor.delete_offsets(start, end);
    }
    let inserted = fragment.node_len(NodeId::ROOT);

    let roots = fragment.children(NodeId::ROOT).to_vec();
    let inline_only = roots.iter().all(|n| match fragment.tag(*n) {
        Some(tag) => tag.is_inline(),
        None => true,
    });

    let tree = &mut editor.tree;
    let caret = tree.offset_to_caret(start);
    if inline_only {
        // Splice the run into the caret's position inside its textblock.
        let (parent, mut index) = if tree.is_text(caret.node) {
            let len = tree.text(caret.node).map(|s| s.chars().count()).unwrap_or(0);
            let parent = tree.parent(caret.node).unwrap_or(NodeId::ROOT);
            let idx = tree.child_index(caret.node).unwrap_or(0);
            if caret.offset == 0 {
                (parent, idx)
            } else if caret.offset >= len {
                (parent, idx + 1)
            } else {
                let tail = tree.split_text(caret.node, caret.offset);
                (parent, tree.child_index(tail).unwrap_or(idx + 1))
            }
        } else {
            (caret.node, caret.offset)
        };
        for root in roots {
            let copy = tree.import_subtree(&fragment, root);
            tree.insert_child(parent, index, copy);
            index += 1;
        }
    } else {
        // Block content goes after the caret's textblock, or at the end of
        // the root when there is none.
        let block = tree.nearest_textblock(caret.node);
        let (parent, mut index) = match block {
            Some(block) => {
                let parent = tree.parent(block).unwrap_or(NodeId::ROOT);
                let idx = tree.child_index(block).unwrap_or(0);
                (parent, idx + 1)
            }
            None => (NodeId::ROOT, tree.children(NodeId::ROOT).len()),
        };
        for root in roots {
            let copy = tree.import_subtree(&fragment, root);
            tree.insert_child(parent, index, copy);
            index += 1;
        }
        // A caret block emptied by the range deletion would linger.
        if let Some(block) = block {
            let no_text = tree
                .text_nodes(block)
                .iter()
                .all(|t| tree.text(*t).map(str::is_empty).unwrap_or(true));
            let no_voids = tree
                .descendants(block)
                .iter()
                .all(|n| !tree.tag(*n).map(Tag::is_void).unwrap_or(false));
            if no_text && no_voids {
                tree.remove(block);
            }
        }
    }

    editor.tree.normalize();
    let after = start + inserted;
    editor.select_offsets(after, after);
    editor.history.push(before);
    true
}
