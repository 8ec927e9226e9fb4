//! Selection validation and repair.
//!
//! Carets point at arena nodes, and arena nodes die when structure changes
//! underneath them. Every consumer of the selection goes through
//! [`ensure_selection`] first, so commands always see a live, in-bounds
//! range. [`CapturedCaret`] additionally remembers the ancestor path at
//! capture time, letting a caret survive the removal of its own node by
//! reattaching to the nearest surviving ancestor.

use crate::tree::{Attrs, DocTree, NodeId, Tag};
use crate::types::{Caret, Selection};

fn caret_is_valid(tree: &DocTree, caret: Caret) -> bool {
    if !tree.contains(caret.node) {
        return false;
    }
    match tree.text(caret.node) {
        Some(text) => caret.offset <= text.chars().count(),
        None => caret.offset <= tree.children(caret.node).len(),
    }
}

/// Whether both endpoints still reference live nodes at in-bounds offsets.
pub fn is_valid(tree: &DocTree, selection: &Selection) -> bool {
    caret_is_valid(tree, selection.anchor) && caret_is_valid(tree, selection.head)
}

/// Return a usable selection: the current one if still valid, otherwise a
/// caret at the end of the content. An empty document gets a paragraph
/// synthesized so the caret has a textblock to live in.
pub fn ensure_selection(tree: &mut DocTree, current: Option<&Selection>) -> Selection {
    if let Some(sel) = current
        && is_valid(tree, sel)
    {
        return *sel;
    }
    if tree.children(NodeId::ROOT).is_empty() {
        let p = tree.create_element(Tag::Paragraph, Attrs::default());
        tree.append_child(NodeId::ROOT, p);
    }
    Selection::collapsed(tree.end_caret())
}

/// A caret plus the ancestor chain it had when captured, nearest first.
#[derive(Clone, Debug)]
pub struct CapturedCaret {
    pub node: NodeId,
    pub offset: usize,
    path: Vec<NodeId>,
}

/// Record a caret together with its ancestor path for later repair.
pub fn capture(tree: &DocTree, caret: Caret) -> CapturedCaret {
    CapturedCaret {
        node: caret.node,
        offset: caret.offset,
        path: tree.ancestors(caret.node),
    }
}

/// Restore a captured caret against the (possibly mutated) tree. A dead
/// node falls back to the first surviving ancestor; a dead whole path falls
/// back to the end of the content.
pub fn restore(tree: &DocTree, captured: &CapturedCaret) -> Caret {
    if caret_is_valid(
        tree,
        Caret::new(captured.node, captured.offset),
    ) {
        return Caret::new(captured.node, captured.offset);
    }
    if tree.contains(captured.node) {
        let max = match tree.text(captured.node) {
            Some(text) => text.chars().count(),
            None => tree.children(captured.node).len(),
        };
        return Caret::new(captured.node, captured.offset.min(max));
    }
    for ancestor in &captured.path {
        if tree.contains(*ancestor) {
            return Caret::new(*ancestor, tree.children(*ancestor).len());
        }
    }
    tree.end_caret()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse;

    #[test]
    fn test_ensure_keeps_valid_selection() {
        let mut tree = parse("<p>hello</p>");
        let t = tree.text_nodes(NodeId::ROOT)[0];
        let sel = Selection::new(Caret::new(t, 1), Caret::new(t, 4));
        assert_eq!(ensure_selection(&mut tree, Some(&sel)), sel);
    }

    #[test]
    fn test_ensure_replaces_dead_selection() {
        let mut tree = parse("<p>hello</p>");
        let t = tree.text_nodes(NodeId::ROOT)[0];
        let sel = Selection::collapsed(Caret::new(t, 2));
        tree.remove(t);
        let fixed = ensure_selection(&mut tree, Some(&sel));
        assert!(is_valid(&tree, &fixed));
        assert!(fixed.is_collapsed());
    }

    #[test]
    fn test_ensure_rejects_out_of_bounds_offset() {
        let mut tree = parse("<p>hi</p>");
        let t = tree.text_nodes(NodeId::ROOT)[0];
        let sel = Selection::collapsed(Caret::new(t, 99));
        let fixed = ensure_selection(&mut tree, Some(&sel));
        assert!(is_valid(&tree, &fixed));
    }

    #[test]
    fn test_ensure_synthesizes_paragraph_in_empty_doc() {
        let mut tree = DocTree::new();
        let sel = ensure_selection(&mut tree, None);
        assert!(is_valid(&tree, &sel));
        let children = tree.children(NodeId::ROOT);
        assert_eq!(children.len(), 1);
        assert_eq!(tree.tag(children[0]), Some(Tag::Paragraph));
    }

    #[test]
    fn test_capture_restore_survives_node_removal() {
        let mut tree = parse("<p><strong>bold</strong></p>");
        let t = tree.text_nodes(NodeId::ROOT)[0];
        let strong = tree.parent(t).unwrap();
        let p = tree.parent(strong).unwrap();

        let captured = capture(&tree, Caret::new(t, 2));
        tree.remove(strong);
        let repaired = restore(&tree, &captured);
        assert_eq!(repaired.node, p);
    }
}
