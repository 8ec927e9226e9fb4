//! Command execution.
//!
//! [`execute`] owns the full edit cycle for every command: snapshot the
//! pre-edit state, repair the selection, apply, normalize, restore a
//! selection, push history. A command that cannot apply rolls the document
//! back to the snapshot and reports `false`; nothing reaches history.
//!
//! Collapsed-selection formatting uses zero-width carriers: toggling a mark
//! with no range selected inserts (or removes) an element holding a single
//! zero-width space, so that subsequent typing picks up the formatting.
//! Carriers never show up in visible text and a double toggle leaves the
//! document byte-identical.

use tracing::debug;

use crate::command::Command;
use crate::document::Editor;
use crate::error::CommandError;
use crate::selection::{self, ensure_selection};
use crate::tree::{Attrs, DocTree, NodeId, Tag};
use crate::types::{
    Caret, ColorRole, Selection, ZERO_WIDTH_SPACE, is_hex_color, is_zero_width_only,
};

/// Where the selection lands after a successful command.
enum Placed {
    /// Global offsets, resolved after normalization.
    Offsets(usize, usize),
    /// An exact caret, pinned to a node that survives normalization.
    At(Caret),
}

/// Apply a command to the editor. Returns whether the document or history
/// changed.
pub fn execute(editor: &mut Editor, command: &Command) -> bool {
    match command {
        Command::Undo => return editor.undo(),
        Command::Redo => return editor.redo(),
        _ => {}
    }
    let before = editor.snapshot();
    let sel = ensure_selection(&mut editor.tree, editor.selection.as_ref());
    let a = editor.tree.caret_to_offset(sel.anchor);
    let b = editor.tree.caret_to_offset(sel.head);
    let (start, end) = (a.min(b), a.max(b));

    match apply(editor, command, sel, start, end) {
        Ok(placed) => {
            editor.tree.normalize();
            match placed {
                Placed::Offsets(s, e) => editor.select_offsets(s, e),
                Placed::At(caret) => {
                    let pinned = Selection::collapsed(caret);
                    if selection::is_valid(&editor.tree, &pinned) {
                        editor.selection = Some(pinned);
                    } else {
                        editor.select_offsets(start, start);
                    }
                }
            }
            editor.history.push(before);
            true
        }
        Err(err) => {
            debug!(command = ?command, error = %err, "command rejected");
            editor.load_snapshot(&before);
            false
        }
    }
}

fn apply(
    editor: &mut Editor,
    command: &Command,
    sel: Selection,
    start: usize,
    end: usize,
) -> Result<Placed, CommandError> {
    match command {
        Command::ToggleBold => toggle_mark(editor, Tag::Bold, Attrs::default(), sel, start, end),
        Command::ToggleItalic => {
            toggle_mark(editor, Tag::Italic, Attrs::default(), sel, start, end)
        }
        Command::ToggleUnderline => {
            toggle_mark(editor, Tag::Underline, Attrs::default(), sel, start, end)
        }
        Command::ToggleStrike => {
            toggle_mark(editor, Tag::Strike, Attrs::default(), sel, start, end)
        }
        Command::SetHeading(level) => {
            if !(1..=6).contains(level) {
                return Err(CommandError::InvalidArgument("heading level must be 1-6"));
            }
            retag_textblocks(editor, Tag::Heading(*level), sel, start, end)
        }
        Command::SetParagraph => retag_textblocks(editor, Tag::Paragraph, sel, start, end),
        Command::SetAlignment(align) => {
            let blocks = textblocks_in_range(&editor.tree, sel, start, end);
            if blocks.is_empty() {
                return Err(CommandError::NoTextblock);
            }
            for block in blocks {
                if let Some(attrs) = editor.tree.attrs_mut(block) {
                    // Left is the default and stays implicit.
                    attrs.align = match align {
                        crate::types::Alignment::Left => None,
                        other => Some(*other),
                    };
                }
            }
            Ok(Placed::Offsets(start, end))
        }
        Command::ToggleBlockquote => toggle_blockquote(editor, sel, start, end),
        Command::InsertList { ordered } => insert_list(editor, *ordered, sel, start, end),
        Command::SetLink(href) => set_link(editor, href.as_deref(), sel, start, end),
        Command::InsertImage(src) => {
            if src.trim().is_empty() {
                return Err(CommandError::InvalidArgument("image source is empty"));
            }
            insert_image(editor, src, start, end)
        }
        Command::SetFontSize(size) => {
            if *size == 0 {
                return Err(CommandError::InvalidArgument("font size must be non-zero"));
            }
            let attrs = Attrs {
                font_size: Some(*size),
                ..Default::default()
            };
            apply_span(editor, attrs, sel, start, end)
        }
        Command::SetColor { role, hex } => {
            if !is_hex_color(hex) {
                return Err(CommandError::InvalidArgument("color must be a hex code"));
            }
            let mut attrs = Attrs::default();
            match role {
                ColorRole::Text => attrs.color = Some(hex.clone()),
                ColorRole::Highlight => attrs.background = Some(hex.clone()),
            }
            apply_span(editor, attrs, sel, start, end)
        }
        Command::Undo | Command::Redo => unreachable!("handled before apply"),
    }
}

// === Inline marks ===

fn toggle_mark(
    editor: &mut Editor,
    tag: Tag,
    attrs: Attrs,
    sel: Selection,
    start: usize,
    end: usize,
) -> Result<Placed, CommandError> {
    if start == end {
        return collapsed_toggle(editor, tag, attrs, sel.head);
    }
    let slices = editor.tree.text_slices(start, end);
    let fully_marked = !slices.is_empty()
        && slices
            .iter()
            .all(|(n, _, _)| editor.tree.mark_ancestor(*n, tag).is_some());
    for (node, lo, hi) in slices {
        let isolated = editor.tree.isolate_text_range(node, lo, hi);
        let mark = editor.tree.mark_ancestor(isolated, tag);
        match (fully_marked, mark) {
            (true, Some(m)) => {
                let top = editor.tree.isolate_branch(isolated, m);
                editor.tree.unwrap_element(top);
            }
            (false, None) => {
                editor.tree.wrap_nodes(&[isolated], tag, attrs.clone());
            }
            _ => {}
        }
    }
    Ok(Placed::Offsets(start, end))
}

/// Toggle a mark at a collapsed caret via a zero-width carrier.
fn collapsed_toggle(
    editor: &mut Editor,
    tag: Tag,
    attrs: Attrs,
    caret: Caret,
) -> Result<Placed, CommandError> {
    let tree = &mut editor.tree;
    if tree.is_text(caret.node) {
        if let Some(mark) = tree.mark_ancestor(caret.node, tag) {
            if is_carrier(tree, mark) {
                if tree.attrs(mark) == Some(&attrs) {
                    // Toggling straight back off: drop the carrier.
                    let at = tree.offset_of_node(mark);
                    tree.remove(mark);
                    return Ok(Placed::Offsets(at, at));
                }
                // A second style lands on the carrier before any typing:
                // stack the attrs so the typed text inherits both.
                if let Some(existing) = tree.attrs_mut(mark) {
                    existing.merge(&attrs);
                }
                return Ok(Placed::At(caret));
            }
            // Inside real formatting: split it and park the caret in a
            // plain zero-width gap between the halves.
            let tail = tree.split_text(caret.node, caret.offset);
            let zwsp = tree.create_text(ZERO_WIDTH_SPACE.to_string());
            if caret.offset == 0 {
                tree.insert_before(tail, zwsp);
            } else {
                tree.insert_after(caret.node, zwsp);
            }
            let top = tree.isolate_branch(zwsp, mark);
            tree.unwrap_element(top);
            return Ok(Placed::At(Caret::new(zwsp, 1)));
        }
        // Caret in a plain zero-width gap between two halves of the same
        // mark: removing the gap lets normalization re-merge them.
        if tree
            .text(caret.node)
            .map(is_zero_width_only)
            .unwrap_or(false)
            && let Some(idx) = tree.child_index(caret.node)
            && let Some(parent) = tree.parent(caret.node)
        {
            let siblings = tree.children(parent);
            let prev = idx.checked_sub(1).map(|i| siblings[i]);
            let next = siblings.get(idx + 1).copied();
            if prev.map(|n| tree.tag(n) == Some(tag)) == Some(true)
                && next.map(|n| tree.tag(n) == Some(tag)) == Some(true)
            {
                let at = tree.offset_of_node(caret.node);
                tree.remove(caret.node);
                return Ok(Placed::Offsets(at, at));
            }
        }
        // Plain text: open a carrier so subsequent typing is formatted.
        let tail = tree.split_text(caret.node, caret.offset);
        let carrier = tree.create_element(tag, attrs);
        let zwsp = tree.create_text(ZERO_WIDTH_SPACE.to_string());
        tree.append_child(carrier, zwsp);
        if caret.offset == 0 {
            tree.insert_before(tail, carrier);
        } else {
            tree.insert_after(caret.node, carrier);
        }
        return Ok(Placed::At(Caret::new(zwsp, 1)));
    }
    // Element caret (empty textblock): insert the carrier at the index.
    let carrier = tree.create_element(tag, attrs);
    let zwsp = tree.create_text(ZERO_WIDTH_SPACE.to_string());
    tree.append_child(carrier, zwsp);
    tree.insert_child(caret.node, caret.offset, carrier);
    Ok(Placed::At(Caret::new(zwsp, 1)))
}

/// A carrier is a mark whose whole content is zero-width text.
fn is_carrier(tree: &DocTree, mark: NodeId) -> bool {
    let descendants = tree.descendants(mark);
    !descendants.is_empty()
        && descendants.iter().all(|n| {
            tree.text(*n).map(is_zero_width_only).unwrap_or(false)
        })
}

/// Styled spans reuse the toggle plumbing for the carrier case. A range
/// application updates an enclosing span in place where one exists and
/// wraps a new one otherwise, so re-applying a style never nests and a
/// second style stacks onto the first.
fn apply_span(
    editor: &mut Editor,
    attrs: Attrs,
    sel: Selection,
    start: usize,
    end: usize,
) -> Result<Placed, CommandError> {
    if start == end {
        return collapsed_toggle(editor, Tag::Span, attrs, sel.head);
    }
    for (node, lo, hi) in editor.tree.text_slices(start, end) {
        let isolated = editor.tree.isolate_text_range(node, lo, hi);
        match editor.tree.mark_ancestor(isolated, Tag::Span) {
            Some(existing) => {
                // Narrow the span to this slice before touching its attrs
                // so text outside the range keeps its styling.
                let span = editor.tree.isolate_branch(isolated, existing);
                if let Some(slot) = editor.tree.attrs_mut(span) {
                    slot.merge(&attrs);
                }
            }
            None => {
                editor.tree.wrap_nodes(&[isolated], Tag::Span, attrs.clone());
            }
        }
    }
    Ok(Placed::Offsets(start, end))
}

// === Blocks ===

fn textblocks_in_range(tree: &DocTree, sel: Selection, start: usize, end: usize) -> Vec<NodeId> {
    let mut out: Vec<NodeId> = Vec::new();
    if start == end {
        if let Some(block) = tree.nearest_textblock(sel.head.node) {
            out.push(block);
        }
        return out;
    }
    for (node, _, _) in tree.text_slices(start, end) {
        if let Some(block) = tree.nearest_textblock(node)
            && !out.contains(&block)
        {
            out.push(block);
        }
    }
    if out.is_empty()
        && let Some(block) = tree.nearest_textblock(sel.head.node)
    {
        out.push(block);
    }
    out
}

fn retag_textblocks(
    editor: &mut Editor,
    tag: Tag,
    sel: Selection,
    start: usize,
    end: usize,
) -> Result<Placed, CommandError> {
    let blocks = textblocks_in_range(&editor.tree, sel, start, end);
    if blocks.is_empty() {
        return Err(CommandError::NoTextblock);
    }
    for block in blocks {
        editor.tree.set_tag(block, tag);
    }
    Ok(Placed::Offsets(start, end))
}

fn toggle_blockquote(
    editor: &mut Editor,
    sel: Selection,
    start: usize,
    end: usize,
) -> Result<Placed, CommandError> {
    let blocks = textblocks_in_range(&editor.tree, sel, start, end);
    if blocks.is_empty() {
        return Err(CommandError::NoTextblock);
    }
    let tree = &mut editor.tree;
    let quotes: Vec<NodeId> = blocks
        .iter()
        .filter_map(|b| tree.ancestor_or_self(*b, |t, n| t.tag(n) == Some(Tag::Blockquote)))
        .collect();
    if quotes.len() == blocks.len() {
        // Everything is quoted: unwrap each distinct quote.
        let mut seen: Vec<NodeId> = Vec::new();
        for quote in quotes {
            if !seen.contains(&quote) {
                seen.push(quote);
                tree.unwrap_element(quote);
            }
        }
        return Ok(Placed::Offsets(start, end));
    }
    // Wrap the top-level ancestors of the affected blocks.
    let mut tops: Vec<NodeId> = Vec::new();
    for block in blocks {
        let top = tree
            .ancestors(block)
            .into_iter()
            .rev()
            .nth(1)
            .unwrap_or(block);
        let top = if tree.parent(block) == Some(NodeId::ROOT) {
            block
        } else {
            top
        };
        if !tops.contains(&top) {
            tops.push(top);
        }
    }
    tree.wrap_nodes(&tops, Tag::Blockquote, Attrs::default());
    Ok(Placed::Offsets(start, end))
}

fn insert_list(
    editor: &mut Editor,
    ordered: bool,
    sel: Selection,
    start: usize,
    end: usize,
) -> Result<Placed, CommandError> {
    let list_tag = if ordered {
        Tag::OrderedList
    } else {
        Tag::BulletList
    };
    let blocks = textblocks_in_range(&editor.tree, sel, start, end);
    let Some(&block) = blocks.first() else {
        return Err(CommandError::NoTextblock);
    };
    let tree = &mut editor.tree;
    let list = tree.ancestor_or_self(block, |t, n| {
        t.tag(n).map(|tag| tag.is_list()).unwrap_or(false)
    });
    match list {
        None => {
            let item = tree.wrap_nodes(&[block], Tag::ListItem, Attrs::default());
            tree.wrap_nodes(&[item], list_tag, Attrs::default());
        }
        Some(list) if tree.tag(list) == Some(list_tag) => {
            // Same kind: lift the block out of the list entirely.
            let top = tree.isolate_branch(block, list);
            let item = tree.parent(block).unwrap_or(top);
            if item != top {
                tree.unwrap_element(item);
            }
            tree.unwrap_element(top);
        }
        Some(list) => {
            tree.set_tag(list, list_tag);
        }
    }
    Ok(Placed::Offsets(start, end))
}

// === Links and images ===

fn set_link(
    editor: &mut Editor,
    href: Option<&str>,
    sel: Selection,
    start: usize,
    end: usize,
) -> Result<Placed, CommandError> {
    let tree = &mut editor.tree;
    if start == end {
        let link = tree.mark_ancestor(sel.head.node, Tag::Link);
        return match (href, link) {
            (Some(href), Some(link)) => {
                if let Some(attrs) = tree.attrs_mut(link) {
                    attrs.href = Some(href.into());
                }
                Ok(Placed::Offsets(start, end))
            }
            (None, Some(link)) => {
                tree.unwrap_element(link);
                Ok(Placed::Offsets(start, end))
            }
            (_, None) => Err(CommandError::NothingToLink),
        };
    }
    for (node, lo, hi) in tree.text_slices(start, end) {
        let isolated = tree.isolate_text_range(node, lo, hi);
        if let Some(existing) = tree.mark_ancestor(isolated, Tag::Link) {
            let top = tree.isolate_branch(isolated, existing);
            tree.unwrap_element(top);
        }
        if let Some(href) = href {
            tree.wrap_nodes(&[isolated], Tag::Link, Attrs::link(href));
        }
    }
    // Caret lands after the (un)linked range.
    Ok(Placed::Offsets(end, end))
}

fn insert_image(
    editor: &mut Editor,
    src: &str,
    start: usize,
    end: usize,
) -> Result<Placed, CommandError> {
    if start < end {
        editor.delete_offsets(start, end);
    }
    let tree = &mut editor.tree;
    let caret = tree.offset_to_caret(start);
    let image = tree.create_element(Tag::Image, Attrs::image(src));
    if tree.is_text(caret.node) {
        let tail = tree.split_text(caret.node, caret.offset);
        if caret.offset == 0 {
            tree.insert_before(tail, image);
        } else {
            tree.insert_after(caret.node, image);
        }
    } else {
        tree.insert_child(caret.node, caret.offset, image);
    }
    Ok(Placed::Offsets(start + 1, start + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with(markup: &str) -> Editor {
        Editor::from_markup(markup)
    }

    #[test]
    fn test_bold_range_round_trip() {
        let mut editor = editor_with("<p>hello world</p>");
        editor.select_offsets(0, 5);

        assert!(execute(&mut editor, &Command::ToggleBold));
        assert_eq!(editor.value(), "<p><strong>hello</strong> world</p>");

        editor.select_offsets(0, 5);
        assert!(execute(&mut editor, &Command::ToggleBold));
        assert_eq!(editor.value(), "<p>hello world</p>");
    }

    #[test]
    fn test_underline_nests_inside_existing_mark() {
        let mut editor = editor_with("<p>Hello <b>world</b></p>");
        editor.select_offsets(6, 11);

        assert!(execute(&mut editor, &Command::ToggleUnderline));
        assert_eq!(
            editor.value(),
            "<p>Hello <strong><u>world</u></strong></p>"
        );
    }

    #[test]
    fn test_partial_bold_extends_to_whole_range() {
        let mut editor = editor_with("<p>ab<strong>cd</strong>ef</p>");
        editor.select_offsets(0, 6);

        assert!(execute(&mut editor, &Command::ToggleBold));
        assert_eq!(editor.value(), "<p><strong>abcdef</strong></p>");
    }

    #[test]
    fn test_unbold_middle_of_run() {
        let mut editor = editor_with("<p><strong>abcdef</strong></p>");
        editor.select_offsets(2, 4);

        assert!(execute(&mut editor, &Command::ToggleBold));
        assert_eq!(
            editor.value(),
            "<p><strong>ab</strong>cd<strong>ef</strong></p>"
        );
    }

    #[test]
    fn test_collapsed_toggle_then_type() {
        let mut editor = editor_with("<p>ab</p>");
        editor.select_offsets(1, 1);

        assert!(execute(&mut editor, &Command::ToggleBold));
        assert!(editor.insert_text("X"));
        assert_eq!(editor.plain_text(), "aXb");
        assert!(editor.value().contains("<strong>"));
        assert!(editor.value().contains('X'));
    }

    #[test]
    fn test_collapsed_double_toggle_is_identity() {
        let mut editor = editor_with("<p>ab</p>");
        editor.select_offsets(1, 1);

        assert!(execute(&mut editor, &Command::ToggleBold));
        assert!(execute(&mut editor, &Command::ToggleBold));
        assert_eq!(editor.value(), "<p>ab</p>");
    }

    #[test]
    fn test_collapsed_toggle_inside_mark_splits_formatting() {
        let mut editor = editor_with("<p><strong>bold</strong></p>");
        editor.select_offsets(2, 2);

        assert!(execute(&mut editor, &Command::ToggleBold));
        assert!(editor.insert_text("Y"));
        assert_eq!(editor.plain_text(), "boYld");
        // Y sits between the two bold halves, unformatted.
        let value = editor.value();
        let y = value.find('Y').unwrap();
        let close = value.find("</strong>").unwrap();
        assert!(close < y, "Y must be outside the first bold run: {value}");
    }

    #[test]
    fn test_collapsed_split_then_retoggle_remerges() {
        let mut editor = editor_with("<p><strong>bold</strong></p>");
        editor.select_offsets(2, 2);

        assert!(execute(&mut editor, &Command::ToggleBold));
        assert!(execute(&mut editor, &Command::ToggleBold));
        assert_eq!(editor.value(), "<p><strong>bold</strong></p>");
    }

    #[test]
    fn test_font_size_preserves_plain_text() {
        let mut editor = editor_with("<p>hello world</p>");
        editor.select_offsets(0, 11);

        assert!(execute(&mut editor, &Command::SetFontSize(24)));
        assert_eq!(editor.plain_text(), "hello world");
        assert_eq!(
            editor.value(),
            "<p><span style=\"font-size: 24px\">hello world</span></p>"
        );
    }

    #[test]
    fn test_color_applies_to_range() {
        let mut editor = editor_with("<p>red</p>");
        editor.select_offsets(0, 3);

        assert!(execute(
            &mut editor,
            &Command::SetColor {
                role: ColorRole::Text,
                hex: "#ff0000".into(),
            }
        ));
        assert_eq!(
            editor.value(),
            "<p><span style=\"color: #ff0000\">red</span></p>"
        );
    }

    #[test]
    fn test_font_size_reapply_does_not_nest() {
        let mut editor = editor_with("<p>hello world</p>");
        editor.select_offsets(0, 11);

        assert!(execute(&mut editor, &Command::SetFontSize(18)));
        editor.select_offsets(0, 11);
        assert!(execute(&mut editor, &Command::SetFontSize(18)));
        assert_eq!(
            editor.value(),
            "<p><span style=\"font-size: 18px\">hello world</span></p>"
        );
    }

    #[test]
    fn test_span_styles_stack_over_range() {
        let mut editor = editor_with("<p>hello</p>");
        editor.select_offsets(0, 5);

        assert!(execute(&mut editor, &Command::SetFontSize(18)));
        editor.select_offsets(0, 5);
        assert!(execute(
            &mut editor,
            &Command::SetColor {
                role: ColorRole::Text,
                hex: "#ff0000".into(),
            }
        ));
        assert_eq!(
            editor.value(),
            "<p><span style=\"font-size: 18px; color: #ff0000\">hello</span></p>"
        );
    }

    #[test]
    fn test_span_styles_stack_at_collapsed_caret() {
        let mut editor = editor_with("<p>ab</p>");
        editor.select_offsets(1, 1);

        assert!(execute(&mut editor, &Command::SetFontSize(18)));
        assert!(execute(
            &mut editor,
            &Command::SetColor {
                role: ColorRole::Text,
                hex: "#ff0000".into(),
            }
        ));
        assert!(editor.insert_text("X"));
        assert_eq!(editor.plain_text(), "aXb");
        assert_eq!(
            editor.value(),
            "<p>a<span style=\"font-size: 18px; color: #ff0000\">\u{200B}X</span>b</p>"
        );
    }

    #[test]
    fn test_invalid_hex_color_rejected() {
        let mut editor = editor_with("<p>red</p>");
        editor.select_offsets(0, 3);

        assert!(!execute(
            &mut editor,
            &Command::SetColor {
                role: ColorRole::Text,
                hex: "red".into(),
            }
        ));
        assert_eq!(editor.value(), "<p>red</p>");
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_font_size_across_paragraphs_preserves_plain_text() {
        let mut editor = editor_with("<p>one two</p><p>three</p>");
        editor.select_offsets(0, 12);

        assert!(execute(&mut editor, &Command::SetFontSize(16)));
        assert_eq!(editor.plain_text(), "one two\nthree");
        assert_eq!(
            editor.value(),
            "<p><span style=\"font-size: 16px\">one two</span></p>\
             <p><span style=\"font-size: 16px\">three</span></p>"
        );
    }

    #[test]
    fn test_heading_and_back() {
        let mut editor = editor_with("<p>title</p>");
        editor.select_offsets(2, 2);

        assert!(execute(&mut editor, &Command::SetHeading(2)));
        assert_eq!(editor.value(), "<h2>title</h2>");

        assert!(execute(&mut editor, &Command::SetParagraph));
        assert_eq!(editor.value(), "<p>title</p>");
    }

    #[test]
    fn test_heading_level_out_of_range_rejected() {
        let mut editor = editor_with("<p>x</p>");
        editor.select_offsets(0, 0);

        assert!(!execute(&mut editor, &Command::SetHeading(7)));
        assert_eq!(editor.value(), "<p>x</p>");
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_alignment() {
        let mut editor = editor_with("<p>mid</p>");
        editor.select_offsets(1, 1);

        assert!(execute(
            &mut editor,
            &Command::SetAlignment(crate::types::Alignment::Center)
        ));
        assert_eq!(editor.value(), "<p style=\"text-align: center\">mid</p>");

        assert!(execute(
            &mut editor,
            &Command::SetAlignment(crate::types::Alignment::Left)
        ));
        assert_eq!(editor.value(), "<p>mid</p>");
    }

    #[test]
    fn test_blockquote_round_trip() {
        let mut editor = editor_with("<p>quoted</p>");
        editor.select_offsets(3, 3);

        assert!(execute(&mut editor, &Command::ToggleBlockquote));
        assert_eq!(editor.value(), "<blockquote><p>quoted</p></blockquote>");

        editor.select_offsets(3, 3);
        assert!(execute(&mut editor, &Command::ToggleBlockquote));
        assert_eq!(editor.value(), "<p>quoted</p>");
    }

    #[test]
    fn test_list_round_trip() {
        let mut editor = editor_with("<p>item</p>");
        editor.select_offsets(2, 2);

        assert!(execute(&mut editor, &Command::InsertList { ordered: false }));
        assert_eq!(editor.value(), "<ul><li><p>item</p></li></ul>");

        editor.select_offsets(2, 2);
        assert!(execute(&mut editor, &Command::InsertList { ordered: false }));
        assert_eq!(editor.value(), "<p>item</p>");
    }

    #[test]
    fn test_list_kind_switch() {
        let mut editor = editor_with("<ul><li><p>item</p></li></ul>");
        editor.select_offsets(2, 2);

        assert!(execute(&mut editor, &Command::InsertList { ordered: true }));
        assert_eq!(editor.value(), "<ol><li><p>item</p></li></ol>");
    }

    #[test]
    fn test_link_apply_and_remove() {
        let mut editor = editor_with("<p>visit here now</p>");
        editor.select_offsets(6, 10);

        assert!(execute(
            &mut editor,
            &Command::SetLink(Some("https://example.com".into()))
        ));
        assert_eq!(
            editor.value(),
            "<p>visit <a href=\"https://example.com\">here</a> now</p>"
        );

        editor.select_offsets(6, 10);
        assert!(execute(&mut editor, &Command::SetLink(None)));
        assert_eq!(editor.value(), "<p>visit here now</p>");
    }

    #[test]
    fn test_link_collapsed_outside_link_is_rejected() {
        let mut editor = editor_with("<p>plain</p>");
        editor.select_offsets(2, 2);

        assert!(!execute(
            &mut editor,
            &Command::SetLink(Some("https://x".into()))
        ));
        assert_eq!(editor.value(), "<p>plain</p>");
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_link_collapsed_inside_link_updates_href() {
        let mut editor = editor_with("<p><a href=\"https://old\">go</a></p>");
        editor.select_offsets(1, 1);

        assert!(execute(
            &mut editor,
            &Command::SetLink(Some("https://new".into()))
        ));
        assert_eq!(editor.value(), "<p><a href=\"https://new\">go</a></p>");
    }

    #[test]
    fn test_insert_image_replaces_selection() {
        let mut editor = editor_with("<p>before after</p>");
        editor.select_offsets(7, 12);

        assert!(execute(
            &mut editor,
            &Command::InsertImage("/up/pic.png".into())
        ));
        assert_eq!(editor.value(), "<p>before <img src=\"/up/pic.png\"></p>");
        assert_eq!(editor.selection_offsets(), Some((8, 8)));
    }

    #[test]
    fn test_command_undo_redo() {
        let mut editor = editor_with("<p>hello</p>");
        editor.select_offsets(0, 5);
        execute(&mut editor, &Command::ToggleBold);
        assert_eq!(editor.value(), "<p><strong>hello</strong></p>");

        assert!(execute(&mut editor, &Command::Undo));
        assert_eq!(editor.value(), "<p>hello</p>");
        assert_eq!(editor.selection_offsets(), Some((0, 5)));

        assert!(execute(&mut editor, &Command::Redo));
        assert_eq!(editor.value(), "<p><strong>hello</strong></p>");
    }

    #[test]
    fn test_failed_command_rolls_back() {
        let mut editor = editor_with("<p>x</p>");
        editor.select_offsets(1, 1);

        assert!(!execute(&mut editor, &Command::InsertImage("  ".into())));
        assert_eq!(editor.value(), "<p>x</p>");
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_toggle_in_empty_document_then_type() {
        let mut editor = Editor::new();
        editor.select_offsets(0, 0);

        assert!(execute(&mut editor, &Command::ToggleBold));
        assert!(editor.insert_text("Hi"));
        assert_eq!(editor.plain_text(), "Hi");
        assert_eq!(editor.value(), "<p><strong>\u{200B}Hi</strong></p>");
    }

    #[test]
    fn test_selection_survives_formatting() {
        let mut editor = editor_with("<p>hello world</p>");
        editor.select_offsets(0, 5);

        execute(&mut editor, &Command::ToggleBold);
        // Range still covers "hello" so a follow-up command hits the same
        // text.
        assert_eq!(editor.selection_offsets(), Some((0, 5)));
        execute(&mut editor, &Command::ToggleItalic);
        assert_eq!(
            editor.value(),
            "<p><strong><em>hello</em></strong> world</p>"
        );
    }
}
