//! Canonical markup writer.
//!
//! Output is deterministic: fixed attribute order, fixed style-declaration
//! order, lowercase names, double-quoted values. A value the editor emitted
//! parses back to an identical tree, which is what content synchronization
//! compares against.

use std::fmt::Write;

use crate::tree::{Attrs, DocTree, NodeId, NodeKind, Tag};

/// Serialize the whole document.
pub fn serialize(tree: &DocTree) -> String {
    serialize_node(tree, NodeId::ROOT)
}

/// Serialize the subtree rooted at `id`. The fragment root itself emits no
/// tags.
pub fn serialize_node(tree: &DocTree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, &mut out);
    out
}

fn write_node(tree: &DocTree, id: NodeId, out: &mut String) {
    match tree.kind(id) {
        Some(NodeKind::Text(text)) => escape_text(text, out),
        Some(NodeKind::Element { tag, attrs }) => {
            if *tag == Tag::Fragment {
                for child in tree.children(id) {
                    write_node(tree, *child, out);
                }
                return;
            }
            out.push('<');
            out.push_str(tag.name());
            write_attrs(attrs, out);
            out.push('>');
            if tag.is_void() {
                return;
            }
            for child in tree.children(id) {
                write_node(tree, *child, out);
            }
            let _ = write!(out, "</{}>", tag.name());
        }
        None => {}
    }
}

fn write_attrs(attrs: &Attrs, out: &mut String) {
    if let Some(href) = &attrs.href {
        out.push_str(" href=\"");
        escape_attr(href, out);
        out.push('"');
    }
    if let Some(src) = &attrs.src {
        out.push_str(" src=\"");
        escape_attr(src, out);
        out.push('"');
    }
    let mut style = String::new();
    if let Some(align) = attrs.align {
        let _ = write!(style, "text-align: {}", align.as_css());
    }
    if let Some(size) = attrs.font_size {
        if !style.is_empty() {
            style.push_str("; ");
        }
        let _ = write!(style, "font-size: {size}px");
    }
    if let Some(color) = &attrs.color {
        if !style.is_empty() {
            style.push_str("; ");
        }
        let _ = write!(style, "color: {color}");
    }
    if let Some(background) = &attrs.background {
        if !style.is_empty() {
            style.push_str("; ");
        }
        let _ = write!(style, "background-color: {background}");
    }
    if !style.is_empty() {
        out.push_str(" style=\"");
        escape_attr(&style, out);
        out.push('"');
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse;
    use crate::types::Alignment;

    #[test]
    fn test_serialize_escapes_text() {
        let mut tree = DocTree::new();
        let p = tree.create_element(Tag::Paragraph, Attrs::default());
        let t = tree.create_text("a < b & c");
        tree.append_child(p, t);
        tree.append_child(NodeId::ROOT, p);
        assert_eq!(serialize(&tree), "<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn test_serialize_escapes_attr() {
        let mut tree = DocTree::new();
        let p = tree.create_element(Tag::Paragraph, Attrs::default());
        let a = tree.create_element(Tag::Link, Attrs::link("https://x/?a=1&b=\"2\""));
        let t = tree.create_text("go");
        tree.append_child(a, t);
        tree.append_child(p, a);
        tree.append_child(NodeId::ROOT, p);
        assert_eq!(
            serialize(&tree),
            "<p><a href=\"https://x/?a=1&amp;b=&quot;2&quot;\">go</a></p>"
        );
    }

    #[test]
    fn test_style_order_is_fixed() {
        let mut tree = DocTree::new();
        let p = tree.create_element(
            Tag::Paragraph,
            Attrs {
                align: Some(Alignment::Right),
                ..Default::default()
            },
        );
        let span = tree.create_element(
            Tag::Span,
            Attrs {
                font_size: Some(18),
                color: Some("#112233".into()),
                background: Some("#ffff00".into()),
                ..Default::default()
            },
        );
        let t = tree.create_text("x");
        tree.append_child(span, t);
        tree.append_child(p, span);
        tree.append_child(NodeId::ROOT, p);
        assert_eq!(
            serialize(&tree),
            "<p style=\"text-align: right\">\
             <span style=\"font-size: 18px; color: #112233; background-color: #ffff00\">x</span></p>"
        );
    }

    #[test]
    fn test_canonical_round_trip() {
        let cases = [
            "<p>hello</p>",
            "<h2>title</h2>",
            "<p style=\"text-align: center\">mid</p>",
            "<ul><li><p>one</p></li><li><p>two</p></li></ul>",
            "<blockquote><p>quoted</p></blockquote>",
            "<p><strong>b</strong><em>i</em><u>u</u><s>s</s></p>",
            "<p><a href=\"https://example.com\">link</a></p>",
            "<p>before<img src=\"/pic.png\">after</p>",
            "<p>line<br>break</p>",
            "<p><span style=\"font-size: 12px\">small</span></p>",
        ];
        for case in cases {
            assert_eq!(serialize(&parse(case)), case, "round-trip of {case}");
        }
    }
}
