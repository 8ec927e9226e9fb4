//! Lenient markup reader.
//!
//! External values (stored content, pasted clipboard payloads, translated
//! view read-backs) arrive as arbitrary markup. The reader never fails: it
//! maps the supported vocabulary onto the tree, unwraps unknown elements so
//! their content survives, drops non-content subtrees outright, and strips
//! the wrapper artifacts machine-translation views inject.

use crate::tree::{Attrs, DocTree, NodeId, Tag};
use crate::types::Alignment;

/// Parse markup into a normalized document tree.
pub fn parse(input: &str) -> DocTree {
    let mut tree = parse_raw(input);
    tree.normalize();
    tree
}

/// Parse markup into a fragment tree. Loose inline content stays at the
/// root so callers can splice it into an existing textblock.
pub fn parse_fragment(input: &str) -> DocTree {
    let mut tree = parse_raw(input);
    tree.normalize_fragment();
    tree
}

// === Tokenizer ===

#[derive(Debug)]
enum Token {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close(String),
    Text(String),
}

struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn next_token(&mut self) -> Option<Token> {
        let rest = self.rest();
        if rest.is_empty() {
            return None;
        }
        if let Some(stripped) = rest.strip_prefix('<') {
            if let Some(after) = stripped.strip_prefix("!--") {
                // Comment: skip to the closing marker, or the end on
                // truncated input.
                match after.find("-->") {
                    Some(i) => self.pos += 4 + i + 3,
                    None => self.pos = self.input.len(),
                }
                return self.next_token();
            }
            if stripped.starts_with('!') || stripped.starts_with('?') {
                // Doctype or processing instruction.
                match stripped.find('>') {
                    Some(i) => self.pos += 1 + i + 1,
                    None => self.pos = self.input.len(),
                }
                return self.next_token();
            }
            let is_close = stripped.starts_with('/');
            let body = if is_close { &stripped[1..] } else { stripped };
            if body.chars().next().map(|c| c.is_ascii_alphabetic()) == Some(true) {
                return self.read_tag(is_close);
            }
            // A bare '<' that opens nothing is literal text.
        }
        let end = rest[1..].find('<').map(|i| i + 1).unwrap_or(rest.len());
        let text = &rest[..end];
        self.pos += end;
        Some(Token::Text(decode_entities(text)))
    }

    fn read_tag(&mut self, is_close: bool) -> Option<Token> {
        let start = self.pos + if is_close { 2 } else { 1 };
        let mut i = start;
        let bytes = self.input.as_bytes();
        while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
            i += 1;
        }
        let name = self.input[start..i].to_ascii_lowercase();
        // Scan attributes up to '>', honoring quoted values.
        let mut attrs = Vec::new();
        let mut self_closing = false;
        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= bytes.len() {
                break;
            }
            if bytes[i] == b'>' {
                i += 1;
                break;
            }
            if bytes[i] == b'/' {
                self_closing = true;
                i += 1;
                continue;
            }
            let key_start = i;
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'>' | b'/') {
                i += 1;
            }
            let key = self.input[key_start..i].to_ascii_lowercase();
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let mut value = String::new();
            if i < bytes.len() && bytes[i] == b'=' {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                    let quote = bytes[i];
                    i += 1;
                    let v_start = i;
                    while i < bytes.len() && bytes[i] != quote {
                        i += 1;
                    }
                    value = decode_entities(&self.input[v_start..i]);
                    if i < bytes.len() {
                        i += 1;
                    }
                } else {
                    let v_start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    value = decode_entities(&self.input[v_start..i]);
                }
            }
            if !key.is_empty() {
                attrs.push((key, value));
            }
        }
        self.pos = i;
        if is_close {
            Some(Token::Close(name))
        } else {
            Some(Token::Open {
                name,
                attrs,
                self_closing,
            })
        }
    }

    /// Skip raw-text element content (script, style) up to and past the
    /// matching close tag.
    fn skip_rawtext(&mut self, name: &str) {
        let rest = self.rest();
        let lower = rest.to_ascii_lowercase();
        let close = format!("</{name}");
        match lower.find(&close) {
            Some(i) => {
                let after = &rest[i..];
                let end = after.find('>').map(|j| i + j + 1).unwrap_or(rest.len());
                self.pos += end;
            }
            None => self.pos = self.input.len(),
        }
    }
}

fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        if c != '&' {
            out.push(c);
            continue;
        }
        let rest = &input[i..];
        let Some(semi) = rest[..rest.len().min(12)].find(';') else {
            out.push('&');
            continue;
        };
        let entity = &rest[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" | "#39" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
                .and_then(|h| u32::from_str_radix(h, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(d) => {
                out.push(d);
                for _ in 0..semi {
                    chars.next();
                }
            }
            None => out.push('&'),
        }
    }
    out
}

// === Tree building ===

/// Elements whose entire subtree is non-content and must be dropped.
fn is_dropped(name: &str) -> bool {
    matches!(
        name,
        "script" | "style" | "head" | "title" | "meta" | "link" | "iframe" | "noscript" | "svg"
    )
}

/// Inline style declarations we understand, picked out of a `style` attr.
#[derive(Default)]
struct StyleProps {
    align: Option<Alignment>,
    font_size: Option<u8>,
    color: Option<String>,
    background: Option<String>,
}

fn parse_style(style: &str) -> StyleProps {
    let mut props = StyleProps::default();
    for decl in style.split(';') {
        let Some((key, value)) = decl.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        match key.as_str() {
            "text-align" => props.align = Alignment::from_css(value),
            "font-size" => {
                props.font_size = value
                    .strip_suffix("px")
                    .map(str::trim)
                    .and_then(|v| v.parse().ok());
            }
            "color" => props.color = Some(value.to_string()),
            "background-color" => props.background = Some(value.to_string()),
            _ => {}
        }
    }
    props
}

/// Map a token's tag and attributes to an element. `None` means the element
/// is transparent: its children are kept but the wrapper is discarded. This
/// is also where machine-translation wrappers (`font` elements,
/// `vertical-align: inherit` spans) disappear.
fn map_element(name: &str, attrs: &[(String, String)]) -> Option<(Tag, Attrs)> {
    let tag = Tag::from_name(name)?;
    let get = |key: &str| attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());
    let style = get("style").map(parse_style).unwrap_or_default();
    let mut out = Attrs::default();
    match tag {
        Tag::Link => {
            out.href = Some(get("href").unwrap_or("").into());
        }
        Tag::Image => {
            out.src = Some(get("src").unwrap_or("").into());
        }
        Tag::Span => {
            out.font_size = style.font_size;
            out.color = style.color.map(Into::into);
            out.background = style.background.map(Into::into);
            // A span carrying nothing we understand is a wrapper artifact.
            if out.is_empty() {
                return None;
            }
        }
        _ if tag.is_textblock() => {
            out.align = style.align;
        }
        _ => {}
    }
    Some((tag, out))
}

enum Frame {
    /// Mapped to a tree element; children attach under it.
    Mapped { name: String, node: NodeId },
    /// Unknown or artifact wrapper; children attach to the frame above.
    Transparent { name: String },
    /// Non-content subtree; everything inside is discarded.
    Dropped { name: String },
}

impl Frame {
    fn name(&self) -> &str {
        match self {
            Frame::Mapped { name, .. } => name,
            Frame::Transparent { name } => name,
            Frame::Dropped { name } => name,
        }
    }
}

fn parse_raw(input: &str) -> DocTree {
    let mut tree = DocTree::new();
    let mut tokenizer = Tokenizer::new(input);
    let mut stack: Vec<Frame> = Vec::new();

    let insertion = |tree: &DocTree, stack: &[Frame]| -> Option<NodeId> {
        for frame in stack.iter().rev() {
            match frame {
                Frame::Dropped { .. } => return None,
                Frame::Mapped { node, .. } if tree.contains(*node) => return Some(*node),
                _ => {}
            }
        }
        Some(NodeId::ROOT)
    };

    while let Some(token) = tokenizer.next_token() {
        match token {
            Token::Text(text) => {
                let Some(parent) = insertion(&tree, &stack) else {
                    continue;
                };
                // Formatting whitespace between blocks is not content.
                if text.chars().all(char::is_whitespace) {
                    let container = tree
                        .tag(parent)
                        .map(|t| t.is_container())
                        .unwrap_or(false);
                    if container && (text.contains('\n') || parent == NodeId::ROOT) {
                        continue;
                    }
                    if tree.tag(parent).map(|t| t.is_list()).unwrap_or(false) {
                        continue;
                    }
                }
                let node = tree.create_text(text);
                tree.append_child(parent, node);
            }
            Token::Open {
                name,
                attrs,
                self_closing,
            } => {
                if is_dropped(&name) {
                    if name == "script" || name == "style" {
                        tokenizer.skip_rawtext(&name);
                    } else if !self_closing && !matches!(name.as_str(), "meta" | "link") {
                        stack.push(Frame::Dropped { name });
                    }
                    continue;
                }
                let mapping = map_element(&name, &attrs);
                // Block openers implicitly close an open textblock and its
                // marks, matching how browsers recover `<p>one<p>two`.
                if mapping.as_ref().map(|(t, _)| t.is_block()).unwrap_or(false) {
                    while let Some(Frame::Mapped { node, .. }) = stack.last() {
                        let inline_or_textblock = tree
                            .tag(*node)
                            .map(|t| t.is_textblock() || t.is_inline_mark())
                            .unwrap_or(false);
                        if inline_or_textblock {
                            stack.pop();
                        } else {
                            break;
                        }
                    }
                }
                let Some(parent) = insertion(&tree, &stack) else {
                    if !self_closing {
                        stack.push(Frame::Transparent { name });
                    }
                    continue;
                };
                match mapping {
                    Some((tag, mapped)) => {
                        let node = tree.create_element(tag, mapped);
                        tree.append_child(parent, node);
                        if !tag.is_void() && !self_closing {
                            stack.push(Frame::Mapped { name, node });
                        }
                    }
                    None => {
                        if !self_closing {
                            stack.push(Frame::Transparent { name });
                        }
                    }
                }
            }
            Token::Close(name) => {
                // Pop to the nearest matching open frame; stray closers are
                // ignored.
                if let Some(pos) = stack.iter().rposition(|f| f.name() == name) {
                    stack.truncate(pos);
                }
            }
        }
    }
    tree
}
