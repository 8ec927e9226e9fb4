//! The buffer tree: an arena of nodes representing the rich-content value.
//!
//! The tree is the single source of truth for the editor. It is deliberately
//! not a live DOM: every mutation is an explicit, deterministic operation on
//! arena slots, which keeps command semantics testable without browser-API
//! quirks.
//!
//! Offsets come in two flavors:
//! - node-local: character offsets inside a text node, child indices inside
//!   an element (see [`Caret`](crate::types::Caret));
//! - global: a position in the document's flattened content, where each text
//!   character counts as one and each inline void (image, line break) counts
//!   as one object character. Global offsets are how selections survive
//!   structural mutation.

use smol_str::SmolStr;

use crate::types::{Alignment, Caret, is_zero_width};

/// Identifier for a node slot inside a [`DocTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The root fragment of every tree.
    pub const ROOT: NodeId = NodeId(0);
}

/// The supported element vocabulary. Anything outside this set is unwrapped
/// or dropped by the markup parser before it can reach the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    /// Container for root and paste fragments; never serialized.
    Fragment,
    Paragraph,
    /// Heading level 1-6.
    Heading(u8),
    BulletList,
    OrderedList,
    ListItem,
    Blockquote,
    Bold,
    Italic,
    Underline,
    Strike,
    Link,
    Span,
    Image,
    HardBreak,
}

impl Tag {
    /// Textblocks hold inline content directly.
    pub fn is_textblock(self) -> bool {
        matches!(self, Tag::Paragraph | Tag::Heading(_))
    }

    /// Containers hold block children (lists, quotes, the root).
    pub fn is_container(self) -> bool {
        matches!(
            self,
            Tag::Fragment | Tag::BulletList | Tag::OrderedList | Tag::ListItem | Tag::Blockquote
        )
    }

    pub fn is_block(self) -> bool {
        self.is_textblock()
            || matches!(
                self,
                Tag::BulletList | Tag::OrderedList | Tag::ListItem | Tag::Blockquote
            )
    }

    pub fn is_list(self) -> bool {
        matches!(self, Tag::BulletList | Tag::OrderedList)
    }

    /// Inline mark elements wrap text runs.
    pub fn is_inline_mark(self) -> bool {
        matches!(
            self,
            Tag::Bold | Tag::Italic | Tag::Underline | Tag::Strike | Tag::Link | Tag::Span
        )
    }

    /// Void elements carry no children and count as one object character.
    pub fn is_void(self) -> bool {
        matches!(self, Tag::Image | Tag::HardBreak)
    }

    pub fn is_inline(self) -> bool {
        self.is_inline_mark() || self.is_void()
    }

    /// Canonical serialized name.
    pub fn name(self) -> &'static str {
        match self {
            Tag::Fragment => "",
            Tag::Paragraph => "p",
            Tag::Heading(1) => "h1",
            Tag::Heading(2) => "h2",
            Tag::Heading(3) => "h3",
            Tag::Heading(4) => "h4",
            Tag::Heading(5) => "h5",
            Tag::Heading(_) => "h6",
            Tag::BulletList => "ul",
            Tag::OrderedList => "ol",
            Tag::ListItem => "li",
            Tag::Blockquote => "blockquote",
            Tag::Bold => "strong",
            Tag::Italic => "em",
            Tag::Underline => "u",
            Tag::Strike => "s",
            Tag::Link => "a",
            Tag::Span => "span",
            Tag::Image => "img",
            Tag::HardBreak => "br",
        }
    }

    /// Map an incoming tag name (including common aliases) to the canonical
    /// tag. Returns `None` for anything unsupported.
    pub fn from_name(name: &str) -> Option<Tag> {
        Some(match name {
            "p" => Tag::Paragraph,
            "h1" => Tag::Heading(1),
            "h2" => Tag::Heading(2),
            "h3" => Tag::Heading(3),
            "h4" => Tag::Heading(4),
            "h5" => Tag::Heading(5),
            "h6" => Tag::Heading(6),
            "ul" => Tag::BulletList,
            "ol" => Tag::OrderedList,
            "li" => Tag::ListItem,
            "blockquote" => Tag::Blockquote,
            "strong" | "b" => Tag::Bold,
            "em" | "i" => Tag::Italic,
            "u" | "ins" => Tag::Underline,
            "s" | "strike" | "del" => Tag::Strike,
            "a" => Tag::Link,
            "span" => Tag::Span,
            "img" => Tag::Image,
            "br" => Tag::HardBreak,
            _ => return None,
        })
    }
}

/// The supported attribute subset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attrs {
    /// Link target (`a`).
    pub href: Option<SmolStr>,
    /// Image source URL; inline base64 data URLs are allowed (`img`).
    pub src: Option<SmolStr>,
    /// Block alignment, serialized as `text-align` (`p`, headings).
    pub align: Option<Alignment>,
    /// Font size in pixels, serialized as `font-size` (`span`).
    pub font_size: Option<u8>,
    /// Foreground color hex, serialized as `color` (`span`).
    pub color: Option<SmolStr>,
    /// Highlight color hex, serialized as `background-color` (`span`).
    pub background: Option<SmolStr>,
}

impl Attrs {
    pub fn link(href: impl Into<SmolStr>) -> Self {
        Self {
            href: Some(href.into()),
            ..Default::default()
        }
    }

    pub fn image(src: impl Into<SmolStr>) -> Self {
        Self {
            src: Some(src.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Attrs::default()
    }

    /// Overlay every `Some` field of `other` onto `self`.
    pub fn merge(&mut self, other: &Attrs) {
        if other.href.is_some() {
            self.href = other.href.clone();
        }
        if other.src.is_some() {
            self.src = other.src.clone();
        }
        if other.align.is_some() {
            self.align = other.align;
        }
        if other.font_size.is_some() {
            self.font_size = other.font_size;
        }
        if other.color.is_some() {
            self.color = other.color.clone();
        }
        if other.background.is_some() {
            self.background = other.background.clone();
        }
    }
}

/// Node payload: an element with a tag and attributes, or a text run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element { tag: Tag, attrs: Attrs },
    Text(String),
}

#[derive(Clone, Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed buffer tree. Slot 0 is always the root fragment.
#[derive(Clone, Debug)]
pub struct DocTree {
    slots: Vec<Option<Node>>,
}

impl Default for DocTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocTree {
    /// Create an empty tree (root fragment only).
    pub fn new() -> Self {
        Self {
            slots: vec![Some(Node {
                kind: NodeKind::Element {
                    tag: Tag::Fragment,
                    attrs: Attrs::default(),
                },
                parent: None,
                children: Vec::new(),
            })],
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).and_then(|s| s.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0).and_then(|s| s.as_mut())
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.slots.push(Some(node));
        NodeId(self.slots.len() - 1)
    }

    // === Accessors ===

    /// Whether the node still exists in the tree arena.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|n| &n.kind)
    }

    /// Element tag, `None` for text nodes or dead slots.
    pub fn tag(&self, id: NodeId) -> Option<Tag> {
        match self.kind(id)? {
            NodeKind::Element { tag, .. } => Some(*tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn attrs(&self, id: NodeId) -> Option<&Attrs> {
        match self.kind(id)? {
            NodeKind::Element { attrs, .. } => Some(attrs),
            NodeKind::Text(_) => None,
        }
    }

    pub fn attrs_mut(&mut self, id: NodeId) -> Option<&mut Attrs> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element { attrs, .. } => Some(attrs),
            NodeKind::Text(_) => None,
        }
    }

    /// Text content, `None` for elements.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(s) => Some(s),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn text_mut(&mut self, id: NodeId) -> Option<&mut String> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Text(s) => Some(s),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Text(_)))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Position of `id` among its siblings.
    pub fn child_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Ancestors of `id`, nearest first, ending with the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            out.push(p);
            cur = self.parent(p);
        }
        out
    }

    /// Nearest ancestor (or self) matching the predicate.
    pub fn ancestor_or_self(
        &self,
        id: NodeId,
        mut pred: impl FnMut(&DocTree, NodeId) -> bool,
    ) -> Option<NodeId> {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if pred(self, n) {
                return Some(n);
            }
            cur = self.parent(n);
        }
        None
    }

    /// Nearest textblock (`p`/heading) containing `id`, self included.
    pub fn nearest_textblock(&self, id: NodeId) -> Option<NodeId> {
        self.ancestor_or_self(id, |t, n| {
            t.tag(n).map(|tag| tag.is_textblock()).unwrap_or(false)
        })
    }

    /// Nearest inline-mark ancestor of `id` with the given tag (self
    /// excluded for text nodes, included for elements).
    pub fn mark_ancestor(&self, id: NodeId, tag: Tag) -> Option<NodeId> {
        self.ancestor_or_self(id, |t, n| t.tag(n) == Some(tag))
    }

    /// Preorder traversal of the subtree under `id` (excluding `id` itself).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    /// All text nodes under `id` in document order.
    pub fn text_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|n| self.is_text(*n))
            .collect()
    }

    // === Construction ===

    pub fn create_element(&mut self, tag: Tag, attrs: Attrs) -> NodeId {
        self.alloc(Node {
            kind: NodeKind::Element { tag, attrs },
            parent: None,
            children: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node {
            kind: NodeKind::Text(text.into()),
            parent: None,
            children: Vec::new(),
        })
    }

    pub fn set_tag(&mut self, id: NodeId, tag: Tag) {
        if let Some(node) = self.node_mut(id)
            && let NodeKind::Element { tag: t, .. } = &mut node.kind
        {
            *t = tag;
        }
    }

    // === Structural mutation ===

    /// Detach `child` from its current parent (if any) and append it to
    /// `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child);
    }

    /// Detach `child` and insert it at `index` in `parent`'s children.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let index = index.min(self.children(parent).len());
        if let Some(node) = self.node_mut(parent) {
            node.children.insert(index, child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
    }

    /// Insert `node` as the sibling immediately after `sibling`.
    pub fn insert_after(&mut self, sibling: NodeId, node: NodeId) {
        if let (Some(parent), Some(idx)) = (self.parent(sibling), self.child_index(sibling)) {
            self.insert_child(parent, idx + 1, node);
        }
    }

    /// Insert `node` as the sibling immediately before `sibling`.
    pub fn insert_before(&mut self, sibling: NodeId, node: NodeId) {
        if let (Some(parent), Some(idx)) = (self.parent(sibling), self.child_index(sibling)) {
            self.insert_child(parent, idx, node);
        }
    }

    /// Unlink `id` from its parent without freeing it.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            if let Some(node) = self.node_mut(parent) {
                node.children.retain(|c| *c != id);
            }
            if let Some(node) = self.node_mut(id) {
                node.parent = None;
            }
        }
    }

    /// Detach `id` and free it together with its whole subtree. The freed
    /// ids become dead; [`DocTree::contains`] reports `false` for them,
    /// which is what selection repair keys on.
    pub fn remove(&mut self, id: NodeId) {
        if id == NodeId::ROOT {
            return;
        }
        self.detach(id);
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if let Some(node) = self.slots.get_mut(n.0).and_then(|s| s.take()) {
                stack.extend(node.children);
            }
        }
    }

    /// Hoist the children of `id` into its parent at its position, then free
    /// the (now childless) element.
    pub fn unwrap_element(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let Some(mut index) = self.child_index(id) else {
            return;
        };
        let children: Vec<NodeId> = self.children(id).to_vec();
        for child in children {
            self.insert_child(parent, index, child);
            index += 1;
        }
        self.remove(id);
    }

    /// Wrap a run of contiguous siblings (given in document order) in a new
    /// element at their position. Returns the wrapper id.
    pub fn wrap_nodes(&mut self, ids: &[NodeId], tag: Tag, attrs: Attrs) -> NodeId {
        let wrapper = self.create_element(tag, attrs);
        let Some(first) = ids.first() else {
            return wrapper;
        };
        let parent = self.parent(*first).unwrap_or(NodeId::ROOT);
        let index = self.child_index(*first).unwrap_or(0);
        for id in ids {
            self.detach(*id);
        }
        self.insert_child(parent, index, wrapper);
        for id in ids {
            self.append_child(wrapper, *id);
        }
        wrapper
    }

    /// Split a text node at a character offset; the tail becomes the next
    /// sibling. Offsets at the boundaries are a no-op: the node that starts
    /// at `offset` is returned.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> NodeId {
        let Some(text) = self.text(id) else {
            return id;
        };
        let char_len = text.chars().count();
        if offset == 0 || offset >= char_len {
            return id;
        }
        let byte = text
            .char_indices()
            .nth(offset)
            .map(|(b, _)| b)
            .unwrap_or(text.len());
        let tail: String = text[byte..].to_string();
        if let Some(s) = self.text_mut(id) {
            s.truncate(byte);
        }
        let tail_id = self.create_text(tail);
        self.insert_after(id, tail_id);
        tail_id
    }

    /// Isolate `[start, end)` of a text node into its own node and return it.
    pub fn isolate_text_range(&mut self, id: NodeId, start: usize, end: usize) -> NodeId {
        let len = self.text(id).map(|t| t.chars().count()).unwrap_or(0);
        let end = end.min(len);
        let start = start.min(end);
        if end < len {
            self.split_text(id, end);
        }
        if start > 0 {
            return self.split_text(id, start);
        }
        id
    }

    /// Split every element between `node` and `top` (inclusive) around
    /// `node`, so that `top` ends up holding exactly the branch down to
    /// `node`. Siblings move into left/right clones, and the branch keeps
    /// its intermediate wrappers. Returns `top`; callers typically unwrap
    /// it (or part of its branch) afterwards.
    pub fn isolate_branch(&mut self, node: NodeId, top: NodeId) -> NodeId {
        let mut cur = node;
        while cur != top {
            let Some(p) = self.parent(cur) else {
                return cur;
            };
            let Some(NodeKind::Element { tag, attrs }) = self.kind(p).cloned() else {
                return cur;
            };
            let idx = self.child_index(cur).unwrap_or(0);
            let siblings = self.children(p).to_vec();
            let before = siblings[..idx].to_vec();
            let after = siblings[idx + 1..].to_vec();
            if !before.is_empty() {
                let left = self.create_element(tag, attrs.clone());
                self.insert_before(p, left);
                for b in before {
                    self.append_child(left, b);
                }
            }
            if !after.is_empty() {
                let right = self.create_element(tag, attrs);
                self.insert_after(p, right);
                for a in after {
                    self.append_child(right, a);
                }
            }
            cur = p;
        }
        cur
    }

    /// Deep-copy the subtree rooted at `src` in `other` into this tree.
    pub fn import_subtree(&mut self, other: &DocTree, src: NodeId) -> NodeId {
        let kind = other
            .kind(src)
            .cloned()
            .unwrap_or_else(|| NodeKind::Text(String::new()));
        let copy = match kind {
            NodeKind::Element { tag, attrs } => self.create_element(tag, attrs),
            NodeKind::Text(s) => self.create_text(s),
        };
        for child in other.children(src).to_vec() {
            let c = self.import_subtree(other, child);
            self.append_child(copy, c);
        }
        copy
    }

    // === Content measurement ===

    /// Length of a subtree in the global offset space: text characters plus
    /// one per inline void.
    pub fn node_len(&self, id: NodeId) -> usize {
        match self.kind(id) {
            Some(NodeKind::Text(s)) => s.chars().count(),
            Some(NodeKind::Element { tag, .. }) if tag.is_void() => 1,
            Some(NodeKind::Element { .. }) => self
                .children(id)
                .iter()
                .map(|c| self.node_len(*c))
                .sum(),
            None => 0,
        }
    }

    /// Total document length in the global offset space.
    pub fn len(&self) -> usize {
        self.node_len(NodeId::ROOT)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the document has no visible content: no non-zero-width
    /// text and no images.
    pub fn is_visibly_empty(&self) -> bool {
        for n in self.descendants(NodeId::ROOT) {
            match self.kind(n) {
                Some(NodeKind::Text(s)) if s.chars().any(|c| !is_zero_width(c)) => return false,
                Some(NodeKind::Element { tag: Tag::Image, .. }) => return false,
                _ => {}
            }
        }
        true
    }

    /// Visible text of a subtree. Zero-width carriers are skipped, blocks
    /// are separated by newlines, hard breaks become newlines, images
    /// contribute nothing.
    pub fn plain_text_of(&self, id: NodeId) -> String {
        fn walk(tree: &DocTree, id: NodeId, out: &mut String) {
            match tree.kind(id) {
                Some(NodeKind::Text(s)) => out.extend(s.chars().filter(|c| !is_zero_width(*c))),
                Some(NodeKind::Element { tag, .. }) => {
                    if *tag == Tag::HardBreak {
                        out.push('\n');
                        return;
                    }
                    for (i, child) in tree.children(id).iter().enumerate() {
                        let block = tree.tag(*child).map(|t| t.is_block()).unwrap_or(false);
                        if block && i > 0 {
                            out.push('\n');
                        }
                        walk(tree, *child, out);
                    }
                }
                None => {}
            }
        }
        let mut out = String::new();
        walk(self, id, &mut out);
        out
    }

    /// Visible text of the whole document.
    pub fn plain_text(&self) -> String {
        self.plain_text_of(NodeId::ROOT)
    }

    // === Global offset space ===

    /// Global offset at which the given node's content starts.
    pub fn offset_of_node(&self, id: NodeId) -> usize {
        let mut offset = 0;
        let mut cur = id;
        while let Some(parent) = self.parent(cur) {
            for sibling in self.children(parent) {
                if *sibling == cur {
                    break;
                }
                offset += self.node_len(*sibling);
            }
            cur = parent;
        }
        offset
    }

    /// Convert a caret to a global offset. Dead or foreign carets clamp to
    /// the document end.
    pub fn caret_to_offset(&self, caret: Caret) -> usize {
        if !self.contains(caret.node) {
            return self.len();
        }
        match self.kind(caret.node) {
            Some(NodeKind::Text(s)) => {
                self.offset_of_node(caret.node) + caret.offset.min(s.chars().count())
            }
            Some(NodeKind::Element { .. }) => {
                let children = self.children(caret.node);
                if caret.offset < children.len() {
                    self.offset_of_node(children[caret.offset])
                } else {
                    self.offset_of_node(caret.node) + self.node_len(caret.node)
                }
            }
            None => self.len(),
        }
    }

    /// Convert a global offset back to a caret, preferring positions inside
    /// text nodes.
    pub fn offset_to_caret(&self, offset: usize) -> Caret {
        let mut off = offset.min(self.len());
        let mut node = NodeId::ROOT;
        loop {
            let children = self.children(node).to_vec();
            if children.is_empty() {
                return match self.kind(node) {
                    Some(NodeKind::Text(_)) => Caret::new(node, off),
                    _ => Caret::new(node, 0),
                };
            }
            let mut target = None;
            for (i, child) in children.iter().enumerate() {
                let l = self.node_len(*child);
                if off < l || i == children.len() - 1 {
                    target = Some((i, *child));
                    break;
                }
                off -= l;
            }
            let Some((i, child)) = target else {
                return Caret::new(node, children.len());
            };
            match self.kind(child) {
                Some(NodeKind::Text(s)) => {
                    return Caret::new(child, off.min(s.chars().count()));
                }
                Some(NodeKind::Element { tag, .. }) if tag.is_void() => {
                    return Caret::new(node, i + off.min(1));
                }
                Some(NodeKind::Element { .. }) => {
                    off = off.min(self.node_len(child));
                    node = child;
                }
                None => return Caret::new(node, i),
            }
        }
    }

    /// Caret at the very end of the document content.
    pub fn end_caret(&self) -> Caret {
        self.offset_to_caret(self.len())
    }

    /// Text nodes intersecting the global range, with their local character
    /// sub-ranges. Empty sub-ranges are excluded.
    pub fn text_slices(&self, start: usize, end: usize) -> Vec<(NodeId, usize, usize)> {
        let mut out = Vec::new();
        let mut pos = 0;
        for n in self.descendants(NodeId::ROOT) {
            match self.kind(n) {
                Some(NodeKind::Text(s)) => {
                    let len = s.chars().count();
                    let lo = start.saturating_sub(pos).min(len);
                    let hi = end.saturating_sub(pos).min(len);
                    if lo < hi {
                        out.push((n, lo, hi));
                    }
                    pos += len;
                }
                Some(NodeKind::Element { tag, .. }) if tag.is_void() => pos += 1,
                _ => {}
            }
        }
        out
    }

    /// Inline void nodes (images, hard breaks) fully inside the global range.
    pub fn voids_in_range(&self, start: usize, end: usize) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pos = 0;
        for n in self.descendants(NodeId::ROOT) {
            match self.kind(n) {
                Some(NodeKind::Text(s)) => pos += s.chars().count(),
                Some(NodeKind::Element { tag, .. }) if tag.is_void() => {
                    if pos >= start && pos + 1 <= end {
                        out.push(n);
                    }
                    pos += 1;
                }
                _ => {}
            }
        }
        out
    }

    // === Normalization ===

    /// Canonicalize the tree:
    /// - drop empty text nodes and childless inline marks;
    /// - merge adjacent text nodes;
    /// - merge adjacent identical inline marks when both hold visible text
    ///   (zero-width carriers are kept distinct so collapsed-selection
    ///   formatting round-trips);
    /// - wrap loose inline content under containers in paragraphs;
    /// - wrap stray non-`li` children of lists in list items.
    pub fn normalize(&mut self) {
        self.normalize_under(NodeId::ROOT);
        let containers: Vec<NodeId> = std::iter::once(NodeId::ROOT)
            .chain(self.descendants(NodeId::ROOT))
            .filter(|n| self.tag(*n).map(|t| t.is_container()).unwrap_or(false))
            .collect();
        for c in containers {
            if !self.contains(c) {
                continue;
            }
            if self.tag(c).map(|t| t.is_list()).unwrap_or(false) {
                self.wrap_stray_list_children(c);
            } else {
                self.wrap_loose_inline(c);
            }
        }
    }

    /// Lighter pass for paste fragments: merge and drop as [`normalize`]
    /// does, fix stray list children, but leave loose inline content
    /// unwrapped so an inline fragment can be spliced into a textblock.
    ///
    /// [`normalize`]: DocTree::normalize
    pub fn normalize_fragment(&mut self) {
        self.normalize_under(NodeId::ROOT);
        let lists: Vec<NodeId> = self
            .descendants(NodeId::ROOT)
            .into_iter()
            .filter(|n| self.tag(*n).map(|t| t.is_list()).unwrap_or(false))
            .collect();
        for list in lists {
            if self.contains(list) {
                self.wrap_stray_list_children(list);
            }
        }
    }

    fn normalize_under(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.normalize_under(child);
        }
        // Drop empties.
        for child in self.children(id).to_vec() {
            match self.kind(child) {
                Some(NodeKind::Text(s)) if s.is_empty() => self.remove(child),
                Some(NodeKind::Element { tag, .. })
                    if tag.is_inline_mark() && self.children(child).is_empty() =>
                {
                    self.remove(child)
                }
                _ => {}
            }
        }
        // Merge adjacent siblings.
        loop {
            let children = self.children(id).to_vec();
            let mut merged = false;
            for pair in children.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                if self.merge_pair(a, b) {
                    merged = true;
                    break;
                }
            }
            if !merged {
                break;
            }
        }
    }

    fn merge_pair(&mut self, a: NodeId, b: NodeId) -> bool {
        match (self.kind(a).cloned(), self.kind(b).cloned()) {
            (Some(NodeKind::Text(_)), Some(NodeKind::Text(tb))) => {
                if let Some(s) = self.text_mut(a) {
                    s.push_str(&tb);
                }
                self.remove(b);
                true
            }
            (
                Some(NodeKind::Element { tag: ta, attrs: aa }),
                Some(NodeKind::Element { tag: tb, attrs: ab }),
            ) if ta == tb && aa == ab && ta.is_inline_mark() => {
                let a_visible = self.plain_text_of(a).chars().any(|c| !c.is_whitespace());
                let b_visible = self.plain_text_of(b).chars().any(|c| !c.is_whitespace());
                if !(a_visible && b_visible) {
                    return false;
                }
                for child in self.children(b).to_vec() {
                    self.append_child(a, child);
                }
                self.remove(b);
                self.normalize_under(a);
                true
            }
            _ => false,
        }
    }

    fn wrap_loose_inline(&mut self, container: NodeId) {
        let mut run: Vec<NodeId> = Vec::new();
        let children = self.children(container).to_vec();
        let mut runs: Vec<Vec<NodeId>> = Vec::new();
        for child in children {
            let inline = match self.kind(child) {
                Some(NodeKind::Text(_)) => true,
                Some(NodeKind::Element { tag, .. }) => tag.is_inline(),
                None => false,
            };
            if inline {
                run.push(child);
            } else if !run.is_empty() {
                runs.push(std::mem::take(&mut run));
            }
        }
        if !run.is_empty() {
            runs.push(run);
        }
        for run in runs {
            self.wrap_nodes(&run, Tag::Paragraph, Attrs::default());
        }
    }

    fn wrap_stray_list_children(&mut self, list: NodeId) {
        for child in self.children(list).to_vec() {
            if self.tag(child) != Some(Tag::ListItem) {
                self.wrap_nodes(&[child], Tag::ListItem, Attrs::default());
            }
        }
    }
}
