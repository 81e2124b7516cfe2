//! Tag dispatch: the recursive descent over the tree.
//!
//! Every element resolves to one [`Tag`] and every tag to one rule. Tags
//! without a rule of their own, [`Tag::Unknown`] included, render their
//! children in order. Around each rule the element's declared colors are
//! pushed on the [`StyleStack`] and, once the rule is done, resolved and laid
//! over the text it produced.

use std::collections::HashSet;

use tessera_common::image::{ImageRequest, PendingImage};
use tessera_common::warning::warn_once;
use tessera_css::{ColorValue, ResolvedColors, StyleFrame, StyleStack, parse_inline_style, resolve_visible};
use tessera_dom::{DomTree, ElementData, MAX_TREE_DEPTH, NodeId, NodeType, Tag};

use crate::annotation::{AnnotationKind, Face};
use crate::buffer::{Rendered, TextBuffer};
use crate::cache::CellCache;
use crate::flow::InlineFlow;
use crate::metrics::text_width;
use crate::options::RenderOptions;
use crate::state::{FlowKind, FoldMode, ListState, RenderState};
use crate::surface::Surface;

/// Extra indentation of `blockquote` and `dd`.
const BLOCK_INDENT: usize = 4;

/// One descent over (part of) a tree into one buffer.
///
/// Table cells are rendered by child renderers that share the tree, the
/// options and the cell cache but own their buffer and state.
pub(crate) struct Renderer<'a> {
    pub(crate) tree: &'a DomTree,
    pub(crate) options: &'a RenderOptions,
    pub(crate) surface: &'a dyn Surface,
    pub(crate) cache: &'a mut CellCache,
    pub(crate) buf: TextBuffer,
    pub(crate) state: RenderState,
    pub(crate) styles: StyleStack,
    images: Vec<ImageRequest>,
    depth: usize,
    /// Ancestors of the node being rendered.
    path: Vec<NodeId>,
    /// Every node this renderer has entered.
    visited: HashSet<NodeId>,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(
        tree: &'a DomTree,
        options: &'a RenderOptions,
        surface: &'a dyn Surface,
        cache: &'a mut CellCache,
    ) -> Self {
        Self {
            tree,
            options,
            surface,
            cache,
            buf: TextBuffer::new(),
            state: RenderState::new(options.resolve_width(surface)),
            styles: StyleStack::new(),
            images: Vec::new(),
            depth: 0,
            path: Vec::new(),
            visited: HashSet::new(),
        }
    }

    /// A renderer for one table cell: fresh buffer, the given state, a copy
    /// of the current style stack. The cell's ancestors count as visited.
    pub(crate) fn child(&mut self, state: RenderState) -> Renderer<'_> {
        Renderer {
            tree: self.tree,
            options: self.options,
            surface: self.surface,
            cache: &mut *self.cache,
            buf: TextBuffer::new(),
            state,
            styles: self.styles.clone(),
            images: Vec::new(),
            depth: self.depth,
            path: self.path.clone(),
            visited: self.path.iter().copied().collect(),
        }
    }

    /// Close the top-level buffer. Non-empty output ends with one newline.
    pub(crate) fn finish(self) -> Rendered {
        let (mut text, annotations) = self.buf.finish();
        if !text.is_empty() {
            text.push('\n');
        }
        Rendered::new(text, annotations, self.images)
    }

    pub(crate) fn render_node(&mut self, id: NodeId) {
        if self.depth >= MAX_TREE_DEPTH {
            warn_once(
                "Render",
                &format!("tree deeper than {MAX_TREE_DEPTH} levels; deeper nodes are skipped"),
            );
            return;
        }
        let tree = self.tree;
        let Some(node) = tree.get(id) else {
            return;
        };
        // A node reached a second time is a cycle or a shared subtree.
        if !self.visited.insert(id) {
            warn_once("Render", "node reached more than once; repeated visit skipped");
            return;
        }
        self.depth += 1;
        self.path.push(id);
        match &node.node_type {
            NodeType::Document => self.render_children(id),
            NodeType::Text(text) => self.insert_text(text),
            NodeType::Comment(_) => {}
            NodeType::Element(el) => self.render_element(id, el),
        }
        let _ = self.path.pop();
        self.depth -= 1;
    }

    pub(crate) fn render_children(&mut self, id: NodeId) {
        let tree = self.tree;
        for &child in tree.children(id) {
            self.render_node(child);
        }
    }

    pub(crate) fn insert_text(&mut self, text: &str) {
        InlineFlow::new(&mut self.buf, &mut self.state, &*self.options.break_rules).insert(text);
    }

    fn render_element(&mut self, id: NodeId, el: &ElementData) {
        let frame = presentational_frame(el);
        if frame.is_empty() {
            self.apply_rule(id, el);
            return;
        }
        self.styles.push(frame);
        self.buf.open_marker();
        self.apply_rule(id, el);
        let start = self.buf.close_marker();
        let declared = self.styles.resolve();
        let _ = self.styles.pop();
        let colors = resolve_visible(
            declared,
            self.surface.default_foreground(),
            self.surface.default_background(),
            &*self.options.contrast,
        );
        self.colorize(start, colors);
    }

    fn apply_rule(&mut self, id: NodeId, el: &ElementData) {
        match el.tag {
            Tag::Head => self.render_head(id),
            Tag::Script | Tag::Style | Tag::Template => {}
            Tag::P | Tag::Dl => {
                self.buf.ensure_paragraph();
                self.render_children(id);
                self.buf.ensure_paragraph();
            }
            Tag::Div
            | Tag::Center
            | Tag::Section
            | Tag::Article
            | Tag::Header
            | Tag::Footer
            | Tag::Main
            | Tag::Nav
            | Tag::Aside
            | Tag::Figure
            | Tag::Dt => {
                self.buf.ensure_newline();
                self.render_children(id);
                self.buf.ensure_newline();
            }
            Tag::Br => {
                self.buf.newline();
                self.state.kind = FlowKind::Text;
            }
            Tag::Hr => self.render_ruler(),
            Tag::H1 | Tag::H2 | Tag::H3 | Tag::H4 | Tag::H5 | Tag::H6 | Tag::Title => {
                self.buf.ensure_paragraph();
                self.region(AnnotationKind::Face { face: Face::Bold }, |r| r.render_children(id));
                self.buf.ensure_paragraph();
            }
            Tag::A => match el.non_empty_attr("href") {
                Some(href) => {
                    let kind = AnnotationKind::Link {
                        href: href.trim().to_string(),
                    };
                    self.region(kind, |r| r.render_children(id));
                }
                None => self.render_children(id),
            },
            Tag::Img => self.render_image(el),
            Tag::Audio | Tag::Video => self.render_media(id, el),
            Tag::Ul | Tag::Ol => self.render_list(id, el),
            Tag::Li => self.render_list_item(id),
            Tag::Blockquote => {
                self.buf.ensure_paragraph();
                self.indented(BLOCK_INDENT, |r| r.render_children(id));
                self.buf.ensure_paragraph();
            }
            Tag::Dd => {
                self.buf.ensure_newline();
                self.indented(BLOCK_INDENT, |r| r.render_children(id));
                self.buf.ensure_newline();
            }
            Tag::Pre => {
                self.buf.ensure_paragraph();
                let saved = self.state.fold;
                self.state.fold = FoldMode::Verbatim;
                self.region(AnnotationKind::Face { face: Face::Monospace }, |r| r.render_children(id));
                self.state.fold = saved;
                self.buf.ensure_paragraph();
            }
            Tag::Table => self.render_table(id),
            Tag::Th => self.region(AnnotationKind::Face { face: Face::Bold }, |r| r.render_children(id)),
            tag => match face_of(tag) {
                Some(face) => self.region(AnnotationKind::Face { face }, |r| r.render_children(id)),
                None => self.render_children(id),
            },
        }
    }

    /// Only the document title is rendered from `head`.
    fn render_head(&mut self, id: NodeId) {
        let tree = self.tree;
        for &child in tree.children(id) {
            if tree.tag(child) == Some(Tag::Title) {
                self.render_node(child);
            }
        }
    }

    fn render_ruler(&mut self) {
        self.buf.ensure_newline();
        let indentation = self.state.indentation;
        self.buf.push_str(&" ".repeat(indentation));
        let start = self.buf.len();
        let rule = "-".repeat(self.state.width.saturating_sub(indentation).max(1));
        self.buf.push_str(&rule);
        self.buf.annotate(start, self.buf.len(), AnnotationKind::Break);
        self.buf.newline();
        self.state.kind = FlowKind::Text;
    }

    /// The `src` of an image that should go to the fetcher: present and not
    /// blocked.
    pub(crate) fn fetchable_source<'e>(&self, el: &'e ElementData) -> Option<&'e str> {
        el.non_empty_attr("src")
            .map(str::trim)
            .filter(|src| !self.options.is_blocked(src))
    }

    fn render_image(&mut self, el: &ElementData) {
        let alt = el.attr("alt").map_or("", str::trim);
        let Some(source) = self.fetchable_source(el) else {
            self.insert_text(alt);
            return;
        };
        if self.state.inhibit_images {
            return;
        }

        let placeholder = if alt.is_empty() { "*" } else { alt };
        self.buf.open_marker();
        self.insert_text(placeholder);
        let start = self.buf.close_marker();
        let Some((start, end)) = self.trimmed_span(start, self.buf.len()) else {
            return;
        };

        let dimension = |name: &str| el.attr(name).and_then(|v| v.trim().parse::<u32>().ok());
        let request = ImageRequest {
            token: PendingImage(u32::try_from(self.images.len()).unwrap_or(u32::MAX)),
            source: source.to_string(),
            alt: alt.to_string(),
            width_hint: dimension("width"),
            height_hint: dimension("height"),
            max_proportion: self.options.max_image_proportion,
        };
        self.images.push(request.clone());
        self.buf.annotate(start, end, AnnotationKind::Image { request });
        self.state.kind = FlowKind::Image;
    }

    fn render_media(&mut self, id: NodeId, el: &ElementData) {
        let Some(source) = el.non_empty_attr("src") else {
            self.render_children(id);
            return;
        };
        let label = if el.tag == Tag::Audio { "[audio]" } else { "[video]" };
        let kind = AnnotationKind::Link {
            href: source.trim().to_string(),
        };
        self.region(kind, |r| r.insert_text(label));
    }

    fn render_list(&mut self, id: NodeId, el: &ElementData) {
        let nested = self.state.list != ListState::None;
        let separate = |buf: &mut TextBuffer| {
            if nested {
                buf.ensure_newline();
            } else {
                buf.ensure_paragraph();
            }
        };
        separate(&mut self.buf);
        let saved = self.state.list;
        self.state.list = if el.tag == Tag::Ol {
            let start = el
                .attr("start")
                .and_then(|s| s.trim().parse::<u32>().ok())
                .unwrap_or(1);
            ListState::Numbered(start)
        } else {
            ListState::Bullet
        };
        self.render_children(id);
        self.state.list = saved;
        separate(&mut self.buf);
    }

    fn render_list_item(&mut self, id: NodeId) {
        self.buf.ensure_newline();
        let prefix = match self.state.list {
            ListState::Numbered(n) => format!("{n} "),
            ListState::Bullet | ListState::None => "* ".to_string(),
        };
        if self.buf.current_line().is_empty() {
            self.buf.push_str(&" ".repeat(self.state.indentation));
        }
        self.buf.push_prefix(&prefix);
        self.state.kind = FlowKind::Text;
        self.indented(text_width(&prefix), |r| r.render_children(id));
        self.buf.ensure_newline();
        if let ListState::Numbered(n) = self.state.list {
            self.state.list = ListState::Numbered(n.saturating_add(1));
        }
    }

    fn indented(&mut self, extra: usize, body: impl FnOnce(&mut Self)) {
        let saved = self.state.indentation;
        self.state.indentation += extra;
        body(self);
        self.state.indentation = saved;
    }

    /// Run `body` and annotate whatever it produced, minus surrounding
    /// whitespace.
    fn region(&mut self, kind: AnnotationKind, body: impl FnOnce(&mut Self)) {
        self.buf.open_marker();
        body(self);
        let start = self.buf.close_marker();
        if let Some((start, end)) = self.trimmed_span(start, self.buf.len()) {
            self.buf.annotate(start, end, kind);
        }
    }

    /// `[start, end)` without leading and trailing spaces and newlines.
    pub(crate) fn trimmed_span(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        let slice = self.buf.text().get(start..end)?;
        let is_blank = |c: char| c == ' ' || c == '\n';
        let lead = slice.len() - slice.trim_start_matches(is_blank).len();
        let trail = slice.len() - slice.trim_end_matches(is_blank).len();
        (lead + trail < slice.len()).then_some((start + lead, end - trail))
    }

    /// Lay `colors` over the text since `start`, leaving alone parts an
    /// inner element already colored.
    pub(crate) fn colorize(&mut self, start: usize, colors: ResolvedColors) {
        if colors.is_empty() {
            return;
        }
        let Some((start, end)) = self.trimmed_span(start, self.buf.len()) else {
            return;
        };
        let mut covered: Vec<(usize, usize)> = self
            .buf
            .annotations()
            .iter()
            .filter(|ann| ann.kind.is_colors() && ann.start < end && ann.end > start)
            .map(|ann| (ann.start.max(start), ann.end.min(end)))
            .collect();
        covered.sort_unstable();

        let mut gaps = Vec::new();
        let mut cursor = start;
        for (s, e) in covered {
            if s > cursor {
                gaps.push((cursor, s));
            }
            cursor = cursor.max(e);
        }
        if cursor < end {
            gaps.push((cursor, end));
        }

        for (s, e) in gaps {
            if let Some((s, e)) = self.trimmed_span(s, e) {
                self.buf.annotate(
                    s,
                    e,
                    AnnotationKind::Colors {
                        foreground: colors.foreground,
                        background: colors.background,
                    },
                );
            }
        }
    }
}

/// Colors an element declares through presentational attributes, with its
/// inline `style` layered over them.
pub(crate) fn presentational_frame(el: &ElementData) -> StyleFrame {
    let mut frame = StyleFrame::default();
    let (fg_attr, bg_attr) = match el.tag {
        Tag::Font => (Some("color"), None),
        Tag::Body => (Some("text"), Some("bgcolor")),
        Tag::Table | Tag::Tr | Tag::Td | Tag::Th => (None, Some("bgcolor")),
        _ => (None, None),
    };
    if let Some(color) = fg_attr.and_then(|name| attribute_color(el, name)) {
        frame = frame.with_foreground(color);
    }
    if let Some(color) = bg_attr.and_then(|name| attribute_color(el, name)) {
        frame = frame.with_background(color);
    }
    if let Some(style) = el.non_empty_attr("style") {
        frame.apply(&parse_inline_style(style));
    }
    frame
}

fn attribute_color(el: &ElementData, name: &str) -> Option<ColorValue> {
    let value = el.non_empty_attr(name)?;
    let color = ColorValue::parse(value);
    if color.is_none() {
        warn_once(
            "Style",
            &format!("ignoring unparseable {name}=\"{value}\" on <{}>", el.tag_name),
        );
    }
    color
}

const fn face_of(tag: Tag) -> Option<Face> {
    match tag {
        Tag::B | Tag::Strong => Some(Face::Bold),
        Tag::I | Tag::Em | Tag::Cite | Tag::Var => Some(Face::Italic),
        Tag::U | Tag::Ins => Some(Face::Underline),
        Tag::S | Tag::Strike | Tag::Del => Some(Face::Strikethrough),
        Tag::Code | Tag::Tt | Tag::Kbd | Tag::Samp => Some(Face::Monospace),
        _ => None,
    }
}
