//! Document and block layout.

use common::{EngineConfig, Rect};
use dom::{Dom, NodeData, NodeId};
use style::{ComputedStyle, StyleMap};

use crate::font::FontMetrics;
use crate::inline::InlineLayout;
use crate::tree::{LayoutBox, LayoutBoxId, LayoutBoxKind, LayoutTree};

/// Tags laid out as blocks when they appear among a node's children.
pub const BLOCK_ELEMENTS: &[&str] = &[
    "html", "body", "article", "section", "nav", "aside", "h1", "h2", "h3", "h4", "h5", "h6",
    "hgroup", "header", "footer", "address", "p", "hr", "pre", "blockquote", "ol", "ul", "menu",
    "li", "dl", "dt", "dd", "figure", "figcaption", "main", "div", "table", "form", "fieldset",
    "legend", "details", "summary",
];

/// Elements that never produce boxes.
pub const NON_RENDERED: &[&str] = &["head", "script", "style"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Block,
    Inline,
}

/// Everything layout reads but never mutates.
pub struct LayoutContext<'a> {
    pub dom: &'a Dom,
    pub styles: &'a StyleMap,
    pub config: &'a EngineConfig,
    pub metrics: &'a dyn FontMetrics,
}

impl<'a> LayoutContext<'a> {
    pub fn style(&self, node: NodeId) -> ComputedStyle {
        self.styles.get(&node).cloned().unwrap_or_else(|| ComputedStyle::inherit_from(None))
    }

    pub fn is_rendered(&self, node: NodeId) -> bool {
        self.dom.tag(node).is_none_or(|t| !NON_RENDERED.contains(&t))
    }
}

/// Block if any element child is block-level; text and childless inputs are
/// inline; other childless elements are blocks.
pub fn layout_mode(dom: &Dom, node: NodeId) -> LayoutMode {
    let Some(n) = dom.node(node) else { return LayoutMode::Inline };
    match &n.data {
        NodeData::Text(_) => LayoutMode::Inline,
        NodeData::Element(_) if !n.children.is_empty() => {
            let has_block = n
                .children
                .iter()
                .any(|&c| dom.tag(c).is_some_and(|t| BLOCK_ELEMENTS.contains(&t)));
            if has_block { LayoutMode::Block } else { LayoutMode::Inline }
        }
        NodeData::Element(e) if e.tag == "input" => LayoutMode::Inline,
        NodeData::Element(_) => LayoutMode::Block,
    }
}

/// Lay out the whole document. The root box sits at the page margin and its
/// height includes both vertical margins.
pub fn layout_document(ctx: &LayoutContext<'_>) -> LayoutTree {
    let cfg = ctx.config;
    let mut tree = LayoutTree::new();
    let rect = Rect::new(cfg.hstep, cfg.vstep, cfg.content_width(), 0.0);
    let doc = tree.alloc(LayoutBox::new(LayoutBoxKind::Document, None, rect));
    tree.root = Some(doc);

    let mut content_height = 0.0;
    if let Some(root) = ctx.dom.root {
        let child = layout_block(ctx, &mut tree, root, rect.x, rect.y, rect.w);
        tree.append_child(doc, child);
        content_height = tree.get(child).map_or(0.0, |b| b.rect.h);
    }
    if let Some(b) = tree.get_mut(doc) {
        b.rect.h = content_height + 2.0 * cfg.vstep;
    }
    tracing::debug!(boxes = tree.boxes.len(), height = content_height, "layout complete");
    tree
}

/// A block box whose children are still being placed.
struct OpenBlock {
    id: LayoutBoxId,
    node: NodeId,
    rect: Rect,
    fixed_height: Option<f32>,
    next_child: usize,
    cursor_y: f32,
}

/// Lay out `node` as a block box at `(x, y)` inside a container of
/// `parent_width`. Nesting depth is bounded by the heap, not the call stack.
pub fn layout_block(
    ctx: &LayoutContext<'_>,
    tree: &mut LayoutTree,
    node: NodeId,
    x: f32,
    y: f32,
    parent_width: f32,
) -> LayoutBoxId {
    let mut open: Vec<OpenBlock> = Vec::new();
    let mut pending = Some((node, x, y, parent_width));
    loop {
        if let Some((node, x, y, parent_width)) = pending.take() {
            if let Some(done) = enter_block(ctx, tree, &mut open, node, x, y, parent_width) {
                match open.last_mut() {
                    Some(parent) => finish_child(tree, parent, done),
                    None => return done,
                }
            }
            continue;
        }
        let Some(top) = open.last_mut() else { break };
        let children = ctx.dom.children(top.node);
        let next = children[top.next_child..].iter().position(|&c| ctx.is_rendered(c));
        match next {
            Some(offset) => {
                let child = children[top.next_child + offset];
                top.next_child += offset + 1;
                pending = Some((child, top.rect.x, top.cursor_y, top.rect.w));
            }
            None => {
                let Some(block) = open.pop() else { break };
                let done = close_block(tree, block);
                match open.last_mut() {
                    Some(parent) => finish_child(tree, parent, done),
                    None => return done,
                }
            }
        }
    }
    tracing::warn!("block layout ended without a root box");
    tree.alloc(LayoutBox::new(LayoutBoxKind::Block, Some(node), Rect::new(x, y, parent_width, 0.0)))
}

/// Allocate the box for `node`. Inline-mode boxes are finished at once and
/// returned; block-mode boxes are pushed onto `open` for their children.
fn enter_block(
    ctx: &LayoutContext<'_>,
    tree: &mut LayoutTree,
    open: &mut Vec<OpenBlock>,
    node: NodeId,
    x: f32,
    y: f32,
    parent_width: f32,
) -> Option<LayoutBoxId> {
    let style = ctx.style(node);
    let width = style.length("width").unwrap_or(parent_width);
    let mut rect = Rect::new(x, y, width, 0.0);
    let mut layout_box = LayoutBox::new(LayoutBoxKind::Block, Some(node), rect);
    let bg = style.background_color();
    if bg != "transparent" {
        layout_box.background = Some(bg.to_string());
    }
    let id = tree.alloc(layout_box);
    let fixed_height = style.length("height");

    match layout_mode(ctx.dom, node) {
        LayoutMode::Block => {
            open.push(OpenBlock { id, node, rect, fixed_height, next_child: 0, cursor_y: y });
            None
        }
        LayoutMode::Inline => {
            if ctx.dom.tag(node) == Some("li") {
                rect.x += ctx.config.list_indent();
                rect.w -= ctx.config.list_indent();
            }
            let content_height = InlineLayout::new(ctx, tree, id, rect).run(node);
            rect.h = fixed_height.unwrap_or(content_height);
            if let Some(b) = tree.get_mut(id) {
                b.rect = rect;
            }
            Some(id)
        }
    }
}

fn close_block(tree: &mut LayoutTree, block: OpenBlock) -> LayoutBoxId {
    let mut rect = block.rect;
    rect.h = block.fixed_height.unwrap_or(block.cursor_y - rect.y);
    if let Some(b) = tree.get_mut(block.id) {
        b.rect = rect;
    }
    block.id
}

fn finish_child(tree: &mut LayoutTree, parent: &mut OpenBlock, child: LayoutBoxId) {
    tree.append_child(parent.id, child);
    parent.cursor_y += tree.get(child).map_or(0.0, |b| b.rect.h);
}
