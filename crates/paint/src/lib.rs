//! # Paint Crate
//!
//! Display list generation from the layout tree. Boxes are visited in
//! pre-order, so a box's background is always emitted before anything its
//! descendants draw.

use common::Rect;
use dom::{Dom, Node, NodeId};
use layout::{FontMetrics, FontSpec, LayoutBox, LayoutBoxKind, LayoutTree};

// ─────────────────────────────────────────────────────────────────────────────
// DisplayCommand
// ─────────────────────────────────────────────────────────────────────────────

/// A single paint command, in absolute page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCommand {
    /// Draw `text` with its top-left corner at `(left, top)`. `bottom` is
    /// `top` plus the font's line space.
    DrawText { top: f32, left: f32, bottom: f32, text: String, font: FontSpec, color: String },
    /// Fill `rect` with a solid color.
    DrawRect { rect: Rect, color: String },
}

impl DisplayCommand {
    pub fn top(&self) -> f32 {
        match self {
            DisplayCommand::DrawText { top, .. } => *top,
            DisplayCommand::DrawRect { rect, .. } => rect.y,
        }
    }

    pub fn bottom(&self) -> f32 {
        match self {
            DisplayCommand::DrawText { bottom, .. } => *bottom,
            DisplayCommand::DrawRect { rect, .. } => rect.bottom(),
        }
    }

    /// True if any part of the command lies within `[top, bottom]`.
    pub fn intersects(&self, top: f32, bottom: f32) -> bool {
        self.top() <= bottom && self.bottom() >= top
    }
}

/// An ordered list of paint commands.
pub type DisplayList = Vec<DisplayCommand>;

// ─────────────────────────────────────────────────────────────────────────────
// Build display list
// ─────────────────────────────────────────────────────────────────────────────

pub fn build_display_list(tree: &LayoutTree, dom: &Dom, metrics: &dyn FontMetrics) -> DisplayList {
    let mut list = DisplayList::new();
    let mut stack: Vec<_> = tree.root.into_iter().collect();
    while let Some(id) = stack.pop() {
        let Some(layout_box) = tree.get(id) else { continue };
        paint_box(layout_box, dom, metrics, &mut list);
        if !matches!(layout_box.kind, LayoutBoxKind::Input { .. }) {
            stack.extend(layout_box.children.iter().rev());
        }
    }
    list
}

fn paint_box(b: &LayoutBox, dom: &Dom, metrics: &dyn FontMetrics, list: &mut DisplayList) {
    if let Some(color) = &b.background {
        list.push(DisplayCommand::DrawRect { rect: b.rect, color: color.clone() });
    }
    match &b.kind {
        LayoutBoxKind::Document | LayoutBoxKind::Block | LayoutBoxKind::Line => {}
        LayoutBoxKind::Text { word, font, color } => {
            list.push(draw_text(b.rect.x, b.rect.y, word.clone(), font, color, metrics));
        }
        LayoutBoxKind::Input { font, color } => {
            let text = b.node.map(|n| atom_label(dom, n)).unwrap_or_default();
            if !text.is_empty() {
                list.push(draw_text(b.rect.x, b.rect.y, text, font, color, metrics));
            }
        }
    }
}

fn draw_text(
    left: f32,
    top: f32,
    text: String,
    font: &FontSpec,
    color: &str,
    metrics: &dyn FontMetrics,
) -> DisplayCommand {
    DisplayCommand::DrawText {
        top,
        left,
        bottom: top + metrics.linespace(font),
        text,
        font: font.clone(),
        color: color.to_string(),
    }
}

/// Text drawn inside an input or button atom.
///
/// Checkboxes show `x` when checked, passwords are masked, hidden inputs
/// show nothing, and a button shows its single text child.
pub fn atom_label(dom: &Dom, node: NodeId) -> String {
    let Some(el) = dom.element(node) else { return String::new() };
    match el.tag.as_str() {
        "input" => {
            let value = el.attr("value").unwrap_or("");
            match el.attr("type").unwrap_or("").to_ascii_lowercase().as_str() {
                "checkbox" if el.has_attr("checked") => "x".to_string(),
                "checkbox" | "hidden" => String::new(),
                "password" => "*".repeat(value.chars().count()),
                _ => value.to_string(),
            }
        }
        "button" => match dom.children(node) {
            [only] => dom.node(*only).and_then(Node::as_text).unwrap_or("").to_string(),
            [] => String::new(),
            _ => {
                tracing::warn!("ignoring HTML contents inside button");
                String::new()
            }
        },
        _ => String::new(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
