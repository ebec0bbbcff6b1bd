//! Box tree: positioned document, block, line, text and input boxes.

use arena::{Arena, GenIndex};
use common::Rect;
use dom::NodeId;

use crate::font::FontSpec;

pub type LayoutBoxId = GenIndex;

// ─────────────────────────────────────────────────────────────────────────────
// LayoutBoxKind
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutBoxKind {
    /// Page root carrying the margins.
    Document,
    /// Block container, in block or inline mode.
    Block,
    /// One line of an inline formatting context.
    Line,
    /// A single word.
    Text { word: String, font: FontSpec, color: String },
    /// An `input` or `button` atom.
    Input { font: FontSpec, color: String },
}

// ─────────────────────────────────────────────────────────────────────────────
// LayoutBox
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LayoutBox {
    pub kind: LayoutBoxKind,
    /// Styled node this box represents. `None` only for the document box.
    pub node: Option<NodeId>,
    /// Absolute page coordinates. Scroll is applied at paint time.
    pub rect: Rect,
    /// Resolved non-transparent `background-color`.
    pub background: Option<String>,
    pub children: Vec<LayoutBoxId>,
}

impl LayoutBox {
    pub fn new(kind: LayoutBoxKind, node: Option<NodeId>, rect: Rect) -> Self {
        Self { kind, node, rect, background: None, children: Vec::new() }
    }

    pub fn is_block(&self) -> bool {
        matches!(self.kind, LayoutBoxKind::Block)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LayoutTree
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct LayoutTree {
    pub boxes: Arena<LayoutBox>,
    pub root: Option<LayoutBoxId>,
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, layout_box: LayoutBox) -> LayoutBoxId {
        self.boxes.allocate(layout_box)
    }

    pub fn get(&self, id: LayoutBoxId) -> Option<&LayoutBox> {
        self.boxes.get(id)
    }

    pub fn get_mut(&mut self, id: LayoutBoxId) -> Option<&mut LayoutBox> {
        self.boxes.get_mut(id)
    }

    pub fn append_child(&mut self, parent: LayoutBoxId, child: LayoutBoxId) {
        if let Some(parent_box) = self.boxes.get_mut(parent) {
            parent_box.children.push(child);
        }
    }

    pub fn children(&self, id: LayoutBoxId) -> &[LayoutBoxId] {
        self.boxes.get(id).map(|b| b.children.as_slice()).unwrap_or(&[])
    }

    /// Every box in pre-order, starting at the root.
    pub fn preorder(&self) -> Vec<LayoutBoxId> {
        let mut out = Vec::new();
        let mut stack: Vec<LayoutBoxId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Total page height: the document box height, margins included.
    pub fn page_height(&self) -> f32 {
        self.root.and_then(|r| self.get(r)).map_or(0.0, |b| b.rect.h)
    }

    /// First block box (pre-order) generated for `node`.
    pub fn block_for_node(&self, node: NodeId) -> Option<&LayoutBox> {
        self.preorder()
            .into_iter()
            .filter_map(|id| self.get(id))
            .find(|b| b.is_block() && b.node == Some(node))
    }

    /// The input box generated for `node`, if it is laid out.
    pub fn input_for_node(&self, node: NodeId) -> Option<&LayoutBox> {
        self.preorder()
            .into_iter()
            .filter_map(|id| self.get(id))
            .find(|b| matches!(b.kind, LayoutBoxKind::Input { .. }) && b.node == Some(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preorder_visits_parents_first() {
        let mut tree = LayoutTree::new();
        let root = tree.alloc(LayoutBox::new(LayoutBoxKind::Document, None, Rect::ZERO));
        let a = tree.alloc(LayoutBox::new(LayoutBoxKind::Block, None, Rect::ZERO));
        let b = tree.alloc(LayoutBox::new(LayoutBoxKind::Line, None, Rect::ZERO));
        let c = tree.alloc(LayoutBox::new(LayoutBoxKind::Block, None, Rect::ZERO));
        tree.append_child(root, a);
        tree.append_child(a, b);
        tree.append_child(root, c);
        tree.root = Some(root);
        assert_eq!(tree.preorder(), vec![root, a, b, c]);
    }

    #[test]
    fn page_height_of_empty_tree() {
        assert_eq!(LayoutTree::new().page_height(), 0.0);
    }
}
