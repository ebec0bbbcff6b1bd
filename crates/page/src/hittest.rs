//! Hit testing for the content area.
//!
//! Finds the DOM node under a point in page coordinates. Boxes are painted
//! in pre-order, so the last containing box in pre-order is the one on top.

use dom::NodeId;
use layout::LayoutTree;

/// The node whose box is topmost at `(x, y)`, if any.
pub fn hit_test(tree: &LayoutTree, x: f32, y: f32) -> Option<NodeId> {
    tree.preorder()
        .into_iter()
        .filter_map(|id| tree.get(id))
        .filter(|b| b.node.is_some() && b.rect.contains(x, y))
        .last()
        .and_then(|b| b.node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{EngineConfig, Rect};
    use layout::{ApproxFontMetrics, LayoutBox, LayoutBoxKind, LayoutContext, layout_document};

    #[test]
    fn test_overlapping_siblings_pick_later() {
        let mut dom = dom::Dom::new();
        let a = dom.create_element("div", vec![]);
        let b = dom.create_element("div", vec![]);
        let mut tree = LayoutTree::new();
        let root = tree.alloc(LayoutBox::new(LayoutBoxKind::Document, None, Rect::new(0.0, 0.0, 100.0, 100.0)));
        tree.root = Some(root);
        let first = tree.alloc(LayoutBox::new(LayoutBoxKind::Block, Some(a), Rect::new(0.0, 0.0, 50.0, 50.0)));
        let second = tree.alloc(LayoutBox::new(LayoutBoxKind::Block, Some(b), Rect::new(25.0, 25.0, 50.0, 50.0)));
        tree.append_child(root, first);
        tree.append_child(root, second);

        assert_eq!(hit_test(&tree, 30.0, 30.0), Some(b));
        assert_eq!(hit_test(&tree, 10.0, 10.0), Some(a));
        assert_eq!(hit_test(&tree, 90.0, 10.0), None);
    }

    #[test]
    fn test_hits_text_inside_link() {
        let dom = html::parse("<p><a href=/next>go</a></p>");
        let styles = style::resolve_styles(&dom, &[]);
        let config = EngineConfig::default();
        let ctx = LayoutContext { dom: &dom, styles: &styles, config: &config, metrics: &ApproxFontMetrics };
        let tree = layout_document(&ctx);

        let word = tree
            .preorder()
            .into_iter()
            .filter_map(|id| tree.get(id))
            .find(|b| matches!(b.kind, LayoutBoxKind::Text { .. }))
            .map(|b| b.rect)
            .unwrap();
        let hit = hit_test(&tree, word.x + 1.0, word.y + 1.0).unwrap();
        assert!(dom.node(hit).unwrap().is_text());
        let anchor = dom.parent(hit).unwrap();
        assert_eq!(dom.tag(anchor), Some("a"));
    }
}
