//! # Layout Engine
//!
//! Builds a positioned box tree from a styled document: block boxes stack
//! vertically, inline content is broken greedily into line boxes.

pub mod block;
pub mod font;
pub mod inline;
pub mod tree;

pub use block::{layout_document, layout_mode, LayoutContext, LayoutMode, BLOCK_ELEMENTS};
pub use font::{ApproxFontMetrics, FontMetrics, FontSlant, FontSpec, FontWeight};
pub use tree::{LayoutBox, LayoutBoxId, LayoutBoxKind, LayoutTree};

#[cfg(test)]
mod tests {
    use super::*;
    use common::{EngineConfig, Rect};
    use dom::Dom;

    fn build(html_src: &str, css_src: &str) -> (Dom, LayoutTree) {
        let dom = html::parse(html_src);
        let sheet = css::parse_stylesheet(css_src);
        let rules = style::cascade_order(&sheet.rules);
        let styles = style::resolve_styles(&dom, &rules);
        let config = EngineConfig::default();
        let ctx = LayoutContext { dom: &dom, styles: &styles, config: &config, metrics: &ApproxFontMetrics };
        let tree = layout_document(&ctx);
        (dom, tree)
    }

    fn words(tree: &LayoutTree) -> Vec<(String, Rect)> {
        tree.preorder()
            .into_iter()
            .filter_map(|id| tree.get(id))
            .filter_map(|b| match &b.kind {
                LayoutBoxKind::Text { word, .. } => Some((word.clone(), b.rect)),
                _ => None,
            })
            .collect()
    }

    fn lines(tree: &LayoutTree) -> Vec<Rect> {
        tree.preorder()
            .into_iter()
            .filter_map(|id| tree.get(id))
            .filter(|b| b.kind == LayoutBoxKind::Line)
            .map(|b| b.rect)
            .collect()
    }

    #[test]
    fn single_line_positions() {
        let (_, tree) = build("<p>hello world</p>", "");
        let w = words(&tree);
        assert_eq!(w.len(), 2);
        assert_eq!(w[0].0, "hello");
        assert_eq!(w[0].1, Rect::new(13.0, 21.25, 40.0, 16.0));
        assert_eq!(w[1].1.x, 61.0);
        assert_eq!(lines(&tree), vec![Rect::new(13.0, 18.0, 774.0, 20.0)]);
        assert_eq!(tree.page_height(), 56.0);
    }

    #[test]
    fn greedy_line_breaking() {
        let (_, tree) = build("<div style=\"width: 100px\">aaaa bbbb cccc</div>", "");
        let w = words(&tree);
        assert_eq!(w[0].1.x, 13.0);
        assert_eq!(w[1].1.x, 53.0);
        assert_eq!(w[2].1.x, 13.0);
        assert_eq!(w[2].1.y, w[0].1.y + 20.0);
        assert_eq!(lines(&tree).len(), 2);
    }

    #[test]
    fn overlong_word_stays_on_first_line() {
        let (_, tree) = build("<div style=\"width: 10px\">abcdef</div>", "");
        assert_eq!(lines(&tree).len(), 1);
        assert_eq!(words(&tree)[0].1.w, 48.0);
    }

    #[test]
    fn soft_hyphen_splits_word() {
        let (_, tree) = build("<div style=\"width: 100px\">aaaaaaa bb&shy;cccc</div>", "");
        let w: Vec<String> = words(&tree).into_iter().map(|(w, _)| w).collect();
        assert_eq!(w, vec!["aaaaaaa", "bb-", "cccc"]);
        assert_eq!(lines(&tree).len(), 2);
    }

    #[test]
    fn nbsp_joins_words() {
        let (_, tree) = build("<p>a&nbsp;b c</p>", "");
        let w: Vec<String> = words(&tree).into_iter().map(|(w, _)| w).collect();
        assert_eq!(w, vec!["a\u{a0}b", "c"]);
    }

    #[test]
    fn soft_hyphen_invisible_when_word_fits() {
        let (_, tree) = build("<p>bb&shy;cc</p>", "");
        assert_eq!(words(&tree)[0].0, "bbcc");
    }

    #[test]
    fn blocks_stack_vertically() {
        let (dom, tree) = build("<div>a</div><div style=\"height: 50px\">b</div><div>c</div>", "");
        let divs = dom.elements_by_tag(dom.root.unwrap(), "div");
        let rects: Vec<Rect> = divs.iter().map(|&d| tree.block_for_node(d).unwrap().rect).collect();
        assert_eq!(rects[0].y, 18.0);
        assert_eq!(rects[0].h, 20.0);
        assert_eq!(rects[1].y, 38.0);
        assert_eq!(rects[1].h, 50.0);
        assert_eq!(rects[2].y, 88.0);
        assert_eq!(tree.page_height(), 108.0 + 36.0);
    }

    #[test]
    fn deeply_nested_blocks() {
        let (dom, tree) = build(&format!("{}x", "<div>".repeat(20_000)), "");
        let divs = dom.elements_by_tag(dom.root.unwrap(), "div");
        assert_eq!(divs.len(), 20_000);
        let outer = tree.block_for_node(divs[0]).unwrap().rect;
        let inner = tree.block_for_node(divs[19_999]).unwrap().rect;
        assert_eq!((outer.y, outer.h), (18.0, 20.0));
        assert_eq!((inner.y, inner.h), (18.0, 20.0));
        assert_eq!(words(&tree).len(), 1);
        assert_eq!(tree.page_height(), 56.0);
    }

    #[test]
    fn nested_blocks_stack_after_siblings() {
        let (dom, tree) = build("<div><div>a</div><div><p>b</p><p>c</p></div></div><p>d</p>", "");
        let ps = dom.elements_by_tag(dom.root.unwrap(), "p");
        let ys: Vec<f32> = ps.iter().map(|&p| tree.block_for_node(p).unwrap().rect.y).collect();
        assert_eq!(ys, vec![38.0, 58.0, 78.0]);
        let outer = dom.elements_by_tag(dom.root.unwrap(), "div")[0];
        assert_eq!(tree.block_for_node(outer).unwrap().rect.h, 60.0);
    }

    #[test]
    fn list_items_indented() {
        let (dom, tree) = build("<ul><li>a</li></ul>", "");
        let li = dom.elements_by_tag(dom.root.unwrap(), "li")[0];
        let rect = tree.block_for_node(li).unwrap().rect;
        assert_eq!(rect.x, 39.0);
        assert_eq!(rect.w, 748.0);
        assert_eq!(words(&tree)[0].1.x, 39.0);
    }

    #[test]
    fn input_atoms() {
        let (dom, tree) = build("<input type=checkbox><input name=q><input type=hidden>", "");
        let inputs = dom.elements_by_tag(dom.root.unwrap(), "input");
        let r: Vec<Rect> = inputs.iter().map(|&i| tree.input_for_node(i).unwrap().rect).collect();
        assert_eq!((r[0].x, r[0].w, r[0].h), (13.0, 16.0, 16.0));
        assert_eq!((r[1].x, r[1].w, r[1].h), (37.0, 200.0, 16.0));
        assert_eq!((r[2].w, r[2].h), (0.0, 0.0));
    }

    #[test]
    fn non_rendered_elements_skipped() {
        let (_, tree) = build("<title>T</title><style>p{}</style><p>y<script>var x;</script></p>", "");
        let w: Vec<String> = words(&tree).into_iter().map(|(w, _)| w).collect();
        assert_eq!(w, vec!["y"]);
    }

    #[test]
    fn background_recorded() {
        let (dom, tree) = build("<div>x</div>", "div { background-color: blue }");
        let div = dom.elements_by_tag(dom.root.unwrap(), "div")[0];
        assert_eq!(tree.block_for_node(div).unwrap().background.as_deref(), Some("blue"));
    }

    #[test]
    fn bigger_font_taller_line() {
        let (_, tree) = build("<p>a <b style=\"font-size: 32px\">B</b></p>", "");
        // 32px -> 24pt -> ascent 26, descent 6
        assert_eq!(lines(&tree)[0].h, 1.25 * 32.0);
        let w = words(&tree);
        assert_eq!(w[0].1.y, 18.0 + 1.25 * 26.0 - 13.0);
        assert_eq!(w[1].1.y, 18.0 + 1.25 * 26.0 - 26.0);
    }

    #[test]
    fn layout_is_deterministic() {
        let src = "<div><p>one two three four five six seven eight nine ten</p><ul><li>x</li></ul></div>";
        let (_, a) = build(src, "p { width: 90px }");
        let (_, b) = build(src, "p { width: 90px }");
        let dump = |t: &LayoutTree| format!("{:?}", t.preorder().into_iter().map(|id| t.get(id).cloned()).collect::<Vec<_>>());
        assert_eq!(dump(&a), dump(&b));
    }

    #[test]
    fn layout_modes() {
        let dom = html::parse("<div></div><input><p>t</p>");
        let root = dom.root.unwrap();
        let div = dom.elements_by_tag(root, "div")[0];
        let input = dom.elements_by_tag(root, "input")[0];
        let p = dom.elements_by_tag(root, "p")[0];
        assert_eq!(layout_mode(&dom, div), LayoutMode::Block);
        assert_eq!(layout_mode(&dom, input), LayoutMode::Inline);
        assert_eq!(layout_mode(&dom, p), LayoutMode::Inline);
        assert_eq!(layout_mode(&dom, root), LayoutMode::Block);
    }
}
