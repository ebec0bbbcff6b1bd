//! Cascade: stable priority ordering of rules and the top-down style pass.

use std::collections::HashMap;

use css::{parse_declarations, CssRule, Declaration};
use dom::{Dom, NodeId};

use crate::computed::{compute_value, ComputedStyle};

// ─────────────────────────────────────────────────────────────────────────────
// Rule ordering
// ─────────────────────────────────────────────────────────────────────────────

/// Stable sort ascending by selector priority. Later rules of equal
/// priority keep their place after earlier ones and so win when applied.
pub fn cascade_order(rules: &[CssRule]) -> Vec<&CssRule> {
    let mut ordered: Vec<&CssRule> = rules.iter().collect();
    ordered.sort_by_key(|r| r.selector.priority());
    ordered
}

// ─────────────────────────────────────────────────────────────────────────────
// Style pass
// ─────────────────────────────────────────────────────────────────────────────

/// Resolved styles for every node of one document.
pub type StyleMap = HashMap<NodeId, ComputedStyle>;

fn apply(style: &mut ComputedStyle, declarations: &[Declaration], parent_font_px: f32) {
    for decl in declarations {
        if let Some(value) = compute_value(&decl.name, &decl.value, parent_font_px) {
            style.set(&decl.name, value);
        }
    }
}

/// Compute the style of a single node given its parent's resolved style.
pub fn style_node(
    dom: &Dom,
    node: NodeId,
    parent: Option<&ComputedStyle>,
    rules: &[&CssRule],
) -> ComputedStyle {
    let mut style = ComputedStyle::inherit_from(parent);
    let parent_font_px = parent.map_or(16.0, ComputedStyle::font_size_px);
    for rule in rules {
        if rule.selector.matches(dom, node) {
            apply(&mut style, &rule.declarations, parent_font_px);
        }
    }
    if let Some(inline) = dom.attr(node, "style") {
        apply(&mut style, &parse_declarations(inline), parent_font_px);
    }
    style
}

/// Recompute every node's style top-down from scratch. Rules must already
/// be in cascade order.
pub fn resolve_styles(dom: &Dom, rules: &[&CssRule]) -> StyleMap {
    let mut styles = StyleMap::new();
    let Some(root) = dom.root else { return styles };
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let parent = dom.parent(node).and_then(|p| styles.get(&p));
        let style = style_node(dom, node, parent, rules);
        styles.insert(node, style);
        stack.extend(dom.children(node).iter().rev());
    }
    tracing::debug!(nodes = styles.len(), rules = rules.len(), "styles resolved");
    styles
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn style_of(html_src: &str, css_src: &str, tag: &str) -> ComputedStyle {
        let dom = html::parse(html_src);
        let sheet = css::parse_stylesheet(css_src);
        let rules = cascade_order(&sheet.rules);
        let styles = resolve_styles(&dom, &rules);
        let root = dom.root.unwrap();
        let node = dom.elements_by_tag(root, tag)[0];
        styles[&node].clone()
    }

    #[test]
    fn class_beats_tag_regardless_of_order() {
        let s = style_of("<p class=cls>x</p>", ".cls { color: blue } p { color: red }", "p");
        assert_eq!(s.color(), "blue");
        let s = style_of("<p class=cls>x</p>", "p { color: red } .cls { color: blue }", "p");
        assert_eq!(s.color(), "blue");
    }

    #[test]
    fn later_rule_wins_ties() {
        let s = style_of("<p>x</p>", "p { color: red } p { color: green }", "p");
        assert_eq!(s.color(), "green");
    }

    #[test]
    fn inline_style_wins() {
        let s = style_of("<p class=a style=\"color: purple\">x</p>", ".a { color: blue }", "p");
        assert_eq!(s.color(), "purple");
    }

    #[test]
    fn percent_relative_to_parent() {
        let s = style_of(
            "<div><span>x</span></div>",
            "div { font-size: 20px } span { font-size: 50% }",
            "span",
        );
        assert_eq!(s.get("font-size"), Some("10px"));
    }

    #[test]
    fn inheritance_flows_down() {
        let s = style_of("<div><p><b>x</b></p></div>", "div { color: red; background-color: yellow }", "b");
        assert_eq!(s.color(), "red");
        assert_eq!(s.background_color(), "transparent");
    }

    #[test]
    fn descendant_rule_applies() {
        let s = style_of("<div class=n><p>x</p></div><p>y</p>", ".n p { font-weight: bold }", "p");
        assert_eq!(s.get("font-weight"), Some("bold"));
        let dom = html::parse("<div class=n><p>x</p></div><p>y</p>");
        let sheet = css::parse_stylesheet(".n p { font-weight: bold }");
        let rules = cascade_order(&sheet.rules);
        let styles = resolve_styles(&dom, &rules);
        let ps = dom.elements_by_tag(dom.root.unwrap(), "p");
        assert_eq!(styles[&ps[1]].get("font-weight"), Some("normal"));
    }

    #[test]
    fn text_nodes_get_styles() {
        let dom = html::parse("<p style=\"color: red\">x</p>");
        let styles = resolve_styles(&dom, &[]);
        let root = dom.root.unwrap();
        let text = dom.preorder(root).into_iter().find(|&n| dom.node(n).unwrap().is_text()).unwrap();
        assert_eq!(styles[&text].color(), "red");
        assert_eq!(styles.len(), dom.nodes.len());
    }

    #[test]
    fn invalid_font_size_ignored() {
        let s = style_of("<p>x</p>", "p { font-size: huge }", "p");
        assert_eq!(s.get("font-size"), Some("16px"));
    }
}
