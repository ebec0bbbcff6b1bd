//! Form helpers: encoded bodies, submit targets and focus order.

use dom::{Dom, NodeId};
use net::form_urlencode;

/// `application/x-www-form-urlencoded` body for the named inputs under
/// `form`, in document order. Checkboxes contribute only when checked, with
/// their `value` or `on`.
pub fn form_body(dom: &Dom, form: NodeId) -> String {
    let mut fields: Vec<(&str, &str)> = Vec::new();
    for input in dom.elements_by_tag(form, "input") {
        let Some(el) = dom.element(input) else { continue };
        let Some(name) = el.attr("name") else { continue };
        let is_checkbox = el.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("checkbox"));
        let value = if is_checkbox {
            if !el.has_attr("checked") {
                continue;
            }
            el.attr("value").unwrap_or("on")
        } else {
            el.attr("value").unwrap_or("")
        };
        fields.push((name, value));
    }
    form_urlencode(fields)
}

/// Nearest inclusive ancestor `form` that carries an `action`.
pub fn submit_target(dom: &Dom, node: NodeId) -> Option<NodeId> {
    let mut current = Some(node);
    while let Some(n) = current {
        if dom.tag(n) == Some("form") && dom.attr(n, "action").is_some() {
            return Some(n);
        }
        current = dom.parent(n);
    }
    None
}

/// The input after `focused` within its form (or the whole document when it
/// has none), wrapping to the first.
pub fn next_input(dom: &Dom, focused: NodeId) -> Option<NodeId> {
    let scope = dom.closest(focused, "form").or(dom.root)?;
    let inputs = dom.elements_by_tag(scope, "input");
    let index = inputs.iter().position(|&n| n == focused)?;
    inputs.get((index + 1) % inputs.len()).copied()
}

/// Whether `node` is an `<input type=checkbox>`.
pub fn is_checkbox(dom: &Dom, node: NodeId) -> bool {
    dom.attr(node, "type").is_some_and(|t| t.eq_ignore_ascii_case("checkbox"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_of(dom: &Dom) -> NodeId {
        dom.elements_by_tag(dom.root.unwrap(), "form")[0]
    }

    #[test]
    fn test_form_body_encodes_named_inputs() {
        let dom = html::parse(
            "<form action=/s><input name=q value='a b&c'><input value=skip>\
             <input name=empty><input type=checkbox name=off>\
             <input type=checkbox name=on checked><input type=checkbox name=v value=yes checked></form>",
        );
        assert_eq!(form_body(&dom, form_of(&dom)), "q=a%20b%26c&empty=&on=on&v=yes");
    }

    #[test]
    fn test_submit_target_skips_forms_without_action() {
        let dom = html::parse("<form action=/outer><div><form><button>go</button></form></div></form>");
        let button = dom.elements_by_tag(dom.root.unwrap(), "button")[0];
        let outer = form_of(&dom);
        assert_eq!(submit_target(&dom, button), Some(outer));

        let dom = html::parse("<button>alone</button>");
        let button = dom.elements_by_tag(dom.root.unwrap(), "button")[0];
        assert_eq!(submit_target(&dom, button), None);
    }

    #[test]
    fn test_next_input_wraps_within_form() {
        let dom = html::parse("<input id=out><form><input id=a><input id=b></form>");
        let a = dom.get_element_by_id("a").unwrap();
        let b = dom.get_element_by_id("b").unwrap();
        assert_eq!(next_input(&dom, a), Some(b));
        assert_eq!(next_input(&dom, b), Some(a));

        let out = dom.get_element_by_id("out").unwrap();
        assert_eq!(next_input(&dom, out), Some(a));
    }

    #[test]
    fn test_is_checkbox() {
        let dom = html::parse("<input type=CHECKBOX id=c><input id=t>");
        assert!(is_checkbox(&dom, dom.get_element_by_id("c").unwrap()));
        assert!(!is_checkbox(&dom, dom.get_element_by_id("t").unwrap()));
    }
}
