use core::fmt;

use dom::{Dom, NodeId};

/// Priority of a tag selector in the cascade.
pub const TAG_PRIORITY: u32 = 1;
/// Priority of a class selector in the cascade.
pub const CLASS_PRIORITY: u32 = 10;

/// A selector: a tag or `.class` atom, or a descendant chain built
/// left-associatively from whitespace-separated atoms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `p`
    Tag(String),
    /// `.note`
    Class(String),
    /// `ancestor descendant`
    Descendant(Box<Selector>, Box<Selector>),
}

impl Selector {
    /// Build a simple selector from one atom such as `div` or `.note`.
    pub fn atom(word: &str) -> Self {
        match word.strip_prefix('.') {
            Some(class) => Selector::Class(class.to_ascii_lowercase()),
            None => Selector::Tag(word.to_ascii_lowercase()),
        }
    }

    /// Cascade priority: tag 1, class 10, descendant the sum of its parts.
    pub fn priority(&self) -> u32 {
        match self {
            Selector::Tag(_) => TAG_PRIORITY,
            Selector::Class(_) => CLASS_PRIORITY,
            Selector::Descendant(a, d) => a.priority() + d.priority(),
        }
    }

    pub fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        match self {
            Selector::Tag(tag) => dom.tag(node) == Some(tag.as_str()),
            Selector::Class(class) => dom
                .element(node)
                .is_some_and(|e| e.classes().any(|c| c.eq_ignore_ascii_case(class))),
            Selector::Descendant(ancestor, descendant) => {
                if !descendant.matches(dom, node) {
                    return false;
                }
                let mut cur = dom.parent(node);
                while let Some(p) = cur {
                    if ancestor.matches(dom, p) {
                        return true;
                    }
                    cur = dom.parent(p);
                }
                false
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Tag(t) => f.write_str(t),
            Selector::Class(c) => write!(f, ".{c}"),
            Selector::Descendant(a, d) => write!(f, "{a} {d}"),
        }
    }
}
