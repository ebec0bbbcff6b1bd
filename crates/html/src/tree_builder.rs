//! Tree builder: consumes tokens and maintains the stack of open elements.
//!
//! Recovery rules:
//! - missing `html`, `head` and `body` are synthesized before a tag or text
//!   that needs them, and `head` is closed once body content appears;
//! - opening `p` inside an open `p` closes the old paragraph and reopens the
//!   formatting elements that were nested inside it;
//! - a close tag always pops the innermost open element, except the root.

use dom::{Attr, Dom, NodeId};

use crate::token::HtmlToken;
use crate::tokenizer::Tokenizer;

/// Void elements: appended but never pushed onto the open stack.
pub const SELF_CLOSING_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Tags that belong in `head` when they appear before any body content.
pub const HEAD_TAGS: &[&str] = &[
    "base", "basefont", "bgsound", "noscript", "link", "meta", "title", "style", "script",
];

/// What the next token would do, for implicit-tag decisions.
#[derive(Clone, Copy)]
enum Next<'t> {
    Open(&'t str),
    Close(&'t str),
    Text,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Shape {
    Empty,
    Html,
    HtmlHead,
    Other,
}

pub struct TreeBuilder<'d> {
    dom: &'d mut Dom,
    open: Vec<NodeId>,
    root: Option<NodeId>,
}

impl<'d> TreeBuilder<'d> {
    pub fn new(dom: &'d mut Dom) -> Self {
        Self { dom, open: Vec::new(), root: None }
    }

    /// The open-stack shapes that implicit-tag insertion cares about.
    fn shape(&self) -> Shape {
        let tag = |i: usize| self.dom.tag(self.open[i]).unwrap_or("");
        match self.open.len() {
            0 => Shape::Empty,
            1 if tag(0) == "html" => Shape::Html,
            2 if tag(0) == "html" && tag(1) == "head" => Shape::HtmlHead,
            _ => Shape::Other,
        }
    }

    fn implicit_tags(&mut self, next: Next<'_>) {
        loop {
            match (self.shape(), next) {
                (Shape::Empty, Next::Open("html")) => break,
                (Shape::Empty, _) => self.open_element("html", Vec::new()),
                (Shape::Html, Next::Open("head" | "body") | Next::Close("html")) => break,
                (Shape::Html, Next::Open(tag)) if HEAD_TAGS.contains(&tag) => {
                    self.open_element("head", Vec::new())
                }
                (Shape::Html, _) => self.open_element("body", Vec::new()),
                (Shape::HtmlHead, Next::Close("head")) => break,
                (Shape::HtmlHead, Next::Open(tag)) if HEAD_TAGS.contains(&tag) => break,
                (Shape::HtmlHead, _) => self.close_element(),
                (Shape::Other, _) => break,
            }
        }
    }

    /// Create an element under the current node and push it.
    fn open_element(&mut self, tag: &str, attrs: Vec<Attr>) {
        let id = self.insert(tag, attrs);
        self.open.push(id);
    }

    fn insert(&mut self, tag: &str, attrs: Vec<Attr>) -> NodeId {
        let id = self.dom.create_element(tag, attrs);
        match self.open.last() {
            Some(&parent) => {
                self.dom.append_child(parent, id);
            }
            None => self.root = Some(id),
        }
        id
    }

    /// Pop the innermost open element unless it is the root.
    fn close_element(&mut self) {
        if self.open.len() > 1 {
            self.open.pop();
        }
    }

    fn has_open_p(&self) -> bool {
        self.open.iter().any(|&id| self.dom.tag(id) == Some("p"))
    }

    pub fn process(&mut self, token: HtmlToken) {
        match token {
            HtmlToken::Text(text) => self.add_text(&text),
            HtmlToken::StartTag { name, attrs } => self.start_tag(&name, attrs),
            HtmlToken::EndTag { name } => self.end_tag(&name),
            HtmlToken::Declaration(_) => {}
        }
    }

    fn add_text(&mut self, text: &str) {
        if text.bytes().all(|b| b.is_ascii_whitespace()) {
            return;
        }
        self.implicit_tags(Next::Text);
        if let Some(&parent) = self.open.last() {
            let node = self.dom.create_text(text);
            self.dom.append_child(parent, node);
        }
    }

    fn start_tag(&mut self, name: &str, attrs: Vec<Attr>) {
        self.implicit_tags(Next::Open(name));
        if SELF_CLOSING_TAGS.contains(&name) {
            self.insert(name, attrs);
        } else if name == "p" && self.has_open_p() {
            self.split_paragraph(attrs);
        } else {
            self.open_element(name, attrs);
        }
    }

    fn end_tag(&mut self, name: &str) {
        self.implicit_tags(Next::Close(name));
        self.close_element();
    }

    /// Close everything inside the open `p`, close it, open a fresh `p`, then
    /// reopen the closed elements innermost-last.
    fn split_paragraph(&mut self, attrs: Vec<Attr>) {
        let mut closed = Vec::new();
        while let Some(&top) = self.open.last() {
            let Some(el) = self.dom.element(top) else { break };
            if el.tag == "p" || self.open.len() == 1 {
                break;
            }
            closed.push((el.tag.clone(), el.attrs.clone()));
            self.close_element();
        }
        self.close_element();
        self.open_element("p", attrs);
        for (tag, attrs) in closed.into_iter().rev() {
            self.open_element(&tag, attrs);
        }
    }

    /// Force-close the remaining elements and return the root. An empty
    /// input still yields a bare `html` element; any other document ends up
    /// with both `head` and `body`.
    pub fn finish(mut self) -> NodeId {
        if self.open.is_empty() && self.root.is_none() {
            self.open_element("html", Vec::new());
        }
        self.open.clear();
        let root = match self.root {
            Some(root) => root,
            None => self.insert("html", Vec::new()),
        };
        if !self.dom.children(root).is_empty() {
            self.ensure_head_and_body(root);
        }
        root
    }

    fn ensure_head_and_body(&mut self, root: NodeId) {
        let has = |dom: &Dom, tag: &str| dom.children(root).iter().any(|&c| dom.tag(c) == Some(tag));
        if !has(self.dom, "head") {
            let head = self.dom.create_element("head", Vec::new());
            let first = self.dom.children(root).first().copied();
            self.dom.insert_before(root, head, first);
        }
        if !has(self.dom, "body") {
            let body = self.dom.create_element("body", Vec::new());
            self.dom.append_child(root, body);
        }
    }
}

/// Parse `source` into `dom` without touching `dom.root`; returns the new
/// `html` element. Used for fragments such as `innerHTML`.
pub fn parse_into(dom: &mut Dom, source: &str) -> NodeId {
    let mut builder = TreeBuilder::new(dom);
    for token in Tokenizer::new(source) {
        builder.process(token);
    }
    builder.finish()
}

/// Parse a full document.
pub fn parse(source: &str) -> Dom {
    let mut dom = Dom::new();
    let root = parse_into(&mut dom, source);
    dom.root = Some(root);
    dom
}
