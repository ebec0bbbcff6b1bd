//! Tree operations.
//!
//! [`Dom`] owns the node arena and keeps parent links and child lists
//! consistent across mutation.

use arena::Arena;

use crate::node::{Attr, ElementData, Node, NodeData, NodeId};

// ---------------------------------------------------------------------------
// Dom
// ---------------------------------------------------------------------------

/// One document: a node arena plus the id of its root element.
#[derive(Default)]
pub struct Dom {
    pub nodes: Arena<Node>,
    pub root: Option<NodeId>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    // =======================================================================
    // Creation and access
    // =======================================================================

    pub fn create_element(&mut self, tag: &str, attrs: Vec<Attr>) -> NodeId {
        self.nodes.allocate(Node::new(NodeData::Element(ElementData::new(tag, attrs))))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.nodes.allocate(Node::new(NodeData::Text(text.to_string())))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.nodes.get(id).and_then(Node::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.nodes.get_mut(id).and_then(Node::as_element_mut)
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attr(name))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Children in document order; empty for unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    // =======================================================================
    // Mutation
    // =======================================================================

    /// Whether `candidate` is `of` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut cur = Some(of);
        while let Some(n) = cur {
            if n == candidate {
                return true;
            }
            cur = self.parent(n);
        }
        false
    }

    /// `child` can move under `parent` without making the tree cyclic.
    fn can_adopt(&self, parent: NodeId, child: NodeId) -> bool {
        self.nodes.contains(parent) && self.nodes.contains(child) && !self.is_inclusive_ancestor(child, parent)
    }

    /// Append `child` as the last child of `parent`, moving it out of its
    /// current position first. Returns `false`, leaving the tree untouched,
    /// when `child` is `parent` or one of its ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.can_adopt(parent, child) {
            return false;
        }
        self.detach(child);
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        true
    }

    /// Insert `child` into `parent` immediately before `reference`. Falls back
    /// to appending when `reference` is absent or not a child of `parent`.
    /// Refuses the same cyclic moves as [`Dom::append_child`].
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> bool {
        if !self.can_adopt(parent, child) {
            return false;
        }
        self.detach(child);
        let pos = reference.and_then(|r| self.nodes[parent].children.iter().position(|&c| c == r));
        match pos {
            Some(i) => self.nodes[parent].children.insert(i, child),
            None => self.nodes[parent].children.push(child),
        }
        self.nodes[child].parent = Some(parent);
        true
    }

    /// Unlink `child` from its parent. The node stays allocated.
    pub fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.parent(child) else { return };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|&c| c != child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = None;
        }
    }

    /// Detach `id` and free it together with its whole subtree.
    pub fn remove_subtree(&mut self, id: NodeId) {
        self.detach(id);
        for n in self.preorder(id) {
            self.nodes.deallocate(n);
        }
        if self.root == Some(id) {
            self.root = None;
        }
    }

    // =======================================================================
    // Traversal
    // =======================================================================

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            out.push(p);
            cur = self.parent(p);
        }
        out
    }

    /// `start` and all its descendants in pre-order.
    pub fn preorder(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.nodes.contains(start) {
            return out;
        }
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        out
    }

    /// Nearest inclusive ancestor with the given tag.
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if self.tag(n) == Some(tag) {
                return Some(n);
            }
            cur = self.parent(n);
        }
        None
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let root = self.root?;
        self.preorder(root)
            .into_iter()
            .find(|&n| self.element(n).and_then(ElementData::id) == Some(id))
    }

    /// Elements with `tag` under `start`, in document order.
    pub fn elements_by_tag(&self, start: NodeId, tag: &str) -> Vec<NodeId> {
        self.preorder(start)
            .into_iter()
            .filter(|&n| self.tag(n) == Some(tag))
            .collect()
    }

    /// Concatenated text of every text node under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.preorder(id)
            .into_iter()
            .filter_map(|n| self.node(n).and_then(Node::as_text))
            .collect()
    }

    /// Indented outline of the subtree, one node per line.
    pub fn dump(&self, start: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![(start, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            out.push_str(&"  ".repeat(depth));
            match &node.data {
                NodeData::Element(e) => {
                    out.push('<');
                    out.push_str(&e.tag);
                    for a in &e.attrs {
                        out.push_str(&format!(" {}=\"{}\"", a.name, a.value));
                    }
                    out.push('>');
                }
                NodeData::Text(t) => out.push_str(&format!("{t:?}")),
            }
            out.push('\n');
            stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Dom, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let html = dom.create_element("html", Vec::new());
        let body = dom.create_element("body", Vec::new());
        let p = dom.create_element("p", vec![Attr::new("id", "first")]);
        dom.append_child(html, body);
        dom.append_child(body, p);
        dom.root = Some(html);
        (dom, html, body, p)
    }

    #[test]
    fn append_sets_parent() {
        let (dom, html, body, p) = sample();
        assert_eq!(dom.parent(body), Some(html));
        assert_eq!(dom.parent(p), Some(body));
        assert_eq!(dom.children(html), &[body]);
    }

    #[test]
    fn append_moves_existing_child() {
        let (mut dom, html, body, p) = sample();
        dom.append_child(html, p);
        assert!(dom.children(body).is_empty());
        assert_eq!(dom.children(html), &[body, p]);
        assert_eq!(dom.parent(p), Some(html));
    }

    #[test]
    fn insert_before_reference() {
        let (mut dom, _, body, p) = sample();
        let q = dom.create_text("q");
        dom.insert_before(body, q, Some(p));
        assert_eq!(dom.children(body), &[q, p]);
    }

    #[test]
    fn insert_before_foreign_reference_appends() {
        let (mut dom, html, body, p) = sample();
        let q = dom.create_text("q");
        dom.insert_before(html, q, Some(p));
        assert_eq!(dom.children(html), &[body, q]);
    }

    #[test]
    fn append_refuses_ancestor_under_descendant() {
        let (mut dom, html, body, p) = sample();
        assert!(!dom.append_child(p, html));
        assert!(!dom.append_child(p, p));
        assert_eq!(dom.parent(html), None);
        assert!(dom.children(p).is_empty());
        assert_eq!(dom.children(body), &[p]);
    }

    #[test]
    fn insert_before_refuses_ancestor_under_descendant() {
        let (mut dom, html, body, p) = sample();
        assert!(!dom.insert_before(p, body, None));
        assert_eq!(dom.ancestors(p), vec![body, html]);
        assert!(dom.children(p).is_empty());
    }

    #[test]
    fn inclusive_ancestor() {
        let (dom, html, body, p) = sample();
        assert!(dom.is_inclusive_ancestor(html, p));
        assert!(dom.is_inclusive_ancestor(p, p));
        assert!(!dom.is_inclusive_ancestor(p, body));
    }

    #[test]
    fn detach_keeps_node_alive() {
        let (mut dom, _, body, p) = sample();
        dom.detach(p);
        assert!(dom.children(body).is_empty());
        assert!(dom.node(p).is_some());
        assert_eq!(dom.parent(p), None);
    }

    #[test]
    fn remove_subtree_frees_descendants() {
        let (mut dom, html, body, p) = sample();
        dom.remove_subtree(body);
        assert!(dom.node(body).is_none());
        assert!(dom.node(p).is_none());
        assert!(dom.children(html).is_empty());
    }

    #[test]
    fn preorder_and_ancestors() {
        let (mut dom, html, body, p) = sample();
        let t = dom.create_text("x");
        dom.append_child(p, t);
        assert_eq!(dom.preorder(html), vec![html, body, p, t]);
        assert_eq!(dom.ancestors(t), vec![p, body, html]);
    }

    #[test]
    fn lookup_helpers() {
        let (mut dom, html, body, p) = sample();
        let t = dom.create_text("hello");
        dom.append_child(p, t);
        assert_eq!(dom.get_element_by_id("first"), Some(p));
        assert_eq!(dom.get_element_by_id("missing"), None);
        assert_eq!(dom.elements_by_tag(html, "p"), vec![p]);
        assert_eq!(dom.closest(t, "body"), Some(body));
        assert_eq!(dom.closest(p, "p"), Some(p));
        assert_eq!(dom.text_content(html), "hello");
    }

    #[test]
    fn dump_outline() {
        let (mut dom, html, _, p) = sample();
        let t = dom.create_text("hi");
        dom.append_child(p, t);
        assert_eq!(dom.dump(html), "<html>\n  <body>\n    <p id=\"first\">\n      \"hi\"\n");
    }
}
