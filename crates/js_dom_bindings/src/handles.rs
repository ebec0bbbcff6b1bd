//! Node ↔ integer handle table.

use std::collections::HashMap;

use dom::NodeId;

/// Small integer naming a node on the script side.
pub type Handle = usize;

/// Handles are handed out lazily, in first-use order, and never reused for
/// the life of a document.
#[derive(Debug, Default)]
pub struct HandleTable {
    nodes: Vec<NodeId>,
    handles: HashMap<NodeId, Handle>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_assign(&mut self, node: NodeId) -> Handle {
        if let Some(&h) = self.handles.get(&node) {
            return h;
        }
        let h = self.nodes.len();
        self.nodes.push(node);
        self.handles.insert(node, h);
        h
    }

    /// The handle of `node`, if script has ever seen it.
    pub fn get(&self, node: NodeId) -> Option<Handle> {
        self.handles.get(&node).copied()
    }

    pub fn node(&self, handle: Handle) -> Option<NodeId> {
        self.nodes.get(handle).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.handles.clear();
    }
}
