//! Document tree.
//!
//! Arena-backed Element/Text tree using generational ids from the `arena`
//! crate instead of `Rc`/`RefCell` back-pointers.

#![forbid(unsafe_code)]

pub mod node;
pub mod tree;

pub use node::*;
pub use tree::Dom;
