//! HTML parser crate: a lenient scanner and an open-element-stack tree
//! builder producing a [`dom::Dom`].

#![forbid(unsafe_code)]

pub mod attributes;
pub mod entities;
pub mod token;
pub mod tokenizer;
pub mod tree_builder;

pub use token::HtmlToken;
pub use tokenizer::Tokenizer;
pub use tree_builder::{parse, parse_into, TreeBuilder, HEAD_TAGS, SELF_CLOSING_TAGS};
