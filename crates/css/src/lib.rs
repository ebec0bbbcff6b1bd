//! CSS parser: tag, class and descendant selectors plus declaration blocks.

pub mod parser;
pub mod selector;

pub use parser::{parse_declarations, parse_selector, parse_stylesheet, CssParser, CssRule, Declaration, Stylesheet};
pub use selector::Selector;
