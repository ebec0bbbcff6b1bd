//! HTML token types produced by the tokenizer.

use dom::Attr;

/// A single token emitted by the HTML tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub enum HtmlToken {
    /// A run of character data with entities already decoded.
    Text(String),
    /// An opening tag like `<div class="x">` or `<br/>`.
    StartTag { name: String, attrs: Vec<Attr> },
    /// A closing tag like `</div>`.
    EndTag { name: String },
    /// `<!doctype ...>` and other `<!...>` constructs, plus empty `<>`.
    /// The tree builder ignores these.
    Declaration(String),
}
