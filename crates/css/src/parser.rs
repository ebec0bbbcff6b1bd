//! Recursive-descent stylesheet parser with skip-ahead error recovery.
//!
//! A malformed declaration skips to the next `;` or `}`; a malformed rule
//! skips past the next `}`. Neither aborts the rest of the sheet.

use crate::selector::Selector;

/// A `property: value` pair. The property is lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
}

impl Declaration {
    pub fn new(name: &str, value: &str) -> Self {
        Self { name: name.to_ascii_lowercase(), value: value.to_string() }
    }
}

/// A style rule: one selector and its declarations in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    pub selector: Selector,
    pub declarations: Vec<Declaration>,
}

/// A parsed stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    /// All rules in source order.
    pub rules: Vec<CssRule>,
}

impl Stylesheet {
    /// Append another sheet's rules after this one's.
    pub fn extend(&mut self, other: Stylesheet) {
        self.rules.extend(other.rules);
    }
}

pub struct CssParser {
    input: Vec<char>,
    pos: usize,
}

impl CssParser {
    pub fn new(input: &str) -> Self {
        Self { input: input.chars().collect(), pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn literal(&mut self, expected: char) -> Option<()> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    /// Identifier-ish run: alphanumerics plus `#`, `-`, `.` and `%`.
    fn word(&mut self) -> Option<String> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || "#-.%".contains(c)) {
            self.pos += 1;
        }
        (self.pos > start).then(|| self.input[start..self.pos].iter().collect())
    }

    /// Everything up to the next `;` or `}`, trimmed. Must be non-empty.
    fn value(&mut self) -> Option<String> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c != ';' && c != '}') {
            self.pos += 1;
        }
        let text: String = self.input[start..self.pos].iter().collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Skip forward until one of `stops`; returns the stop found.
    fn ignore_until(&mut self, stops: &[char]) -> Option<char> {
        while let Some(c) = self.peek() {
            if stops.contains(&c) {
                return Some(c);
            }
            self.pos += 1;
        }
        None
    }

    /// One declaration, expanding the `font` shorthand into its four
    /// longhands: style, weight, size, family (the remaining words).
    fn pair(&mut self, out: &mut Vec<Declaration>) -> Option<()> {
        let prop = self.word()?.to_ascii_lowercase();
        self.whitespace();
        self.literal(':')?;
        self.whitespace();
        let value = self.value()?;
        if prop == "font" {
            let words: Vec<&str> = value.split_whitespace().collect();
            let [style, weight, size, family @ ..] = words.as_slice() else { return None };
            if family.is_empty() {
                return None;
            }
            out.push(Declaration::new("font-style", style));
            out.push(Declaration::new("font-weight", weight));
            out.push(Declaration::new("font-size", size));
            out.push(Declaration::new("font-family", &family.join(" ")));
        } else {
            out.push(Declaration::new(&prop, &value));
        }
        Some(())
    }

    /// Declarations until `}` or end of input.
    pub fn body(&mut self) -> Vec<Declaration> {
        let mut out = Vec::new();
        while self.peek().is_some_and(|c| c != '}') {
            let mut decl = Vec::new();
            let ok = self.pair(&mut decl).is_some();
            if ok {
                out.extend(decl);
                self.whitespace();
                if self.literal(';').is_some() {
                    self.whitespace();
                    continue;
                }
            }
            match self.ignore_until(&[';', '}']) {
                Some(';') => {
                    self.pos += 1;
                    self.whitespace();
                }
                _ => break,
            }
        }
        out
    }

    pub fn selector(&mut self) -> Option<Selector> {
        let mut out = Selector::atom(&self.word()?);
        self.whitespace();
        while self.peek().is_some_and(|c| c != '{') {
            let descendant = Selector::atom(&self.word()?);
            out = Selector::Descendant(Box::new(out), Box::new(descendant));
            self.whitespace();
        }
        Some(out)
    }

    fn rule(&mut self) -> Option<CssRule> {
        self.whitespace();
        let selector = self.selector()?;
        self.literal('{')?;
        self.whitespace();
        let declarations = self.body();
        self.literal('}')?;
        Some(CssRule { selector, declarations })
    }

    pub fn parse(&mut self) -> Stylesheet {
        let mut rules = Vec::new();
        while self.pos < self.input.len() {
            match self.rule() {
                Some(rule) => {
                    rules.push(rule);
                    self.whitespace();
                }
                None => match self.ignore_until(&['}']) {
                    Some(_) => {
                        self.pos += 1;
                        self.whitespace();
                    }
                    None => break,
                },
            }
        }
        Stylesheet { rules }
    }
}

/// Parse a complete stylesheet.
pub fn parse_stylesheet(input: &str) -> Stylesheet {
    CssParser::new(input).parse()
}

/// Parse a bare declaration block, as found in a `style` attribute.
pub fn parse_declarations(input: &str) -> Vec<Declaration> {
    let mut parser = CssParser::new(input);
    parser.whitespace();
    parser.body()
}

/// Parse a standalone selector. The whole input must be consumed.
pub fn parse_selector(input: &str) -> Option<Selector> {
    let mut parser = CssParser::new(input.trim());
    let selector = parser.selector()?;
    (parser.pos == parser.input.len()).then_some(selector)
}
