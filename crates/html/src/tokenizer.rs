//! Character-level HTML scanner.
//!
//! A single forward pass over the input with four exclusive states: text,
//! tag, comment, and quoted attribute value (tracked inside the tag state).
//! `<script>` and `<style>` bodies are raw text up to the matching close tag.

use crate::attributes::parse_tag;
use crate::entities;
use crate::token::HtmlToken;

/// Elements whose content is not scanned for markup.
pub const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Iterator over the tokens of an HTML source string.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    /// Lower-case `</tag` that ends the current raw-text element.
    raw_text_end: Option<String>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0, raw_text_end: None }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_comment(&mut self) {
        let body = &self.rest()[4..];
        self.pos = match body.find("-->") {
            Some(end) => self.pos + 4 + end + 3,
            None => self.input.len(),
        };
    }

    fn raw_text(&mut self, end: &str) -> Option<HtmlToken> {
        let rest = self.rest();
        let len = find_ignore_ascii_case(rest, end).unwrap_or(rest.len());
        self.pos += len;
        (len > 0).then(|| HtmlToken::Text(rest[..len].to_string()))
    }

    fn finish_tag(&mut self, raw: &str) -> HtmlToken {
        let token = parse_tag(raw);
        if let HtmlToken::StartTag { name, .. } = &token {
            if RAW_TEXT_TAGS.contains(&name.as_str()) {
                self.raw_text_end = Some(format!("</{name}"));
            }
        }
        token
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = HtmlToken;

    fn next(&mut self) -> Option<HtmlToken> {
        if let Some(end) = self.raw_text_end.take() {
            if let Some(token) = self.raw_text(&end) {
                return Some(token);
            }
        }

        let mut buf = String::new();
        let mut in_tag = false;
        let mut quote: Option<char> = None;

        while self.pos < self.input.len() {
            let rest = self.rest();
            if quote.is_none() && rest.starts_with("<!--") {
                if !in_tag && !buf.is_empty() {
                    return Some(HtmlToken::Text(entities::decode(&buf)));
                }
                self.skip_comment();
                continue;
            }
            let Some(c) = rest.chars().next() else { break };
            match c {
                '"' | '\'' if in_tag => {
                    match quote {
                        Some(q) if q == c => quote = None,
                        None => quote = Some(c),
                        Some(_) => {}
                    }
                    buf.push(c);
                }
                '<' if quote.is_none() => {
                    if !buf.is_empty() {
                        // Text before a tag, or the remains of a tag that
                        // never closed, is flushed as character data.
                        return Some(HtmlToken::Text(entities::decode(&buf)));
                    }
                    in_tag = true;
                }
                '>' if in_tag && quote.is_none() => {
                    self.pos += 1;
                    return Some(self.finish_tag(&buf));
                }
                _ => buf.push(c),
            }
            self.pos += c.len_utf8();
        }

        // An unterminated tag at end of input is dropped.
        if in_tag || buf.is_empty() {
            None
        } else {
            Some(HtmlToken::Text(entities::decode(&buf)))
        }
    }
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<HtmlToken> {
        Tokenizer::new(src).collect()
    }

    fn start(name: &str) -> HtmlToken {
        HtmlToken::StartTag { name: name.into(), attrs: Vec::new() }
    }

    fn end(name: &str) -> HtmlToken {
        HtmlToken::EndTag { name: name.into() }
    }

    fn text(t: &str) -> HtmlToken {
        HtmlToken::Text(t.into())
    }

    #[test]
    fn text_and_tags() {
        assert_eq!(tokens("<p>hi</p>"), vec![start("p"), text("hi"), end("p")]);
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(tokens("a<!-- <b> -->c"), vec![text("a"), text("c")]);
    }

    #[test]
    fn unterminated_comment_swallows_rest() {
        assert_eq!(tokens("a<!-- never closed <p>"), vec![text("a")]);
    }

    #[test]
    fn quoted_gt_does_not_end_tag() {
        let toks = tokens("<a title=\"x > y\">z</a>");
        match &toks[0] {
            HtmlToken::StartTag { name, attrs } => {
                assert_eq!(name, "a");
                assert_eq!(attrs[0].value, "x > y");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(toks[1], text("z"));
    }

    #[test]
    fn script_body_is_raw() {
        let toks = tokens("<script>if (a < b && c > d) x();</SCRIPT>after");
        assert_eq!(toks, vec![
            start("script"),
            text("if (a < b && c > d) x();"),
            end("script"),
            text("after"),
        ]);
    }

    #[test]
    fn empty_style_element() {
        assert_eq!(tokens("<style></style>"), vec![start("style"), end("style")]);
    }

    #[test]
    fn unterminated_tag_dropped() {
        assert_eq!(tokens("x<div class=a"), vec![text("x")]);
    }

    #[test]
    fn stray_gt_is_text() {
        assert_eq!(tokens("1 > 0"), vec![text("1 > 0")]);
    }

    #[test]
    fn entities_decoded_in_text() {
        assert_eq!(tokens("a &amp; b"), vec![text("a & b")]);
    }
}
