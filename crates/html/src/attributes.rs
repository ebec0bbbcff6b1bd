//! Tag text splitting: `name attr=value ...` into a token.

use dom::Attr;

use crate::token::HtmlToken;

/// Turn the text between `<` and `>` into a token.
pub fn parse_tag(raw: &str) -> HtmlToken {
    let raw = raw.trim();
    if raw.starts_with('!') || raw.is_empty() {
        return HtmlToken::Declaration(raw.to_string());
    }
    let raw = strip_self_closing(raw);
    let (name, rest) = match raw.find(char::is_whitespace) {
        Some(i) => (&raw[..i], &raw[i..]),
        None => (raw, ""),
    };
    let name = name.to_ascii_lowercase();
    match name.strip_prefix('/') {
        Some(closing) => HtmlToken::EndTag { name: closing.to_string() },
        None => HtmlToken::StartTag { name, attrs: parse_attributes(rest) },
    }
}

/// Drop a self-closing `/` that stands after the tag name, after whitespace
/// or after a quoted value. A slash ending an unquoted value is kept.
fn strip_self_closing(raw: &str) -> &str {
    let Some(body) = raw.strip_suffix('/') else { return raw };
    let bare_name = !body.contains(char::is_whitespace);
    let after_token = body.ends_with(|c: char| c.is_whitespace() || c == '"' || c == '\'');
    if bare_name || after_token { body.trim_end() } else { raw }
}

/// Split on unquoted whitespace, honoring `'` and `"` quoting. A closing
/// quote always ends the current token, so `a="x"` yields `a=x`.
fn tokenize(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in text.chars() {
        match quote {
            Some(q) if c == q => {
                parts.push(std::mem::take(&mut current));
                quote = None;
            }
            Some(_) => current.push(c),
            None if c.is_whitespace() => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            None if c == '"' || c == '\'' => quote = Some(c),
            None => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Parse attribute text into `Attr`s. Keys are lower-cased, bare keys get an
/// empty value and a repeated key overwrites the earlier value in place.
pub fn parse_attributes(text: &str) -> Vec<Attr> {
    let mut attrs: Vec<Attr> = Vec::new();
    for pair in tokenize(text) {
        let (key, value) = match pair.split_once('=') {
            Some((k, v)) => (k, v),
            None => (pair.as_str(), ""),
        };
        if key.is_empty() {
            continue;
        }
        let attr = Attr::new(key, value);
        match attrs.iter_mut().find(|a| a.name == attr.name) {
            Some(existing) => existing.value = attr.value,
            None => attrs.push(attr),
        }
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(raw: &str) -> (String, Vec<(String, String)>) {
        match parse_tag(raw) {
            HtmlToken::StartTag { name, attrs } => {
                (name, attrs.into_iter().map(|a| (a.name, a.value)).collect())
            }
            other => panic!("expected start tag, got {other:?}"),
        }
    }

    #[test]
    fn bare_tag() {
        assert_eq!(start("DIV"), ("div".to_string(), vec![]));
    }

    #[test]
    fn end_tag() {
        assert_eq!(parse_tag("/P"), HtmlToken::EndTag { name: "p".into() });
    }

    #[test]
    fn declaration_ignored() {
        assert!(matches!(parse_tag("!doctype html"), HtmlToken::Declaration(_)));
    }

    #[test]
    fn quoted_values_keep_spaces_and_equals() {
        let (_, attrs) = start("a href=\"/x?a=1&b=2\" title='two words'");
        assert_eq!(attrs, vec![
            ("href".to_string(), "/x?a=1&b=2".to_string()),
            ("title".to_string(), "two words".to_string()),
        ]);
    }

    #[test]
    fn boolean_and_uppercase_keys() {
        let (name, attrs) = start("input TYPE=checkbox checked");
        assert_eq!(name, "input");
        assert_eq!(attrs, vec![
            ("type".to_string(), "checkbox".to_string()),
            ("checked".to_string(), String::new()),
        ]);
    }

    #[test]
    fn self_closing_slash_stripped() {
        let (name, attrs) = start("br/");
        assert_eq!(name, "br");
        assert!(attrs.is_empty());
        let (name, attrs) = start("img src=a.png /");
        assert_eq!(name, "img");
        assert_eq!(attrs, vec![("src".to_string(), "a.png".to_string())]);
    }

    #[test]
    fn unquoted_value_keeps_trailing_slash() {
        let (name, attrs) = start("a href=/x/");
        assert_eq!(name, "a");
        assert_eq!(attrs, vec![("href".to_string(), "/x/".to_string())]);
        let (_, attrs) = start("a href=/docs/ /");
        assert_eq!(attrs, vec![("href".to_string(), "/docs/".to_string())]);
    }

    #[test]
    fn slash_after_quoted_value_stripped() {
        let (_, attrs) = start("img src=\"a.png\"/");
        assert_eq!(attrs, vec![("src".to_string(), "a.png".to_string())]);
    }

    #[test]
    fn empty_quoted_value() {
        let (_, attrs) = start("input value=\"\"");
        assert_eq!(attrs, vec![("value".to_string(), String::new())]);
    }
}
