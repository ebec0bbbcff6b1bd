//! # Cookie Jar
//!
//! One cookie per host, overwritten by every `Set-Cookie`. Attribute names
//! and values are stored lower-cased; only `samesite` and `httponly` carry
//! meaning.

#![forbid(unsafe_code)]

use std::collections::{BTreeMap, HashMap};

// ─────────────────────────────────────────────────────────────────────────────
// StoredCookie
// ─────────────────────────────────────────────────────────────────────────────

/// A host's cookie: the raw `name=value` text and its attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredCookie {
    pub value: String,
    pub params: BTreeMap<String, String>,
}

impl StoredCookie {
    /// Parse `name=value[; attr[=val]]*`. Text before the first `;` is kept
    /// verbatim.
    pub fn parse(header: &str) -> Self {
        let (value, rest) = match header.split_once(';') {
            Some((v, rest)) => (v, Some(rest)),
            None => (header, None),
        };
        let mut params = BTreeMap::new();
        for pair in rest.into_iter().flat_map(|r| r.split(';')) {
            let pair = pair.trim();
            let (name, val) = pair.split_once('=').unwrap_or((pair, ""));
            params.insert(name.trim().to_ascii_lowercase(), val.trim().to_ascii_lowercase());
        }
        Self { value: value.to_string(), params }
    }

    pub fn http_only(&self) -> bool {
        self.params.contains_key("httponly")
    }

    /// The `samesite` attribute, `none` when absent.
    pub fn same_site(&self) -> &str {
        self.params.get("samesite").map_or("none", String::as_str)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CookieJar
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    entries: HashMap<String, StoredCookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, host: &str) -> Option<&StoredCookie> {
        self.entries.get(host)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store a `Set-Cookie` header value for `host`, replacing any previous
    /// cookie.
    pub fn store(&mut self, host: &str, header: &str) {
        self.entries.insert(host.to_string(), StoredCookie::parse(header));
    }

    /// Value for an outgoing `Cookie` header. A `samesite=lax` cookie is
    /// withheld from cross-host non-GET requests.
    pub fn header_for(&self, host: &str, top_level_host: Option<&str>, method: &str) -> Option<&str> {
        let cookie = self.entries.get(host)?;
        if let Some(top) = top_level_host {
            if cookie.same_site() == "lax" && top != host && method != "GET" {
                return None;
            }
        }
        Some(&cookie.value)
    }

    /// `document.cookie` read: empty when there is no cookie or it is
    /// `httponly`.
    pub fn script_get(&self, host: &str) -> String {
        match self.entries.get(host) {
            Some(c) if !c.http_only() => c.value.clone(),
            _ => String::new(),
        }
    }

    /// `document.cookie` write. Refused (returns `false`) when the current
    /// cookie is `httponly`.
    pub fn script_set(&mut self, host: &str, text: &str) -> bool {
        if self.entries.get(host).is_some_and(StoredCookie::http_only) {
            return false;
        }
        self.store(host, text);
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
