//! Per-document policies captured from response headers.

use crate::urls::url_origin;

/// `Referrer-Policy` of the page issuing a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferrerPolicy {
    /// Always send the referring page.
    #[default]
    Unrestricted,
    NoReferrer,
    /// Send only to the referring page's own host.
    SameOrigin,
}

impl ReferrerPolicy {
    /// Unknown values fall back to [`ReferrerPolicy::Unrestricted`].
    pub fn parse(header: &str) -> Self {
        match header.trim().to_ascii_lowercase().as_str() {
            "no-referrer" => Self::NoReferrer,
            "same-origin" => Self::SameOrigin,
            _ => Self::Unrestricted,
        }
    }
}

/// The `default-src` origin list of a `Content-Security-Policy` header.
/// Other directives are not consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentSecurityPolicy {
    allowed_origins: Vec<String>,
}

impl ContentSecurityPolicy {
    /// `None` unless the header starts with `default-src`.
    pub fn parse(header: &str) -> Option<Self> {
        let mut words = header.split_whitespace();
        if words.next()? != "default-src" {
            return None;
        }
        Some(Self { allowed_origins: words.map(str::to_string).collect() })
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }

    pub fn allows(&self, url: &str) -> bool {
        url_origin(url).is_some_and(|origin| self.allowed_origins.contains(&origin))
    }
}

/// A request is allowed when there is no policy or the policy lists its
/// origin.
pub fn request_allowed(policy: Option<&ContentSecurityPolicy>, url: &str) -> bool {
    policy.is_none_or(|p| p.allows(url))
}
