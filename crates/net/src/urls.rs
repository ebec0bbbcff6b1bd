//! URL helpers shared by the page controller and the script bridge.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use crate::error::NetError;

/// Characters left alone when encoding a form component: unreserved marks
/// and `/`.
const FORM_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~').remove(b'/');

/// Resolve `url` against the document at `current`. Absolute URLs pass
/// through untouched; `..` never climbs above the host.
pub fn resolve_url(url: &str, current: &str) -> Result<String, NetError> {
    if url.contains("://") {
        return Ok(url.to_string());
    }
    let base = Url::parse(current).map_err(|e| NetError::InvalidUrl(format!("{current}: {e}")))?;
    base.join(url)
        .map(String::from)
        .map_err(|e| NetError::InvalidUrl(format!("{url}: {e}")))
}

/// `scheme://host[:port]`; the port appears only when it is not the
/// scheme's default.
pub fn url_origin(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str().unwrap_or("");
    Some(match parsed.port() {
        Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
        None => format!("{}://{host}", parsed.scheme()),
    })
}

pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(str::to_string)
}

/// Split off the `#fragment`, if any.
pub fn split_fragment(url: &str) -> (&str, Option<&str>) {
    match url.split_once('#') {
        Some((base, frag)) => (base, Some(frag)),
        None => (url, None),
    }
}

/// `name=value` pairs joined with `&`, both sides percent-encoded.
pub fn form_urlencode<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    pairs
        .into_iter()
        .map(|(name, value)| {
            format!("{}={}", utf8_percent_encode(name, FORM_COMPONENT), utf8_percent_encode(value, FORM_COMPONENT))
        })
        .collect::<Vec<_>>()
        .join("&")
}
