//! The `fetch` entry point: scheme dispatch, request headers, cookies,
//! redirects and caching.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use cookie::{CookieJar, StoredCookie};
use http1::HttpRequest;
use tracing::{debug, warn};
use url::Url;

use crate::cache::{CachedResponse, Clock, ResponseCache, SystemClock, cache_lifetime};
use crate::error::NetError;
use crate::policy::ReferrerPolicy;
use crate::transport::{Endpoint, TcpTransport, Transport};
use crate::urls::host_of;

/// Pseudo-URL rendering the bookmark list.
pub const BOOKMARKS_URL: &str = "about:bookmarks";

/// Body served in place of a page whose TLS handshake failed.
pub const SECURE_CONNECTION_FAILED: &str = "<!doctype html>\n Secure Connection Failed";

const DEFAULT_USER_AGENT: &str = "Chrome/112.0.5615.45";
const MAX_REDIRECTS: u32 = 8;

// ─────────────────────────────────────────────────────────────────────────────
// Public types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetConfig {
    /// Sent unless the request carries its own `User-Agent`.
    pub user_agent: String,
    /// Redirects followed before giving up.
    pub max_redirects: u32,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self { user_agent: DEFAULT_USER_AGENT.to_string(), max_redirects: MAX_REDIRECTS }
    }
}

/// An outgoing fetch. `POST` is used exactly when `payload` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    /// URL of the page the request is made on behalf of.
    pub top_level_url: Option<String>,
    pub payload: Option<String>,
    pub headers: Vec<(String, String)>,
    pub referrer_policy: ReferrerPolicy,
}

impl FetchRequest {
    pub fn get(url: &str) -> Self {
        Self { url: url.to_string(), ..Self::default() }
    }

    pub fn post(url: &str, payload: &str) -> Self {
        Self { payload: Some(payload.to_string()), ..Self::get(url) }
    }

    pub fn with_top_level(mut self, top_level_url: Option<&str>) -> Self {
        self.top_level_url = top_level_url.map(str::to_string);
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_referrer_policy(mut self, policy: ReferrerPolicy) -> Self {
        self.referrer_policy = policy;
        self
    }

    fn method(&self) -> &'static str {
        if self.payload.is_some() { "POST" } else { "GET" }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Lower-cased header names.
    pub headers: HashMap<String, String>,
    pub body: String,
    /// Whether the final hop was fetched over TLS.
    pub secure: bool,
}

impl Response {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NetworkClient
// ─────────────────────────────────────────────────────────────────────────────

/// Fetches resources. Clones share one cookie jar, cache and bookmark list;
/// the client is single-threaded.
#[derive(Clone)]
pub struct NetworkClient {
    config: NetConfig,
    transport: Rc<dyn Transport>,
    clock: Rc<dyn Clock>,
    cookies: Rc<RefCell<CookieJar>>,
    cache: Rc<RefCell<ResponseCache>>,
    bookmarks: Rc<RefCell<Vec<String>>>,
}

impl fmt::Debug for NetworkClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkClient")
            .field("config", &self.config)
            .field("cookies", &self.cookies.borrow().len())
            .field("cached", &self.cache.borrow().len())
            .finish_non_exhaustive()
    }
}

impl NetworkClient {
    pub fn new(transport: Rc<dyn Transport>, config: NetConfig) -> Self {
        Self {
            config,
            transport,
            clock: Rc::new(SystemClock),
            cookies: Rc::new(RefCell::new(CookieJar::new())),
            cache: Rc::new(RefCell::new(ResponseCache::new())),
            bookmarks: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// A client talking to the network over TCP and native-tls.
    pub fn tcp(config: NetConfig) -> Self {
        Self::new(Rc::new(TcpTransport::new()), config)
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Fetch `request.url`, following redirects.
    pub fn fetch(&self, request: &FetchRequest) -> Result<Response, NetError> {
        self.fetch_hop(request, 0)
    }

    fn fetch_hop(&self, request: &FetchRequest, redirects: u32) -> Result<Response, NetError> {
        if redirects > self.config.max_redirects {
            return Err(NetError::TooManyRedirects);
        }
        if request.payload.is_none() {
            if let Some(hit) = self.cache.borrow().get(&request.url, self.clock.now()) {
                debug!(url = %request.url, "cache hit");
                return Ok(Response {
                    headers: hit.headers.clone(),
                    body: hit.body.clone(),
                    secure: request.url.starts_with("https:"),
                });
            }
        }
        if request.url == BOOKMARKS_URL {
            return Ok(self.bookmarks_page());
        }

        let url = Url::parse(&request.url).map_err(|e| NetError::InvalidUrl(format!("{}: {e}", request.url)))?;
        match url.scheme() {
            "http" | "https" => self.fetch_http(request, &url, redirects),
            "file" => {
                let path = url.to_file_path().map_err(|()| NetError::InvalidUrl(request.url.clone()))?;
                debug!(path = %path.display(), "read file");
                let body = std::fs::read_to_string(path)?;
                Ok(Response { headers: HashMap::new(), body, secure: false })
            }
            other => Err(NetError::UnknownScheme(other.to_string())),
        }
    }

    fn fetch_http(&self, request: &FetchRequest, url: &Url, redirects: u32) -> Result<Response, NetError> {
        let host = url.host_str().ok_or_else(|| NetError::InvalidUrl(request.url.clone()))?;
        let secure = url.scheme() == "https";
        let port = url.port_or_known_default().unwrap_or(if secure { 443 } else { 80 });
        let top_host = request.top_level_url.as_deref().and_then(host_of);

        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }
        let host_header = match url.port() {
            Some(p) => format!("{host}:{p}"),
            None => host.to_string(),
        };

        let mut http = HttpRequest::new(&host_header, &path);
        http.body = request.payload.clone();
        for (name, value) in &request.headers {
            http.header(name, value);
        }
        http.header("User-Agent", &self.config.user_agent);
        if let Some(referer) = referer_for(request, host, top_host.as_deref()) {
            http.header("Referer", referer);
        }
        if let Some(cookie) = self.cookies.borrow().header_for(host, top_host.as_deref(), request.method()) {
            http.header("Cookie", cookie);
        }

        debug!(method = request.method(), %url, "fetch");
        let endpoint = Endpoint { host: host.to_string(), port, tls: secure };
        let raw = match self.transport.roundtrip(&endpoint, &http.to_bytes()) {
            Ok(raw) => raw,
            Err(NetError::TlsHandshake(reason)) => {
                warn!(%host, %reason, "TLS handshake failed");
                return Ok(Response {
                    headers: HashMap::new(),
                    body: SECURE_CONNECTION_FAILED.to_string(),
                    secure: false,
                });
            }
            Err(e) => return Err(e),
        };

        let response = http1::parse_response(&raw)?;
        if !response.is_success() && !response.is_redirect() {
            return Err(NetError::BadStatus { status: response.status, reason: response.reason });
        }
        let headers: HashMap<String, String> = response.headers.into_iter().collect();

        if let Some(set_cookie) = headers.get("set-cookie") {
            self.cookies.borrow_mut().store(host, set_cookie);
        }

        if response.status >= 300 {
            let location = headers.get("location").ok_or(NetError::MissingLocation)?;
            let next = url.join(location).map_err(|e| NetError::InvalidUrl(format!("{location}: {e}")))?;
            debug!(from = %url, to = %next, status = response.status, "redirect");
            let follow = FetchRequest { url: next.into(), payload: None, ..request.clone() };
            return self.fetch_hop(&follow, redirects + 1);
        }

        for name in ["transfer-encoding", "content-encoding"] {
            if headers.contains_key(name) {
                return Err(NetError::UnsupportedEncoding(name.to_string()));
            }
        }

        if request.payload.is_none() {
            if let Some(ttl) = cache_lifetime(headers.get("cache-control").map(String::as_str)) {
                let entry = CachedResponse {
                    expires: self.clock.now() + ttl,
                    headers: headers.clone(),
                    body: response.body.clone(),
                };
                self.cache.borrow_mut().insert(&request.url, entry);
            }
        }

        Ok(Response { headers, body: response.body, secure })
    }

    // ── Cookies ─────────────────────────────────────────────────────────────

    pub fn cookie(&self, host: &str) -> Option<StoredCookie> {
        self.cookies.borrow().get(host).cloned()
    }

    /// `document.cookie` for the page at `url`.
    pub fn script_cookie(&self, url: &str) -> String {
        host_of(url).map(|host| self.cookies.borrow().script_get(&host)).unwrap_or_default()
    }

    /// Assign `document.cookie`; `false` when the stored cookie is httponly.
    pub fn set_script_cookie(&self, url: &str, text: &str) -> bool {
        match host_of(url) {
            Some(host) => self.cookies.borrow_mut().script_set(&host, text),
            None => false,
        }
    }

    // ── Bookmarks ───────────────────────────────────────────────────────────

    /// Add or remove `url`; returns whether it is bookmarked afterwards.
    pub fn toggle_bookmark(&self, url: &str) -> bool {
        let mut bookmarks = self.bookmarks.borrow_mut();
        match bookmarks.iter().position(|b| b == url) {
            Some(i) => {
                bookmarks.remove(i);
                false
            }
            None => {
                bookmarks.push(url.to_string());
                true
            }
        }
    }

    pub fn is_bookmarked(&self, url: &str) -> bool {
        self.bookmarks.borrow().iter().any(|b| b == url)
    }

    fn bookmarks_page(&self) -> Response {
        let mut body = String::from("<!doctype html>\n");
        for b in self.bookmarks.borrow().iter() {
            body.push_str(&format!("<a href=\"{b}\">{b}</a><br>\n"));
        }
        Response { headers: HashMap::new(), body, secure: false }
    }
}

fn referer_for<'r>(request: &'r FetchRequest, host: &str, top_host: Option<&str>) -> Option<&'r str> {
    let top = request.top_level_url.as_deref()?;
    match request.referrer_policy {
        ReferrerPolicy::NoReferrer => None,
        ReferrerPolicy::SameOrigin => (top_host == Some(host)).then_some(top),
        ReferrerPolicy::Unrestricted => Some(top),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
