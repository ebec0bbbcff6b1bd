//! # Network Client
//!
//! Scheme-aware fetching for the engine: `http`, `https` (native-tls with
//! SNI), `file`, and the `about:bookmarks` pseudo-page. Follows redirects,
//! keeps the process-wide cookie jar and response cache, and applies
//! referrer and SameSite rules on outgoing requests.
//!
//! The jar, cache and bookmarks live behind `Rc<RefCell<_>>` inside
//! [`NetworkClient`]; every clone shares them. Nothing here is `Send`.

#![forbid(unsafe_code)]

pub mod cache;
pub mod client;
pub mod error;
pub mod policy;
pub mod transport;
pub mod urls;

pub use cache::{CachedResponse, Clock, ManualClock, ResponseCache, SystemClock};
pub use client::{BOOKMARKS_URL, FetchRequest, NetConfig, NetworkClient, Response, SECURE_CONNECTION_FAILED};
pub use error::NetError;
pub use policy::{ContentSecurityPolicy, ReferrerPolicy, request_allowed};
pub use transport::{Endpoint, MemoryTransport, TcpTransport, Transport};
pub use urls::{form_urlencode, host_of, resolve_url, split_fragment, url_origin};
