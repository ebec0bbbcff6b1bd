//! Byte transports: a request goes out, everything the server sends until it
//! closes the connection comes back.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::NetError;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Where a request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub tls: bool,
}

impl Endpoint {
    fn scheme(&self) -> &'static str {
        if self.tls { "https" } else { "http" }
    }
}

pub trait Transport {
    /// Send `request` and read the full response. A failed TLS handshake must
    /// be reported as [`NetError::TlsHandshake`].
    fn roundtrip(&self, endpoint: &Endpoint, request: &[u8]) -> Result<Vec<u8>, NetError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// TCP + native-tls
// ─────────────────────────────────────────────────────────────────────────────

/// One connection per request, closed by the server (`Connection: close`).
#[derive(Debug, Clone)]
pub struct TcpTransport {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
        }
    }
}

impl TcpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn connect(&self, host: &str, port: u16) -> Result<TcpStream, NetError> {
        let mut last_err = None;
        for addr in (host, port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.read_timeout))?;
                    debug!(%addr, "connected");
                    return Ok(stream);
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(NetError::Io(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no addresses for {host}"))
        })))
    }
}

impl Transport for TcpTransport {
    fn roundtrip(&self, endpoint: &Endpoint, request: &[u8]) -> Result<Vec<u8>, NetError> {
        let tcp = self.connect(&endpoint.host, endpoint.port)?;
        if !endpoint.tls {
            return exchange(tcp, request);
        }
        let connector = native_tls::TlsConnector::new().map_err(|e| NetError::Tls(e.to_string()))?;
        let stream = connector
            .connect(&endpoint.host, tcp)
            .map_err(|e| NetError::TlsHandshake(e.to_string()))?;
        exchange(stream, request)
    }
}

fn exchange<S: Read + Write>(mut stream: S, request: &[u8]) -> Result<Vec<u8>, NetError> {
    stream.write_all(request)?;
    stream.flush()?;
    let mut buf = Vec::new();
    match stream.read_to_end(&mut buf) {
        Ok(_) => {}
        // TLS peers often close without close_notify.
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof && !buf.is_empty() => {}
        Err(e) => return Err(e.into()),
    }
    Ok(buf)
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory transport
// ─────────────────────────────────────────────────────────────────────────────

/// Serves canned raw responses keyed by URL and records every request.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    routes: RefCell<HashMap<String, String>>,
    sent: RefCell<Vec<String>>,
    tls_failure: RefCell<bool>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `raw` (status line, headers and body) for `url`. The fragment is
    /// ignored; the query is part of the key.
    pub fn route(&self, url: &str, raw: impl Into<String>) {
        let key = match Url::parse(url) {
            Ok(u) => {
                let mut key = format!(
                    "{}://{}:{}{}",
                    u.scheme(),
                    u.host_str().unwrap_or(""),
                    u.port_or_known_default().unwrap_or(0),
                    u.path()
                );
                if let Some(q) = u.query() {
                    key.push('?');
                    key.push_str(q);
                }
                key
            }
            Err(_) => url.to_string(),
        };
        self.routes.borrow_mut().insert(key, raw.into());
    }

    /// Serve a `200 OK` with the given body and extra header lines.
    pub fn route_ok(&self, url: &str, headers: &[(&str, &str)], body: &str) {
        let mut raw = String::from("HTTP/1.1 200 OK\r\n");
        for (name, value) in headers {
            raw.push_str(&format!("{name}: {value}\r\n"));
        }
        raw.push_str("\r\n");
        raw.push_str(body);
        self.route(url, raw);
    }

    /// Make every TLS endpoint fail its handshake.
    pub fn fail_tls(&self, fail: bool) {
        *self.tls_failure.borrow_mut() = fail;
    }

    /// Raw text of every request sent so far.
    pub fn requests(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.sent.borrow().len()
    }
}

impl Transport for MemoryTransport {
    fn roundtrip(&self, endpoint: &Endpoint, request: &[u8]) -> Result<Vec<u8>, NetError> {
        if endpoint.tls && *self.tls_failure.borrow() {
            return Err(NetError::TlsHandshake(format!("certificate rejected for {}", endpoint.host)));
        }
        let text = String::from_utf8_lossy(request).into_owned();
        let path = text.split_whitespace().nth(1).unwrap_or("/").to_string();
        self.sent.borrow_mut().push(text);
        let key = format!("{}://{}:{}{}", endpoint.scheme(), endpoint.host, endpoint.port, path);
        self.routes
            .borrow()
            .get(&key)
            .map(|raw| raw.clone().into_bytes())
            .ok_or_else(|| NetError::Io(io::Error::new(io::ErrorKind::ConnectionRefused, key)))
    }
}
