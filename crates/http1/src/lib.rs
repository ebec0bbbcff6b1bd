//! # HTTP/1.1 Messages
//!
//! Serializes `Connection: close` requests and parses the status line and
//! header block of a response whose body runs to end of stream.

#![forbid(unsafe_code)]

use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Error
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    #[error("response ended before the header block")]
    Incomplete,
    #[error("invalid status line: {0:?}")]
    InvalidStatusLine(String),
    #[error("invalid header line: {0:?}")]
    InvalidHeader(String),
    #[error("response is not valid UTF-8")]
    InvalidUtf8,
}

// ─────────────────────────────────────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────────────────────────────────────

/// An outgoing request. `POST` is used exactly when a body is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub path: String,
    pub host: String,
    /// Extra headers in send order.
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(host: &str, path: &str) -> Self {
        Self { path: path.to_string(), host: host.to_string(), headers: Vec::new(), body: None }
    }

    pub fn method(&self) -> &'static str {
        if self.body.is_some() { "POST" } else { "GET" }
    }

    /// Add a header unless one with the same name is already present.
    pub fn header(&mut self, name: &str, value: &str) -> &mut Self {
        if !self.has_header(name) {
            self.headers.push((name.to_string(), value.to_string()));
        }
        self
    }

    pub fn has_header(&self, name: &str) -> bool {
        ["host", "connection", "content-length"].contains(&name.to_ascii_lowercase().as_str())
            || self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Request line, `Host`, `Connection: close`, the extra headers,
    /// `Content-Length` when there is a body, a blank line, then the body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!("{} {} HTTP/1.1\r\n", self.method(), self.path);
        out.push_str(&format!("Host: {}\r\n", self.host));
        out.push_str("Connection: close\r\n");
        for (name, value) in &self.headers {
            out.push_str(&format!("{name}: {value}\r\n"));
        }
        if let Some(body) = &self.body {
            out.push_str(&format!("Content-Length: {}\r\n", body.len()));
        }
        out.push_str("\r\n");
        if let Some(body) = &self.body {
            out.push_str(body);
        }
        out.into_bytes()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub version: String,
    pub status: u16,
    pub reason: String,
    /// Header names lower-cased, values trimmed, in arrival order.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Case-insensitive lookup; the last occurrence wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    pub fn location(&self) -> Option<&str> {
        self.header("location")
    }
}

/// Parse a complete response read until the server closed the connection.
pub fn parse_response(data: &[u8]) -> Result<HttpResponse, HttpError> {
    let text = std::str::from_utf8(data).map_err(|_| HttpError::InvalidUtf8)?;
    let (head, body) = match text.find("\r\n\r\n") {
        Some(i) => (&text[..i], &text[i + 4..]),
        None => match text.find("\n\n") {
            Some(i) => (&text[..i], &text[i + 2..]),
            None => return Err(HttpError::Incomplete),
        },
    };
    let mut lines = head.lines();
    let status_line = lines.next().ok_or(HttpError::Incomplete)?;
    let (version, status, reason) = parse_status_line(status_line)?;

    let mut headers = Vec::new();
    for line in lines {
        let (name, value) =
            line.split_once(':').ok_or_else(|| HttpError::InvalidHeader(line.to_string()))?;
        headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
    }

    Ok(HttpResponse { version, status, reason, headers, body: body.to_string() })
}

/// `HTTP/1.1 200 OK` into its three parts. The reason phrase may be empty.
fn parse_status_line(line: &str) -> Result<(String, u16, String), HttpError> {
    let bad = || HttpError::InvalidStatusLine(line.to_string());
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().filter(|v| v.starts_with("HTTP/")).ok_or_else(bad)?;
    let status = parts.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;
    let reason = parts.next().unwrap_or("").trim();
    Ok((version.to_string(), status, reason.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
