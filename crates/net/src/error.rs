use http1::HttpError;
use thiserror::Error;

/// Failures that abort a fetch.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("unknown scheme: {0}")]
    UnknownScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("unexpected status {status} {reason}")]
    BadStatus { status: u16, reason: String },

    #[error("malformed response: {0}")]
    MalformedResponse(#[from] HttpError),

    #[error("unsupported response header: {0}")]
    UnsupportedEncoding(String),

    #[error("redirect without a Location header")]
    MissingLocation,

    #[error("too many redirects")]
    TooManyRedirects,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS handshake failed: {0}")]
    TlsHandshake(String),

    #[error("TLS error: {0}")]
    Tls(String),
}
