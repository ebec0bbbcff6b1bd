use net::NetError;
use thiserror::Error;

/// A navigation that could not be committed. The tab keeps showing the
/// previous document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: NetError,
    },

    #[error("cannot resolve {href:?}: {source}")]
    Resolve {
        href: String,
        #[source]
        source: NetError,
    },
}

impl LoadError {
    /// The underlying network failure.
    pub fn net_error(&self) -> &NetError {
        match self {
            LoadError::Fetch { source, .. } | LoadError::Resolve { source, .. } => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoadError::Fetch { url: "http://h/".into(), source: NetError::TooManyRedirects };
        assert!(err.to_string().starts_with("failed to load http://h/"));
        assert!(matches!(err.net_error(), NetError::TooManyRedirects));

        let err = LoadError::Resolve { href: "::".into(), source: NetError::InvalidUrl("::".into()) };
        assert!(err.to_string().contains("\"::\""));
    }
}
