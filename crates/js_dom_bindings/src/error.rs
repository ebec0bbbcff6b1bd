use net::NetError;
use thiserror::Error;

use crate::handles::Handle;

/// Failures surfaced to script as exceptions.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("invalid node handle: {0}")]
    InvalidHandle(Handle),

    #[error("hierarchy request: node {child} cannot be inserted under {parent}")]
    HierarchyRequest { parent: Handle, child: Handle },

    #[error("invalid selector: {0:?}")]
    InvalidSelector(String),

    #[error("Cross-origin XHR request not allowed: {0}")]
    CrossOrigin(String),

    #[error("Cross-origin XHR blocked by CSP: {0}")]
    BlockedByCsp(String),

    #[error("network error: {0}")]
    Network(#[from] NetError),

    #[error("unknown host function: {0}")]
    UnknownCall(String),

    #[error("bad argument {index} to {call}")]
    BadArgument { call: String, index: usize },

    #[error("script error: {0}")]
    Runtime(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(ScriptError::InvalidHandle(7).to_string(), "invalid node handle: 7");
        assert_eq!(
            ScriptError::HierarchyRequest { parent: 3, child: 1 }.to_string(),
            "hierarchy request: node 1 cannot be inserted under 3"
        );
        assert!(ScriptError::BlockedByCsp("http://x/".into()).to_string().contains("CSP"));
        let err: ScriptError = NetError::TooManyRedirects.into();
        assert_eq!(err.to_string(), "network error: too many redirects");
    }
}
