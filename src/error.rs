use std::io;
use thiserror::Error;

/// Errors a single proxied connection can fail with.
///
/// Both kinds stop at the connection boundary: the listener logs them
/// and the socket closes. They never affect other connections and never
/// leave the cache half-updated.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The client request could not be parsed into a proxied GET.
    #[error("parse error: {0}")]
    Parse(&'static str),

    /// Socket failure talking to the client or the origin, including
    /// timeouts and premature closes.
    #[error("connection error: {0}")]
    Connection(#[from] io::Error),
}

impl ProxyError {
    pub fn is_parse(&self) -> bool {
        matches!(self, ProxyError::Parse(_))
    }

    /// Connection error carrying a timeout, used where a tokio timer
    /// elapses rather than the socket itself failing.
    pub fn timed_out(what: &str) -> Self {
        ProxyError::Connection(io::Error::new(io::ErrorKind::TimedOut, what.to_string()))
    }
}
