use crate::error::ProxyError;
use crate::DEFAULT_PORT;

const SCHEME: &str = "http://";
const REQUEST_LINE_TOKENS: usize = 3;

/// A proxied GET request, assembled from the request line and the
/// `Host:` header. Method and version are fixed: the proxy only
/// accepts absolute-URI GET and always talks HTTP/1.0 to the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: &'static str,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub version: &'static str,
    /// Unix seconds at which the request was parsed; becomes the cache
    /// entry timestamp if the response is stored.
    pub received_at: u64,
}

/// Build a [`Request`] from the captured request line and `Host:` line.
///
/// The request line must carry an absolute `http://` URI and split into
/// exactly three whitespace-separated tokens, and the method must be
/// GET. The path is everything from the first `/` after the scheme
/// (defaulting to `/`), the port comes from the authority (defaulting
/// to 80), and the host is the `Host:` value taken verbatim.
pub fn parse_request(
    request_line: &str,
    host_line: &str,
    received_at: u64,
) -> Result<Request, ProxyError> {
    if !request_line.contains(SCHEME) {
        return Err(ProxyError::Parse("request is not an absolute http:// URI"));
    }
    let tokens: Vec<&str> = request_line.split_whitespace().collect();
    if tokens.len() != REQUEST_LINE_TOKENS {
        return Err(ProxyError::Parse(
            "request line is not '<method> <uri> <version>'",
        ));
    }
    if tokens[0] != "GET" {
        return Err(ProxyError::Parse("only GET requests are supported"));
    }
    let rest = tokens[1]
        .strip_prefix(SCHEME)
        .ok_or(ProxyError::Parse("request is not an absolute http:// URI"))?;

    let (authority, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], rest[idx..].to_string()),
        None => (rest, String::from("/")),
    };
    let port = match authority.split_once(':') {
        Some((_, p)) => p
            .parse::<u16>()
            .map_err(|_| ProxyError::Parse("invalid port in request URI"))?,
        None => DEFAULT_PORT,
    };

    let host = host_line
        .strip_prefix("Host:")
        .map(str::trim)
        .unwrap_or_default();
    if host.is_empty() {
        return Err(ProxyError::Parse("missing or empty Host header"));
    }

    Ok(Request {
        method: "GET",
        host: host.to_string(),
        port,
        path,
        version: "HTTP/1.0",
        received_at,
    })
}

/// Produce the forwarded-header block from the collected header pairs,
/// in encounter order.
///
/// `Keep-Alive` headers are dropped and `Proxy-Connection` is rewritten
/// to close; the proxy never reuses connections on either side. Every
/// other header passes through unchanged.
pub fn build_forwarded_headers(headers: &[(String, String)]) -> String {
    let mut out = String::new();
    for (name, value) in headers {
        if name.eq_ignore_ascii_case("keep-alive") {
            continue;
        }
        if name.eq_ignore_ascii_case("proxy-connection") {
            out.push_str("Proxy-Connection: close\r\n");
        } else {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value);
            out.push_str("\r\n");
        }
    }
    out
}
