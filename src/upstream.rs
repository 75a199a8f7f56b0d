use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::error::ProxyError;
use crate::parser::Request;
use crate::{CONNECTION_TIMEOUT, CONNECT_TIMEOUT};

/// Fetch the whole response for `req` from the origin server.
///
/// The origin request is a bare `GET <path> HTTP/1.0` line; collected
/// client headers are normalized for the forwarded block but not sent
/// upstream. The response carries no framing: everything the origin
/// writes until EOF is the response.
pub async fn fetch(req: &Request, _headers: &str) -> Result<Bytes, ProxyError> {
    debug!("connecting to {}:{}", req.host, req.port);
    let mut stream = timeout(
        CONNECT_TIMEOUT,
        TcpStream::connect((req.host.as_str(), req.port)),
    )
    .await
    .map_err(|_| ProxyError::timed_out("origin connect"))??;

    let request_line = format!("{} {} {}\r\n\r\n", req.method, req.path, req.version);
    stream.write_all(request_line.as_bytes()).await?;

    let mut response = BytesMut::with_capacity(8192);
    loop {
        let n = timeout(CONNECTION_TIMEOUT, stream.read_buf(&mut response))
            .await
            .map_err(|_| ProxyError::timed_out("origin read"))??;
        if n == 0 {
            break;
        }
    }
    Ok(response.freeze())
}
