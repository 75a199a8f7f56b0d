use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::cache::{unix_now, CacheStore, InsertOutcome};
use crate::compress::{compress, decompress};
use crate::error::ProxyError;
use crate::parser::{build_forwarded_headers, parse_request, Request};
use crate::{upstream, CONNECTION_TIMEOUT, MAX_OBJECT_SIZE};

/// Serve one client connection, then let it close.
///
/// The request is consumed line by line: everything before the first
/// line starting with `GET` is skipped, the request is parsed as soon
/// as the `Host:` line arrives, and remaining headers are collected
/// until the blank line that ends the request. On a parse failure the
/// connection is simply closed; no error response is written back.
pub async fn handle_connection<S>(stream: S, cache: CacheStore) -> Result<(), ProxyError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (read_half, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);

    // AWAIT_REQUEST_LINE: skip anything that is not a GET line
    let (request_line, url) = loop {
        let Some(line) = read_client_line(&mut reader).await? else {
            return Err(ProxyError::Parse("no GET request line before end of stream"));
        };
        let mut tokens = line.split_whitespace();
        if tokens.next() == Some("GET") {
            let url = tokens.next().unwrap_or_default().to_string();
            break (line, url);
        }
    };

    // AWAIT_HOST: headers ahead of Host are collected like any other
    let mut headers: Vec<(String, String)> = Vec::new();
    let req: Request = loop {
        let Some(line) = read_client_line(&mut reader).await? else {
            return Err(ProxyError::Parse("connection closed before Host header"));
        };
        if is_blank(&line) {
            return Err(ProxyError::Parse("request ended before Host header"));
        }
        if line.split_whitespace().next() == Some("Host:") {
            break parse_request(&request_line, &line, unix_now())?;
        }
        headers.push(split_header(&line)?);
    };

    // COLLECT_HEADERS: up to the blank line that ends the request
    loop {
        let Some(line) = read_client_line(&mut reader).await? else {
            return Err(ProxyError::Parse("connection closed before end of headers"));
        };
        if is_blank(&line) {
            break;
        }
        headers.push(split_header(&line)?);
    }

    let forwarded = build_forwarded_headers(&headers);

    if let Some(entry) = cache.get(&url).await {
        let body = decompress(&entry.body)?;
        writer.write_all(&body).await?;
        writer.flush().await?;
        info!("CACHE HIT: {url}");
        return Ok(());
    }

    debug!("CACHE MISS: {url}");
    let response = upstream::fetch(&req, &forwarded).await?;
    writer.write_all(&response).await?;
    writer.flush().await?;

    let compressed = compress(&response)?;
    match cache.insert(url.clone(), compressed, req.received_at).await {
        InsertOutcome::Inserted { free_space } => {
            info!("CACHED: {url} (cache free space: {free_space} bytes)");
            if free_space < MAX_OBJECT_SIZE {
                let removed = cache.evict_stale(unix_now()).await;
                debug!("evicted {removed} stale entries");
            }
        }
        InsertOutcome::ObjectTooLarge => warn!("NOT CACHED (object too large): {url}"),
        InsertOutcome::CacheFull => warn!("NOT CACHED (cache full): {url}"),
    }
    Ok(())
}

async fn read_client_line<R>(reader: &mut R) -> Result<Option<String>, ProxyError>
where
    R: AsyncBufRead + Unpin,
{
    let mut raw = Vec::new();
    let n = timeout(CONNECTION_TIMEOUT, reader.read_until(b'\n', &mut raw))
        .await
        .map_err(|_| ProxyError::timed_out("client read"))??;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&raw).into_owned()))
}

fn split_header(line: &str) -> Result<(String, String), ProxyError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (name, value) = line
        .split_once(':')
        .ok_or(ProxyError::Parse("malformed header line"))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}
