use std::io::{Read, Write};

use bytes::Bytes;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::COMPRESSION_LEVEL;

/// Compress a fetched response for cache storage. Pass-through when
/// compression is configured off (level 0).
pub fn compress(data: &[u8]) -> std::io::Result<Bytes> {
    if COMPRESSION_LEVEL == 0 {
        return Ok(Bytes::copy_from_slice(data));
    }
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 2 + 16),
        Compression::new(COMPRESSION_LEVEL),
    );
    encoder.write_all(data)?;
    Ok(encoder.finish()?.into())
}

/// Inverse of [`compress`]; reproduces the stored bytes exactly.
pub fn decompress(data: &[u8]) -> std::io::Result<Bytes> {
    if COMPRESSION_LEVEL == 0 {
        return Ok(Bytes::copy_from_slice(data));
    }
    let mut out = Vec::with_capacity(data.len() * 2);
    ZlibDecoder::new(data).read_to_end(&mut out)?;
    Ok(out.into())
}
