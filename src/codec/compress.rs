//! Deflate helpers for the event-buffer dump special case.
//!
//! The event-buffer payload is the only compressed field in the protocol.
//! Both sides use zlib-wrapped deflate at the default level, matching the
//! `java.util.zip.Deflater`/`Inflater` defaults of the original agent.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{Result, WireError};

/// Slack added to the compression scratch buffer. Deflate can expand tiny
/// or incompressible inputs by a few bytes.
const DEFLATE_SLACK: usize = 32;

/// Compress a buffer with zlib deflate at the default level.
pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let scratch = Vec::with_capacity(data.len() + DEFLATE_SLACK);
    let mut encoder = ZlibEncoder::new(scratch, Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Inflate a buffer that must decompress to exactly `expected_len` bytes.
///
/// Any inflate failure or size mismatch is a connection-fatal integrity
/// fault: a partially recovered event buffer cannot be interpreted.
pub fn inflate_exact(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len);
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| WireError::Integrity(format!("event buffer inflate failed: {e}")))?;
    if out.len() != expected_len {
        return Err(WireError::Integrity(format!(
            "decompressed size {} does not match declared size {}",
            out.len(),
            expected_len
        )));
    }
    Ok(out)
}
