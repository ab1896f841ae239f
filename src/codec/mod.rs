//! Primitive wire encode/decode helpers.
//!
//! The write side operates on an in-memory [`BytesMut`]: a frame is always
//! assembled completely before it is handed to the transport, so that the
//! writer mutex is held only for the actual write. The read side pulls
//! straight from the transport reader with the big-endian primitives from
//! [`AsyncReadExt`].
//!
//! Conventions (fixed by the protocol, not negotiable per field):
//!
//! - Strings: 2-byte big-endian byte-length prefix + UTF-8 bytes.
//! - Optional byte blobs: 4-byte length, `0` means absent, except for the
//!   fields that carry an explicit presence byte (event-buffer payload,
//!   method-group leaf array), which the owning variants encode themselves.
//! - Variable-length arrays: leading 4-byte signed count.
//! - Fixed-size arrays: no length on the wire at all.

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Result, WireError};

pub mod compress;

/// Maximum encoded byte length of a string field (2-byte length prefix).
pub const MAX_UTF_LEN: usize = u16::MAX as usize;

/// Write a length-prefixed UTF-8 string.
pub fn put_utf(buf: &mut BytesMut, s: &str) -> Result<()> {
    let bytes = s.as_bytes();
    if bytes.len() > MAX_UTF_LEN {
        return Err(WireError::StringTooLong(bytes.len()));
    }
    buf.put_u16(bytes.len() as u16);
    buf.put_slice(bytes);
    Ok(())
}

/// Write a 1-byte boolean (nonzero = true).
pub fn put_bool(buf: &mut BytesMut, v: bool) {
    buf.put_u8(v as u8);
}

/// Write an optional byte blob with the "length 0 means absent" convention.
///
/// An empty blob is indistinguishable from an absent one on the wire; callers
/// model such fields as `Option<Vec<u8>>` and never as an empty vector.
pub fn put_opt_blob(buf: &mut BytesMut, blob: Option<&[u8]>) {
    match blob {
        None => buf.put_i32(0),
        Some(b) => {
            buf.put_i32(b.len() as i32);
            buf.put_slice(b);
        }
    }
}

/// Write a leading 4-byte count for a variable-length array.
pub fn put_count(buf: &mut BytesMut, n: usize) {
    buf.put_i32(n as i32);
}

/// Read a length-prefixed UTF-8 string.
pub async fn read_utf<R: AsyncRead + Unpin>(r: &mut R) -> Result<String> {
    let len = r.read_u16().await? as usize;
    let mut bytes = vec![0u8; len];
    r.read_exact(&mut bytes).await?;
    String::from_utf8(bytes)
        .map_err(|e| WireError::Integrity(format!("invalid UTF-8 in string field: {e}")))
}

/// Read a 1-byte boolean.
pub async fn read_bool<R: AsyncRead + Unpin>(r: &mut R) -> Result<bool> {
    Ok(r.read_u8().await? != 0)
}

/// Read a 4-byte array count. Negative counts are malformed.
pub async fn read_count<R: AsyncRead + Unpin>(r: &mut R) -> Result<usize> {
    let n = r.read_i32().await?;
    if n < 0 {
        return Err(WireError::Integrity(format!("negative array count: {n}")));
    }
    Ok(n as usize)
}

/// Read exactly `len` raw bytes.
pub async fn read_exact_vec<R: AsyncRead + Unpin>(r: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; len];
    r.read_exact(&mut bytes).await?;
    Ok(bytes)
}

/// Read an optional byte blob ("length 0 means absent").
pub async fn read_opt_blob<R: AsyncRead + Unpin>(r: &mut R) -> Result<Option<Vec<u8>>> {
    let len = read_count(r).await?;
    if len == 0 {
        return Ok(None);
    }
    Ok(Some(read_exact_vec(r, len).await?))
}

/// Read `n` big-endian i32 values.
pub async fn read_i32_vec<R: AsyncRead + Unpin>(r: &mut R, n: usize) -> Result<Vec<i32>> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(r.read_i32().await?);
    }
    Ok(out)
}

/// Read `n` big-endian i64 values.
pub async fn read_i64_vec<R: AsyncRead + Unpin>(r: &mut R, n: usize) -> Result<Vec<i64>> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(r.read_i64().await?);
    }
    Ok(out)
}

/// Read `n` big-endian f64 values.
pub async fn read_f64_vec<R: AsyncRead + Unpin>(r: &mut R, n: usize) -> Result<Vec<f64>> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(r.read_f64().await?);
    }
    Ok(out)
}

/// Read `n` length-prefixed UTF-8 strings.
pub async fn read_utf_vec<R: AsyncRead + Unpin>(r: &mut R, n: usize) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(read_utf(r).await?);
    }
    Ok(out)
}
