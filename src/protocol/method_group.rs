//! The instrumentation method-group payload shared by the
//! `InstrumentMethodGroup` command and its symmetrical response.
//!
//! Both owners compose this one unit instead of duplicating the field layout;
//! the bytes it produces are identical regardless of which direction carries
//! it.

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::codec;
use crate::error::{Result, WireError};

/// Bootstrap/system loader sentinel used by the agent.
pub(crate) const BOOTSTRAP_LOADER_SENTINEL: i32 = -1;

/// A method group: instrumentation subtype selector plus the shared payload.
///
/// An absent group (`Option::None` at the owner) is encoded as subtype `-1`
/// with nothing following; a present group never uses `-1` as its subtype.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrMethodGroup {
    /// Instrumentation subtype selector.
    pub instr_type: i32,
    /// The shared payload record.
    pub data: InstrMethodGroupData,
}

/// The nested composite record itself.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstrMethodGroupData {
    /// Classes whose methods are covered by this group.
    pub class_names: Vec<String>,
    /// Loader id per class, parallel to `class_names`. The bootstrap
    /// sentinel `-1` is written as `0` at encode time.
    pub class_loader_ids: Vec<i32>,
    /// Optional per-method leaf flags, gated by an explicit presence byte
    /// (not the zero-length convention).
    pub instr_method_leaf: Option<Vec<bool>>,
    /// Additional instrumentation info for this group.
    pub addl_info: i32,
    /// Optional replacement class-file bytes per class; a slot may be absent.
    pub replacement_class_file_bytes: Vec<Option<Vec<u8>>>,
}

impl InstrMethodGroupData {
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        if self.class_loader_ids.len() != self.class_names.len() {
            return Err(WireError::Integrity(format!(
                "class name / loader id length mismatch: {} vs {}",
                self.class_names.len(),
                self.class_loader_ids.len()
            )));
        }
        codec::put_count(buf, self.class_names.len());
        for name in &self.class_names {
            codec::put_utf(buf, name)?;
        }
        for &id in &self.class_loader_ids {
            buf.put_i32(if id == BOOTSTRAP_LOADER_SENTINEL { 0 } else { id });
        }
        match &self.instr_method_leaf {
            None => codec::put_bool(buf, false),
            Some(leaf) => {
                codec::put_bool(buf, true);
                codec::put_count(buf, leaf.len());
                for &flag in leaf {
                    codec::put_bool(buf, flag);
                }
            }
        }
        buf.put_i32(self.addl_info);
        codec::put_count(buf, self.replacement_class_file_bytes.len());
        for blob in &self.replacement_class_file_bytes {
            codec::put_opt_blob(buf, blob.as_deref());
        }
        Ok(())
    }

    pub(crate) async fn decode<R: AsyncRead + Unpin>(r: &mut R) -> Result<Self> {
        let n_classes = codec::read_count(r).await?;
        let class_names = codec::read_utf_vec(r, n_classes).await?;
        let class_loader_ids = codec::read_i32_vec(r, n_classes).await?;
        let instr_method_leaf = if codec::read_bool(r).await? {
            let n = codec::read_count(r).await?;
            let mut leaf = Vec::with_capacity(n);
            for _ in 0..n {
                leaf.push(codec::read_bool(r).await?);
            }
            Some(leaf)
        } else {
            None
        };
        let addl_info = r.read_i32().await?;
        let n_blobs = codec::read_count(r).await?;
        let mut replacement_class_file_bytes = Vec::with_capacity(n_blobs);
        for _ in 0..n_blobs {
            replacement_class_file_bytes.push(codec::read_opt_blob(r).await?);
        }
        Ok(Self {
            class_names,
            class_loader_ids,
            instr_method_leaf,
            addl_info,
            replacement_class_file_bytes,
        })
    }
}

impl InstrMethodGroup {
    /// Encode an optional group: `None` becomes the `-1` "empty" selector.
    pub(crate) fn encode_opt(group: Option<&InstrMethodGroup>, buf: &mut BytesMut) -> Result<()> {
        match group {
            None => {
                buf.put_i32(-1);
                Ok(())
            }
            Some(g) => {
                buf.put_i32(g.instr_type);
                g.data.encode(buf)
            }
        }
    }

    pub(crate) async fn decode_opt<R: AsyncRead + Unpin>(
        r: &mut R,
    ) -> Result<Option<InstrMethodGroup>> {
        let instr_type = r.read_i32().await?;
        if instr_type == -1 {
            return Ok(None);
        }
        let data = InstrMethodGroupData::decode(r).await?;
        Ok(Some(InstrMethodGroup { instr_type, data }))
    }
}
