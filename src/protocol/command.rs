//! Command envelope: one variant per complex command kind, plus the bare
//! simple form that carries nothing but its type code.
//!
//! Encode order within each payload struct is the wire order. Per-variant
//! handling of the bootstrap-loader sentinel (`-1`) is deliberate and
//! inconsistent across variants: it mirrors the call-site semantics of the
//! original agent and must not be unified.
//!
//! - [`ClassLoadedCommand`] transmits `-1` untouched.
//! - [`MethodLoadedCommand`], [`GetDefiningClassLoaderCommand`] and
//!   [`GetClassIdCommand`] normalize `-1` to `0` at decode time.
//! - [`RootClassLoadedCommand`] and the shared method-group record normalize
//!   `-1` to `0` at encode time.

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::codec::{self, compress};
use crate::error::{Result, WireError};
use crate::protocol::method_group::{InstrMethodGroup, BOOTSTRAP_LOADER_SENTINEL};
use crate::protocol::registry::{self, commands};

/// Announces a class load in the target VM, with the class file bytes so the
/// client-side instrumentation engine can decide what to rewrite.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLoadedCommand {
    pub class_name: String,
    /// This loader id, parent loader id and loading-thread id. The `-1`
    /// sentinel is transmitted as-is in this variant.
    pub loader_data: [i32; 3],
    /// Absent when the agent could not capture the bytes.
    pub class_file_bytes: Option<Vec<u8>>,
    pub thread_in_call_graph: bool,
}

/// Announces that an instrumented method body was loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodLoadedCommand {
    pub class_name: String,
    /// Normalized on decode: the bootstrap sentinel `-1` arrives as `0`.
    pub class_loader_id: i32,
    pub method_name: String,
    pub method_signature: String,
}

/// First invocation of an instrumented method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInvokedFirstTimeCommand {
    pub method_id: i32,
}

/// The initial class inventory sent once at session start.
#[derive(Debug, Clone, PartialEq)]
pub struct RootClassLoadedCommand {
    pub class_names: Vec<String>,
    /// Parallel to `class_names`; `-1` is written as `0` at encode time.
    pub class_loader_ids: Vec<i32>,
    /// Cached class file bytes, separately counted; slots may be absent.
    pub cached_class_file_bytes: Vec<Option<Vec<u8>>>,
    /// Array position is the loader id, value is its parent loader id.
    pub parent_loader_ids: Vec<i32>,
    pub event_buffer_file_name: String,
}

/// The profiling event buffer is full (or was force-dumped) and its contents
/// travel compressed inside this command.
#[derive(Debug, Clone, PartialEq)]
pub struct EventBufferDumpedCommand {
    /// Uncompressed buffer contents. Empty when a forced dump found no new
    /// events; the wire then carries a zero size and no compressed payload.
    pub buffer: Vec<u8>,
}

/// Instrument (or de-instrument) a group of methods.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentMethodGroupCommand {
    /// `None` is the "empty" group, encoded as subtype `-1`.
    pub group: Option<InstrMethodGroup>,
}

/// Kick off instrumentation for the given root classes.
#[derive(Debug, Clone, PartialEq)]
pub struct InitiateInstrumentationCommand {
    pub instr_type: i32,
    pub root_class_names: Vec<String>,
    pub instrument_spawned_threads: bool,
    pub start_profiling_points: bool,
}

/// Instrumentation parameters that may change mid-session.
#[derive(Debug, Clone, PartialEq)]
pub struct SetChangeableInstrParamsCommand {
    pub lock_contention_monitoring: bool,
    pub n_profiled_threads_limit: i32,
    pub stack_depth_limit: i32,
    pub sampling_interval: i32,
    pub obj_alloc_stack_sampling_interval: i32,
    pub obj_alloc_stack_sampling_depth: i32,
    pub run_gc_on_get_results: bool,
    pub wait_tracking: bool,
    pub sleep_tracking: bool,
    pub threads_sampling: bool,
}

/// Instrumentation parameters fixed for the whole session.
#[derive(Debug, Clone, PartialEq)]
pub struct SetUnchangeableInstrParamsCommand {
    pub remote_profiling: bool,
    pub absolute_timer: bool,
    pub thread_cpu_timer: bool,
    pub instr_scheme: i32,
    pub code_region_cpu_res_buf_size: i32,
}

/// Resolve jmethodIds into method names.
#[derive(Debug, Clone, PartialEq)]
pub struct GetMethodNamesForJMethodIdsCommand {
    pub method_ids: Vec<i32>,
}

/// Ask the peer which loader defines a class.
#[derive(Debug, Clone, PartialEq)]
pub struct GetDefiningClassLoaderCommand {
    pub class_name: String,
    /// Normalized on decode: `-1` arrives as `0`.
    pub class_loader_id: i32,
}

/// Ask the client for the id of a class it tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct GetClassIdCommand {
    pub class_name: String,
    /// Normalized on decode: `-1` arrives as `0`.
    pub class_loader_id: i32,
}

/// Dump the heap to the given file on the agent side.
#[derive(Debug, Clone, PartialEq)]
pub struct TakeHeapDumpCommand {
    pub output_file: String,
}

/// Request class file bytes for a set of (class, loader) pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct GetClassFileBytesCommand {
    pub class_names: Vec<String>,
    pub class_loader_ids: Vec<i32>,
}

/// A command envelope.
///
/// Simple commands have no subtype: they are a bare type code, and unknown
/// codes on the simple path pass through undecoded (the peer pair is matched,
/// so strictness buys nothing there; complex decode stays strict).
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A command fully described by its type code.
    Simple(u8),
    ClassLoaded(ClassLoadedCommand),
    MethodLoaded(MethodLoadedCommand),
    MethodInvokedFirstTime(MethodInvokedFirstTimeCommand),
    RootClassLoaded(RootClassLoadedCommand),
    EventBufferDumped(EventBufferDumpedCommand),
    InstrumentMethodGroup(InstrumentMethodGroupCommand),
    InitiateInstrumentation(InitiateInstrumentationCommand),
    SetChangeableInstrParams(SetChangeableInstrParamsCommand),
    SetUnchangeableInstrParams(SetUnchangeableInstrParamsCommand),
    GetMethodNamesForJMethodIds(GetMethodNamesForJMethodIdsCommand),
    GetDefiningClassLoader(GetDefiningClassLoaderCommand),
    GetClassId(GetClassIdCommand),
    TakeHeapDump(TakeHeapDumpCommand),
    GetClassFileBytes(GetClassFileBytesCommand),
}

impl Command {
    /// The wire type code of this command.
    pub fn type_code(&self) -> u8 {
        match self {
            Command::Simple(code) => *code,
            Command::ClassLoaded(_) => commands::CLASS_LOADED,
            Command::MethodLoaded(_) => commands::METHOD_LOADED,
            Command::MethodInvokedFirstTime(_) => commands::METHOD_INVOKED_FIRST_TIME,
            Command::RootClassLoaded(_) => commands::ROOT_CLASS_LOADED,
            Command::EventBufferDumped(_) => commands::EVENT_BUFFER_DUMPED,
            Command::InstrumentMethodGroup(_) => commands::INSTRUMENT_METHOD_GROUP,
            Command::InitiateInstrumentation(_) => commands::INITIATE_INSTRUMENTATION,
            Command::SetChangeableInstrParams(_) => commands::SET_CHANGEABLE_INSTR_PARAMS,
            Command::SetUnchangeableInstrParams(_) => commands::SET_UNCHANGEABLE_INSTR_PARAMS,
            Command::GetMethodNamesForJMethodIds(_) => commands::GET_METHOD_NAMES_FOR_JMETHOD_IDS,
            Command::GetDefiningClassLoader(_) => commands::GET_DEFINING_CLASS_LOADER,
            Command::GetClassId(_) => commands::GET_CLASSID,
            Command::TakeHeapDump(_) => commands::TAKE_HEAP_DUMP,
            Command::GetClassFileBytes(_) => commands::GET_CLASS_FILE_BYTES,
        }
    }

    /// Whether this command takes the simple framing path.
    pub fn is_simple(&self) -> bool {
        matches!(self, Command::Simple(_))
    }

    /// Debug name of this command's type code.
    pub fn name(&self) -> &'static str {
        registry::command_name(self.type_code())
    }

    /// Encode the subtype-specific payload. Simple commands contribute
    /// nothing beyond their type code.
    pub(crate) fn encode_payload(&self, buf: &mut BytesMut) -> Result<()> {
        match self {
            Command::Simple(_) => Ok(()),
            Command::ClassLoaded(c) => c.encode(buf),
            Command::MethodLoaded(c) => c.encode(buf),
            Command::MethodInvokedFirstTime(c) => {
                buf.put_i32(c.method_id);
                Ok(())
            }
            Command::RootClassLoaded(c) => c.encode(buf),
            Command::EventBufferDumped(c) => c.encode(buf),
            Command::InstrumentMethodGroup(c) => InstrMethodGroup::encode_opt(c.group.as_ref(), buf),
            Command::InitiateInstrumentation(c) => c.encode(buf),
            Command::SetChangeableInstrParams(c) => {
                codec::put_bool(buf, c.lock_contention_monitoring);
                buf.put_i32(c.n_profiled_threads_limit);
                buf.put_i32(c.stack_depth_limit);
                buf.put_i32(c.sampling_interval);
                buf.put_i32(c.obj_alloc_stack_sampling_interval);
                buf.put_i32(c.obj_alloc_stack_sampling_depth);
                codec::put_bool(buf, c.run_gc_on_get_results);
                codec::put_bool(buf, c.wait_tracking);
                codec::put_bool(buf, c.sleep_tracking);
                codec::put_bool(buf, c.threads_sampling);
                Ok(())
            }
            Command::SetUnchangeableInstrParams(c) => {
                codec::put_bool(buf, c.remote_profiling);
                codec::put_bool(buf, c.absolute_timer);
                codec::put_bool(buf, c.thread_cpu_timer);
                buf.put_i32(c.instr_scheme);
                buf.put_i32(c.code_region_cpu_res_buf_size);
                Ok(())
            }
            Command::GetMethodNamesForJMethodIds(c) => {
                codec::put_count(buf, c.method_ids.len());
                for &id in &c.method_ids {
                    buf.put_i32(id);
                }
                Ok(())
            }
            Command::GetDefiningClassLoader(c) => {
                codec::put_utf(buf, &c.class_name)?;
                buf.put_i32(c.class_loader_id);
                Ok(())
            }
            Command::GetClassId(c) => {
                codec::put_utf(buf, &c.class_name)?;
                buf.put_i32(c.class_loader_id);
                Ok(())
            }
            Command::TakeHeapDump(c) => codec::put_utf(buf, &c.output_file),
            Command::GetClassFileBytes(c) => c.encode(buf),
        }
    }

    /// Decode the payload of a complex command, selected by its type code.
    ///
    /// This match and the registry are the single point that must stay in
    /// sync when a message kind is added; the compiler enforces the envelope
    /// side through the enum.
    pub(crate) async fn decode_complex<R: AsyncRead + Unpin>(
        code: u8,
        r: &mut R,
    ) -> Result<Command> {
        match code {
            commands::CLASS_LOADED => Ok(Command::ClassLoaded(ClassLoadedCommand::decode(r).await?)),
            commands::METHOD_LOADED => {
                Ok(Command::MethodLoaded(MethodLoadedCommand::decode(r).await?))
            }
            commands::METHOD_INVOKED_FIRST_TIME => Ok(Command::MethodInvokedFirstTime(
                MethodInvokedFirstTimeCommand {
                    method_id: r.read_i32().await?,
                },
            )),
            commands::ROOT_CLASS_LOADED => Ok(Command::RootClassLoaded(
                RootClassLoadedCommand::decode(r).await?,
            )),
            commands::EVENT_BUFFER_DUMPED => Ok(Command::EventBufferDumped(
                EventBufferDumpedCommand::decode(r).await?,
            )),
            commands::INSTRUMENT_METHOD_GROUP => Ok(Command::InstrumentMethodGroup(
                InstrumentMethodGroupCommand {
                    group: InstrMethodGroup::decode_opt(r).await?,
                },
            )),
            commands::INITIATE_INSTRUMENTATION => Ok(Command::InitiateInstrumentation(
                InitiateInstrumentationCommand::decode(r).await?,
            )),
            commands::SET_CHANGEABLE_INSTR_PARAMS => Ok(Command::SetChangeableInstrParams(
                SetChangeableInstrParamsCommand {
                    lock_contention_monitoring: codec::read_bool(r).await?,
                    n_profiled_threads_limit: r.read_i32().await?,
                    stack_depth_limit: r.read_i32().await?,
                    sampling_interval: r.read_i32().await?,
                    obj_alloc_stack_sampling_interval: r.read_i32().await?,
                    obj_alloc_stack_sampling_depth: r.read_i32().await?,
                    run_gc_on_get_results: codec::read_bool(r).await?,
                    wait_tracking: codec::read_bool(r).await?,
                    sleep_tracking: codec::read_bool(r).await?,
                    threads_sampling: codec::read_bool(r).await?,
                },
            )),
            commands::SET_UNCHANGEABLE_INSTR_PARAMS => Ok(Command::SetUnchangeableInstrParams(
                SetUnchangeableInstrParamsCommand {
                    remote_profiling: codec::read_bool(r).await?,
                    absolute_timer: codec::read_bool(r).await?,
                    thread_cpu_timer: codec::read_bool(r).await?,
                    instr_scheme: r.read_i32().await?,
                    code_region_cpu_res_buf_size: r.read_i32().await?,
                },
            )),
            commands::GET_METHOD_NAMES_FOR_JMETHOD_IDS => {
                let n = codec::read_count(r).await?;
                Ok(Command::GetMethodNamesForJMethodIds(
                    GetMethodNamesForJMethodIdsCommand {
                        method_ids: codec::read_i32_vec(r, n).await?,
                    },
                ))
            }
            commands::GET_DEFINING_CLASS_LOADER => {
                let class_name = codec::read_utf(r).await?;
                let class_loader_id = normalize_loader_id(r.read_i32().await?);
                Ok(Command::GetDefiningClassLoader(GetDefiningClassLoaderCommand {
                    class_name,
                    class_loader_id,
                }))
            }
            commands::GET_CLASSID => {
                let class_name = codec::read_utf(r).await?;
                let class_loader_id = normalize_loader_id(r.read_i32().await?);
                Ok(Command::GetClassId(GetClassIdCommand {
                    class_name,
                    class_loader_id,
                }))
            }
            commands::TAKE_HEAP_DUMP => Ok(Command::TakeHeapDump(TakeHeapDumpCommand {
                output_file: codec::read_utf(r).await?,
            })),
            commands::GET_CLASS_FILE_BYTES => Ok(Command::GetClassFileBytes(
                GetClassFileBytesCommand::decode(r).await?,
            )),
            other => Err(WireError::UnknownCommandType(other)),
        }
    }
}

/// Decode-side bootstrap-loader normalization, for the variants that apply it.
fn normalize_loader_id(id: i32) -> i32 {
    if id == BOOTSTRAP_LOADER_SENTINEL {
        0
    } else {
        id
    }
}

impl ClassLoadedCommand {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        codec::put_utf(buf, &self.class_name)?;
        for &v in &self.loader_data {
            buf.put_i32(v);
        }
        codec::put_opt_blob(buf, self.class_file_bytes.as_deref());
        codec::put_bool(buf, self.thread_in_call_graph);
        Ok(())
    }

    async fn decode<R: AsyncRead + Unpin>(r: &mut R) -> Result<Self> {
        let class_name = codec::read_utf(r).await?;
        let mut loader_data = [0i32; 3];
        for slot in &mut loader_data {
            *slot = r.read_i32().await?;
        }
        let class_file_bytes = codec::read_opt_blob(r).await?;
        let thread_in_call_graph = codec::read_bool(r).await?;
        Ok(Self {
            class_name,
            loader_data,
            class_file_bytes,
            thread_in_call_graph,
        })
    }
}

impl MethodLoadedCommand {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        codec::put_utf(buf, &self.class_name)?;
        buf.put_i32(self.class_loader_id);
        codec::put_utf(buf, &self.method_name)?;
        codec::put_utf(buf, &self.method_signature)
    }

    async fn decode<R: AsyncRead + Unpin>(r: &mut R) -> Result<Self> {
        Ok(Self {
            class_name: codec::read_utf(r).await?,
            class_loader_id: normalize_loader_id(r.read_i32().await?),
            method_name: codec::read_utf(r).await?,
            method_signature: codec::read_utf(r).await?,
        })
    }
}

impl RootClassLoadedCommand {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
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
        codec::put_count(buf, self.cached_class_file_bytes.len());
        for blob in &self.cached_class_file_bytes {
            codec::put_opt_blob(buf, blob.as_deref());
        }
        codec::put_count(buf, self.parent_loader_ids.len());
        for &id in &self.parent_loader_ids {
            buf.put_i32(id);
        }
        codec::put_utf(buf, &self.event_buffer_file_name)
    }

    async fn decode<R: AsyncRead + Unpin>(r: &mut R) -> Result<Self> {
        let n_classes = codec::read_count(r).await?;
        let class_names = codec::read_utf_vec(r, n_classes).await?;
        let class_loader_ids = codec::read_i32_vec(r, n_classes).await?;
        let n_cached = codec::read_count(r).await?;
        let mut cached_class_file_bytes = Vec::with_capacity(n_cached);
        for _ in 0..n_cached {
            cached_class_file_bytes.push(codec::read_opt_blob(r).await?);
        }
        let n_parents = codec::read_count(r).await?;
        let parent_loader_ids = codec::read_i32_vec(r, n_parents).await?;
        let event_buffer_file_name = codec::read_utf(r).await?;
        Ok(Self {
            class_names,
            class_loader_ids,
            cached_class_file_bytes,
            parent_loader_ids,
            event_buffer_file_name,
        })
    }
}

impl EventBufferDumpedCommand {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_i32(self.buffer.len() as i32);
        if self.buffer.is_empty() {
            codec::put_bool(buf, false);
            return Ok(());
        }
        codec::put_bool(buf, true);
        let compressed = compress::deflate(&self.buffer)?;
        buf.put_i32(compressed.len() as i32);
        buf.put_slice(&compressed);
        Ok(())
    }

    async fn decode<R: AsyncRead + Unpin>(r: &mut R) -> Result<Self> {
        let buf_size = codec::read_count(r).await?;
        let present = codec::read_bool(r).await?;
        if !present {
            if buf_size != 0 {
                return Err(WireError::Integrity(format!(
                    "event buffer declares {buf_size} bytes but carries no payload"
                )));
            }
            return Ok(Self { buffer: Vec::new() });
        }
        let compressed_len = codec::read_count(r).await?;
        let compressed = codec::read_exact_vec(r, compressed_len).await?;
        let buffer = compress::inflate_exact(&compressed, buf_size)?;
        Ok(Self { buffer })
    }
}

impl InitiateInstrumentationCommand {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_i32(self.instr_type);
        codec::put_count(buf, self.root_class_names.len());
        for name in &self.root_class_names {
            codec::put_utf(buf, name)?;
        }
        codec::put_bool(buf, self.instrument_spawned_threads);
        codec::put_bool(buf, self.start_profiling_points);
        Ok(())
    }

    async fn decode<R: AsyncRead + Unpin>(r: &mut R) -> Result<Self> {
        let instr_type = r.read_i32().await?;
        let n = codec::read_count(r).await?;
        let root_class_names = codec::read_utf_vec(r, n).await?;
        Ok(Self {
            instr_type,
            root_class_names,
            instrument_spawned_threads: codec::read_bool(r).await?,
            start_profiling_points: codec::read_bool(r).await?,
        })
    }
}

impl GetClassFileBytesCommand {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        if self.class_loader_ids.len() != self.class_names.len() {
            return Err(WireError::Integrity(format!(
                "class name / loader id length mismatch: {} vs {}",
                self.class_names.len(),
                self.class_loader_ids.len()
            )));
        }
        codec::put_count(buf, self.class_names.len());
        for (name, &id) in self.class_names.iter().zip(&self.class_loader_ids) {
            codec::put_utf(buf, name)?;
            buf.put_i32(id);
        }
        Ok(())
    }

    async fn decode<R: AsyncRead + Unpin>(r: &mut R) -> Result<Self> {
        let n = codec::read_count(r).await?;
        let mut class_names = Vec::with_capacity(n);
        let mut class_loader_ids = Vec::with_capacity(n);
        for _ in 0..n {
            class_names.push(codec::read_utf(r).await?);
            class_loader_ids.push(r.read_i32().await?);
        }
        Ok(Self {
            class_names,
            class_loader_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn roundtrip(cmd: Command) -> Command {
        let mut buf = BytesMut::new();
        cmd.encode_payload(&mut buf).unwrap();
        let code = cmd.type_code();
        let mut cursor = std::io::Cursor::new(buf.to_vec());
        Command::decode_complex(code, &mut cursor).await.unwrap()
    }

    #[tokio::test]
    async fn test_class_loaded_roundtrip_keeps_sentinel() {
        let pattern: Vec<u8> = (0..200).map(|i| (i * 7) as u8).collect();
        let cmd = Command::ClassLoaded(ClassLoadedCommand {
            class_name: "com.example.Foo".into(),
            loader_data: [5, 3, 3],
            class_file_bytes: Some(pattern.clone()),
            thread_in_call_graph: true,
        });
        match roundtrip(cmd.clone()).await {
            Command::ClassLoaded(decoded) => {
                assert_eq!(decoded.class_name, "com.example.Foo");
                assert_eq!(decoded.loader_data, [5, 3, 3]);
                assert_eq!(decoded.class_file_bytes, Some(pattern));
                assert!(decoded.thread_in_call_graph);
            }
            other => panic!("wrong variant: {other:?}"),
        }

        // -1 survives this variant unchanged
        let cmd = Command::ClassLoaded(ClassLoadedCommand {
            class_name: "B".into(),
            loader_data: [-1, -1, 0],
            class_file_bytes: None,
            thread_in_call_graph: false,
        });
        match roundtrip(cmd).await {
            Command::ClassLoaded(decoded) => {
                assert_eq!(decoded.loader_data, [-1, -1, 0]);
                assert_eq!(decoded.class_file_bytes, None);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_method_loaded_normalizes_on_decode() {
        let cmd = Command::MethodLoaded(MethodLoadedCommand {
            class_name: "com.example.Foo".into(),
            class_loader_id: -1,
            method_name: "run".into(),
            method_signature: "()V".into(),
        });
        match roundtrip(cmd).await {
            Command::MethodLoaded(decoded) => assert_eq!(decoded.class_loader_id, 0),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_root_class_loaded_normalizes_on_encode() {
        let cmd = Command::RootClassLoaded(RootClassLoadedCommand {
            class_names: vec!["A".into(), "B".into()],
            class_loader_ids: vec![-1, 7],
            cached_class_file_bytes: vec![None, Some(vec![1, 2, 3])],
            parent_loader_ids: vec![0, 0, 1],
            event_buffer_file_name: "/tmp/evbuf".into(),
        });
        match roundtrip(cmd).await {
            Command::RootClassLoaded(decoded) => {
                assert_eq!(decoded.class_loader_ids, vec![0, 7]);
                assert_eq!(decoded.cached_class_file_bytes, vec![None, Some(vec![1, 2, 3])]);
                assert_eq!(decoded.parent_loader_ids, vec![0, 0, 1]);
                assert_eq!(decoded.event_buffer_file_name, "/tmp/evbuf");
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_event_buffer_roundtrip() {
        for size in [0usize, 1, 255, 4096, 1024 * 1024] {
            let buffer: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
            let cmd = Command::EventBufferDumped(EventBufferDumpedCommand {
                buffer: buffer.clone(),
            });
            match roundtrip(cmd).await {
                Command::EventBufferDumped(decoded) => assert_eq!(decoded.buffer, buffer),
                other => panic!("wrong variant: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_event_buffer_size_without_payload_is_fault() {
        let mut buf = BytesMut::new();
        buf.put_i32(100); // declares 100 bytes
        buf.put_u8(0); // but nothing follows
        let mut cursor = std::io::Cursor::new(buf.to_vec());
        assert!(matches!(
            Command::decode_complex(commands::EVENT_BUFFER_DUMPED, &mut cursor).await,
            Err(WireError::Integrity(_))
        ));
    }

    #[tokio::test]
    async fn test_get_class_file_bytes_empty_request() {
        let cmd = Command::GetClassFileBytes(GetClassFileBytesCommand {
            class_names: vec![],
            class_loader_ids: vec![],
        });
        match roundtrip(cmd).await {
            Command::GetClassFileBytes(decoded) => {
                assert!(decoded.class_names.is_empty());
                assert!(decoded.class_loader_ids.is_empty());
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_instrument_method_group_empty() {
        let cmd = Command::InstrumentMethodGroup(InstrumentMethodGroupCommand { group: None });
        match roundtrip(cmd).await {
            Command::InstrumentMethodGroup(decoded) => assert_eq!(decoded.group, None),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_instr_params_roundtrip() {
        let cmd = Command::SetChangeableInstrParams(SetChangeableInstrParamsCommand {
            lock_contention_monitoring: true,
            n_profiled_threads_limit: 32,
            stack_depth_limit: 100,
            sampling_interval: 10,
            obj_alloc_stack_sampling_interval: 5,
            obj_alloc_stack_sampling_depth: -5,
            run_gc_on_get_results: false,
            wait_tracking: true,
            sleep_tracking: false,
            threads_sampling: true,
        });
        assert_eq!(roundtrip(cmd.clone()).await, cmd);

        let cmd = Command::SetUnchangeableInstrParams(SetUnchangeableInstrParamsCommand {
            remote_profiling: false,
            absolute_timer: true,
            thread_cpu_timer: false,
            instr_scheme: 2,
            code_region_cpu_res_buf_size: 1000,
        });
        assert_eq!(roundtrip(cmd.clone()).await, cmd);
    }

    #[tokio::test]
    async fn test_initiate_instrumentation_roundtrip() {
        let cmd = Command::InitiateInstrumentation(InitiateInstrumentationCommand {
            instr_type: 3,
            root_class_names: vec!["com.example.Main".into(), "com.example.Worker".into()],
            instrument_spawned_threads: true,
            start_profiling_points: false,
        });
        assert_eq!(roundtrip(cmd.clone()).await, cmd);

        let empty = Command::InitiateInstrumentation(InitiateInstrumentationCommand {
            instr_type: -1,
            root_class_names: vec![],
            instrument_spawned_threads: false,
            start_profiling_points: true,
        });
        assert_eq!(roundtrip(empty.clone()).await, empty);
    }

    #[tokio::test]
    async fn test_get_method_names_roundtrip() {
        let cmd = Command::GetMethodNamesForJMethodIds(GetMethodNamesForJMethodIdsCommand {
            method_ids: vec![1, i32::MAX, -7],
        });
        assert_eq!(roundtrip(cmd.clone()).await, cmd);

        let empty = Command::GetMethodNamesForJMethodIds(GetMethodNamesForJMethodIdsCommand {
            method_ids: vec![],
        });
        assert_eq!(roundtrip(empty.clone()).await, empty);
    }

    #[tokio::test]
    async fn test_get_defining_class_loader_normalizes_on_decode() {
        let cmd = Command::GetDefiningClassLoader(GetDefiningClassLoaderCommand {
            class_name: "com.example.Foo".into(),
            class_loader_id: -1,
        });
        match roundtrip(cmd).await {
            Command::GetDefiningClassLoader(decoded) => {
                assert_eq!(decoded.class_name, "com.example.Foo");
                assert_eq!(decoded.class_loader_id, 0);
            }
            other => panic!("wrong variant: {other:?}"),
        }

        // non-sentinel ids survive unchanged
        let cmd = Command::GetDefiningClassLoader(GetDefiningClassLoaderCommand {
            class_name: "com.example.Foo".into(),
            class_loader_id: 8,
        });
        assert_eq!(roundtrip(cmd.clone()).await, cmd);
    }

    #[tokio::test]
    async fn test_get_class_id_normalizes_on_decode() {
        let cmd = Command::GetClassId(GetClassIdCommand {
            class_name: "com.example.Bar".into(),
            class_loader_id: -1,
        });
        match roundtrip(cmd).await {
            Command::GetClassId(decoded) => assert_eq!(decoded.class_loader_id, 0),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_take_heap_dump_roundtrip() {
        let cmd = Command::TakeHeapDump(TakeHeapDumpCommand {
            output_file: "/tmp/heap.hprof".into(),
        });
        assert_eq!(roundtrip(cmd.clone()).await, cmd);
    }

    #[test]
    fn test_root_class_loaded_mismatched_loader_ids_rejected() {
        let cmd = Command::RootClassLoaded(RootClassLoadedCommand {
            class_names: vec!["A".into(), "B".into()],
            class_loader_ids: vec![1],
            cached_class_file_bytes: vec![],
            parent_loader_ids: vec![],
            event_buffer_file_name: String::new(),
        });
        let mut buf = BytesMut::new();
        assert!(matches!(
            cmd.encode_payload(&mut buf),
            Err(WireError::Integrity(_))
        ));
    }

    #[test]
    fn test_get_class_file_bytes_mismatched_lengths_rejected() {
        let cmd = Command::GetClassFileBytes(GetClassFileBytesCommand {
            class_names: vec!["A".into()],
            class_loader_ids: vec![1, 2],
        });
        let mut buf = BytesMut::new();
        assert!(matches!(
            cmd.encode_payload(&mut buf),
            Err(WireError::Integrity(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_complex_code_is_typed_fault() {
        let mut cursor = std::io::Cursor::new(Vec::new());
        match Command::decode_complex(199, &mut cursor).await {
            Err(WireError::UnknownCommandType(code)) => assert_eq!(code, 199),
            other => panic!("expected UnknownCommandType, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_command_name() {
        assert_eq!(Command::Simple(commands::RUN_GC).name(), "RunGc");
        assert_eq!(Command::Simple(250).name(), "Unknown command");
    }
}
