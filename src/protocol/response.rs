//! Response envelope: the common `{ok, error}` header plus an optional
//! subtype payload.
//!
//! The common header is owned by the framing layer, never by a payload
//! decoder: on the wire a complex response is `type code, ok, optional error
//! string, payload`. `ok` and `error_message` are transmitted independently;
//! consumers check them separately, so they are not collapsed into a single
//! tagged result even though `error_message.is_some()` conventionally implies
//! `!ok`.

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::codec;
use crate::error::{Result, WireError};
use crate::protocol::method_group::{InstrMethodGroup, BOOTSTRAP_LOADER_SENTINEL};
use crate::protocol::registry::{self, responses};

/// Timing results for a profiled code region.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeRegionCpuResultsResponse {
    pub results: Vec<i64>,
}

/// Packed method-name table for a set of jmethodIds.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodNamesResponse {
    pub packed_data: Vec<u8>,
    pub packed_array_offsets: Vec<i32>,
}

/// Per-thread liveness status bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadLivenessStatusResponse {
    pub status: Vec<u8>,
}

/// Periodic telemetry sample: VM-wide counters, per-thread states, newly
/// started threads and GC episode timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredNumbersResponse {
    /// Fixed-size block of VM-wide counters (heap, threads, GC, ...).
    pub general_numbers: [i64; GENERAL_NUMBERS_SIZE],
    pub thread_ids: Vec<i32>,
    pub thread_states: Vec<u8>,
    pub new_thread_ids: Vec<i32>,
    pub new_thread_names: Vec<String>,
    pub new_thread_class_names: Vec<String>,
    /// GC episode start timestamps; sorted ascending immediately after
    /// decode (the encoder is not required to pre-sort).
    pub gc_starts: Vec<i64>,
    /// GC episode finish timestamps; same sorting rule.
    pub gc_finishes: Vec<i64>,
}

/// Number of slots in the fixed general-numbers block.
pub const GENERAL_NUMBERS_SIZE: usize = 9;

/// Static properties of the target VM, captured once per session.
#[derive(Debug, Clone, PartialEq)]
pub struct VmPropertiesResponse {
    pub java_version: String,
    pub java_class_path: String,
    pub java_ext_dirs: String,
    pub boot_class_path: String,
    pub working_dir: String,
    pub jvm_arguments: String,
    pub jvm_flags: String,
    pub max_heap_size: i64,
    pub startup_time_millis: i64,
    pub startup_time_counts: i64,
}

/// Acknowledges a forced results dump with its absolute timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct DumpResultsResponse {
    pub dump_abs_timestamp: i64,
}

/// Instrumentation engine self-statistics, for the diagnostics panel.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalStatsResponse {
    pub n_total_instr_methods: i32,
    pub n_class_loads: i32,
    pub n_first_method_invocations: i32,
    pub n_non_empty_group_responses: i32,
    pub n_empty_group_responses: i32,
    pub n_single_method_group_responses: i32,
    pub client_instr_time: f64,
    pub client_data_proc_time: f64,
    pub total_hotswap_time: f64,
    pub avg_hotswap_time: f64,
    pub min_hotswap_time: f64,
    pub max_hotswap_time: f64,
    pub method_entry_exit_call_time: f64,
}

/// The loader that defines a class.
#[derive(Debug, Clone, PartialEq)]
pub struct DefiningLoaderResponse {
    /// Normalized on decode: the bootstrap sentinel `-1` arrives as `0`.
    pub loader_id: i32,
}

/// Instrumentation timing calibration data.
///
/// The three timing arrays always have the same length, which is written
/// once on the wire and implied for all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationDataResponse {
    pub method_entry_exit_call_time: Vec<f64>,
    pub method_entry_exit_inner_time: Vec<f64>,
    pub method_entry_exit_outer_time: Vec<f64>,
    pub timer_counts_in_second: [i64; 2],
}

/// Per-class allocated object counts.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectAllocationResultsResponse {
    pub results: Vec<i32>,
}

/// The client-tracked id for a class, `-1` when untracked (the `ok` flag of
/// the envelope mirrors whether the lookup succeeded).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassIdResponse {
    pub class_id: i32,
}

/// A heap histogram snapshot. Class names are interned across snapshots:
/// only names not sent before travel in `new_names`/`new_ids`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeapHistogramResponse {
    pub time_millis: i64,
    pub new_names: Vec<String>,
    pub new_ids: Vec<i32>,
    pub ids: Vec<i32>,
    pub instances: Vec<i64>,
    pub bytes: Vec<i64>,
}

/// Class file bytes for a previous [`GetClassFileBytes`] request, one
/// optional blob per requested class, in request order.
///
/// [`GetClassFileBytes`]: crate::protocol::command::GetClassFileBytesCommand
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFileBytesResponse {
    pub class_bytes: Vec<Option<Vec<u8>>>,
}

/// Follow-up instrumentation produced in answer to a class-load event;
/// shares the method-group record with the command direction.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentMethodGroupResponse {
    /// `None` means "nothing to instrument", encoded as subtype `-1`.
    pub group: Option<InstrMethodGroup>,
}

/// Subtype payload of a response. `None` marks a simple response, which
/// carries only the common header and takes the simple framing path.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    None,
    CodeRegionCpuResults(CodeRegionCpuResultsResponse),
    MethodNames(MethodNamesResponse),
    ThreadLivenessStatus(ThreadLivenessStatusResponse),
    MonitoredNumbers(MonitoredNumbersResponse),
    VmProperties(VmPropertiesResponse),
    DumpResults(DumpResultsResponse),
    InternalStats(InternalStatsResponse),
    DefiningLoader(DefiningLoaderResponse),
    CalibrationData(CalibrationDataResponse),
    ObjectAllocationResults(ObjectAllocationResultsResponse),
    ClassId(ClassIdResponse),
    HeapHistogram(HeapHistogramResponse),
    ClassFileBytes(ClassFileBytesResponse),
    InstrumentMethodGroup(InstrumentMethodGroupResponse),
}

/// A response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Success flag; transmitted independently of `error_message`.
    pub ok: bool,
    /// Optional error text; presence conventionally implies `!ok`, but the
    /// wire format never enforces that coupling.
    pub error_message: Option<String>,
    pub payload: ResponsePayload,
}

impl Response {
    /// A plain success acknowledgment.
    pub fn success() -> Self {
        Self::simple(true, None)
    }

    /// A simple response with the given header fields.
    pub fn simple(ok: bool, error_message: Option<String>) -> Self {
        Response {
            ok,
            error_message,
            payload: ResponsePayload::None,
        }
    }

    /// A successful complex response wrapping `payload`.
    pub fn complex(payload: ResponsePayload) -> Self {
        Response {
            ok: true,
            error_message: None,
            payload,
        }
    }

    /// Whether this response takes the simple framing path.
    pub fn is_simple(&self) -> bool {
        matches!(self.payload, ResponsePayload::None)
    }

    /// Debug name for diagnostics: the payload's registry name, or a fixed
    /// label for simple responses.
    pub fn name(&self) -> &'static str {
        match self.payload.type_code() {
            Some(code) => registry::response_name(code),
            None => "SimpleResponse",
        }
    }
}

impl ResponsePayload {
    /// The wire type code, or `None` for the simple form.
    pub fn type_code(&self) -> Option<u8> {
        match self {
            ResponsePayload::None => None,
            ResponsePayload::CodeRegionCpuResults(_) => Some(responses::CODE_REGION_CPU_RESULTS),
            ResponsePayload::MethodNames(_) => Some(responses::METHOD_NAMES),
            ResponsePayload::ThreadLivenessStatus(_) => Some(responses::THREAD_LIVENESS_STATUS),
            ResponsePayload::MonitoredNumbers(_) => Some(responses::MONITORED_NUMBERS),
            ResponsePayload::VmProperties(_) => Some(responses::VM_PROPERTIES),
            ResponsePayload::DumpResults(_) => Some(responses::DUMP_RESULTS),
            ResponsePayload::InternalStats(_) => Some(responses::INTERNAL_STATS),
            ResponsePayload::DefiningLoader(_) => Some(responses::DEFINING_LOADER),
            ResponsePayload::CalibrationData(_) => Some(responses::CALIBRATION_DATA),
            ResponsePayload::ObjectAllocationResults(_) => {
                Some(responses::OBJECT_ALLOCATION_RESULTS)
            }
            ResponsePayload::ClassId(_) => Some(responses::CLASS_ID),
            ResponsePayload::HeapHistogram(_) => Some(responses::HEAP_HISTOGRAM),
            ResponsePayload::ClassFileBytes(_) => Some(responses::CLASS_FILE_BYTES),
            ResponsePayload::InstrumentMethodGroup(_) => Some(responses::INSTRUMENT_METHOD_GROUP),
        }
    }

    /// Encode the subtype-specific fields (everything after the common
    /// header).
    pub(crate) fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        match self {
            ResponsePayload::None => Ok(()),
            ResponsePayload::CodeRegionCpuResults(p) => {
                codec::put_count(buf, p.results.len());
                for &v in &p.results {
                    buf.put_i64(v);
                }
                Ok(())
            }
            ResponsePayload::MethodNames(p) => {
                codec::put_count(buf, p.packed_data.len());
                buf.put_slice(&p.packed_data);
                codec::put_count(buf, p.packed_array_offsets.len());
                for &v in &p.packed_array_offsets {
                    buf.put_i32(v);
                }
                Ok(())
            }
            ResponsePayload::ThreadLivenessStatus(p) => {
                codec::put_count(buf, p.status.len());
                buf.put_slice(&p.status);
                Ok(())
            }
            ResponsePayload::MonitoredNumbers(p) => p.encode(buf),
            ResponsePayload::VmProperties(p) => {
                codec::put_utf(buf, &p.java_version)?;
                codec::put_utf(buf, &p.java_class_path)?;
                codec::put_utf(buf, &p.java_ext_dirs)?;
                codec::put_utf(buf, &p.boot_class_path)?;
                codec::put_utf(buf, &p.working_dir)?;
                codec::put_utf(buf, &p.jvm_arguments)?;
                codec::put_utf(buf, &p.jvm_flags)?;
                buf.put_i64(p.max_heap_size);
                buf.put_i64(p.startup_time_millis);
                buf.put_i64(p.startup_time_counts);
                Ok(())
            }
            ResponsePayload::DumpResults(p) => {
                buf.put_i64(p.dump_abs_timestamp);
                Ok(())
            }
            ResponsePayload::InternalStats(p) => {
                buf.put_i32(p.n_total_instr_methods);
                buf.put_i32(p.n_class_loads);
                buf.put_i32(p.n_first_method_invocations);
                buf.put_i32(p.n_non_empty_group_responses);
                buf.put_i32(p.n_empty_group_responses);
                buf.put_i32(p.n_single_method_group_responses);
                buf.put_f64(p.client_instr_time);
                buf.put_f64(p.client_data_proc_time);
                buf.put_f64(p.total_hotswap_time);
                buf.put_f64(p.avg_hotswap_time);
                buf.put_f64(p.min_hotswap_time);
                buf.put_f64(p.max_hotswap_time);
                buf.put_f64(p.method_entry_exit_call_time);
                Ok(())
            }
            ResponsePayload::DefiningLoader(p) => {
                buf.put_i32(p.loader_id);
                Ok(())
            }
            ResponsePayload::CalibrationData(p) => p.encode(buf),
            ResponsePayload::ObjectAllocationResults(p) => {
                codec::put_count(buf, p.results.len());
                for &v in &p.results {
                    buf.put_i32(v);
                }
                Ok(())
            }
            ResponsePayload::ClassId(p) => {
                buf.put_i32(p.class_id);
                Ok(())
            }
            ResponsePayload::HeapHistogram(p) => p.encode(buf),
            ResponsePayload::ClassFileBytes(p) => {
                codec::put_count(buf, p.class_bytes.len());
                for blob in &p.class_bytes {
                    codec::put_opt_blob(buf, blob.as_deref());
                }
                Ok(())
            }
            ResponsePayload::InstrumentMethodGroup(p) => {
                InstrMethodGroup::encode_opt(p.group.as_ref(), buf)
            }
        }
    }

    /// Decode the payload of a complex response, selected by its type code.
    pub(crate) async fn decode_complex<R: AsyncRead + Unpin>(
        code: u8,
        r: &mut R,
    ) -> Result<ResponsePayload> {
        match code {
            responses::CODE_REGION_CPU_RESULTS => {
                let n = codec::read_count(r).await?;
                Ok(ResponsePayload::CodeRegionCpuResults(
                    CodeRegionCpuResultsResponse {
                        results: codec::read_i64_vec(r, n).await?,
                    },
                ))
            }
            responses::METHOD_NAMES => {
                let data_len = codec::read_count(r).await?;
                let packed_data = codec::read_exact_vec(r, data_len).await?;
                let n_offsets = codec::read_count(r).await?;
                let packed_array_offsets = codec::read_i32_vec(r, n_offsets).await?;
                Ok(ResponsePayload::MethodNames(MethodNamesResponse {
                    packed_data,
                    packed_array_offsets,
                }))
            }
            responses::THREAD_LIVENESS_STATUS => {
                let n = codec::read_count(r).await?;
                Ok(ResponsePayload::ThreadLivenessStatus(
                    ThreadLivenessStatusResponse {
                        status: codec::read_exact_vec(r, n).await?,
                    },
                ))
            }
            responses::MONITORED_NUMBERS => Ok(ResponsePayload::MonitoredNumbers(
                MonitoredNumbersResponse::decode(r).await?,
            )),
            responses::VM_PROPERTIES => Ok(ResponsePayload::VmProperties(VmPropertiesResponse {
                java_version: codec::read_utf(r).await?,
                java_class_path: codec::read_utf(r).await?,
                java_ext_dirs: codec::read_utf(r).await?,
                boot_class_path: codec::read_utf(r).await?,
                working_dir: codec::read_utf(r).await?,
                jvm_arguments: codec::read_utf(r).await?,
                jvm_flags: codec::read_utf(r).await?,
                max_heap_size: r.read_i64().await?,
                startup_time_millis: r.read_i64().await?,
                startup_time_counts: r.read_i64().await?,
            })),
            responses::DUMP_RESULTS => Ok(ResponsePayload::DumpResults(DumpResultsResponse {
                dump_abs_timestamp: r.read_i64().await?,
            })),
            responses::INTERNAL_STATS => Ok(ResponsePayload::InternalStats(InternalStatsResponse {
                n_total_instr_methods: r.read_i32().await?,
                n_class_loads: r.read_i32().await?,
                n_first_method_invocations: r.read_i32().await?,
                n_non_empty_group_responses: r.read_i32().await?,
                n_empty_group_responses: r.read_i32().await?,
                n_single_method_group_responses: r.read_i32().await?,
                client_instr_time: r.read_f64().await?,
                client_data_proc_time: r.read_f64().await?,
                total_hotswap_time: r.read_f64().await?,
                avg_hotswap_time: r.read_f64().await?,
                min_hotswap_time: r.read_f64().await?,
                max_hotswap_time: r.read_f64().await?,
                method_entry_exit_call_time: r.read_f64().await?,
            })),
            responses::DEFINING_LOADER => {
                let raw = r.read_i32().await?;
                Ok(ResponsePayload::DefiningLoader(DefiningLoaderResponse {
                    loader_id: if raw == BOOTSTRAP_LOADER_SENTINEL { 0 } else { raw },
                }))
            }
            responses::CALIBRATION_DATA => Ok(ResponsePayload::CalibrationData(
                CalibrationDataResponse::decode(r).await?,
            )),
            responses::OBJECT_ALLOCATION_RESULTS => {
                let n = codec::read_count(r).await?;
                Ok(ResponsePayload::ObjectAllocationResults(
                    ObjectAllocationResultsResponse {
                        results: codec::read_i32_vec(r, n).await?,
                    },
                ))
            }
            responses::CLASS_ID => Ok(ResponsePayload::ClassId(ClassIdResponse {
                class_id: r.read_i32().await?,
            })),
            responses::HEAP_HISTOGRAM => Ok(ResponsePayload::HeapHistogram(
                HeapHistogramResponse::decode(r).await?,
            )),
            responses::CLASS_FILE_BYTES => {
                let n = codec::read_count(r).await?;
                let mut class_bytes = Vec::with_capacity(n);
                for _ in 0..n {
                    class_bytes.push(codec::read_opt_blob(r).await?);
                }
                Ok(ResponsePayload::ClassFileBytes(ClassFileBytesResponse {
                    class_bytes,
                }))
            }
            responses::INSTRUMENT_METHOD_GROUP => Ok(ResponsePayload::InstrumentMethodGroup(
                InstrumentMethodGroupResponse {
                    group: InstrMethodGroup::decode_opt(r).await?,
                },
            )),
            other => Err(WireError::UnknownResponseType(other)),
        }
    }
}

impl MonitoredNumbersResponse {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        if self.new_thread_names.len() != self.new_thread_ids.len()
            || self.new_thread_class_names.len() != self.new_thread_ids.len()
        {
            return Err(WireError::Integrity(format!(
                "new-thread array length mismatch: {} ids, {} names, {} class names",
                self.new_thread_ids.len(),
                self.new_thread_names.len(),
                self.new_thread_class_names.len()
            )));
        }
        for &v in &self.general_numbers {
            buf.put_i64(v);
        }
        codec::put_count(buf, self.thread_ids.len());
        for &id in &self.thread_ids {
            buf.put_i32(id);
        }
        codec::put_count(buf, self.thread_states.len());
        buf.put_slice(&self.thread_states);
        codec::put_count(buf, self.new_thread_ids.len());
        if !self.new_thread_ids.is_empty() {
            for &id in &self.new_thread_ids {
                buf.put_i32(id);
            }
            for name in &self.new_thread_names {
                codec::put_utf(buf, name)?;
            }
            for name in &self.new_thread_class_names {
                codec::put_utf(buf, name)?;
            }
        }
        codec::put_count(buf, self.gc_starts.len());
        for &t in &self.gc_starts {
            buf.put_i64(t);
        }
        codec::put_count(buf, self.gc_finishes.len());
        for &t in &self.gc_finishes {
            buf.put_i64(t);
        }
        Ok(())
    }

    async fn decode<R: AsyncRead + Unpin>(r: &mut R) -> Result<Self> {
        let mut general_numbers = [0i64; GENERAL_NUMBERS_SIZE];
        for slot in &mut general_numbers {
            *slot = r.read_i64().await?;
        }
        let n_threads = codec::read_count(r).await?;
        let thread_ids = codec::read_i32_vec(r, n_threads).await?;
        let n_states = codec::read_count(r).await?;
        let thread_states = codec::read_exact_vec(r, n_states).await?;
        let n_new = codec::read_count(r).await?;
        let (new_thread_ids, new_thread_names, new_thread_class_names) = if n_new > 0 {
            (
                codec::read_i32_vec(r, n_new).await?,
                codec::read_utf_vec(r, n_new).await?,
                codec::read_utf_vec(r, n_new).await?,
            )
        } else {
            (Vec::new(), Vec::new(), Vec::new())
        };
        let n_gc_starts = codec::read_count(r).await?;
        let mut gc_starts = codec::read_i64_vec(r, n_gc_starts).await?;
        let n_gc_finishes = codec::read_count(r).await?;
        let mut gc_finishes = codec::read_i64_vec(r, n_gc_finishes).await?;
        // Received invariant: consumers rely on chronological GC episodes.
        gc_starts.sort_unstable();
        gc_finishes.sort_unstable();
        Ok(Self {
            general_numbers,
            thread_ids,
            thread_states,
            new_thread_ids,
            new_thread_names,
            new_thread_class_names,
            gc_starts,
            gc_finishes,
        })
    }
}

impl CalibrationDataResponse {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        // One count serves all three arrays.
        codec::put_count(buf, self.method_entry_exit_call_time.len());
        for &v in &self.method_entry_exit_call_time {
            buf.put_f64(v);
        }
        for &v in &self.method_entry_exit_inner_time {
            buf.put_f64(v);
        }
        for &v in &self.method_entry_exit_outer_time {
            buf.put_f64(v);
        }
        for &v in &self.timer_counts_in_second {
            buf.put_i64(v);
        }
        Ok(())
    }

    async fn decode<R: AsyncRead + Unpin>(r: &mut R) -> Result<Self> {
        let n = codec::read_count(r).await?;
        let method_entry_exit_call_time = codec::read_f64_vec(r, n).await?;
        let method_entry_exit_inner_time = codec::read_f64_vec(r, n).await?;
        let method_entry_exit_outer_time = codec::read_f64_vec(r, n).await?;
        let mut timer_counts_in_second = [0i64; 2];
        for slot in &mut timer_counts_in_second {
            *slot = r.read_i64().await?;
        }
        Ok(Self {
            method_entry_exit_call_time,
            method_entry_exit_inner_time,
            method_entry_exit_outer_time,
            timer_counts_in_second,
        })
    }
}

impl HeapHistogramResponse {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_i64(self.time_millis);
        codec::put_count(buf, self.new_names.len());
        for name in &self.new_names {
            codec::put_utf(buf, name)?;
        }
        codec::put_count(buf, self.new_ids.len());
        for &id in &self.new_ids {
            buf.put_i32(id);
        }
        codec::put_count(buf, self.ids.len());
        for &id in &self.ids {
            buf.put_i32(id);
        }
        codec::put_count(buf, self.instances.len());
        for &v in &self.instances {
            buf.put_i64(v);
        }
        codec::put_count(buf, self.bytes.len());
        for &v in &self.bytes {
            buf.put_i64(v);
        }
        Ok(())
    }

    async fn decode<R: AsyncRead + Unpin>(r: &mut R) -> Result<Self> {
        let time_millis = r.read_i64().await?;
        let n_new_names = codec::read_count(r).await?;
        let new_names = codec::read_utf_vec(r, n_new_names).await?;
        let n_new_ids = codec::read_count(r).await?;
        let new_ids = codec::read_i32_vec(r, n_new_ids).await?;
        let n_ids = codec::read_count(r).await?;
        let ids = codec::read_i32_vec(r, n_ids).await?;
        let n_instances = codec::read_count(r).await?;
        let instances = codec::read_i64_vec(r, n_instances).await?;
        let n_bytes = codec::read_count(r).await?;
        let bytes = codec::read_i64_vec(r, n_bytes).await?;
        Ok(Self {
            time_millis,
            new_names,
            new_ids,
            ids,
            instances,
            bytes,
        })
    }
}
