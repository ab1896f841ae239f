//! Message type registry: the fixed bijection between integer type codes and
//! command/response kinds, plus debug-name lookup.
//!
//! Command codes and response codes are two disjoint numbering spaces; never
//! compare a command code against a response code. The codes are protocol
//! constants: both peers are always deployed as a matched pair, so there is
//! no version-negotiation mechanism and no renumbering without touching both
//! ends.
//!
//! The name lookups are deliberately lenient: an out-of-range code returns a
//! literal placeholder instead of failing, so that diagnostics across
//! mismatched protocol builds still produce readable logs. Decode dispatch is
//! strict; only the names are lenient.

/// Command type codes.
pub mod commands {
    pub const CHECK_CONNECTION: u8 = 1;
    pub const START_TARGET_APP: u8 = 2;
    pub const CLASS_LOADED: u8 = 3;
    pub const METHOD_LOADED: u8 = 4;
    pub const ROOT_CLASS_LOADED: u8 = 5;
    pub const EVENT_BUFFER_DUMPED: u8 = 6;
    pub const METHOD_INVOKED_FIRST_TIME: u8 = 7;
    pub const SUSPEND_TARGET_APP: u8 = 8;
    pub const RESUME_TARGET_APP: u8 = 9;
    pub const TERMINATE_TARGET_JVM: u8 = 10;
    pub const INSTRUMENT_METHOD_GROUP: u8 = 11;
    pub const INITIATE_INSTRUMENTATION: u8 = 12;
    pub const SET_CHANGEABLE_INSTR_PARAMS: u8 = 13;
    pub const SET_UNCHANGEABLE_INSTR_PARAMS: u8 = 14;
    pub const GET_METHOD_NAMES_FOR_JMETHOD_IDS: u8 = 15;
    pub const GET_DEFINING_CLASS_LOADER: u8 = 16;
    pub const GET_CLASSID: u8 = 17;
    pub const TAKE_HEAP_DUMP: u8 = 18;
    pub const DETACH: u8 = 19;
    pub const PREPARE_DETACH: u8 = 20;
    pub const SHUTDOWN_INITIATED: u8 = 21;
    pub const SHUTDOWN_COMPLETED: u8 = 22;
    pub const SHUTDOWN_OK: u8 = 23;
    pub const RESULTS_AVAILABLE: u8 = 24;
    pub const CPU_RESULTS_EXIST: u8 = 25;
    pub const DUMP_EXISTING_RESULTS: u8 = 26;
    pub const DUMP_EXISTING_RESULTS_LIVE: u8 = 27;
    pub const DEACTIVATE_INJECTED_CODE: u8 = 28;
    pub const INSTRUMENT_REFLECTION: u8 = 29;
    pub const DEINSTRUMENT_REFLECTION: u8 = 30;
    pub const GET_THREAD_LIVENESS_STATUS: u8 = 31;
    pub const GET_MONITORED_NUMBERS: u8 = 32;
    pub const GET_INTERNAL_STATS: u8 = 33;
    pub const GET_VM_PROPERTIES: u8 = 34;
    pub const GET_STORED_CALIBRATION_DATA: u8 = 35;
    pub const RUN_CALIBRATION_AND_GET_DATA: u8 = 36;
    pub const RUN_GC: u8 = 37;
    pub const GET_OBJECT_ALLOCATION_RESULTS: u8 = 38;
    pub const GET_CODE_REGION_CPU_RESULTS: u8 = 39;
    pub const STILL_ALIVE: u8 = 40;
    pub const TAKE_SNAPSHOT: u8 = 41;
    pub const RESET_PROFILER_COLLECTORS: u8 = 42;
    pub const GET_HEAP_HISTOGRAM: u8 = 43;
    pub const CLASS_LOADER_UNLOADING: u8 = 44;
    pub const GET_CLASS_FILE_BYTES: u8 = 45;
}

/// Response type codes. Only complex responses carry a code on the wire;
/// simple responses are identified by their frame kind alone.
pub mod responses {
    pub const CODE_REGION_CPU_RESULTS: u8 = 1;
    pub const METHOD_NAMES: u8 = 2;
    pub const THREAD_LIVENESS_STATUS: u8 = 3;
    pub const MONITORED_NUMBERS: u8 = 4;
    pub const VM_PROPERTIES: u8 = 5;
    pub const DUMP_RESULTS: u8 = 6;
    pub const INTERNAL_STATS: u8 = 7;
    pub const DEFINING_LOADER: u8 = 8;
    pub const CALIBRATION_DATA: u8 = 9;
    pub const OBJECT_ALLOCATION_RESULTS: u8 = 10;
    pub const CLASS_ID: u8 = 11;
    pub const HEAP_HISTOGRAM: u8 = 12;
    pub const CLASS_FILE_BYTES: u8 = 13;
    pub const INSTRUMENT_METHOD_GROUP: u8 = 14;
}

/// Human-readable name of a command code, for diagnostics.
pub fn command_name(code: u8) -> &'static str {
    use commands::*;
    match code {
        CHECK_CONNECTION => "CheckConnection",
        START_TARGET_APP => "StartTargetApp",
        CLASS_LOADED => "ClassLoaded",
        METHOD_LOADED => "MethodLoaded",
        ROOT_CLASS_LOADED => "RootClassLoaded",
        EVENT_BUFFER_DUMPED => "EventBufferDumped",
        METHOD_INVOKED_FIRST_TIME => "MethodInvokedFirstTime",
        SUSPEND_TARGET_APP => "SuspendTargetApp",
        RESUME_TARGET_APP => "ResumeTargetApp",
        TERMINATE_TARGET_JVM => "TerminateTargetJvm",
        INSTRUMENT_METHOD_GROUP => "InstrumentMethodGroup",
        INITIATE_INSTRUMENTATION => "InitiateInstrumentation",
        SET_CHANGEABLE_INSTR_PARAMS => "SetChangeableInstrParams",
        SET_UNCHANGEABLE_INSTR_PARAMS => "SetUnchangeableInstrParams",
        GET_METHOD_NAMES_FOR_JMETHOD_IDS => "GetMethodNamesForJMethodIds",
        GET_DEFINING_CLASS_LOADER => "GetDefiningClassLoader",
        GET_CLASSID => "GetClassId",
        TAKE_HEAP_DUMP => "TakeHeapDump",
        DETACH => "Detach",
        PREPARE_DETACH => "PrepareDetach",
        SHUTDOWN_INITIATED => "ShutdownInitiated",
        SHUTDOWN_COMPLETED => "ShutdownCompleted",
        SHUTDOWN_OK => "ShutdownOk",
        RESULTS_AVAILABLE => "ResultsAvailable",
        CPU_RESULTS_EXIST => "CpuResultsExist",
        DUMP_EXISTING_RESULTS => "DumpExistingResults",
        DUMP_EXISTING_RESULTS_LIVE => "DumpExistingResultsLive",
        DEACTIVATE_INJECTED_CODE => "DeactivateInjectedCode",
        INSTRUMENT_REFLECTION => "InstrumentReflection",
        DEINSTRUMENT_REFLECTION => "DeinstrumentReflection",
        GET_THREAD_LIVENESS_STATUS => "GetThreadLivenessStatus",
        GET_MONITORED_NUMBERS => "GetMonitoredNumbers",
        GET_INTERNAL_STATS => "GetInternalStats",
        GET_VM_PROPERTIES => "GetVmProperties",
        GET_STORED_CALIBRATION_DATA => "GetStoredCalibrationData",
        RUN_CALIBRATION_AND_GET_DATA => "RunCalibrationAndGetData",
        RUN_GC => "RunGc",
        GET_OBJECT_ALLOCATION_RESULTS => "GetObjectAllocationResults",
        GET_CODE_REGION_CPU_RESULTS => "GetCodeRegionCpuResults",
        STILL_ALIVE => "StillAlive",
        TAKE_SNAPSHOT => "TakeSnapshot",
        RESET_PROFILER_COLLECTORS => "ResetProfilerCollectors",
        GET_HEAP_HISTOGRAM => "GetHeapHistogram",
        CLASS_LOADER_UNLOADING => "ClassLoaderUnloading",
        GET_CLASS_FILE_BYTES => "GetClassFileBytes",
        _ => "Unknown command",
    }
}

/// Human-readable name of a response code, for diagnostics.
pub fn response_name(code: u8) -> &'static str {
    use responses::*;
    match code {
        CODE_REGION_CPU_RESULTS => "CodeRegionCpuResults",
        METHOD_NAMES => "MethodNames",
        THREAD_LIVENESS_STATUS => "ThreadLivenessStatus",
        MONITORED_NUMBERS => "MonitoredNumbers",
        VM_PROPERTIES => "VmProperties",
        DUMP_RESULTS => "DumpResults",
        INTERNAL_STATS => "InternalStats",
        DEFINING_LOADER => "DefiningLoader",
        CALIBRATION_DATA => "CalibrationData",
        OBJECT_ALLOCATION_RESULTS => "ObjectAllocationResults",
        CLASS_ID => "ClassId",
        HEAP_HISTOGRAM => "HeapHistogram",
        CLASS_FILE_BYTES => "ClassFileBytes",
        INSTRUMENT_METHOD_GROUP => "InstrumentMethodGroup",
        _ => "Unknown response",
    }
}
