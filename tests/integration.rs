//! End-to-end exchanges over an in-memory duplex stream: both peers framed
//! through the public API, with real compression and concurrent senders.

use profwire::protocol::command::{
    ClassLoadedCommand, EventBufferDumpedCommand, GetClassIdCommand,
    MethodInvokedFirstTimeCommand,
};
use profwire::protocol::registry::{commands, responses};
use profwire::protocol::response::{
    ClassIdResponse, MonitoredNumbersResponse, VmPropertiesResponse,
};
use profwire::{
    wire_pair, Command, Message, Response, ResponsePayload, WireConfig, WireError, WireReceiver,
    WireSender,
};
use tokio::io::{AsyncWriteExt, ReadHalf, WriteHalf};

type Peer = (
    WireSender<WriteHalf<tokio::io::DuplexStream>>,
    WireReceiver<ReadHalf<tokio::io::DuplexStream>>,
);

/// Two fully-wired peers talking over an in-memory stream.
fn connected_peers(buffer: usize) -> (Peer, Peer) {
    let (client, server) = tokio::io::duplex(buffer);
    let (cr, cw) = tokio::io::split(client);
    let (sr, sw) = tokio::io::split(server);
    (
        wire_pair(cr, cw, WireConfig::default()),
        wire_pair(sr, sw, WireConfig::default()),
    )
}

#[tokio::test]
async fn test_request_response_session() {
    let ((client_tx, mut client_rx), (server_tx, mut server_rx)) = connected_peers(64 * 1024);

    let server = tokio::spawn(async move {
        loop {
            match server_rx.receive_message().await {
                Ok(Message::Command(Command::Simple(code)))
                    if code == commands::GET_VM_PROPERTIES =>
                {
                    let resp = Response::complex(ResponsePayload::VmProperties(
                        VmPropertiesResponse {
                            java_version: "17.0.2".into(),
                            java_class_path: "/app/app.jar".into(),
                            java_ext_dirs: String::new(),
                            boot_class_path: String::new(),
                            working_dir: "/app".into(),
                            jvm_arguments: "-Xmx4g".into(),
                            jvm_flags: String::new(),
                            max_heap_size: 1 << 32,
                            startup_time_millis: 1_700_000_000_000,
                            startup_time_counts: 42,
                        },
                    ));
                    server_tx.send_response(resp).await.unwrap();
                }
                Ok(Message::Command(Command::GetClassId(cmd))) => {
                    assert_eq!(cmd.class_name, "java.util.HashMap");
                    // decode-side normalization applies to this variant
                    assert_eq!(cmd.class_loader_id, 0);
                    let resp = Response::complex(ResponsePayload::ClassId(ClassIdResponse {
                        class_id: 321,
                    }));
                    server_tx.send_response(resp).await.unwrap();
                }
                Ok(Message::Command(Command::Simple(code)))
                    if code == commands::SHUTDOWN_OK =>
                {
                    server_tx.send_simple_response(true, None).await.unwrap();
                    return;
                }
                other => panic!("server got unexpected message: {other:?}"),
            }
        }
    });

    client_tx
        .send_simple_command(commands::GET_VM_PROPERTIES)
        .await
        .unwrap();
    match client_rx.receive_message().await.unwrap() {
        Message::Response(resp) => {
            assert!(resp.ok);
            match resp.payload {
                ResponsePayload::VmProperties(props) => {
                    assert_eq!(props.java_version, "17.0.2");
                    assert_eq!(props.max_heap_size, 1 << 32);
                }
                other => panic!("wrong payload: {other:?}"),
            }
        }
        other => panic!("expected response, got {other:?}"),
    }

    client_tx
        .send_command(Command::GetClassId(GetClassIdCommand {
            class_name: "java.util.HashMap".into(),
            class_loader_id: -1,
        }))
        .await
        .unwrap();
    match client_rx.receive_message().await.unwrap() {
        Message::Response(resp) => match resp.payload {
            ResponsePayload::ClassId(p) => assert_eq!(p.class_id, 321),
            other => panic!("wrong payload: {other:?}"),
        },
        other => panic!("expected response, got {other:?}"),
    }

    client_tx
        .send_simple_command(commands::SHUTDOWN_OK)
        .await
        .unwrap();
    match client_rx.receive_message().await.unwrap() {
        Message::Response(resp) => {
            assert!(resp.ok);
            assert_eq!(resp.error_message, None);
            assert!(resp.is_simple());
        }
        other => panic!("expected response, got {other:?}"),
    }

    server.await.unwrap();
}

#[tokio::test]
async fn test_large_event_buffer_travels_compressed() {
    let ((client_tx, _client_rx), (_server_tx, mut server_rx)) = connected_peers(256 * 1024);

    // Half a megabyte of compressible data, larger than the stream buffer:
    // sender and receiver must run concurrently.
    let buffer: Vec<u8> = (0..512 * 1024).map(|i| ((i / 64) % 251) as u8).collect();
    let expected = buffer.clone();

    let send = tokio::spawn(async move {
        client_tx
            .send_command(Command::EventBufferDumped(EventBufferDumpedCommand {
                buffer,
            }))
            .await
            .unwrap();
    });

    match server_rx.receive_message().await.unwrap() {
        Message::Command(Command::EventBufferDumped(cmd)) => assert_eq!(cmd.buffer, expected),
        other => panic!("unexpected message: {other:?}"),
    }
    send.await.unwrap();
}

#[tokio::test]
async fn test_gc_timestamps_arrive_sorted() {
    let ((client_tx, _client_rx), (_server_tx, mut server_rx)) = connected_peers(64 * 1024);

    let resp = Response::complex(ResponsePayload::MonitoredNumbers(MonitoredNumbersResponse {
        general_numbers: [0; 9],
        thread_ids: vec![1],
        thread_states: vec![1],
        new_thread_ids: vec![],
        new_thread_names: vec![],
        new_thread_class_names: vec![],
        gc_starts: vec![900, 100, 500],
        gc_finishes: vec![950, 150, 550],
    }));
    client_tx.send_response(resp).await.unwrap();

    match server_rx.receive_message().await.unwrap() {
        Message::Response(resp) => match resp.payload {
            ResponsePayload::MonitoredNumbers(numbers) => {
                assert_eq!(numbers.gc_starts, vec![100, 500, 900]);
                assert_eq!(numbers.gc_finishes, vec![150, 550, 950]);
            }
            other => panic!("wrong payload: {other:?}"),
        },
        other => panic!("expected response, got {other:?}"),
    }
}

#[tokio::test]
async fn test_class_loaded_keeps_bootstrap_sentinel_end_to_end() {
    let ((client_tx, _client_rx), (_server_tx, mut server_rx)) = connected_peers(64 * 1024);

    client_tx
        .send_command(Command::ClassLoaded(ClassLoadedCommand {
            class_name: "java.lang.Object".into(),
            loader_data: [-1, -1, 2],
            class_file_bytes: None,
            thread_in_call_graph: false,
        }))
        .await
        .unwrap();

    match server_rx.receive_message().await.unwrap() {
        Message::Command(Command::ClassLoaded(cmd)) => {
            assert_eq!(cmd.loader_data, [-1, -1, 2]);
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn test_concurrent_senders_deliver_every_frame_intact() {
    let ((client_tx, _client_rx), (_server_tx, mut server_rx)) = connected_peers(256 * 1024);

    const TASKS: u8 = 8;
    const PER_TASK: u32 = 50;

    let mut handles = Vec::new();
    for task in 0..TASKS {
        let tx = client_tx.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..PER_TASK {
                let method_id = ((task as i32) << 16) | i as i32;
                tx.send_command(Command::MethodInvokedFirstTime(
                    MethodInvokedFirstTimeCommand { method_id },
                ))
                .await
                .unwrap();
            }
        }));
    }

    let mut seen = std::collections::HashSet::new();
    for _ in 0..(TASKS as u32 * PER_TASK) {
        match server_rx.receive_message().await.unwrap() {
            Message::Command(Command::MethodInvokedFirstTime(cmd)) => {
                assert!(seen.insert(cmd.method_id), "duplicate {}", cmd.method_id);
            }
            other => panic!("corrupted stream: {other:?}"),
        }
    }
    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn test_bad_frame_kind_byte_is_fatal() {
    let (mut raw, server) = tokio::io::duplex(1024);
    let (sr, _sw) = tokio::io::split(server);
    let (_tx, mut rx) = wire_pair(sr, tokio::io::sink(), WireConfig::default());

    raw.write_all(&[0x07, 0x01, 0x02]).await.unwrap();
    match rx.receive_message().await {
        Err(WireError::BadFrameKind(0x07)) => {}
        other => panic!("expected BadFrameKind, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_complex_response_code_is_typed_fault() {
    let (mut raw, server) = tokio::io::duplex(1024);
    let (sr, _sw) = tokio::io::split(server);
    let (_tx, mut rx) = wire_pair(sr, tokio::io::sink(), WireConfig::default());

    // complex response frame: unknown code 99, ok=true, no error string
    raw.write_all(&[4, 99, 1, 0]).await.unwrap();
    match rx.receive_message().await {
        Err(WireError::UnknownResponseType(99)) => {}
        other => panic!("expected UnknownResponseType, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_response_name_is_lenient() {
    // the registry names stay usable for logging even when decode rejects
    assert_eq!(
        profwire::protocol::registry::response_name(responses::CLASS_ID),
        "ClassId"
    );
    assert_eq!(
        profwire::protocol::registry::response_name(99),
        "Unknown response"
    );
}

#[tokio::test]
async fn test_hangup_between_messages_is_connection_closed() {
    let ((client_tx, _client_rx), (_server_tx, mut server_rx)) = connected_peers(1024);

    client_tx
        .send_simple_command(commands::STILL_ALIVE)
        .await
        .unwrap();
    server_rx.receive_message().await.unwrap();

    drop(client_tx);
    drop(_client_rx);
    match server_rx.receive_message().await {
        Err(WireError::ConnectionClosed) => {}
        other => panic!("expected ConnectionClosed, got {other:?}"),
    }
}
