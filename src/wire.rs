//! Framing dispatcher: four send shapes, one receive state machine.
//!
//! Every transmission opens with a one-byte frame kind. Commands carry a type
//! code next; responses carry the common `{ok, error}` header, with the type
//! code in front of it for the complex form. The payload bytes, when present,
//! follow last. The receive side mirrors this exactly and hands back a
//! [`Message`], the single point where both directions converge.
//!
//! A clean EOF on the frame-kind byte is the peer hanging up between messages
//! and surfaces as [`WireError::ConnectionClosed`]; an EOF anywhere later is
//! a mid-frame truncation and stays an I/O error.

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::codec;
use crate::error::{Result, WireError};
use crate::protocol::command::Command;
use crate::protocol::frame::FrameKind;
use crate::protocol::response::{Response, ResponsePayload};

/// A received wire message, either direction.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Command(Command),
    Response(Response),
}

impl Message {
    /// Debug name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Message::Command(cmd) => cmd.name(),
            Message::Response(resp) => resp.name(),
        }
    }
}

/// Encode a complete command frame into `buf`.
pub fn encode_command(cmd: &Command, buf: &mut BytesMut) -> Result<()> {
    if cmd.is_simple() {
        buf.put_u8(FrameKind::SimpleCommand.as_u8());
        buf.put_u8(cmd.type_code());
        Ok(())
    } else {
        buf.put_u8(FrameKind::ComplexCommand.as_u8());
        buf.put_u8(cmd.type_code());
        cmd.encode_payload(buf)
    }
}

/// Encode a complete response frame into `buf`.
pub fn encode_response(resp: &Response, buf: &mut BytesMut) -> Result<()> {
    match resp.payload.type_code() {
        None => {
            buf.put_u8(FrameKind::SimpleResponse.as_u8());
            put_response_header(buf, resp)?;
            Ok(())
        }
        Some(code) => {
            buf.put_u8(FrameKind::ComplexResponse.as_u8());
            buf.put_u8(code);
            put_response_header(buf, resp)?;
            resp.payload.encode(buf)
        }
    }
}

/// Write the common response header: success flag, error-string presence
/// byte, and the error string when present.
fn put_response_header(buf: &mut BytesMut, resp: &Response) -> Result<()> {
    codec::put_bool(buf, resp.ok);
    match &resp.error_message {
        None => codec::put_bool(buf, false),
        Some(msg) => {
            codec::put_bool(buf, true);
            codec::put_utf(buf, msg)?;
        }
    }
    Ok(())
}

async fn read_response_header<R: AsyncRead + Unpin>(r: &mut R) -> Result<(bool, Option<String>)> {
    let ok = codec::read_bool(r).await?;
    let error_message = if codec::read_bool(r).await? {
        Some(codec::read_utf(r).await?)
    } else {
        None
    };
    Ok((ok, error_message))
}

/// Read one complete message from the stream.
pub async fn read_message<R: AsyncRead + Unpin>(r: &mut R) -> Result<Message> {
    let kind_byte = match r.read_u8().await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(WireError::ConnectionClosed);
        }
        Err(e) => return Err(e.into()),
    };
    match FrameKind::from_u8(kind_byte)? {
        FrameKind::SimpleCommand => {
            // Unrecognized simple codes pass through undecoded; the dispatch
            // above this layer decides what to do with them.
            let code = r.read_u8().await?;
            Ok(Message::Command(Command::Simple(code)))
        }
        FrameKind::ComplexCommand => {
            let code = r.read_u8().await?;
            Ok(Message::Command(Command::decode_complex(code, r).await?))
        }
        FrameKind::SimpleResponse => {
            let (ok, error_message) = read_response_header(r).await?;
            Ok(Message::Response(Response::simple(ok, error_message)))
        }
        FrameKind::ComplexResponse => {
            let code = r.read_u8().await?;
            // The common header is always consumed before the payload; the
            // payload decoders never see it.
            let (ok, error_message) = read_response_header(r).await?;
            let payload = ResponsePayload::decode_complex(code, r).await?;
            Ok(Message::Response(Response {
                ok,
                error_message,
                payload,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::command::GetClassIdCommand;
    use crate::protocol::registry::commands;
    use crate::protocol::response::ClassIdResponse;

    async fn decode(bytes: Vec<u8>) -> Result<Message> {
        let mut cursor = std::io::Cursor::new(bytes);
        read_message(&mut cursor).await
    }

    #[tokio::test]
    async fn test_simple_command_frame_is_two_bytes() {
        let cmd = Command::Simple(commands::RUN_GC);
        let mut buf = BytesMut::new();
        encode_command(&cmd, &mut buf).unwrap();
        assert_eq!(&buf[..], &[1, commands::RUN_GC]);

        assert_eq!(decode(buf.to_vec()).await.unwrap(), Message::Command(cmd));
    }

    #[tokio::test]
    async fn test_complex_command_roundtrip() {
        let cmd = Command::GetClassId(GetClassIdCommand {
            class_name: "java.util.HashMap".into(),
            class_loader_id: 2,
        });
        let mut buf = BytesMut::new();
        encode_command(&cmd, &mut buf).unwrap();
        assert_eq!(buf[0], 2);
        assert_eq!(buf[1], commands::GET_CLASSID);

        assert_eq!(decode(buf.to_vec()).await.unwrap(), Message::Command(cmd));
    }

    #[tokio::test]
    async fn test_simple_response_with_and_without_error() {
        let resp = Response::simple(false, Some("no such class".into()));
        let mut buf = BytesMut::new();
        encode_response(&resp, &mut buf).unwrap();
        assert_eq!(buf[0], 3);
        assert_eq!(decode(buf.to_vec()).await.unwrap(), Message::Response(resp));

        let ok = Response::success();
        let mut buf = BytesMut::new();
        encode_response(&ok, &mut buf).unwrap();
        // kind + ok + absent-error presence byte
        assert_eq!(&buf[..], &[3, 1, 0]);
        assert_eq!(decode(buf.to_vec()).await.unwrap(), Message::Response(ok));
    }

    #[tokio::test]
    async fn test_complex_response_header_precedes_payload() {
        let resp = Response::complex(ResponsePayload::ClassId(ClassIdResponse { class_id: 9 }));
        let mut buf = BytesMut::new();
        encode_response(&resp, &mut buf).unwrap();
        // kind, code, ok, error presence, then the 4-byte payload
        assert_eq!(&buf[..4], &[4, resp.payload.type_code().unwrap(), 1, 0]);
        assert_eq!(&buf[4..], 9i32.to_be_bytes());

        assert_eq!(decode(buf.to_vec()).await.unwrap(), Message::Response(resp));
    }

    #[tokio::test]
    async fn test_bad_frame_kind_is_fatal() {
        match decode(vec![9, 0, 0]).await {
            Err(WireError::BadFrameKind(9)) => {}
            other => panic!("expected BadFrameKind, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_eof_before_frame_kind_is_connection_closed() {
        match decode(Vec::new()).await {
            Err(WireError::ConnectionClosed) => {}
            other => panic!("expected ConnectionClosed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_eof_mid_frame_stays_io_error() {
        // complex command frame cut off after the type code
        match decode(vec![2, commands::GET_CLASSID]).await {
            Err(WireError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_simple_command_passes_through() {
        match decode(vec![1, 250]).await.unwrap() {
            Message::Command(Command::Simple(250)) => {}
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
