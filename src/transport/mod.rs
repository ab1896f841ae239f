//! Duplex stream adapter: a cloneable sender and a single-reader receiver.
//!
//! The sender serializes frames onto the write half behind an async mutex, so
//! any number of tasks may hold a clone and send concurrently without frame
//! interleaving. Every frame is assembled completely in memory first; the
//! mutex is held only for the write and flush. The receiver owns the read
//! half outright and stamps a shared [`Liveness`] timestamp after every
//! message, which watchdog tasks poll to detect a hung peer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::protocol::command::Command;
use crate::protocol::response::Response;
use crate::wire::{self, Message};

/// Transport tuning knobs.
#[derive(Debug, Clone, Default)]
pub struct WireConfig {
    /// Log every sent and received frame at debug level.
    pub log_frames: bool,
}

/// Shared last-activity timestamp for the connection.
///
/// Stored as millisecond offsets from a fixed origin so that readers never
/// take a lock; the resolution is plenty for liveness watchdogs.
#[derive(Debug, Clone)]
pub struct Liveness {
    inner: Arc<LivenessInner>,
}

#[derive(Debug)]
struct LivenessInner {
    origin: Instant,
    millis: AtomicU64,
}

impl Liveness {
    fn new() -> Self {
        Liveness {
            inner: Arc::new(LivenessInner {
                origin: Instant::now(),
                millis: AtomicU64::new(0),
            }),
        }
    }

    /// Record activity now.
    pub fn touch(&self) {
        let elapsed = self.inner.origin.elapsed().as_millis() as u64;
        self.inner.millis.store(elapsed, Ordering::Relaxed);
    }

    /// Instant of the most recent recorded activity.
    pub fn last_activity(&self) -> Instant {
        let millis = self.inner.millis.load(Ordering::Relaxed);
        self.inner.origin + Duration::from_millis(millis)
    }

    /// Time elapsed since the most recent recorded activity.
    pub fn idle_for(&self) -> Duration {
        self.last_activity().elapsed()
    }
}

/// Sending half of the connection. Cheap to clone; all clones share one
/// writer and one frame-ordering mutex.
#[derive(Debug)]
pub struct WireSender<W> {
    writer: Arc<Mutex<BufWriter<W>>>,
    config: Arc<WireConfig>,
}

impl<W> Clone for WireSender<W> {
    fn clone(&self) -> Self {
        WireSender {
            writer: Arc::clone(&self.writer),
            config: Arc::clone(&self.config),
        }
    }
}

impl<W: AsyncWrite + Unpin> WireSender<W> {
    /// Send a command. Takes the command by value: payloads can be large
    /// (class files, event buffers) and are released as soon as the frame
    /// bytes are on the wire.
    pub async fn send_command(&self, cmd: Command) -> Result<()> {
        let mut buf = BytesMut::new();
        wire::encode_command(&cmd, &mut buf)?;
        if self.config.log_frames {
            debug!(command = cmd.name(), bytes = buf.len(), "sending command");
        }
        self.write_frame(buf).await
    }

    /// Send a simple command identified by its type code alone.
    pub async fn send_simple_command(&self, code: u8) -> Result<()> {
        self.send_command(Command::Simple(code)).await
    }

    /// Send a response.
    pub async fn send_response(&self, resp: Response) -> Result<()> {
        let mut buf = BytesMut::new();
        wire::encode_response(&resp, &mut buf)?;
        if self.config.log_frames {
            debug!(response = resp.name(), bytes = buf.len(), "sending response");
        }
        self.write_frame(buf).await
    }

    /// Send a simple response: just the `{ok, error}` header.
    pub async fn send_simple_response(&self, ok: bool, error_message: Option<String>) -> Result<()> {
        self.send_response(Response::simple(ok, error_message)).await
    }

    async fn write_frame(&self, buf: BytesMut) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(&buf).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Receiving half of the connection. There is exactly one receiver per
/// connection; message decoding is inherently sequential.
#[derive(Debug)]
pub struct WireReceiver<R> {
    reader: BufReader<R>,
    liveness: Liveness,
    config: Arc<WireConfig>,
}

impl<R: AsyncRead + Unpin> WireReceiver<R> {
    /// Read the next message, stamping the liveness timestamp on success.
    pub async fn receive_message(&mut self) -> Result<Message> {
        let msg = wire::read_message(&mut self.reader).await?;
        self.liveness.touch();
        if self.config.log_frames {
            debug!(message = msg.name(), "received message");
        }
        Ok(msg)
    }

    /// Handle to the shared liveness timestamp, for watchdog tasks.
    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }
}

/// Wrap the two halves of a duplex stream into a sender/receiver pair.
pub fn wire_pair<R, W>(reader: R, writer: W, config: WireConfig) -> (WireSender<W>, WireReceiver<R>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let config = Arc::new(config);
    let liveness = Liveness::new();
    liveness.touch();
    let sender = WireSender {
        writer: Arc::new(Mutex::new(BufWriter::new(writer))),
        config: Arc::clone(&config),
    };
    let receiver = WireReceiver {
        reader: BufReader::new(reader),
        liveness,
        config,
    };
    (sender, receiver)
}
