//! # profwire
//!
//! Binary wire protocol spoken between a JVM profiling agent (running inside
//! the target VM) and the controlling profiler client.
//!
//! The protocol deliberately bypasses any general-purpose serialization
//! mechanism: every message variant hand-encodes its fields in a fixed
//! big-endian layout, and a one-byte frame marker distinguishes the four
//! frame kinds (simple/complex command, simple/complex response). Simple
//! commands are a type code and nothing else; simple responses are a success
//! flag plus an optional error string.
//!
//! ## Architecture
//!
//! - [`protocol`]: message type registry, frame kinds, and the
//!   [`Command`]/[`Response`] envelope model with per-variant encode/decode
//! - [`codec`]: primitive wire helpers (length-prefixed UTF-8 strings,
//!   optional byte blobs, counted arrays) and the deflate special case for
//!   event-buffer dumps
//! - [`wire`]: the framing dispatcher, one receive state machine and four
//!   send shapes
//! - [`transport`]: duplex stream adapter, a cloneable mutex-serialized
//!   sender plus a single-reader receiver with a shared liveness timestamp
//!
//! ## Example
//!
//! ```ignore
//! use profwire::{wire_pair, Command, Message, WireConfig};
//! use profwire::protocol::registry::commands;
//!
//! let (read_half, write_half) = stream.into_split();
//! let (sender, mut receiver) = wire_pair(read_half, write_half, WireConfig::default());
//!
//! sender.send_simple_command(commands::CHECK_CONNECTION).await?;
//! match receiver.receive_message().await? {
//!     Message::Response(resp) if resp.ok => { /* connected */ }
//!     other => { /* protocol violation */ }
//! }
//! ```

pub mod codec;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod wire;

pub use error::{Result, WireError};
pub use protocol::command::Command;
pub use protocol::response::{Response, ResponsePayload};
pub use transport::{wire_pair, Liveness, WireConfig, WireReceiver, WireSender};
pub use wire::Message;
