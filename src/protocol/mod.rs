//! Protocol model: frame kinds, the message type registry, and the
//! command/response envelope types with their per-variant encoders.

pub mod command;
pub mod frame;
pub mod method_group;
pub mod registry;
pub mod response;

pub use command::Command;
pub use frame::FrameKind;
pub use method_group::{InstrMethodGroup, InstrMethodGroupData};
pub use response::{Response, ResponsePayload};
