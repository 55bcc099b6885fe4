//! Chat wire protocol
//!
//! Handles reading units off the wire, the display name handshake, and
//! message classification.

pub mod framing;
pub mod handshake;
pub mod messages;

pub use framing::{Frame, FrameReader, RawChunkReader};
pub use handshake::{DisplayName, NameRules};
pub use messages::{Inbound, classify, join_announcement, leave_announcement};
