//! XOR-checksummed request/response framing over byte channels.
//!
//! This is the protocol engine of serialink. Every frame on the wire is:
//! - a 1-byte request (`110` tag, role bit, 4-bit action)
//! - a 1-byte length (payload size + 1, at most 51)
//! - up to 50 payload bytes
//! - a 1-byte XOR checksum over everything before it
//!
//! A [`Session`] binds the engine to one [`Channel`](serialink_channel::Channel)
//! and runs blocking, one-frame-at-a-time exchanges over it.

pub mod checksum;
pub mod codec;
pub mod error;
pub mod reader;
pub mod request;
pub mod session;
pub mod writer;

pub use checksum::{checksum, Checksum};
pub use codec::{
    decode_frame, encode_frame, Frame, FrameConfig, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT,
    HEADER_SIZE, MAX_LENGTH, MAX_PAYLOAD, MIN_FRAME_LENGTH,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use request::{
    encode_request, Request, Role, ACTION_MASK, ERROR_ACTION, HEADER_MASK, HEADER_TAG, SLAVE_BIT,
    VALUE_FALSE, VALUE_TRUE,
};
pub use session::Session;
pub use writer::FrameWriter;
