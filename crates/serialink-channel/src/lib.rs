//! Byte-level duplex channel abstraction.
//!
//! The framing engine never touches an OS handle directly. It talks to a
//! [`Channel`], which exposes exactly four operations: how many bytes are
//! waiting, read one byte, write one byte, flush. Provided channels:
//! - [`MemoryChannel`]: in-process queues, for tests and loopback
//! - [`SocketChannel`]: connected Unix domain sockets (Linux/macOS)
//! - [`SerialChannel`]: serial devices (behind the `serial` feature)
//!
//! This is the lowest layer of serialink.

pub mod error;
pub mod memory;
pub mod traits;

#[cfg(feature = "serial")]
pub mod serial;

#[cfg(unix)]
pub mod uds;

pub use error::{ChannelError, Result};
pub use memory::MemoryChannel;
pub use traits::Channel;

/// Default line speed for serial devices.
///
/// Defined outside the `serial` module so callers can name it even when
/// serial support is compiled out.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

#[cfg(feature = "serial")]
pub use serial::{SerialChannel, SerialSettings};

#[cfg(unix)]
pub use uds::{SocketChannel, UnixDomainSocket};
