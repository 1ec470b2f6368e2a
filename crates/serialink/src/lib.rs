//! Checksummed request/response framing for serial links.
//!
//! serialink lets a master and a slave exchange short typed requests over any
//! byte-oriented duplex channel, one blocking frame at a time.
//!
//! # Crate Structure
//!
//! - [`channel`]: Byte-level channel abstraction (memory, unix socket, serial port)
//! - [`frame`]: Frame codec, XOR checksum, request header and protocol sessions
//!
//! ```no_run
//! use serialink::channel::UnixDomainSocket;
//! use serialink::frame::{Request, Role, Session};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut channel = UnixDomainSocket::connect("/tmp/serialink.sock")?;
//! let mut session = Session::open(&mut channel);
//!
//! let mut reply = Vec::new();
//! let request = Request::new(Role::Master, 2).byte();
//! let code = session.send_single_and_receive(request, 0x01, &mut reply)?;
//! println!("reply {code:#04x}: {reply:?}");
//! session.close()?;
//! # Ok(())
//! # }
//! ```

/// Re-export channel types.
pub mod channel {
    pub use serialink_channel::*;
}

/// Re-export frame types.
pub mod frame {
    pub use serialink_frame::*;
}
