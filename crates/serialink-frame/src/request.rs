//! Request byte layout.
//!
//! ```text
//!  7   6   5   4   3   2   1   0
//! ┌───┬───┬───┬───┬───┬───┬───┬───┐
//! │ 1 │ 1 │ 0 │ S │  action code  │
//! └───┴───┴───┴───┴───┴───┴───┴───┘
//! ```
//! `S` is set when the frame originates from the slave.

use std::fmt;

/// Fixed tag in bits 7-5 (`110`).
pub const HEADER_TAG: u8 = 0xC0;

/// Bits occupied by the tag.
pub const HEADER_MASK: u8 = 0xE0;

/// Role bit (bit 4): set for slave-originated requests.
pub const SLAVE_BIT: u8 = 0x10;

/// Bits occupied by the action code.
pub const ACTION_MASK: u8 = 0x0F;

/// Action code conventionally used for error replies.
pub const ERROR_ACTION: u8 = 0x0F;

/// Single-byte payload meaning "false".
pub const VALUE_FALSE: u8 = 0x00;

/// Single-byte payload meaning "true".
pub const VALUE_TRUE: u8 = 0xFF;

/// Build a request byte.
///
/// `action` is truncated to its low four bits; no error is raised for larger values.
pub fn encode_request(is_slave: bool, action: u8) -> u8 {
    let mut request = (HEADER_TAG & HEADER_MASK) | (action & ACTION_MASK);
    if is_slave {
        request |= SLAVE_BIT;
    }
    request
}

/// Which side of the link produced a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Master,
    Slave,
}

impl Role {
    pub fn name(self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Slave => "slave",
        }
    }
}

/// A decoded view of a request byte.
///
/// Any byte converts into a `Request`; use [`has_header_tag`](Request::has_header_tag)
/// to check that it was built by [`encode_request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Request(u8);

impl Request {
    /// Encode a request for `role` with the given action code (low 4 bits kept).
    pub fn new(role: Role, action: u8) -> Self {
        Self(encode_request(role == Role::Slave, action))
    }

    pub fn byte(self) -> u8 {
        self.0
    }

    pub fn role(self) -> Role {
        if self.0 & SLAVE_BIT != 0 {
            Role::Slave
        } else {
            Role::Master
        }
    }

    pub fn action(self) -> u8 {
        self.0 & ACTION_MASK
    }

    /// True when bits 7-5 carry the `110` tag.
    pub fn has_header_tag(self) -> bool {
        self.0 & HEADER_MASK == HEADER_TAG
    }

    /// Same action, answered from the slave side.
    pub fn as_slave(self) -> Self {
        Self::new(Role::Slave, self.action())
    }

    /// True for the error action code.
    pub fn is_error(self) -> bool {
        self.has_header_tag() && self.action() == ERROR_ACTION
    }
}

impl From<u8> for Request {
    fn from(byte: u8) -> Self {
        Self(byte)
    }
}

impl From<Request> for u8 {
    fn from(request: Request) -> Self {
        request.0
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_header_tag() {
            write!(
                f,
                "{:#04x} ({} action {})",
                self.0,
                self.role().name(),
                self.action()
            )
        } else {
            write!(f, "{:#04x} (untagged)", self.0)
        }
    }
}
