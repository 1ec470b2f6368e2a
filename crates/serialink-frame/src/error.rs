use std::time::Duration;

use serialink_channel::ChannelError;

/// Errors that can occur while sending or receiving frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload to send is empty or larger than the protocol allows.
    #[error("payload size {size} outside 1..={max} bytes")]
    PayloadSize { size: usize, max: usize },

    /// The received length byte is 0 or exceeds the maximum.
    #[error("invalid frame length byte {length}")]
    InvalidLength { length: u8 },

    /// The receive buffer could not grow to hold the payload.
    #[error("could not allocate {requested} payload bytes")]
    Allocation { requested: usize },

    /// The received checksum does not match the frame contents.
    #[error("checksum mismatch (computed {expected:#04x}, received {actual:#04x})")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// A well-formed frame carried response code 0x00, which signals failure.
    #[error("frame carries reserved response code 0x00")]
    ReservedResponse,

    /// The channel ran out of bytes in the middle of a frame.
    #[error("channel ran dry mid-frame")]
    Truncated,

    /// Fewer than the minimum bytes arrived within the configured timeout.
    /// Nothing was consumed, so a frame that is still arriving stays queued.
    #[error("no frame started within {0:?}")]
    Idle(Duration),

    /// A frame started but did not complete within the configured timeout.
    #[error("frame incomplete after {0:?}")]
    Timeout(Duration),

    /// The underlying channel failed.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),
}

impl FrameError {
    /// Whether a receive failing with this error discards the channel's
    /// pending bytes to resynchronize.
    pub fn drains_channel(&self) -> bool {
        matches!(
            self,
            FrameError::InvalidLength { .. }
                | FrameError::ChecksumMismatch { .. }
                | FrameError::ReservedResponse
                | FrameError::Truncated
                | FrameError::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
