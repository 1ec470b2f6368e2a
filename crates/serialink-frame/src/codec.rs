use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::checksum::{checksum, Checksum};
use crate::error::{FrameError, Result};
use crate::request::Request;

/// Request (1) + length (1).
pub const HEADER_SIZE: usize = 2;

/// Maximum payload bytes per frame.
pub const MAX_PAYLOAD: usize = 50;

/// Largest legal length byte (payload + checksum).
pub const MAX_LENGTH: u8 = MAX_PAYLOAD as u8 + 1;

/// Bytes that must be queued before a receive starts parsing.
pub const MIN_FRAME_LENGTH: usize = 4;

/// Delay between availability checks while waiting for bytes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Receive timeout offered for callers that opt in; not applied by default.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The request byte (response code when received).
    pub request: u8,
    /// The payload, at most [`MAX_PAYLOAD`] bytes.
    pub payload: Bytes,
}

impl Frame {
    pub fn new(request: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            request,
            payload: payload.into(),
        }
    }

    /// The request byte decoded into role and action.
    pub fn request_info(&self) -> Request {
        Request::from(self.request)
    }

    /// Total bytes on the wire (header + payload + checksum).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + 1
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬──────────┬─────────────────────┬──────────┐
/// │ Request  │ Length   │ Payload             │ Checksum │
/// │ (1B)     │ (1B)     │ (Length - 1 bytes)  │ (1B XOR) │
/// └──────────┴──────────┴─────────────────────┴──────────┘
/// ```
/// The payload must hold between 1 and [`MAX_PAYLOAD`] bytes.
pub fn encode_frame(request: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.is_empty() || payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadSize {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    let length = payload.len() as u8 + 1;

    let mut sum = Checksum::new();
    sum.update(request);
    sum.update(length);
    sum.update_slice(payload);

    dst.reserve(HEADER_SIZE + payload.len() + 1);
    dst.put_u8(request);
    dst.put_u8(length);
    dst.put_slice(payload);
    dst.put_u8(sum.value());
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer; on error the buffer
/// is left untouched. Unlike [`encode_frame`], an empty payload
/// (length byte 1) is accepted.
pub fn decode_frame(src: &mut BytesMut) -> Result<Option<Frame>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    let request = src[0];
    let length = src[1];
    if length == 0 || length > MAX_LENGTH {
        return Err(FrameError::InvalidLength { length });
    }

    let total = HEADER_SIZE + usize::from(length);
    if src.len() < total {
        return Ok(None);
    }

    let expected = checksum(&src[..total - 1]);
    let actual = src[total - 1];
    if expected != actual {
        return Err(FrameError::ChecksumMismatch { expected, actual });
    }
    if request == 0 {
        return Err(FrameError::ReservedResponse);
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(usize::from(length) - 1).freeze();
    src.advance(1);

    Ok(Some(Frame { request, payload }))
}

/// Configuration for the blocking frame engine.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Delay between availability checks. Default: 25 ms.
    pub poll_interval: Duration,
    /// Bytes that must be queued before a receive starts parsing. Default: 4.
    pub min_frame_length: usize,
    /// Upper bound on one receive. Default: `None` (wait forever).
    pub timeout: Option<Duration>,
}

impl FrameConfig {
    /// Enforce `timeout` on every receive.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            min_frame_length: MIN_FRAME_LENGTH,
            timeout: None,
        }
    }
}
