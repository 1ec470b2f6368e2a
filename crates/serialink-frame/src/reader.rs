use std::time::Instant;

use serialink_channel::Channel;
use tracing::{debug, trace, warn};

use crate::checksum::Checksum;
use crate::codec::{FrameConfig, MAX_LENGTH};
use crate::error::{FrameError, Result};

/// Reads complete frames from any [`Channel`].
///
/// Reading blocks, polling the channel at the configured interval, until a
/// whole frame has arrived or has been judged malformed.
pub struct FrameReader<C> {
    inner: C,
    config: FrameConfig,
}

impl<C: Channel> FrameReader<C> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: C) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: C, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read the next frame into `buffer` (blocking).
    ///
    /// On success `buffer` holds exactly the payload and the returned value is
    /// the frame's request byte, which is never 0. With a timeout set, the
    /// wait for a frame to start ends in [`FrameError::Idle`] and leaves the
    /// channel untouched; once a frame has started it gets a fresh timeout
    /// to complete. On a malformed frame
    /// (see [`FrameError::drains_channel`]) every byte still queued on the
    /// channel is discarded before the error is returned. After a failure the
    /// contents of `buffer` are unspecified.
    pub fn read_frame(&mut self, buffer: &mut Vec<u8>) -> Result<u8> {
        let started = Instant::now();
        match self.read_frame_inner(buffer, started) {
            Ok(response) => Ok(response),
            Err(err) => {
                if err.drains_channel() {
                    warn!(error = %err, "discarding malformed frame");
                    match self.inner.drain() {
                        Ok(discarded) => debug!(discarded, "drained channel after bad frame"),
                        Err(drain_err) => warn!(error = %drain_err, "drain after bad frame failed"),
                    }
                }
                Err(err)
            }
        }
    }

    fn read_frame_inner(&mut self, buffer: &mut Vec<u8>, started: Instant) -> Result<u8> {
        self.wait_for(self.config.min_frame_length, started)
            .map_err(|err| match err {
                FrameError::Timeout(timeout) => FrameError::Idle(timeout),
                other => other,
            })?;
        let frame_started = Instant::now();

        let mut sum = Checksum::new();
        let request = self.next_byte()?;
        sum.update(request);
        let length = self.next_byte()?;
        sum.update(length);

        if length == 0 || length > MAX_LENGTH {
            return Err(FrameError::InvalidLength { length });
        }

        // Payload plus the trailing checksum byte.
        self.wait_for(usize::from(length), frame_started)?;

        let payload_len = usize::from(length) - 1;
        buffer.clear();
        buffer
            .try_reserve_exact(payload_len)
            .map_err(|_| FrameError::Allocation {
                requested: payload_len,
            })?;
        buffer.resize(payload_len, 0);
        for slot in buffer.iter_mut() {
            let byte = self.next_byte()?;
            *slot = byte;
            sum.update(byte);
        }

        let received = self.next_byte()?;
        if received != sum.value() {
            return Err(FrameError::ChecksumMismatch {
                expected: sum.value(),
                actual: received,
            });
        }
        if request == 0 {
            return Err(FrameError::ReservedResponse);
        }

        trace!(request, payload_len, "received frame");
        Ok(request)
    }

    fn wait_for(&mut self, count: usize, started: Instant) -> Result<()> {
        loop {
            if self.inner.available()? >= count {
                return Ok(());
            }
            if let Some(timeout) = self.config.timeout {
                if started.elapsed() >= timeout {
                    return Err(FrameError::Timeout(timeout));
                }
            }
            std::thread::sleep(self.config.poll_interval);
        }
    }

    fn next_byte(&mut self) -> Result<u8> {
        self.inner.read_byte()?.ok_or(FrameError::Truncated)
    }

    /// Borrow the underlying channel.
    pub fn get_ref(&self) -> &C {
        &self.inner
    }

    /// Mutably borrow the underlying channel.
    pub fn get_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Consume the reader and return the inner channel.
    pub fn into_inner(self) -> C {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
