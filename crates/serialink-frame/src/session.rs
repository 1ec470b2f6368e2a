use serialink_channel::Channel;
use tracing::{debug, warn};

use crate::codec::FrameConfig;
use crate::error::Result;
use crate::reader::FrameReader;
use crate::writer::FrameWriter;

/// A protocol session bound to one channel.
///
/// The session borrows the channel for its whole lifetime and never owns it.
/// Every operation is synchronous: it returns only once its frame has been
/// fully written, or fully read and checked. Closing consumes the session, so
/// no operation can run on a released binding.
pub struct Session<'a, C: Channel + ?Sized> {
    channel: &'a mut C,
    config: FrameConfig,
}

impl<'a, C: Channel + ?Sized> Session<'a, C> {
    /// Bind to `channel` with default configuration, discarding stale input.
    pub fn open(channel: &'a mut C) -> Self {
        Self::open_with_config(channel, FrameConfig::default())
    }

    /// Bind to `channel`, discarding whatever is already queued on it.
    ///
    /// The drain is best-effort; a channel error here is logged, not returned.
    pub fn open_with_config(channel: &'a mut C, config: FrameConfig) -> Self {
        match channel.drain() {
            Ok(discarded) => debug!(discarded, "session opened"),
            Err(err) => warn!(error = %err, "could not drain channel on open"),
        }
        Self { channel, config }
    }

    /// Bind to a channel that cannot hold stale input, such as a socket
    /// accepted a moment ago. Nothing is drained, so a frame the peer sent
    /// right after connecting is kept.
    pub fn attach(channel: &'a mut C, config: FrameConfig) -> Self {
        debug!("session attached");
        Self { channel, config }
    }

    /// Drain pending input, flush pending output and release the channel.
    pub fn close(self) -> Result<()> {
        let discarded = self.channel.drain()?;
        self.channel.flush()?;
        debug!(discarded, "session closed");
        Ok(())
    }

    /// Receive one frame into `buffer`; returns the frame's response code.
    pub fn receive(&mut self, buffer: &mut Vec<u8>) -> Result<u8> {
        FrameReader::with_config(&mut *self.channel, self.config.clone()).read_frame(buffer)
    }

    /// Send one frame carrying `payload` (1 to 50 bytes).
    pub fn send(&mut self, request: u8, payload: &[u8]) -> Result<()> {
        FrameWriter::new(&mut *self.channel).send(request, payload)
    }

    /// Send one frame carrying a single byte.
    pub fn send_single(&mut self, request: u8, value: u8) -> Result<()> {
        self.send(request, &[value])
    }

    /// Send one frame, then block for the reply.
    ///
    /// Nothing is read if the send fails.
    pub fn send_and_receive(
        &mut self,
        request: u8,
        payload: &[u8],
        response: &mut Vec<u8>,
    ) -> Result<u8> {
        self.send(request, payload)?;
        self.receive(response)
    }

    /// [`send_single`](Self::send_single) followed by a receive.
    pub fn send_single_and_receive(
        &mut self,
        request: u8,
        value: u8,
        response: &mut Vec<u8>,
    ) -> Result<u8> {
        self.send_and_receive(request, &[value], response)
    }

    /// Current session configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Borrow the bound channel.
    pub fn channel(&mut self) -> &mut C {
        self.channel
    }
}
