use bytes::BytesMut;
use serialink_channel::Channel;
use tracing::trace;

use crate::codec::{encode_frame, Frame, MAX_PAYLOAD};
use crate::error::Result;

/// Writes complete frames to any [`Channel`].
pub struct FrameWriter<C> {
    inner: C,
    buf: BytesMut,
}

impl<C: Channel> FrameWriter<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(MAX_PAYLOAD + 3),
        }
    }

    /// Write a complete frame (blocking).
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(frame.request, frame.payload.as_ref())
    }

    /// Encode and send one frame, then wait for the channel to flush.
    ///
    /// A payload outside `1..=MAX_PAYLOAD` bytes is rejected before anything
    /// is written.
    pub fn send(&mut self, request: u8, payload: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_frame(request, payload, &mut self.buf)?;
        self.inner.write_all(&self.buf)?;
        self.inner.flush()?;

        trace!(request, payload_len = payload.len(), "sent frame");
        Ok(())
    }

    /// Borrow the underlying channel.
    pub fn get_ref(&self) -> &C {
        &self.inner
    }

    /// Mutably borrow the underlying channel.
    pub fn get_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Consume the writer and return the inner channel.
    pub fn into_inner(self) -> C {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use serialink_channel::{ChannelError, MemoryChannel};

    use super::*;
    use crate::codec::decode_frame;
    use crate::error::FrameError;
    use crate::reader::FrameReader;

    #[test]
    fn write_single_byte_frame() {
        let mut writer = FrameWriter::new(MemoryChannel::new());
        writer.send(0x01, &[0xAA]).unwrap();

        assert_eq!(writer.get_ref().written(), vec![0x01, 0x02, 0xAA, 0xA9]);
        assert_eq!(writer.get_ref().flush_count(), 1);
    }

    #[test]
    fn write_multiple_frames() {
        let mut writer = FrameWriter::new(MemoryChannel::new());
        writer.send(0xC1, b"one").unwrap();
        writer.send(0xC2, b"two").unwrap();

        let mut wire = BytesMut::from(writer.get_ref().written().as_slice());
        let f1 = decode_frame(&mut wire).unwrap().unwrap();
        let f2 = decode_frame(&mut wire).unwrap().unwrap();
        assert_eq!((f1.request, f1.payload.as_ref()), (0xC1, b"one".as_ref()));
        assert_eq!((f2.request, f2.payload.as_ref()), (0xC2, b"two".as_ref()));
    }

    #[test]
    fn empty_payload_writes_nothing() {
        let mut writer = FrameWriter::new(MemoryChannel::new());
        let err = writer.send(0xC1, &[]).unwrap_err();

        assert!(matches!(err, FrameError::PayloadSize { size: 0, .. }));
        assert!(writer.get_ref().written().is_empty());
        assert_eq!(writer.get_ref().flush_count(), 0);
    }

    #[test]
    fn oversized_payload_writes_nothing() {
        let mut writer = FrameWriter::new(MemoryChannel::new());
        for size in [MAX_PAYLOAD + 1, 200] {
            let err = writer.send(0xC1, &vec![0u8; size]).unwrap_err();
            assert!(matches!(err, FrameError::PayloadSize { size: s, max: 50 } if s == size));
        }
        assert!(writer.get_ref().written().is_empty());
    }

    #[test]
    fn write_frame_method() {
        let mut writer = FrameWriter::new(MemoryChannel::new());
        writer.write_frame(&Frame::new(0xD4, "abc")).unwrap();

        let mut reader = FrameReader::new(MemoryChannel::new());
        reader.get_ref().inject(&writer.get_ref().written());
        let mut buffer = Vec::new();
        assert_eq!(reader.read_frame(&mut buffer).unwrap(), 0xD4);
        assert_eq!(buffer, b"abc");
    }

    #[test]
    fn channel_failure_propagates() {
        let mut writer = FrameWriter::new(RefusingChannel);
        let err = writer.send(0xC1, b"x").unwrap_err();
        assert!(matches!(err, FrameError::Channel(ChannelError::Closed)));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut writer = FrameWriter::new(MemoryChannel::new());
        writer.get_mut().write_byte(0x55).unwrap();
        assert_eq!(writer.get_ref().written(), vec![0x55]);

        writer.send(0x01, &[0xAA]).unwrap();
        let inner = writer.into_inner();
        assert_eq!(inner.take_written(), vec![0x55, 0x01, 0x02, 0xAA, 0xA9]);
        assert_eq!(inner.flush_count(), 1);
    }

    struct RefusingChannel;

    impl Channel for RefusingChannel {
        fn available(&mut self) -> serialink_channel::Result<usize> {
            Ok(0)
        }

        fn read_byte(&mut self) -> serialink_channel::Result<Option<u8>> {
            Ok(None)
        }

        fn write_byte(&mut self, _byte: u8) -> serialink_channel::Result<()> {
            Err(ChannelError::Closed)
        }

        fn flush(&mut self) -> serialink_channel::Result<()> {
            Ok(())
        }
    }
}
