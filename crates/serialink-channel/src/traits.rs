use crate::error::Result;

/// A byte-oriented duplex channel.
///
/// This is the only interface the framing engine needs from a transport.
/// Implementations must not block in [`available`](Channel::available) or
/// [`read_byte`](Channel::read_byte); the engine polls.
pub trait Channel {
    /// Number of bytes that can be read without blocking.
    fn available(&mut self) -> Result<usize>;

    /// Read and consume one byte, or `Ok(None)` if nothing is queued.
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Queue one byte for transmission.
    fn write_byte(&mut self, byte: u8) -> Result<()>;

    /// Block until every queued byte has left the local side.
    fn flush(&mut self) -> Result<()>;

    /// Write a byte slice, one byte at a time.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Discard every byte that is immediately readable.
    ///
    /// Returns the number of bytes thrown away.
    fn drain(&mut self) -> Result<usize> {
        let mut discarded = 0usize;
        while self.read_byte()?.is_some() {
            discarded += 1;
        }
        Ok(discarded)
    }
}

impl<C: Channel + ?Sized> Channel for &mut C {
    fn available(&mut self) -> Result<usize> {
        (**self).available()
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_all(bytes)
    }
}

impl<C: Channel + ?Sized> Channel for Box<C> {
    fn available(&mut self) -> Result<usize> {
        (**self).available()
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_all(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryChannel;

    #[test]
    fn drain_counts_discarded_bytes() {
        let mut channel = MemoryChannel::new();
        channel.inject(&[1, 2, 3, 4, 5]);

        assert_eq!(channel.drain().unwrap(), 5);
        assert_eq!(channel.available().unwrap(), 0);
        assert_eq!(channel.drain().unwrap(), 0);
    }

    #[test]
    fn write_all_writes_in_order() {
        let mut channel = MemoryChannel::new();
        channel.write_all(&[0xC1, 0x02, 0xAA]).unwrap();
        assert_eq!(channel.written(), vec![0xC1, 0x02, 0xAA]);
    }

    #[test]
    fn boxed_dyn_channel_forwards() {
        let mut boxed: Box<dyn Channel> = Box::new(MemoryChannel::new());
        boxed.write_byte(0x42).unwrap();
        boxed.flush().unwrap();
        assert_eq!(boxed.available().unwrap(), 0);
        assert_eq!(boxed.read_byte().unwrap(), None);
    }

    #[test]
    fn mutable_reference_forwards() {
        fn pull<C: Channel>(mut channel: C) -> Option<u8> {
            channel.read_byte().unwrap()
        }

        let mut channel = MemoryChannel::new();
        channel.inject(&[9]);
        assert_eq!(pull(&mut channel), Some(9));
        assert_eq!(channel.available().unwrap(), 0);
    }
}
