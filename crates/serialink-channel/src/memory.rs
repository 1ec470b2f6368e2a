use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::Result;
use crate::traits::Channel;

type Queue = Arc<Mutex<VecDeque<u8>>>;

/// In-memory duplex channel.
///
/// A standalone channel ([`MemoryChannel::new`]) has an inbound queue fed by
/// [`inject`](MemoryChannel::inject) and an outbound queue inspected with
/// [`written`](MemoryChannel::written). Two endpoints from
/// [`MemoryChannel::pair`] are cross-wired and may live on different threads.
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    inbound: Queue,
    outbound: Queue,
    flushes: Arc<Mutex<usize>>,
}

impl MemoryChannel {
    /// Create a standalone endpoint with empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create two connected endpoints: bytes written on one are readable on the other.
    pub fn pair() -> (Self, Self) {
        let a_to_b = Queue::default();
        let b_to_a = Queue::default();
        let left = Self {
            inbound: Arc::clone(&b_to_a),
            outbound: Arc::clone(&a_to_b),
            flushes: Arc::default(),
        };
        let right = Self {
            inbound: a_to_b,
            outbound: b_to_a,
            flushes: Arc::default(),
        };
        (left, right)
    }

    /// Make `bytes` readable on this endpoint.
    pub fn inject(&self, bytes: &[u8]) {
        lock(&self.inbound).extend(bytes.iter().copied());
    }

    /// Snapshot of bytes written and not yet consumed by a peer.
    pub fn written(&self) -> Vec<u8> {
        lock(&self.outbound).iter().copied().collect()
    }

    /// Remove and return every byte written so far.
    pub fn take_written(&self) -> Vec<u8> {
        lock(&self.outbound).drain(..).collect()
    }

    /// Number of times [`Channel::flush`] was called on this endpoint.
    pub fn flush_count(&self) -> usize {
        *self.flushes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Channel for MemoryChannel {
    fn available(&mut self) -> Result<usize> {
        Ok(lock(&self.inbound).len())
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        Ok(lock(&self.inbound).pop_front())
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        lock(&self.outbound).push_back(byte);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        *self.flushes.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) += 1;
        Ok(())
    }
}

// A panicking test thread must not wedge the other endpoint.
fn lock(queue: &Queue) -> MutexGuard<'_, VecDeque<u8>> {
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
