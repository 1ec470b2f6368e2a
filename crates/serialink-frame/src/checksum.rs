//! XOR frame checksum.

/// Running XOR accumulator.
///
/// Both directions fold bytes in as they cross the channel, so neither side
/// ever needs the whole frame in memory to check it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checksum(u8);

impl Checksum {
    pub fn new() -> Self {
        Self(0)
    }

    /// Fold one byte in.
    pub fn update(&mut self, byte: u8) {
        self.0 ^= byte;
    }

    /// Fold a slice in, left to right.
    pub fn update_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.update(byte);
        }
    }

    /// Current checksum value.
    pub fn value(&self) -> u8 {
        self.0
    }
}

/// XOR of every byte in `bytes`; `0` for an empty slice.
pub fn checksum(bytes: &[u8]) -> u8 {
    let mut sum = Checksum::new();
    sum.update_slice(bytes);
    sum.value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_zero() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(Checksum::new().value(), 0);
    }

    #[test]
    fn single_payload_frame() {
        assert_eq!(checksum(&[0x01, 0x02, 0xAA]), 0xA9);
    }

    #[test]
    fn deterministic() {
        let bytes = [0xC3, 0x05, 0x10, 0x20, 0x30, 0x40];
        assert_eq!(checksum(&bytes), checksum(&bytes));
    }

    #[test]
    fn repeated_byte_cancels() {
        assert_eq!(checksum(&[0x5A, 0x5A]), 0);
        assert_eq!(checksum(&[0x5A, 0x5A, 0x5A]), 0x5A);
    }

    #[test]
    fn accumulator_matches_one_shot() {
        let bytes: Vec<u8> = (0..=255u8).collect();
        let mut sum = Checksum::new();
        for &byte in &bytes[..100] {
            sum.update(byte);
        }
        sum.update_slice(&bytes[100..]);
        assert_eq!(sum.value(), checksum(&bytes));
    }

    #[test]
    fn appending_checksum_yields_zero() {
        let mut frame = vec![0xD2, 0x04, 0x01, 0x02, 0x03];
        frame.push(checksum(&frame));
        assert_eq!(checksum(&frame), 0);
    }
}
