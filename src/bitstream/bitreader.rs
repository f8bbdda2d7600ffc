//! BitReader: reads back the dense bit stream produced by the BitWriter.
//!
//! The reader is limited to the exact bit count recorded next to the payload, so the
//! zero padding at the end of the last byte is never mistaken for data.

/// Reads bits MSB-first from a byte slice.
#[derive(Debug)]
pub struct BitReader<'a> {
    buffer: &'a [u8],
    /// Absolute position of the next bit to read
    position: u64,
    /// One past the last readable bit
    limit: u64,
}

impl<'a> BitReader<'a> {
    /// Creates a new BitReader that yields at most `bit_len` bits of `buffer`.
    /// If the buffer holds fewer bits than that, reading stops at the end of the buffer.
    pub fn new(buffer: &'a [u8], bit_len: u64) -> Self {
        Self {
            buffer,
            position: 0,
            limit: bit_len.min(buffer.len() as u64 * 8),
        }
    }

    /// Next bit as 0 or 1, or None once the readable bits are used up.
    pub fn bit(&mut self) -> Option<usize> {
        if self.position >= self.limit {
            return None;
        }
        let byte = self.buffer[(self.position / 8) as usize];
        let shift = 7 - (self.position % 8) as u32;
        self.position += 1;
        Some(((byte >> shift) & 1) as usize)
    }

    /// Next bit as a branch direction: true for 1 (right), false for 0 (left).
    pub fn bool_bit(&mut self) -> Option<bool> {
        self.bit().map(|bit| bit == 1)
    }

    /// Bits still available to read.
    pub fn remaining(&self) -> u64 {
        self.limit - self.position
    }

    /// Debugging function. Report current position as [byte.bit].
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.position / 8, self.position % 8)
    }
}
