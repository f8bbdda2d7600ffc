/// Packs variable length codes into a dense, MSB-first bit stream held in memory.
/// The exact number of bits written is tracked so the final padding can be ignored
/// by the reader.
#[derive(Debug)]
pub struct BitWriter {
    /// Output buffer holding all full bytes written so far.
    output: Vec<u8>,
    /// Private queue to hold bits that are waiting to be put as bytes into the output buffer.
    queue: u64,
    /// Count of valid bits in the queue.
    q_bits: u8,
    /// Total number of bits written.
    bit_len: u64,
}

impl BitWriter {
    /// Create a new BitWriter, reserving `capacity` bytes of output.
    pub fn new(capacity: usize) -> Self {
        Self {
            output: Vec::with_capacity(capacity),
            queue: 0,
            q_bits: 0,
            bit_len: 0,
        }
    }

    /// Move full bytes out of the queue once it is too full to take another 32 bit code.
    fn push_queue(&mut self) {
        if self.q_bits > 32 {
            while self.q_bits > 7 {
                let byte = (self.queue >> (self.q_bits - 8)) as u8;
                self.output.push(byte);
                self.q_bits -= 8;
            }
        }
    }

    /// Put the low `len` bits of `code` on the stream, most significant bit first.
    /// `len` must be 1..=32.
    pub fn out_bits(&mut self, code: u32, len: u8) {
        debug_assert!((1..=32).contains(&len));
        self.push_queue();
        let mask = (1_u64 << len) - 1;
        self.queue <<= len;
        self.queue |= code as u64 & mask;
        self.q_bits += len;
        self.bit_len += len as u64;
    }

    /// Debugging function. Report current position as [byte.bit].
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.bit_len / 8, self.bit_len % 8)
    }

    /// Flush the queue and hand back the packed bytes together with the exact bit count.
    /// The last byte is padded with zeros in its least significant bits.
    pub fn finish(mut self) -> (Vec<u8>, u64) {
        self.flush();
        (self.output, self.bit_len)
    }

    /// Flushes the remaining bits (1-7) from the queue, padding with 0s in the least
    /// signficant bits.
    fn flush(&mut self) {
        // First push out all the full bytes
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte);
            self.q_bits -= 8;
        }
        // Then push out the remaining bits
        if self.q_bits > 0 {
            let mut byte = (self.queue & (0xff >> (8 - self.q_bits))) as u8;
            byte <<= 8 - self.q_bits;
            self.output.push(byte);
            self.q_bits = 0;
        }
    }
}
