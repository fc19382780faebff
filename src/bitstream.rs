//! Bit-granular reading and writing of SBC frames
//!
//! Both directions work MSB-first over a fixed-size byte buffer. Overruns are
//! not reported per call: they set a sticky error flag that the caller checks
//! once at the end of a frame.

/// Bitstream writer over a buffer of declared size
#[derive(Debug)]
pub struct BitWriter {
    /// Output buffer, sized up front
    data: Vec<u8>,
    /// Bit cache for sub-byte operations
    cache: u32,
    /// Number of bits in cache
    cache_bits: u32,
    /// Bytes emitted so far
    position: usize,
    /// Sticky overrun flag
    error: bool,
}

impl BitWriter {
    /// Create a writer for a buffer of exactly `size` bytes
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0u8; size],
            cache: 0,
            cache_bits: 0,
            position: 0,
            error: false,
        }
    }

    /// Write the low `n` bits of `value` (`n` in 0..=32)
    pub fn put_bits(&mut self, value: u32, n: u32) {
        debug_assert!(n <= 32);
        if n == 0 {
            return;
        }

        let mut remaining = n;
        while remaining > 0 {
            let take = remaining.min(8 - self.cache_bits);
            let chunk = (value >> (remaining - take)) & ((1u32 << take) - 1);
            self.cache = (self.cache << take) | chunk;
            self.cache_bits += take;
            remaining -= take;

            if self.cache_bits == 8 {
                self.emit_byte();
            }
        }
    }

    fn emit_byte(&mut self) {
        match self.data.get_mut(self.position) {
            Some(byte) if !self.error => *byte = self.cache as u8,
            _ => self.error = true,
        }
        self.position += 1;
        self.cache = 0;
        self.cache_bits = 0;
    }

    /// Pad the last partial byte with zero bits and emit it
    pub fn flush(&mut self) {
        if self.cache_bits > 0 {
            let pad = 8 - self.cache_bits;
            self.put_bits(0, pad);
        }
    }

    /// Absolute bit offset from the start of the buffer
    pub fn bit_position(&self) -> usize {
        self.position * 8 + self.cache_bits as usize
    }

    /// Declared buffer size in bits
    pub fn capacity_bits(&self) -> usize {
        self.data.len() * 8
    }

    /// True once a write went past the declared size
    pub fn has_error(&self) -> bool {
        self.error
    }

    /// Bytes written so far
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Patch an already written byte
    pub fn set_byte(&mut self, index: usize, value: u8) {
        if let Some(byte) = self.data.get_mut(index) {
            *byte = value;
        } else {
            self.error = true;
        }
    }

    /// Consume the writer and return the full buffer
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Bitstream reader over a borrowed byte buffer
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Refill accumulator
    cache: u64,
    /// Valid bits in the accumulator
    cache_bits: u32,
    /// Next byte to load into the accumulator
    next_byte: usize,
    /// Bits handed out to the caller
    consumed: usize,
    /// Sticky overrun or mismatch flag
    error: bool,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            cache: 0,
            cache_bits: 0,
            next_byte: 0,
            consumed: 0,
            error: false,
        }
    }

    /// Start reading at a byte offset
    pub fn at_byte(data: &'a [u8], offset: usize) -> Self {
        let mut reader = Self::new(data);
        reader.next_byte = offset.min(data.len());
        reader.consumed = offset * 8;
        if offset > data.len() {
            reader.error = true;
        }
        reader
    }

    fn refill(&mut self) {
        while self.cache_bits <= 56 {
            match self.data.get(self.next_byte) {
                Some(&byte) => {
                    self.cache |= (byte as u64) << (56 - self.cache_bits);
                    self.cache_bits += 8;
                    self.next_byte += 1;
                }
                None => break,
            }
        }
    }

    /// Read `n` bits (`n` in 0..=32) MSB-first.
    ///
    /// Past the end of the buffer the missing bits read as zero and the
    /// error flag is raised.
    pub fn get_bits(&mut self, n: u32) -> u32 {
        debug_assert!(n <= 32);
        if n == 0 {
            return 0;
        }
        if self.cache_bits < n {
            self.refill();
        }
        if self.cache_bits < n {
            self.error = true;
            self.cache_bits = n;
        }

        let value = (self.cache >> (64 - n)) as u32;
        self.cache <<= n;
        self.cache_bits -= n;
        self.consumed += n as usize;
        value
    }

    /// Read `n` bits and flag an error unless they equal `expected`
    pub fn get_fixed_bits(&mut self, n: u32, expected: u32) {
        if self.get_bits(n) != expected {
            self.error = true;
        }
    }

    /// Absolute bit offset of the next bit to be read
    pub fn bit_position(&self) -> usize {
        self.consumed
    }

    /// True once a read ran out of data or a fixed field mismatched
    pub fn has_error(&self) -> bool {
        self.error
    }
}
