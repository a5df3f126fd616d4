//! # Bit Reader and Writer
//!
//! Both sides work most-significant-bit first. They know nothing about
//! the codes that are transported through them.

use crate::error::FormatError;

/// Position within the current byte, counted down from 7 to 0
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
struct State(u8);

impl State {
    const FRESH: State = State(7);

    /// Advance by one bit, returns true when a byte boundary is crossed
    fn tick(&mut self) -> bool {
        if self.0 == 0 {
            self.0 = 7;
            true
        } else {
            self.0 -= 1;
            false
        }
    }

    fn with_free(free: usize) -> Self {
        debug_assert!((1..=8).contains(&free));
        State((free - 1) as u8)
    }

    fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

fn mask(count: usize) -> u32 {
    if count >= 32 {
        u32::MAX
    } else {
        (1 << count) - 1
    }
}

/// A bitwise writer
#[derive(Debug)]
pub struct BitWriter {
    buffer: Vec<u8>,
    /// free bits in `curr`, minus one
    state: State,
    curr: u8,
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWriter {
    /// Creates a new instance
    pub fn new() -> Self {
        Self {
            buffer: vec![],
            state: State::FRESH,
            curr: 0,
        }
    }

    fn avail(&self) -> usize {
        self.state.as_usize() + 1
    }

    /// Number of bits written so far
    pub fn bit_len(&self) -> usize {
        self.buffer.len() * 8 + (8 - self.avail())
    }

    /// Write a single bit
    pub fn write_bit(&mut self, bit: bool) {
        self.curr = (self.curr << 1) | u8::from(bit);
        if self.state.tick() {
            self.buffer.push(self.curr);
            self.curr = 0;
        }
    }

    /// Write the low `count` bits of `val`, most significant first
    pub fn write_bits(&mut self, val: u32, count: u8) {
        debug_assert!(count <= 32);
        let mut todo = usize::from(count);
        let avail = self.avail();
        if avail < 8 {
            if todo < avail {
                self.curr = (self.curr << todo) | (val & mask(todo)) as u8;
                self.state = State::with_free(avail - todo);
                return;
            }
            let rest = todo - avail;
            let prefix = ((val >> rest) & mask(avail)) as u8;
            self.buffer.push(self.curr << avail | prefix);
            todo = rest;
        }
        // at this point, the writer is starting the next byte
        while todo >= 8 {
            let rest = todo - 8;
            self.buffer.push(((val >> rest) & 0xFF) as u8);
            todo = rest;
        }
        self.curr = (val & mask(todo)) as u8;
        self.state = State::with_free(8 - todo);
    }

    /// Pad a trailing partial byte with zero bits
    pub fn flush(&mut self) {
        let offset = self.avail();
        if offset < 8 {
            self.buffer.push(self.curr << offset);
            self.curr = 0;
            self.state = State::FRESH;
        }
    }

    /// Flush and return the buffer
    pub fn done(mut self) -> Vec<u8> {
        self.flush();
        self.buffer
    }
}

/// Read bits from a slice
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// bits left in `buffer`
    state: State,
    buffer: u8,
    inner: std::slice::Iter<'a, u8>,
}

impl<'a> BitReader<'a> {
    /// Creates a new instance
    pub fn new(bytes: &'a [u8]) -> BitReader<'a> {
        BitReader {
            state: State::default(),
            buffer: 0,
            inner: bytes.iter(),
        }
    }

    /// Bits that can still be read
    pub fn remaining_bits(&self) -> usize {
        self.inner.len() * 8 + self.state.as_usize()
    }

    /// Whole bytes that have not been touched yet
    pub fn remaining_bytes(&self) -> &'a [u8] {
        self.inner.as_slice()
    }

    /// Read a single bit
    pub fn read_bit(&mut self) -> Result<bool, FormatError> {
        self.next().ok_or(FormatError::UnexpectedEndOfStream)
    }

    /// Read `count` bits, the first one ending up as the most significant
    ///
    /// Nothing is consumed if fewer than `count` bits are left.
    pub fn read_bits(&mut self, count: u8) -> Result<u32, FormatError> {
        debug_assert!(count <= 32);
        let mut todo = usize::from(count);
        if self.remaining_bits() < todo {
            return Err(FormatError::UnexpectedEndOfStream);
        }
        let mut value = 0u32;
        while todo > 0 {
            if self.state.as_usize() == 0 && todo >= 8 {
                // byte aligned, skip the bit loop
                let byte = self.inner.next().ok_or(FormatError::UnexpectedEndOfStream)?;
                value = (value << 8) | u32::from(*byte);
                todo -= 8;
            } else {
                let bit = self.read_bit()?;
                value = (value << 1) | u32::from(bit);
                todo -= 1;
            }
        }
        Ok(value)
    }
}

impl Iterator for BitReader<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.tick() {
            if let Some(value) = self.inner.next() {
                self.buffer = *value;
            } else {
                self.state = State(0);
                return None;
            }
        }
        let (next_buffer, carry) = self.buffer.overflowing_mul(2);
        self.buffer = next_buffer;
        Some(carry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = self.remaining_bits();
        (size, Some(size))
    }
}
