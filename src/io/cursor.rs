//! Bounds-checked cursor over an in-memory buffer
//!
//! Every read checks the remaining length first and fails with
//! [`FlvError::Truncated`] instead of reading past the end. Reads hand out
//! `Bytes` slices of the shared buffer, so string payloads are not copied.

use bytes::{Buf, Bytes};

use super::endian;
use crate::error::{FlvError, Result};

/// Forward-only cursor over a `Bytes` buffer
#[derive(Debug, Clone)]
pub struct ByteCursor {
    buf: Bytes,
    /// Absolute position of `buf[0]` when the cursor was created
    base: u64,
    /// Bytes consumed so far
    consumed: usize,
}

impl ByteCursor {
    /// Create a cursor positioned at the start of `buf`
    pub fn new(buf: Bytes) -> Self {
        Self::with_base_offset(buf, 0)
    }

    /// Create a cursor whose reported offsets start at `base`
    pub fn with_base_offset(buf: Bytes, base: u64) -> Self {
        Self {
            buf,
            base,
            consumed: 0,
        }
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Check if the cursor is exhausted
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Absolute position of the next byte
    pub fn offset(&self) -> u64 {
        self.base + self.consumed as u64
    }

    /// Return exactly `n` bytes and advance past them
    pub fn read_exact(&mut self, n: usize, field: &'static str) -> Result<Bytes> {
        self.ensure(n, field)?;
        self.consumed += n;
        Ok(self.buf.split_to(n))
    }

    /// Return exactly `n` bytes without advancing
    pub fn peek(&self, n: usize, field: &'static str) -> Result<&[u8]> {
        self.ensure(n, field)?;
        Ok(&self.buf[..n])
    }

    /// Skip exactly `n` bytes
    pub fn skip(&mut self, n: usize, field: &'static str) -> Result<()> {
        self.ensure(n, field)?;
        self.consumed += n;
        self.buf.advance(n);
        Ok(())
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8> {
        self.claim(1, field)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_u16(&mut self, field: &'static str) -> Result<u16> {
        self.claim(2, field)?;
        Ok(self.buf.get_u16())
    }

    pub fn read_i16(&mut self, field: &'static str) -> Result<i16> {
        self.claim(2, field)?;
        Ok(self.buf.get_i16())
    }

    pub fn read_u24(&mut self, field: &'static str) -> Result<u32> {
        self.claim(3, field)?;
        Ok(endian::get_u24(&mut self.buf))
    }

    pub fn read_u32(&mut self, field: &'static str) -> Result<u32> {
        self.claim(4, field)?;
        Ok(self.buf.get_u32())
    }

    pub fn read_f64(&mut self, field: &'static str) -> Result<f64> {
        self.claim(8, field)?;
        Ok(self.buf.get_f64())
    }

    /// Check `n` bytes are available and count them as consumed
    fn claim(&mut self, n: usize, field: &'static str) -> Result<()> {
        self.ensure(n, field)?;
        self.consumed += n;
        Ok(())
    }

    fn ensure(&self, needed: usize, field: &'static str) -> Result<()> {
        let remaining = self.buf.remaining();
        if remaining < needed {
            return Err(FlvError::Truncated {
                offset: self.offset(),
                field,
                needed,
                remaining,
            });
        }
        Ok(())
    }
}
