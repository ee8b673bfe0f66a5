//! Forward-only byte source over `std::io::Read`
//!
//! Wraps any reader and tracks the absolute stream position. Short reads
//! become [`FlvError::Io`] with kind `UnexpectedEof`; the only place a clean
//! end of stream is accepted is [`StreamSource::read_boundary`].

use std::io::{ErrorKind, Read};

use byteorder::ReadBytesExt;
use bytes::{Bytes, BytesMut};

use super::endian::FlvEndian;
use crate::error::{FlvError, Result};

/// Byte source that owns its reader for its whole lifetime
#[derive(Debug)]
pub struct StreamSource<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> StreamSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    /// Absolute position of the next byte
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Get a reference to the wrapped reader
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Consume the source, returning the wrapped reader
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read exactly `N` bytes
    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.fill(&mut out, field)?;
        Ok(out)
    }

    /// Read exactly `N` bytes, or `None` if the source is already exhausted
    ///
    /// A source that ends part-way through the field is still an error.
    pub fn read_boundary<const N: usize>(
        &mut self,
        field: &'static str,
    ) -> Result<Option<[u8; N]>> {
        let mut out = [0u8; N];
        let start = self.offset;
        let got = self.fill_some(&mut out, field)?;
        match got {
            0 => Ok(None),
            n if n == N => Ok(Some(out)),
            _ => Err(FlvError::Io {
                offset: start,
                field,
                source: ErrorKind::UnexpectedEof.into(),
            }),
        }
    }

    /// Read exactly `n` bytes into a fresh buffer
    pub fn read_bytes(&mut self, n: usize, field: &'static str) -> Result<Bytes> {
        let mut buf = BytesMut::zeroed(n);
        self.fill(&mut buf, field)?;
        Ok(buf.freeze())
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8> {
        self.typed(1, field, |r| r.read_u8())
    }

    pub fn read_u32(&mut self, field: &'static str) -> Result<u32> {
        self.typed(4, field, |r| r.read_u32::<FlvEndian>())
    }

    /// Discard exactly `n` bytes
    pub fn skip(&mut self, n: u64, field: &'static str) -> Result<()> {
        let start = self.offset;
        let copied = std::io::copy(&mut (&mut self.inner).take(n), &mut std::io::sink())
            .map_err(|source| FlvError::Io {
                offset: start,
                field,
                source,
            })?;
        self.offset += copied;
        if copied < n {
            return Err(FlvError::Io {
                offset: start,
                field,
                source: ErrorKind::UnexpectedEof.into(),
            });
        }
        Ok(())
    }

    /// Run a fixed-width `byteorder` read of `size` bytes
    fn typed<T>(
        &mut self,
        size: u64,
        field: &'static str,
        read: impl FnOnce(&mut R) -> std::io::Result<T>,
    ) -> Result<T> {
        let start = self.offset;
        let value = read(&mut self.inner).map_err(|source| FlvError::Io {
            offset: start,
            field,
            source,
        })?;
        self.offset += size;
        Ok(value)
    }

    fn fill(&mut self, buf: &mut [u8], field: &'static str) -> Result<()> {
        let start = self.offset;
        let got = self.fill_some(buf, field)?;
        if got < buf.len() {
            return Err(FlvError::Io {
                offset: start,
                field,
                source: ErrorKind::UnexpectedEof.into(),
            });
        }
        Ok(())
    }

    /// Read until `buf` is full or the source ends, returning the byte count
    fn fill_some(&mut self, buf: &mut [u8], field: &'static str) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => {
                    filled += n;
                    self.offset += n as u64;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(FlvError::Io {
                        offset: self.offset,
                        field,
                        source,
                    })
                }
            }
        }
        Ok(filled)
    }
}
