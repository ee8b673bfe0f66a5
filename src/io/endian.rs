//! Big-endian field conversion
//!
//! FLV stores every multi-byte integer and float in network byte order.
//! In-memory fields go through `bytes::Buf`, streamed fields through
//! `byteorder`. The 24-bit fields (tag data size, timestamp, stream id) have
//! no native Rust type and are widened to `u32`.

use bytes::{Buf, BufMut};

/// Byte order of every FLV field
pub type FlvEndian = byteorder::BigEndian;

/// Read a big-endian 24-bit unsigned integer
#[inline]
pub fn get_u24(buf: &mut impl Buf) -> u32 {
    buf.get_uint(3) as u32
}

/// Write the low 24 bits of `v` big-endian
#[inline]
pub fn put_u24(buf: &mut impl BufMut, v: u32) {
    buf.put_uint(u64::from(v & 0x00FF_FFFF), 3);
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::ReadBytesExt;

    #[test]
    fn test_u24() {
        assert_eq!(get_u24(&mut &[0x00u8, 0x00, 0x09][..]), 9);
        assert_eq!(get_u24(&mut &[0x12u8, 0x34, 0x56][..]), 0x123456);
        assert_eq!(get_u24(&mut &[0xFFu8, 0xFF, 0xFF][..]), 0x00FF_FFFF);
    }

    #[test]
    fn test_put_u24_discards_upper_byte() {
        let mut out = Vec::new();
        put_u24(&mut out, 0xAB12_3456);
        assert_eq!(out, vec![0x12, 0x34, 0x56]);
    }

    #[test]
    fn test_stream_order_matches_buf() {
        let raw = [0xFFu8, 0xC4, 0x40, 0x29, 0, 0, 0, 0, 0, 0];
        let mut rd = &raw[..];
        assert_eq!(rd.read_i16::<FlvEndian>().unwrap(), -60);
        assert_eq!(rd.read_f64::<FlvEndian>().unwrap(), 12.5);

        let mut buf = &raw[..];
        assert_eq!(buf.get_i16(), -60);
        assert_eq!(buf.get_f64(), 12.5);
    }
}
