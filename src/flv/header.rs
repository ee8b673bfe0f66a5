//! FLV file header
//!
//! ```text
//! +-----------+---------+-------------+---------------+-----------------+
//! | "FLV" (3) | Ver (1) | TypeFlags(1)| DataOffset(4) | PrevTagSize0(4) |
//! +-----------+---------+-------------+---------------+-----------------+
//! TypeFlags: bits 7-3 reserved, bit 2 audio, bit 1 reserved, bit 0 video
//! ```

use crate::error::{FlvError, FormatError, Result};

/// "FLV" in ASCII
pub const FLV_SIGNATURE: [u8; 3] = *b"FLV";

/// Size of the file header in bytes (version 1)
pub const FLV_HEADER_SIZE: u32 = 9;

const FLAG_VIDEO: u8 = 0x01;
const FLAG_AUDIO: u8 = 0x04;

/// Decoded file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub signature: [u8; 3],
    pub version: u8,
    pub has_audio: bool,
    pub has_video: bool,
    /// Raw type flags byte, reserved bits included
    pub flags: u8,
    /// Header length in bytes
    pub data_offset: u32,
}

impl FileHeader {
    /// Parse and validate the 9-byte header
    ///
    /// `offset` is the absolute position of the first header byte, used
    /// for error reporting.
    pub fn parse(raw: [u8; 9], offset: u64) -> Result<Self> {
        let [s0, s1, s2, version, flags, d0, d1, d2, d3] = raw;
        let signature = [s0, s1, s2];
        if signature != FLV_SIGNATURE {
            return Err(FlvError::format(offset, FormatError::BadSignature(signature)));
        }

        let data_offset = u32::from_be_bytes([d0, d1, d2, d3]);

        let valid_offset = if version == 1 {
            data_offset == FLV_HEADER_SIZE
        } else {
            data_offset >= FLV_HEADER_SIZE
        };
        if !valid_offset {
            return Err(FlvError::format(
                offset + 5,
                FormatError::InvalidDataOffset {
                    version,
                    data_offset,
                },
            ));
        }

        Ok(Self {
            signature,
            version,
            has_audio: flags & FLAG_AUDIO != 0,
            has_video: flags & FLAG_VIDEO != 0,
            flags,
            data_offset,
        })
    }

    /// Header bytes beyond the standard 9 that must be skipped
    pub fn extra_len(&self) -> u32 {
        self.data_offset - FLV_HEADER_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(sig: &[u8; 3], version: u8, flags: u8, data_offset: u32) -> [u8; 9] {
        let mut out = [0u8; 9];
        out[..3].copy_from_slice(sig);
        out[3] = version;
        out[4] = flags;
        out[5..].copy_from_slice(&data_offset.to_be_bytes());
        out
    }

    #[test]
    fn test_audio_and_video() {
        let header = FileHeader::parse(raw(b"FLV", 1, 0x05, 9), 0).unwrap();
        assert!(header.has_audio);
        assert!(header.has_video);
        assert_eq!(header.version, 1);
        assert_eq!(header.data_offset, 9);
        assert_eq!(header.extra_len(), 0);
    }

    #[test]
    fn test_flag_bit_positions() {
        let video_only = FileHeader::parse(raw(b"FLV", 1, 0x01, 9), 0).unwrap();
        assert!(video_only.has_video);
        assert!(!video_only.has_audio);

        let audio_only = FileHeader::parse(raw(b"FLV", 1, 0x04, 9), 0).unwrap();
        assert!(audio_only.has_audio);
        assert!(!audio_only.has_video);

        // Reserved bit 1 sets neither flag
        let reserved = FileHeader::parse(raw(b"FLV", 1, 0x02, 9), 0).unwrap();
        assert!(!reserved.has_audio);
        assert!(!reserved.has_video);
        assert_eq!(reserved.flags, 0x02);
    }

    #[test]
    fn test_bad_signature() {
        let err = FileHeader::parse(raw(b"FLX", 1, 0x05, 9), 0).unwrap_err();
        assert!(matches!(
            err,
            FlvError::Format {
                offset: 0,
                kind: FormatError::BadSignature(sig)
            } if &sig == b"FLX"
        ));
    }

    #[test]
    fn test_version_one_requires_nine_byte_header() {
        let err = FileHeader::parse(raw(b"FLV", 1, 0x05, 13), 0).unwrap_err();
        assert!(matches!(
            err,
            FlvError::Format {
                offset: 5,
                kind: FormatError::InvalidDataOffset {
                    version: 1,
                    data_offset: 13
                }
            }
        ));
    }

    #[test]
    fn test_other_versions_allow_longer_header() {
        let header = FileHeader::parse(raw(b"FLV", 2, 0x01, 13), 0).unwrap();
        assert_eq!(header.extra_len(), 4);

        let err = FileHeader::parse(raw(b"FLV", 2, 0x01, 4), 0).unwrap_err();
        assert!(matches!(
            err,
            FlvError::Format {
                kind: FormatError::InvalidDataOffset { .. },
                ..
            }
        ));
    }
}
