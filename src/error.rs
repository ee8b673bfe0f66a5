//! Error types
//!
//! Every parse failure is fatal to the current pass and carries the absolute
//! byte offset of the field that was being decoded.

use std::path::PathBuf;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, FlvError>;

/// Top-level error type
#[derive(Debug, thiserror::Error)]
pub enum FlvError {
    /// The byte source could not be opened
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Short read or end of source while a required field was expected
    #[error("I/O error reading {field} at offset {offset}: {source}")]
    Io {
        offset: u64,
        field: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Structurally invalid data
    #[error("invalid FLV data at offset {offset}: {kind}")]
    Format { offset: u64, kind: FormatError },

    /// Tag type byte outside {8, 9, 18}
    #[error("unknown tag type {tag_type} at offset {offset}")]
    UnknownTagType { offset: u64, tag_type: u8 },

    /// Script data ended before a value or a required sentinel was complete
    #[error(
        "script data truncated reading {field} at offset {offset}: \
         needed {needed} bytes, {remaining} remaining"
    )]
    Truncated {
        offset: u64,
        field: &'static str,
        needed: usize,
        remaining: usize,
    },

    /// A read was attempted after an earlier error ended the pass
    #[error("reader stopped by an earlier error, at offset {offset}")]
    Stopped { offset: u64 },
}

/// Kinds of [`FlvError::Format`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("bad signature {0:02x?}, expected \"FLV\"")]
    BadSignature([u8; 3]),

    #[error("header data offset {data_offset} is invalid for version {version}")]
    InvalidDataOffset { version: u8, data_offset: u32 },

    #[error("previous tag size must be zero after the file header, found {0}")]
    NonZeroPreviousTagSize(u32),

    #[error("previous tag size {found} does not match tag size {expected}")]
    PreviousTagSizeMismatch { expected: u32, found: u32 },

    #[error("stream id must be zero, found {0}")]
    NonZeroStreamId(u32),

    #[error("declared tag size {declared} is smaller than its {sub_header} sub-header bytes")]
    PayloadUnderflow { declared: u32, sub_header: u32 },

    #[error("unknown script data marker 0x{0:02x}")]
    UnknownScriptMarker(u8),

    #[error("script data nesting exceeds {0} levels")]
    NestingTooDeep(usize),
}

impl FlvError {
    /// Absolute byte offset at which the failure was detected, if known
    pub fn offset(&self) -> Option<u64> {
        match self {
            FlvError::Open { .. } => None,
            FlvError::Io { offset, .. }
            | FlvError::Format { offset, .. }
            | FlvError::UnknownTagType { offset, .. }
            | FlvError::Truncated { offset, .. }
            | FlvError::Stopped { offset } => Some(*offset),
        }
    }

    pub(crate) fn format(offset: u64, kind: FormatError) -> Self {
        FlvError::Format { offset, kind }
    }
}
