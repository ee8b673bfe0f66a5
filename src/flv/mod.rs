//! FLV container reading
//!
//! This module provides:
//! - File header validation
//! - Tag framing with audio and video sub-header decoding
//! - A forward-only reader yielding one tag per call
//! - Handler hooks for push-style consumption

pub mod handler;
pub mod header;
pub mod reader;
pub mod tag;

pub use handler::{dispatch, Callbacks, FlvHandler};
pub use header::{FileHeader, FLV_HEADER_SIZE, FLV_SIGNATURE};
pub use reader::FlvReader;
pub use tag::{
    AacPacketType, AudioSubHeader, AudioTag, AvcPacketHeader, AvcPacketType, FlvTag, FlvTagType,
    ScriptTag, SoundFormat, SoundRate, SoundSize, SoundType, TagHeader, VideoCodec,
    VideoFrameType, VideoSubHeader, VideoTag,
};
