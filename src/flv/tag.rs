//! FLV tag framing and codec sub-headers
//!
//! FLV Tag Structure:
//! ```text
//! +---------+-------------+--------+--------+-------------+---------+-----------------+
//! | Type(1) | DataSize(3) | TS(3)  | TSx(1) | StreamID(3) | Data(N) | PrevTagSize(4)  |
//! +---------+-------------+--------+--------+-------------+---------+-----------------+
//! Type byte: bits 7-6 reserved, bit 5 filter, bits 4-0 tag type
//! ```
//!
//! Video Data:
//! ```text
//! +----------+----------+
//! | FrameType| CodecID  | [AVCPacketType(1) CompositionTime(3)] | [VP6 adjustment(1)] | Payload
//! | (4 bits) | (4 bits) |
//! +----------+----------+
//! ```
//!
//! Audio Data:
//! ```text
//! +-----------+---------+----------+----------+
//! |SoundFormat|SoundRate|SoundSize |SoundType | [AACPacketType(1)] | Payload
//! | (4 bits)  | (2 bits)| (1 bit)  | (1 bit)  |
//! +-----------+---------+----------+----------+
//! ```

use bytes::{Buf, Bytes};

use crate::io::endian;
use crate::script::ScriptData;

/// FLV tag header size
pub const TAG_HEADER_SIZE: usize = 11;

pub const TAG_TYPE_AUDIO: u8 = 8;
pub const TAG_TYPE_VIDEO: u8 = 9;
pub const TAG_TYPE_SCRIPT: u8 = 18;

/// FLV tag type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlvTagType {
    Audio,
    Video,
    Script,
}

impl FlvTagType {
    pub fn from_u8(b: u8) -> Option<Self> {
        match b {
            TAG_TYPE_AUDIO => Some(FlvTagType::Audio),
            TAG_TYPE_VIDEO => Some(FlvTagType::Video),
            TAG_TYPE_SCRIPT => Some(FlvTagType::Script),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            FlvTagType::Audio => TAG_TYPE_AUDIO,
            FlvTagType::Video => TAG_TYPE_VIDEO,
            FlvTagType::Script => TAG_TYPE_SCRIPT,
        }
    }
}

/// Fixed 11-byte tag framing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader {
    /// Raw 5-bit tag type
    pub tag_type: u8,
    /// Packets are filtered (encrypted)
    pub filter: bool,
    /// Reserved bits 6-7 of the first byte
    pub reserved: u8,
    /// Bytes after the stream id up to the trailer
    pub data_size: u32,
    /// Lower 24 bits of the timestamp in milliseconds
    pub timestamp: u32,
    /// Upper 8 bits of the timestamp
    pub timestamp_extended: u8,
    pub stream_id: u32,
    /// Absolute position of the first header byte
    pub offset: u64,
}

impl TagHeader {
    pub fn parse(raw: [u8; TAG_HEADER_SIZE], offset: u64) -> Self {
        let mut buf = &raw[..];
        let first = buf.get_u8();
        Self {
            tag_type: first & 0x1F,
            filter: first & 0x20 != 0,
            reserved: first >> 6,
            data_size: endian::get_u24(&mut buf),
            timestamp: endian::get_u24(&mut buf),
            timestamp_extended: buf.get_u8(),
            stream_id: endian::get_u24(&mut buf),
            offset,
        }
    }

    pub fn kind(&self) -> Option<FlvTagType> {
        FlvTagType::from_u8(self.tag_type)
    }

    /// Full 32-bit timestamp in milliseconds
    pub fn full_timestamp(&self) -> u32 {
        (u32::from(self.timestamp_extended) << 24) | self.timestamp
    }

    /// Size of the whole tag as the trailer should report it
    pub fn tag_size(&self) -> u32 {
        TAG_HEADER_SIZE as u32 + self.data_size
    }
}

/// Audio format (upper 4 bits of first byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundFormat {
    /// Linear PCM, platform endian
    LinearPcmPlatform = 0,
    /// ADPCM
    Adpcm = 1,
    /// MP3
    Mp3 = 2,
    /// Linear PCM, little endian
    LinearPcmLe = 3,
    /// Nellymoser 16kHz mono
    Nellymoser16kMono = 4,
    /// Nellymoser 8kHz mono
    Nellymoser8kMono = 5,
    /// Nellymoser
    Nellymoser = 6,
    /// G.711 A-law
    G711ALaw = 7,
    /// G.711 mu-law
    G711MuLaw = 8,
    /// Reserved
    Reserved = 9,
    /// AAC
    Aac = 10,
    /// Speex
    Speex = 11,
    /// MP3 8kHz
    Mp38k = 14,
    /// Device-specific sound
    DeviceSpecific = 15,
}

impl SoundFormat {
    pub fn from_bits(v: u8) -> Option<Self> {
        match v {
            0 => Some(SoundFormat::LinearPcmPlatform),
            1 => Some(SoundFormat::Adpcm),
            2 => Some(SoundFormat::Mp3),
            3 => Some(SoundFormat::LinearPcmLe),
            4 => Some(SoundFormat::Nellymoser16kMono),
            5 => Some(SoundFormat::Nellymoser8kMono),
            6 => Some(SoundFormat::Nellymoser),
            7 => Some(SoundFormat::G711ALaw),
            8 => Some(SoundFormat::G711MuLaw),
            9 => Some(SoundFormat::Reserved),
            10 => Some(SoundFormat::Aac),
            11 => Some(SoundFormat::Speex),
            14 => Some(SoundFormat::Mp38k),
            15 => Some(SoundFormat::DeviceSpecific),
            _ => None,
        }
    }
}

/// Audio sample rate (bits 2-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundRate {
    Rate5512 = 0,
    Rate11025 = 1,
    Rate22050 = 2,
    Rate44100 = 3,
}

impl SoundRate {
    pub fn from_bits(v: u8) -> Self {
        match v & 0x03 {
            0 => SoundRate::Rate5512,
            1 => SoundRate::Rate11025,
            2 => SoundRate::Rate22050,
            _ => SoundRate::Rate44100,
        }
    }

    pub fn to_hz(&self) -> u32 {
        match self {
            SoundRate::Rate5512 => 5512,
            SoundRate::Rate11025 => 11025,
            SoundRate::Rate22050 => 22050,
            SoundRate::Rate44100 => 44100,
        }
    }
}

/// Sample size (bit 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundSize {
    Bits8 = 0,
    Bits16 = 1,
}

/// Channel layout (bit 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundType {
    Mono = 0,
    Stereo = 1,
}

/// AAC packet type following an AAC audio sub-header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AacPacketType {
    /// AudioSpecificConfig
    SequenceHeader,
    /// Raw AAC frame
    Raw,
    Other(u8),
}

impl From<u8> for AacPacketType {
    fn from(b: u8) -> Self {
        match b {
            0 => AacPacketType::SequenceHeader,
            1 => AacPacketType::Raw,
            other => AacPacketType::Other(other),
        }
    }
}

/// Per-tag audio codec info
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSubHeader {
    /// Raw 4-bit sound format
    pub sound_format: u8,
    pub sound_rate: SoundRate,
    pub sound_size: SoundSize,
    pub sound_type: SoundType,
    /// Present only when the sound format is AAC
    pub aac_packet_type: Option<AacPacketType>,
}

impl AudioSubHeader {
    /// Decode the first audio byte; the AAC packet type is filled in later
    pub fn from_byte(b: u8) -> Self {
        Self {
            sound_format: b >> 4,
            sound_rate: SoundRate::from_bits(b >> 2),
            sound_size: if b & 0x02 != 0 {
                SoundSize::Bits16
            } else {
                SoundSize::Bits8
            },
            sound_type: if b & 0x01 != 0 {
                SoundType::Stereo
            } else {
                SoundType::Mono
            },
            aac_packet_type: None,
        }
    }

    pub fn format(&self) -> Option<SoundFormat> {
        SoundFormat::from_bits(self.sound_format)
    }

    /// Check if an AAC packet type byte follows
    pub fn is_aac(&self) -> bool {
        self.sound_format == SoundFormat::Aac as u8
    }

    /// Sub-header bytes consumed before the payload
    pub fn size(&self) -> u32 {
        if self.is_aac() {
            2
        } else {
            1
        }
    }
}

/// Video frame type (upper 4 bits of first byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFrameType {
    /// Keyframe (for AVC, a seekable frame)
    Keyframe = 1,
    /// Inter frame (for AVC, a non-seekable frame)
    InterFrame = 2,
    /// Disposable inter frame (H.263 only)
    DisposableInterFrame = 3,
    /// Generated keyframe (reserved for server use)
    GeneratedKeyframe = 4,
    /// Video info/command frame
    VideoInfoFrame = 5,
}

impl VideoFrameType {
    pub fn from_bits(v: u8) -> Option<Self> {
        match v {
            1 => Some(VideoFrameType::Keyframe),
            2 => Some(VideoFrameType::InterFrame),
            3 => Some(VideoFrameType::DisposableInterFrame),
            4 => Some(VideoFrameType::GeneratedKeyframe),
            5 => Some(VideoFrameType::VideoInfoFrame),
            _ => None,
        }
    }

    pub fn is_keyframe(&self) -> bool {
        matches!(
            self,
            VideoFrameType::Keyframe | VideoFrameType::GeneratedKeyframe
        )
    }
}

/// Video codec ID (lower 4 bits of first byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodec {
    /// Sorenson H.263
    SorensonH263 = 2,
    /// Screen video
    ScreenVideo = 3,
    /// VP6
    Vp6 = 4,
    /// VP6 with alpha
    Vp6Alpha = 5,
    /// Screen video v2
    ScreenVideoV2 = 6,
    /// AVC (H.264)
    Avc = 7,
}

impl VideoCodec {
    pub fn from_bits(v: u8) -> Option<Self> {
        match v {
            2 => Some(VideoCodec::SorensonH263),
            3 => Some(VideoCodec::ScreenVideo),
            4 => Some(VideoCodec::Vp6),
            5 => Some(VideoCodec::Vp6Alpha),
            6 => Some(VideoCodec::ScreenVideoV2),
            7 => Some(VideoCodec::Avc),
            _ => None,
        }
    }
}

/// AVC packet type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvcPacketType {
    /// AVCDecoderConfigurationRecord
    SequenceHeader,
    /// One or more NALUs
    Nalu,
    /// End of sequence
    EndOfSequence,
    Other(u8),
}

impl From<u8> for AvcPacketType {
    fn from(b: u8) -> Self {
        match b {
            0 => AvcPacketType::SequenceHeader,
            1 => AvcPacketType::Nalu,
            2 => AvcPacketType::EndOfSequence,
            other => AvcPacketType::Other(other),
        }
    }
}

/// The 4 bytes following an AVC video sub-header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvcPacketHeader {
    pub packet_type: AvcPacketType,
    /// Raw 24-bit composition time offset
    pub composition_time: u32,
}

impl AvcPacketHeader {
    pub fn parse(raw: [u8; 4]) -> Self {
        let [packet_type, c0, c1, c2] = raw;
        Self {
            packet_type: AvcPacketType::from(packet_type),
            composition_time: u32::from_be_bytes([0, c0, c1, c2]),
        }
    }

    /// Composition time offset as the signed value it encodes
    pub fn composition_time_signed(&self) -> i32 {
        ((self.composition_time << 8) as i32) >> 8
    }
}

/// Per-tag video codec info
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoSubHeader {
    /// Raw 4-bit frame type
    pub frame_type: u8,
    /// Raw 4-bit codec id
    pub codec_id: u8,
    /// Present only for AVC
    pub avc: Option<AvcPacketHeader>,
    /// Present only for VP6 and VP6 with alpha
    pub vp6_extra: Option<u8>,
}

impl VideoSubHeader {
    /// Decode the first video byte; codec extras are filled in later
    pub fn from_byte(b: u8) -> Self {
        Self {
            frame_type: b >> 4,
            codec_id: b & 0x0F,
            avc: None,
            vp6_extra: None,
        }
    }

    pub fn frame(&self) -> Option<VideoFrameType> {
        VideoFrameType::from_bits(self.frame_type)
    }

    pub fn codec(&self) -> Option<VideoCodec> {
        VideoCodec::from_bits(self.codec_id)
    }

    pub fn is_keyframe(&self) -> bool {
        self.frame().map(|ft| ft.is_keyframe()).unwrap_or(false)
    }

    /// Codec-specific bytes following the first byte
    pub fn extra_len(&self) -> u32 {
        match self.codec() {
            Some(VideoCodec::Avc) => 4,
            Some(VideoCodec::Vp6) | Some(VideoCodec::Vp6Alpha) => 1,
            _ => 0,
        }
    }

    /// Sub-header bytes consumed before the payload
    pub fn size(&self) -> u32 {
        1 + self.extra_len()
    }
}

/// Decoded audio tag
#[derive(Debug, Clone)]
pub struct AudioTag {
    pub header: TagHeader,
    pub sub_header: AudioSubHeader,
    /// Remaining bytes after the sub-header
    pub payload: Bytes,
    /// Trailer value following the payload
    pub previous_tag_size: u32,
}

/// Decoded video tag
#[derive(Debug, Clone)]
pub struct VideoTag {
    pub header: TagHeader,
    pub sub_header: VideoSubHeader,
    /// Remaining bytes after the sub-header
    pub payload: Bytes,
    /// Trailer value following the payload
    pub previous_tag_size: u32,
}

/// Decoded script tag
#[derive(Debug, Clone)]
pub struct ScriptTag {
    pub header: TagHeader,
    /// Raw script body
    pub payload: Bytes,
    /// Decoded body, `None` when script decoding is disabled
    pub data: Option<ScriptData>,
    /// Trailer value following the payload
    pub previous_tag_size: u32,
}

/// One decoded tag
#[derive(Debug, Clone)]
pub enum FlvTag {
    Audio(AudioTag),
    Video(VideoTag),
    Script(ScriptTag),
}

impl FlvTag {
    pub fn tag_type(&self) -> FlvTagType {
        match self {
            FlvTag::Audio(_) => FlvTagType::Audio,
            FlvTag::Video(_) => FlvTagType::Video,
            FlvTag::Script(_) => FlvTagType::Script,
        }
    }

    pub fn header(&self) -> &TagHeader {
        match self {
            FlvTag::Audio(t) => &t.header,
            FlvTag::Video(t) => &t.header,
            FlvTag::Script(t) => &t.header,
        }
    }

    pub fn payload(&self) -> &Bytes {
        match self {
            FlvTag::Audio(t) => &t.payload,
            FlvTag::Video(t) => &t.payload,
            FlvTag::Script(t) => &t.payload,
        }
    }

    pub fn previous_tag_size(&self) -> u32 {
        match self {
            FlvTag::Audio(t) => t.previous_tag_size,
            FlvTag::Video(t) => t.previous_tag_size,
            FlvTag::Script(t) => t.previous_tag_size,
        }
    }

    /// Timestamp in milliseconds
    pub fn timestamp(&self) -> u32 {
        self.header().full_timestamp()
    }

    /// Payload size after sub-headers
    pub fn size(&self) -> usize {
        self.payload().len()
    }

    pub fn is_video(&self) -> bool {
        matches!(self, FlvTag::Video(_))
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, FlvTag::Audio(_))
    }

    /// Check if this is an AVC sequence header
    pub fn is_avc_sequence_header(&self) -> bool {
        match self {
            FlvTag::Video(v) => v
                .sub_header
                .avc
                .map(|avc| avc.packet_type == AvcPacketType::SequenceHeader)
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Check if this is an AAC sequence header
    pub fn is_aac_sequence_header(&self) -> bool {
        match self {
            FlvTag::Audio(a) => a.sub_header.aac_packet_type == Some(AacPacketType::SequenceHeader),
            _ => false,
        }
    }
}
