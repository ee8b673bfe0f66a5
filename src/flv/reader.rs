//! Sequential FLV tag stream reader
//!
//! # File Layout
//!
//! ```text
//! +============+==================+==============+==================+
//! | FLV Header | PrevTagSize0 (0) | Tag 1        | PrevTagSize1 ... |
//! | (9 bytes)  | (4 bytes)        | (11+N bytes) | (4 bytes)        |
//! +============+==================+==============+==================+
//! ```
//!
//! # States
//!
//! ```text
//! Start ──read_header()──► HeaderRead ──next_tag()──► HeaderRead ...
//!                               │                          │
//!                               ▼ (source exhausted)       ▼ (any error)
//!                              End                       Failed
//! ```
//!
//! Reading is forward-only and one tag per call, so a caller can stop at
//! any point. After `End` or `Failed` the reader yields nothing further.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::handler::{dispatch, FlvHandler};
use super::header::FileHeader;
use super::tag::{
    AacPacketType, AudioSubHeader, AudioTag, AvcPacketHeader, FlvTag, FlvTagType, ScriptTag,
    TagHeader, VideoCodec, VideoSubHeader, VideoTag, TAG_HEADER_SIZE,
};
use crate::config::ReaderConfig;
use crate::error::{FlvError, FormatError, Result};
use crate::io::{ByteCursor, StreamSource};
use crate::script::ScriptDecoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    Start,
    HeaderRead,
    End,
    Failed,
}

/// FLV tag stream reader
///
/// Owns its byte source for its whole lifetime; the source is released when
/// the reader is dropped, on every exit path.
#[derive(Debug)]
pub struct FlvReader<R> {
    source: StreamSource<R>,
    config: ReaderConfig,
    decoder: ScriptDecoder,
    state: ReaderState,
    header: Option<(FileHeader, u32)>,
}

impl FlvReader<BufReader<File>> {
    /// Open an FLV file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, ReaderConfig::default())
    }

    /// Open an FLV file with explicit options
    pub fn open_with_config(path: impl AsRef<Path>, config: ReaderConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| FlvError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Opened FLV file");
        Ok(Self::with_config(BufReader::new(file), config))
    }
}

impl<R: Read> FlvReader<R> {
    /// Create a reader over any byte source
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, ReaderConfig::default())
    }

    /// Create a reader with explicit options
    pub fn with_config(inner: R, config: ReaderConfig) -> Self {
        Self {
            source: StreamSource::new(inner),
            decoder: ScriptDecoder::with_max_depth(config.max_nesting_depth),
            config,
            state: ReaderState::Start,
            header: None,
        }
    }

    /// The file header, once read
    pub fn header(&self) -> Option<&FileHeader> {
        self.header.as_ref().map(|(h, _)| h)
    }

    /// Absolute position of the next unread byte
    pub fn offset(&self) -> u64 {
        self.source.offset()
    }

    /// Check if the reader reached the end of the stream or failed
    pub fn is_finished(&self) -> bool {
        matches!(self.state, ReaderState::End | ReaderState::Failed)
    }

    /// Consume the reader, returning the underlying source
    pub fn into_inner(self) -> R {
        self.source.into_inner()
    }

    /// Read the file header and the leading trailer
    ///
    /// Returns the header and the trailer value (always zero). Calling this
    /// again returns the header read the first time. Once any read has
    /// failed this returns [`FlvError::Stopped`] without touching the source.
    pub fn read_header(&mut self) -> Result<(FileHeader, u32)> {
        if self.state == ReaderState::Failed {
            return Err(FlvError::Stopped {
                offset: self.source.offset(),
            });
        }
        if let Some(header) = self.header {
            return Ok(header);
        }
        let result = self.read_header_inner();
        match &result {
            Ok(header) => {
                self.header = Some(*header);
                self.state = ReaderState::HeaderRead;
            }
            Err(e) => self.fail(e),
        }
        result
    }

    /// Decode the next tag
    ///
    /// Reads the file header first if it has not been read. Returns
    /// `Ok(None)` once the source is exhausted at a tag boundary, and after
    /// any earlier error.
    pub fn next_tag(&mut self) -> Result<Option<FlvTag>> {
        match self.state {
            ReaderState::End | ReaderState::Failed => return Ok(None),
            ReaderState::Start => {
                self.read_header()?;
            }
            ReaderState::HeaderRead => {}
        }

        let result = self.read_tag();
        match &result {
            Ok(None) => {
                tracing::debug!(offset = self.source.offset(), "End of FLV stream");
                self.state = ReaderState::End;
            }
            Ok(Some(_)) => {}
            Err(e) => self.fail(e),
        }
        result
    }

    /// Decode the whole stream, delivering each item to `handler`
    ///
    /// Items delivered before an error stand as valid partial results.
    pub fn parse<H: FlvHandler + ?Sized>(&mut self, handler: &mut H) -> Result<()> {
        let (header, previous_tag_size) = self.read_header()?;
        handler.on_header(&header, previous_tag_size);

        while let Some(tag) = self.next_tag()? {
            dispatch(handler, &tag);
        }
        Ok(())
    }

    fn fail(&mut self, e: &FlvError) {
        tracing::debug!(error = %e, "FLV parse failed");
        self.state = ReaderState::Failed;
    }

    fn read_header_inner(&mut self) -> Result<(FileHeader, u32)> {
        let offset = self.source.offset();
        let raw = self.source.read_array::<9>("file header")?;
        let header = FileHeader::parse(raw, offset)?;

        if header.extra_len() > 0 {
            tracing::warn!(
                version = header.version,
                data_offset = header.data_offset,
                "Skipping extended file header"
            );
            self.source
                .skip(u64::from(header.extra_len()), "extended file header")?;
        }

        let trailer_offset = self.source.offset();
        let previous_tag_size = self.source.read_u32("previous tag size 0")?;
        if previous_tag_size != 0 {
            return Err(FlvError::format(
                trailer_offset,
                FormatError::NonZeroPreviousTagSize(previous_tag_size),
            ));
        }

        tracing::debug!(
            version = header.version,
            has_audio = header.has_audio,
            has_video = header.has_video,
            "FLV header decoded"
        );
        Ok((header, previous_tag_size))
    }

    fn read_tag(&mut self) -> Result<Option<FlvTag>> {
        let offset = self.source.offset();
        let raw = match self.source.read_boundary::<TAG_HEADER_SIZE>("tag header")? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let header = TagHeader::parse(raw, offset);

        let kind = header.kind().ok_or(FlvError::UnknownTagType {
            offset,
            tag_type: header.tag_type,
        })?;

        if header.stream_id != 0 {
            if self.config.strict_stream_id {
                return Err(FlvError::format(
                    offset + 8,
                    FormatError::NonZeroStreamId(header.stream_id),
                ));
            }
            tracing::warn!(offset, stream_id = header.stream_id, "Non-zero stream id");
        }

        let tag = match kind {
            FlvTagType::Audio => FlvTag::Audio(self.read_audio(header)?),
            FlvTagType::Video => FlvTag::Video(self.read_video(header)?),
            FlvTagType::Script => FlvTag::Script(self.read_script(header)?),
        };

        tracing::debug!(
            offset,
            tag_type = ?kind,
            data_size = header.data_size,
            timestamp = header.full_timestamp(),
            "Tag decoded"
        );
        Ok(Some(tag))
    }

    fn read_audio(&mut self, header: TagHeader) -> Result<AudioTag> {
        let mut remaining = header.data_size;

        self.claim(&header, &mut remaining, 1)?;
        let mut sub_header = AudioSubHeader::from_byte(self.source.read_u8("audio tag header")?);
        if sub_header.is_aac() {
            self.claim(&header, &mut remaining, 1)?;
            let packet_type = self.source.read_u8("AAC packet type")?;
            sub_header.aac_packet_type = Some(AacPacketType::from(packet_type));
        }
        tracing::trace!(
            sound_format = sub_header.sound_format,
            rate = sub_header.sound_rate.to_hz(),
            aac_packet_type = ?sub_header.aac_packet_type,
            "Audio sub-header"
        );

        let payload = self.source.read_bytes(remaining as usize, "audio data")?;
        let previous_tag_size = self.read_trailer(&header)?;

        Ok(AudioTag {
            header,
            sub_header,
            payload,
            previous_tag_size,
        })
    }

    fn read_video(&mut self, header: TagHeader) -> Result<VideoTag> {
        let mut remaining = header.data_size;

        self.claim(&header, &mut remaining, 1)?;
        let mut sub_header = VideoSubHeader::from_byte(self.source.read_u8("video tag header")?);
        match sub_header.codec() {
            Some(VideoCodec::Avc) => {
                self.claim(&header, &mut remaining, 4)?;
                let raw = self.source.read_array::<4>("AVC packet header")?;
                sub_header.avc = Some(AvcPacketHeader::parse(raw));
            }
            Some(VideoCodec::Vp6) | Some(VideoCodec::Vp6Alpha) => {
                self.claim(&header, &mut remaining, 1)?;
                sub_header.vp6_extra = Some(self.source.read_u8("VP6 adjustment")?);
            }
            _ => {}
        }
        tracing::trace!(
            frame_type = sub_header.frame_type,
            codec_id = sub_header.codec_id,
            avc = ?sub_header.avc,
            "Video sub-header"
        );

        let payload = self.source.read_bytes(remaining as usize, "video data")?;
        let previous_tag_size = self.read_trailer(&header)?;

        Ok(VideoTag {
            header,
            sub_header,
            payload,
            previous_tag_size,
        })
    }

    fn read_script(&mut self, header: TagHeader) -> Result<ScriptTag> {
        let payload_offset = self.source.offset();
        let payload = self
            .source
            .read_bytes(header.data_size as usize, "script data")?;

        let data = if self.config.decode_script {
            let mut cur = ByteCursor::with_base_offset(payload.clone(), payload_offset);
            let data = self.decoder.decode_body(&mut cur)?;
            tracing::trace!(name = ?data.name(), values = data.values().len(), "Script data");
            Some(data)
        } else {
            None
        };

        let previous_tag_size = self.read_trailer(&header)?;
        Ok(ScriptTag {
            header,
            payload,
            data,
            previous_tag_size,
        })
    }

    /// Reserve `n` sub-header bytes out of the declared tag size
    fn claim(&self, header: &TagHeader, remaining: &mut u32, n: u32) -> Result<()> {
        if *remaining < n {
            return Err(FlvError::format(
                self.source.offset(),
                FormatError::PayloadUnderflow {
                    declared: header.data_size,
                    sub_header: header.data_size - *remaining + n,
                },
            ));
        }
        *remaining -= n;
        Ok(())
    }

    fn read_trailer(&mut self, header: &TagHeader) -> Result<u32> {
        let offset = self.source.offset();
        let found = self.source.read_u32("previous tag size")?;
        let expected = header.tag_size();
        if found != expected {
            if self.config.verify_previous_tag_size {
                return Err(FlvError::format(
                    offset,
                    FormatError::PreviousTagSizeMismatch { expected, found },
                ));
            }
            tracing::warn!(offset, expected, found, "Previous tag size mismatch");
        }
        Ok(found)
    }
}

impl<R: Read> Iterator for FlvReader<R> {
    type Item = Result<FlvTag>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_tag().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flv::handler::Callbacks;
    use crate::flv::tag::{AvcPacketType, TAG_TYPE_AUDIO, TAG_TYPE_SCRIPT, TAG_TYPE_VIDEO};
    use crate::io::endian::put_u24;
    use crate::script::{encode_script, KeyedEntry, ScriptData, ScriptValue};
    use std::io::{Cursor, ErrorKind};

    const HEADER: [u8; 13] = [
        b'F', b'L', b'V', 0x01, 0x05, 0x00, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00, 0x00,
    ];

    fn tag_bytes(tag_type: u8, timestamp: u32, body: &[u8]) -> Vec<u8> {
        let mut out = vec![tag_type];
        put_u24(&mut out, body.len() as u32);
        put_u24(&mut out, timestamp);
        out.push((timestamp >> 24) as u8);
        out.extend_from_slice(&[0, 0, 0]);
        out.extend_from_slice(body);
        out.extend_from_slice(&(11 + body.len() as u32).to_be_bytes());
        out
    }

    fn stream(tags: &[Vec<u8>]) -> Vec<u8> {
        let mut out = HEADER.to_vec();
        for tag in tags {
            out.extend_from_slice(tag);
        }
        out
    }

    fn reader(bytes: Vec<u8>) -> FlvReader<Cursor<Vec<u8>>> {
        FlvReader::new(Cursor::new(bytes))
    }

    fn metadata() -> ScriptData {
        ScriptData::new(vec![
            ScriptValue::string("onMetaData"),
            ScriptValue::EcmaArray(vec![
                KeyedEntry::new("duration", ScriptValue::Number(12.5)),
                KeyedEntry::new("videocodecid", ScriptValue::Number(7.0)),
            ]),
        ])
    }

    #[test]
    fn test_read_header() {
        let mut r = reader(HEADER.to_vec());
        let (header, previous_tag_size) = r.read_header().unwrap();
        assert!(header.has_audio);
        assert!(header.has_video);
        assert_eq!(previous_tag_size, 0);
        assert_eq!(r.offset(), 13);
        assert!(r.next_tag().unwrap().is_none());
        assert!(r.is_finished());
    }

    #[test]
    fn test_bad_signature() {
        let mut bytes = HEADER.to_vec();
        bytes[0] = b'X';
        let err = reader(bytes).read_header().unwrap_err();
        assert!(matches!(
            err,
            FlvError::Format {
                kind: FormatError::BadSignature(_),
                ..
            }
        ));
    }

    #[test]
    fn test_header_not_reread_after_failure() {
        // Bad header followed by a valid one
        let mut bytes = HEADER.to_vec();
        bytes[0] = b'X';
        bytes.extend_from_slice(&HEADER);

        let mut r = reader(bytes);
        assert!(r.read_header().is_err());
        assert!(r.is_finished());

        let err = r.read_header().unwrap_err();
        assert!(matches!(err, FlvError::Stopped { offset: 9 }));
        assert!(r.header().is_none());
        assert!(r.is_finished());
        assert_eq!(r.offset(), 9);

        assert!(r.next_tag().unwrap().is_none());
        let mut headers = 0;
        let err = {
            let mut callbacks = Callbacks::new().header(|_, _| headers += 1);
            r.parse(&mut callbacks).unwrap_err()
        };
        assert!(matches!(err, FlvError::Stopped { .. }));
        assert_eq!(headers, 0);
    }

    #[test]
    fn test_parse_after_tag_failure_delivers_nothing() {
        let bytes = stream(&[tag_bytes(7, 0, &[0x00])]);
        let mut r = reader(bytes);
        assert!(matches!(
            r.next_tag().unwrap_err(),
            FlvError::UnknownTagType { tag_type: 7, .. }
        ));

        let mut headers = 0;
        let err = {
            let mut callbacks = Callbacks::new().header(|_, _| headers += 1);
            r.parse(&mut callbacks).unwrap_err()
        };
        assert!(matches!(err, FlvError::Stopped { offset: 24 }));
        assert_eq!(headers, 0);
    }

    #[test]
    fn test_non_zero_leading_trailer() {
        let mut bytes = HEADER.to_vec();
        bytes[12] = 1;
        let err = reader(bytes).read_header().unwrap_err();
        assert!(matches!(
            err,
            FlvError::Format {
                offset: 9,
                kind: FormatError::NonZeroPreviousTagSize(1)
            }
        ));
    }

    #[test]
    fn test_truncated_header() {
        let err = reader(HEADER[..7].to_vec()).read_header().unwrap_err();
        assert!(matches!(err, FlvError::Io { offset: 0, field: "file header", .. }));
    }

    #[test]
    fn test_aac_audio_consumes_packet_type() {
        let bytes = stream(&[tag_bytes(TAG_TYPE_AUDIO, 0, &[0xAF, 0x01, 0xDE, 0xAD])]);
        let tag = reader(bytes).next_tag().unwrap().unwrap();
        match tag {
            FlvTag::Audio(audio) => {
                assert_eq!(audio.sub_header.aac_packet_type, Some(AacPacketType::Raw));
                assert_eq!(&audio.payload[..], &[0xDEu8, 0xAD]);
                assert_eq!(audio.previous_tag_size, 15);
            }
            other => panic!("expected audio, got {other:?}"),
        }
    }

    #[test]
    fn test_non_aac_audio_has_one_byte_sub_header() {
        let bytes = stream(&[tag_bytes(TAG_TYPE_AUDIO, 0, &[0x2F, 0x01, 0x02])]);
        let tag = reader(bytes).next_tag().unwrap().unwrap();
        match tag {
            FlvTag::Audio(audio) => {
                assert_eq!(audio.sub_header.aac_packet_type, None);
                assert_eq!(&audio.payload[..], &[0x01u8, 0x02]);
            }
            other => panic!("expected audio, got {other:?}"),
        }
    }

    #[test]
    fn test_video_sub_header_sizes() {
        let bytes = stream(&[
            tag_bytes(TAG_TYPE_VIDEO, 0, &[0x17, 0x01, 0x00, 0x00, 0x21, 0xAA, 0xBB]),
            tag_bytes(TAG_TYPE_VIDEO, 40, &[0x14, 0x00, 0xCC]),
            tag_bytes(TAG_TYPE_VIDEO, 80, &[0x25, 0x11, 0xDD]),
            tag_bytes(TAG_TYPE_VIDEO, 120, &[0x22, 0xEE]),
        ]);
        let tags: Vec<FlvTag> = reader(bytes).collect::<Result<_>>().unwrap();
        assert_eq!(tags.len(), 4);

        let videos: Vec<&VideoTag> = tags
            .iter()
            .map(|t| match t {
                FlvTag::Video(v) => v,
                other => panic!("expected video, got {other:?}"),
            })
            .collect();

        let avc = videos[0].sub_header.avc.unwrap();
        assert_eq!(avc.packet_type, AvcPacketType::Nalu);
        assert_eq!(avc.composition_time, 0x21);
        assert_eq!(&videos[0].payload[..], &[0xAAu8, 0xBB]);

        assert_eq!(videos[1].sub_header.vp6_extra, Some(0x00));
        assert_eq!(&videos[1].payload[..], &[0xCCu8]);

        assert_eq!(videos[2].sub_header.vp6_extra, Some(0x11));
        assert_eq!(&videos[2].payload[..], &[0xDDu8]);

        assert!(videos[3].sub_header.avc.is_none());
        assert!(videos[3].sub_header.vp6_extra.is_none());
        assert_eq!(&videos[3].payload[..], &[0xEEu8]);
        assert_eq!(tags[3].timestamp(), 120);
    }

    #[test]
    fn test_script_tag_is_decoded() {
        let body = encode_script(&metadata());
        let bytes = stream(&[tag_bytes(TAG_TYPE_SCRIPT, 0, &body)]);
        let tag = reader(bytes).next_tag().unwrap().unwrap();
        match tag {
            FlvTag::Script(script) => {
                let data = script.data.unwrap();
                assert_eq!(data, metadata());
                assert_eq!(data.name(), Some("onMetaData"));
                assert_eq!(data.body().unwrap().get_number("duration"), Some(12.5));
                assert_eq!(script.payload, body);
            }
            other => panic!("expected script, got {other:?}"),
        }
    }

    #[test]
    fn test_script_decoding_disabled() {
        let body = encode_script(&metadata());
        let bytes = stream(&[tag_bytes(TAG_TYPE_SCRIPT, 0, &body)]);
        let config = ReaderConfig::default().skip_script_decoding();
        let tag = FlvReader::with_config(Cursor::new(bytes), config)
            .next_tag()
            .unwrap()
            .unwrap();
        match tag {
            FlvTag::Script(script) => {
                assert!(script.data.is_none());
                assert_eq!(script.payload.len(), body.len());
            }
            other => panic!("expected script, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_script_reports_absolute_offset() {
        // String marker declaring 16 bytes with only 1 present
        let bytes = stream(&[tag_bytes(TAG_TYPE_SCRIPT, 0, &[0x02, 0x00, 0x10, b'o'])]);
        let err = reader(bytes).next_tag().unwrap_err();
        // Payload starts after the file header (13) and tag header (11)
        assert!(matches!(
            err,
            FlvError::Truncated {
                offset: 27,
                needed: 16,
                remaining: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_tag_type() {
        let bytes = stream(&[tag_bytes(TAG_TYPE_AUDIO, 0, &[0x2F]), tag_bytes(7, 0, &[0x00])]);
        let mut r = reader(bytes);
        assert!(r.next_tag().unwrap().is_some());
        let err = r.next_tag().unwrap_err();
        assert!(matches!(
            err,
            FlvError::UnknownTagType {
                offset: 29,
                tag_type: 7
            }
        ));
        // Fused after failure
        assert!(r.next_tag().unwrap().is_none());
        assert!(r.next().is_none());
    }

    #[test]
    fn test_payload_underflow() {
        // AAC needs two sub-header bytes but the tag declares one
        let mut tag = tag_bytes(TAG_TYPE_AUDIO, 0, &[0xAF]);
        tag.extend_from_slice(&[0x00; 4]);
        let err = reader(stream(&[tag])).next_tag().unwrap_err();
        assert!(matches!(
            err,
            FlvError::Format {
                kind: FormatError::PayloadUnderflow {
                    declared: 1,
                    sub_header: 2
                },
                ..
            }
        ));

        let err = reader(stream(&[tag_bytes(TAG_TYPE_VIDEO, 0, &[])]))
            .next_tag()
            .unwrap_err();
        assert!(matches!(
            err,
            FlvError::Format {
                offset: 24,
                kind: FormatError::PayloadUnderflow {
                    declared: 0,
                    sub_header: 1
                }
            }
        ));
    }

    #[test]
    fn test_truncated_payload_keeps_earlier_tags() {
        let mut bytes = stream(&[
            tag_bytes(TAG_TYPE_AUDIO, 0, &[0x2F, 0x01]),
            tag_bytes(TAG_TYPE_VIDEO, 33, &[0x22, 0x01, 0x02, 0x03]),
        ]);
        // Cut the second tag inside its payload
        bytes.truncate(13 + 17 + 11 + 2);

        let mut headers = 0;
        let mut audio = Vec::new();
        let mut video = 0;
        let err = {
            let mut callbacks = Callbacks::new()
                .header(|_, _| headers += 1)
                .audio(|tag| audio.push(tag.payload.clone()))
                .video(|_| video += 1);
            reader(bytes).parse(&mut callbacks).unwrap_err()
        };

        assert_eq!(headers, 1);
        assert_eq!(audio.len(), 1);
        assert_eq!(&audio[0][..], &[0x01u8]);
        assert_eq!(video, 0);
        match err {
            FlvError::Io { field, source, .. } => {
                assert_eq!(field, "video data");
                assert_eq!(source.kind(), ErrorKind::UnexpectedEof);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_partial_tag_header_is_io_error() {
        let mut bytes = stream(&[]);
        bytes.extend_from_slice(&[TAG_TYPE_AUDIO, 0x00]);
        let err = reader(bytes).next_tag().unwrap_err();
        assert!(matches!(err, FlvError::Io { offset: 13, field: "tag header", .. }));
    }

    #[test]
    fn test_stream_id_checks() {
        let mut tag = tag_bytes(TAG_TYPE_AUDIO, 0, &[0x2F]);
        tag[10] = 1;

        let err = reader(stream(&[tag.clone()])).next_tag().unwrap_err();
        assert!(matches!(
            err,
            FlvError::Format {
                offset: 21,
                kind: FormatError::NonZeroStreamId(1)
            }
        ));

        let config = ReaderConfig::default().lenient_stream_id();
        let tag = FlvReader::with_config(Cursor::new(stream(&[tag])), config)
            .next_tag()
            .unwrap()
            .unwrap();
        assert_eq!(tag.header().stream_id, 1);
    }

    #[test]
    fn test_trailer_verification() {
        let mut tag = tag_bytes(TAG_TYPE_AUDIO, 0, &[0x2F]);
        let last = tag.len() - 1;
        tag[last] = 0xFF;

        // Accepted and reported as read by default
        let parsed = reader(stream(&[tag.clone()])).next_tag().unwrap().unwrap();
        assert_eq!(parsed.previous_tag_size(), 0xFF);

        let config = ReaderConfig::default().verify_previous_tag_size(true);
        let err = FlvReader::with_config(Cursor::new(stream(&[tag])), config)
            .next_tag()
            .unwrap_err();
        assert!(matches!(
            err,
            FlvError::Format {
                kind: FormatError::PreviousTagSizeMismatch {
                    expected: 12,
                    found: 0xFF
                },
                ..
            }
        ));
    }

    #[test]
    fn test_extended_timestamp() {
        let bytes = stream(&[tag_bytes(TAG_TYPE_AUDIO, 0x0123_4567, &[0x2F])]);
        let tag = reader(bytes).next_tag().unwrap().unwrap();
        assert_eq!(tag.timestamp(), 0x0123_4567);
        assert_eq!(tag.header().timestamp_extended, 0x01);
    }

    #[test]
    fn test_parse_dispatches_in_order() {
        #[derive(Default)]
        struct Recorder(Vec<&'static str>);

        impl FlvHandler for Recorder {
            fn on_header(&mut self, _header: &FileHeader, _previous_tag_size: u32) {
                self.0.push("header");
            }
            fn on_audio(&mut self, _tag: &AudioTag) {
                self.0.push("audio");
            }
            fn on_video(&mut self, _tag: &VideoTag) {
                self.0.push("video");
            }
            fn on_script(&mut self, tag: &ScriptTag) {
                assert!(tag.data.is_some());
                self.0.push("script");
            }
        }

        let bytes = stream(&[
            tag_bytes(TAG_TYPE_SCRIPT, 0, &encode_script(&metadata())),
            tag_bytes(TAG_TYPE_VIDEO, 0, &[0x17, 0x00, 0x00, 0x00, 0x00, 0x01]),
            tag_bytes(TAG_TYPE_AUDIO, 0, &[0xAF, 0x00, 0x12, 0x10]),
        ]);
        let mut recorder = Recorder::default();
        reader(bytes).parse(&mut recorder).unwrap();
        assert_eq!(recorder.0, vec!["header", "script", "video", "audio"]);
    }

    #[test]
    fn test_open_missing_file() {
        let err = FlvReader::open("/nonexistent/dir/missing.flv").unwrap_err();
        match err {
            FlvError::Open { path, source } => {
                assert!(path.ends_with("missing.flv"));
                assert_eq!(source.kind(), ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_iterator_reads_header_implicitly() {
        let bytes = stream(&[
            tag_bytes(TAG_TYPE_AUDIO, 0, &[0x2F]),
            tag_bytes(TAG_TYPE_AUDIO, 23, &[0x2F]),
        ]);
        let mut r = reader(bytes);
        assert!(r.header().is_none());
        let timestamps: Vec<u32> = r.by_ref().map(|t| t.unwrap().timestamp()).collect();
        assert_eq!(timestamps, vec![0, 23]);
        assert!(r.header().unwrap().has_video);
        assert!(r.is_finished());
    }
}
