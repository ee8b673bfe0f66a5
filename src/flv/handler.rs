//! Application handlers for decoded tags
//!
//! Implement [`FlvHandler`] to receive the file header and each tag as the
//! reader decodes them. All methods default to no-ops, so a handler only
//! overrides what it cares about. [`Callbacks`] offers the same four slots
//! as optional closures.

use super::header::FileHeader;
use super::tag::{AudioTag, FlvTag, ScriptTag, VideoTag};

/// Receives decoded items in stream order
pub trait FlvHandler {
    /// Called once with the file header and the leading trailer value
    fn on_header(&mut self, _header: &FileHeader, _previous_tag_size: u32) {}

    /// Called for each audio tag
    fn on_audio(&mut self, _tag: &AudioTag) {}

    /// Called for each video tag
    fn on_video(&mut self, _tag: &VideoTag) {}

    /// Called for each script tag, with its decoded value tree
    fn on_script(&mut self, _tag: &ScriptTag) {}
}

/// Route a tag to the matching handler method
pub fn dispatch<H: FlvHandler + ?Sized>(handler: &mut H, tag: &FlvTag) {
    match tag {
        FlvTag::Audio(t) => handler.on_audio(t),
        FlvTag::Video(t) => handler.on_video(t),
        FlvTag::Script(t) => handler.on_script(t),
    }
}

type HeaderFn<'a> = Box<dyn FnMut(&FileHeader, u32) + 'a>;
type AudioFn<'a> = Box<dyn FnMut(&AudioTag) + 'a>;
type VideoFn<'a> = Box<dyn FnMut(&VideoTag) + 'a>;
type ScriptFn<'a> = Box<dyn FnMut(&ScriptTag) + 'a>;

/// Closure-based handler; unset slots do nothing
#[derive(Default)]
pub struct Callbacks<'a> {
    header: Option<HeaderFn<'a>>,
    audio: Option<AudioFn<'a>>,
    video: Option<VideoFn<'a>>,
    script: Option<ScriptFn<'a>>,
}

impl<'a> Callbacks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the file header handler
    pub fn header(mut self, f: impl FnMut(&FileHeader, u32) + 'a) -> Self {
        self.header = Some(Box::new(f));
        self
    }

    /// Set the audio tag handler
    pub fn audio(mut self, f: impl FnMut(&AudioTag) + 'a) -> Self {
        self.audio = Some(Box::new(f));
        self
    }

    /// Set the video tag handler
    pub fn video(mut self, f: impl FnMut(&VideoTag) + 'a) -> Self {
        self.video = Some(Box::new(f));
        self
    }

    /// Set the script tag handler
    pub fn script(mut self, f: impl FnMut(&ScriptTag) + 'a) -> Self {
        self.script = Some(Box::new(f));
        self
    }
}

impl FlvHandler for Callbacks<'_> {
    fn on_header(&mut self, header: &FileHeader, previous_tag_size: u32) {
        if let Some(f) = self.header.as_mut() {
            f(header, previous_tag_size);
        }
    }

    fn on_audio(&mut self, tag: &AudioTag) {
        if let Some(f) = self.audio.as_mut() {
            f(tag);
        }
    }

    fn on_video(&mut self, tag: &VideoTag) {
        if let Some(f) = self.video.as_mut() {
            f(tag);
        }
    }

    fn on_script(&mut self, tag: &ScriptTag) {
        if let Some(f) = self.script.as_mut() {
            f(tag);
        }
    }
}

impl std::fmt::Debug for Callbacks<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("header", &self.header.is_some())
            .field("audio", &self.audio.is_some())
            .field("video", &self.video.is_some())
            .field("script", &self.script.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flv::tag::{AudioSubHeader, TagHeader};
    use bytes::Bytes;

    fn audio_tag() -> FlvTag {
        FlvTag::Audio(AudioTag {
            header: TagHeader::parse([8, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0], 13),
            sub_header: AudioSubHeader::from_byte(0x2F),
            payload: Bytes::new(),
            previous_tag_size: 12,
        })
    }

    #[test]
    fn test_unset_slots_are_noops() {
        let mut callbacks = Callbacks::new();
        dispatch(&mut callbacks, &audio_tag());
    }

    #[test]
    fn test_dispatch_to_slot() {
        let mut audio = 0;
        let mut video = 0;
        {
            let mut callbacks = Callbacks::new()
                .audio(|tag| {
                    assert_eq!(tag.previous_tag_size, 12);
                    audio += 1;
                })
                .video(|_| video += 1);
            dispatch(&mut callbacks, &audio_tag());
            dispatch(&mut callbacks, &audio_tag());
        }
        assert_eq!(audio, 2);
        assert_eq!(video, 0);
    }

    #[test]
    fn test_trait_defaults() {
        struct OnlyAudio(usize);
        impl FlvHandler for OnlyAudio {
            fn on_audio(&mut self, _tag: &AudioTag) {
                self.0 += 1;
            }
        }

        let mut handler = OnlyAudio(0);
        dispatch(&mut handler, &audio_tag());
        assert_eq!(handler.0, 1);
    }

    #[test]
    fn test_debug_shows_set_slots() {
        let callbacks = Callbacks::new().script(|_| {});
        let s = format!("{callbacks:?}");
        assert!(s.contains("script: true"));
        assert!(s.contains("audio: false"));
    }
}
