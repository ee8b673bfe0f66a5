//! Reader configuration

use crate::script::decoder::DEFAULT_MAX_NESTING_DEPTH;

/// Tag stream reader options
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Decode script tag payloads into a value tree
    pub decode_script: bool,

    /// Nesting limit for objects and arrays in script data
    pub max_nesting_depth: usize,

    /// Reject tags whose stream id is not zero
    pub strict_stream_id: bool,

    /// Reject tags whose trailer differs from the tag size just read
    pub verify_previous_tag_size: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            decode_script: true,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            strict_stream_id: true,
            verify_previous_tag_size: false, // Many muxers write sloppy trailers
        }
    }
}

impl ReaderConfig {
    /// Deliver script tags with their raw payload only
    pub fn skip_script_decoding(mut self) -> Self {
        self.decode_script = false;
        self
    }

    /// Set the script data nesting limit
    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Accept non-zero stream ids with a warning
    pub fn lenient_stream_id(mut self) -> Self {
        self.strict_stream_id = false;
        self
    }

    /// Enable cross-checking of per-tag trailers
    pub fn verify_previous_tag_size(mut self, verify: bool) -> Self {
        self.verify_previous_tag_size = verify;
        self
    }
}
