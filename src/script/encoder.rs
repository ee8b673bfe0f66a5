//! Script data (AMF0) encoder
//!
//! Writes each value with the inverse of its decode rule. A `String` longer
//! than 0xFFFF bytes is written as a long string, so it decodes back as
//! `LongString` with the same bytes. Keys have no long form and must fit
//! their 16-bit length prefix.

use bytes::{BufMut, Bytes, BytesMut};

use super::decoder::{MARKER_LONG_STRING, OBJECT_END_SENTINEL};
use super::value::{KeyedEntry, ScriptData, ScriptValue};

/// Longest key or short string a 16-bit length prefix can describe
pub const MAX_KEY_LEN: usize = 0xFFFF;

/// Script data encoder
pub struct ScriptEncoder {
    buf: BytesMut,
}

impl ScriptEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(256),
        }
    }

    /// Create encoder with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Get the encoded bytes and reset encoder
    pub fn finish(&mut self) -> Bytes {
        self.buf.split().freeze()
    }

    /// Get current encoded length
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if encoder is empty
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Encode a single value
    pub fn encode(&mut self, value: &ScriptValue) {
        if let ScriptValue::String(s) = value {
            if s.len() > MAX_KEY_LEN {
                // No room in a 16-bit prefix
                self.write_long_string(s);
                return;
            }
        }

        self.buf.put_u8(value.marker());
        match value {
            ScriptValue::Number(n) => self.buf.put_f64(*n),
            ScriptValue::Boolean(b) => self.buf.put_u8(u8::from(*b)),
            ScriptValue::String(s) => self.write_string(s),
            ScriptValue::Object(entries) => {
                self.write_entries(entries);
                self.buf.put_slice(&OBJECT_END_SENTINEL);
            }
            ScriptValue::MovieClip
            | ScriptValue::Null
            | ScriptValue::Undefined
            | ScriptValue::ObjectEnd => {}
            ScriptValue::Reference(index) => self.buf.put_u16(*index),
            ScriptValue::EcmaArray(entries) => {
                self.buf.put_u32(entries.len() as u32);
                self.write_entries(entries);
                self.buf.put_slice(&OBJECT_END_SENTINEL);
            }
            ScriptValue::StrictArray(elements) => {
                self.buf.put_u32(elements.len() as u32);
                for elem in elements {
                    self.encode(elem);
                }
            }
            ScriptValue::Date(date) => {
                self.buf.put_f64(date.timestamp);
                self.buf.put_i16(date.utc_offset_minutes);
            }
            ScriptValue::LongString(s) => {
                self.buf.put_u32(s.len() as u32);
                self.buf.put_slice(s);
            }
        }
    }

    /// Encode the values of a script tag body
    pub fn encode_data(&mut self, data: &ScriptData) {
        for value in data.values() {
            self.encode(value);
        }
    }

    fn write_entries(&mut self, entries: &[KeyedEntry]) {
        for entry in entries {
            debug_assert!(
                entry.key.len() <= MAX_KEY_LEN,
                "key of {} bytes exceeds the 16-bit length prefix",
                entry.key.len()
            );
            if entry.key.len() > MAX_KEY_LEN {
                tracing::warn!(len = entry.key.len(), "Truncating oversized key");
            }
            self.write_string(&entry.key[..entry.key.len().min(MAX_KEY_LEN)]);
            self.encode(&entry.value);
        }
    }

    /// Write bytes with 16-bit length prefix (no type marker)
    fn write_string(&mut self, s: &[u8]) {
        self.buf.put_u16(s.len() as u16);
        self.buf.put_slice(s);
    }

    fn write_long_string(&mut self, s: &[u8]) {
        self.buf.put_u8(MARKER_LONG_STRING);
        self.buf.put_u32(s.len() as u32);
        self.buf.put_slice(s);
    }
}

impl Default for ScriptEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to encode a single value
pub fn encode(value: &ScriptValue) -> Bytes {
    let mut encoder = ScriptEncoder::new();
    encoder.encode(value);
    encoder.finish()
}

/// Convenience function to encode a script tag body
pub fn encode_script(data: &ScriptData) -> Bytes {
    let mut encoder = ScriptEncoder::new();
    encoder.encode_data(data);
    encoder.finish()
}
