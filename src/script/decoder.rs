//! Script data (AMF0) decoder
//!
//! Recursive descent over a [`ByteCursor`]. The decoder holds no mutable
//! state: nesting depth travels down the call stack and every byte is
//! accounted for by the cursor.
//!
//! Type Markers:
//! ```text
//! 0x00 - Number (IEEE 754 double)
//! 0x01 - Boolean
//! 0x02 - String (16-bit length prefix)
//! 0x03 - Object (keyed entries until 0x000009)
//! 0x04 - MovieClip (reserved, no payload)
//! 0x05 - Null
//! 0x06 - Undefined
//! 0x07 - Reference (16-bit index)
//! 0x08 - ECMA Array (32-bit count, keyed entries, 0x000009 trailer)
//! 0x09 - Object End
//! 0x0A - Strict Array (32-bit count, values)
//! 0x0B - Date (double + 16-bit signed UTC offset)
//! 0x0C - Long String (32-bit length prefix)
//! ```

use bytes::Bytes;

use super::value::{KeyedEntry, ScriptData, ScriptDate, ScriptValue};
use crate::error::{FlvError, FormatError, Result};
use crate::io::ByteCursor;

pub(crate) const MARKER_NUMBER: u8 = 0x00;
pub(crate) const MARKER_BOOLEAN: u8 = 0x01;
pub(crate) const MARKER_STRING: u8 = 0x02;
pub(crate) const MARKER_OBJECT: u8 = 0x03;
pub(crate) const MARKER_MOVIE_CLIP: u8 = 0x04;
pub(crate) const MARKER_NULL: u8 = 0x05;
pub(crate) const MARKER_UNDEFINED: u8 = 0x06;
pub(crate) const MARKER_REFERENCE: u8 = 0x07;
pub(crate) const MARKER_ECMA_ARRAY: u8 = 0x08;
pub(crate) const MARKER_OBJECT_END: u8 = 0x09;
pub(crate) const MARKER_STRICT_ARRAY: u8 = 0x0A;
pub(crate) const MARKER_DATE: u8 = 0x0B;
pub(crate) const MARKER_LONG_STRING: u8 = 0x0C;

/// Empty key followed by the object end marker
pub const OBJECT_END_SENTINEL: [u8; 3] = [0x00, 0x00, MARKER_OBJECT_END];

/// Maximum nesting depth for objects/arrays (prevent stack overflow)
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

/// Upper bound on entries reserved ahead of decoding a declared count
const MAX_PREALLOC: usize = 1024;

/// Script data decoder
#[derive(Debug, Clone, Copy)]
pub struct ScriptDecoder {
    max_depth: usize,
}

impl ScriptDecoder {
    /// Create a new decoder with default settings
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    /// Create decoder with an explicit nesting limit
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Decode every value in the cursor until it is exhausted
    pub fn decode_body(&self, cur: &mut ByteCursor) -> Result<ScriptData> {
        let mut values = Vec::new();
        while !cur.is_empty() {
            values.push(self.decode_value(cur)?);
        }
        Ok(ScriptData::new(values))
    }

    /// Decode one marker-prefixed value
    pub fn decode_value(&self, cur: &mut ByteCursor) -> Result<ScriptValue> {
        self.value(cur, 0)
    }

    /// Decode one key and the value that follows it
    ///
    /// This is the entry grammar of Objects and ECMA arrays: a 16-bit
    /// length-prefixed key with no marker, then one marker-prefixed value.
    pub fn decode_keyed_slot(&self, cur: &mut ByteCursor) -> Result<KeyedEntry> {
        self.keyed_slot(cur, 0)
    }

    fn value(&self, cur: &mut ByteCursor, depth: usize) -> Result<ScriptValue> {
        let offset = cur.offset();
        let marker = cur.read_u8("value marker")?;
        match marker {
            MARKER_NUMBER => Ok(ScriptValue::Number(cur.read_f64("number")?)),
            MARKER_BOOLEAN => Ok(ScriptValue::Boolean(cur.read_u8("boolean")? != 0)),
            MARKER_STRING => Ok(ScriptValue::String(read_string(cur)?)),
            MARKER_OBJECT => {
                let depth = self.enter(depth, offset)?;
                Ok(ScriptValue::Object(self.object(cur, depth)?))
            }
            MARKER_MOVIE_CLIP => Ok(ScriptValue::MovieClip),
            MARKER_NULL => Ok(ScriptValue::Null),
            MARKER_UNDEFINED => Ok(ScriptValue::Undefined),
            MARKER_REFERENCE => Ok(ScriptValue::Reference(cur.read_u16("reference")?)),
            MARKER_ECMA_ARRAY => {
                let depth = self.enter(depth, offset)?;
                Ok(ScriptValue::EcmaArray(self.ecma_array(cur, depth)?))
            }
            MARKER_OBJECT_END => Ok(ScriptValue::ObjectEnd),
            MARKER_STRICT_ARRAY => {
                let depth = self.enter(depth, offset)?;
                Ok(ScriptValue::StrictArray(self.strict_array(cur, depth)?))
            }
            MARKER_DATE => Ok(ScriptValue::Date(ScriptDate {
                timestamp: cur.read_f64("date")?,
                utc_offset_minutes: cur.read_i16("date offset")?,
            })),
            MARKER_LONG_STRING => {
                let len = cur.read_u32("long string length")? as usize;
                Ok(ScriptValue::LongString(
                    cur.read_exact(len, "long string bytes")?,
                ))
            }
            _ => Err(FlvError::format(
                offset,
                FormatError::UnknownScriptMarker(marker),
            )),
        }
    }

    fn keyed_slot(&self, cur: &mut ByteCursor, depth: usize) -> Result<KeyedEntry> {
        let key = read_string(cur)?;
        let value = self.value(cur, depth)?;
        Ok(KeyedEntry { key, value })
    }

    fn object(&self, cur: &mut ByteCursor, depth: usize) -> Result<Vec<KeyedEntry>> {
        let mut entries = Vec::new();
        loop {
            if cur.peek(3, "object end marker")? == OBJECT_END_SENTINEL {
                cur.skip(3, "object end marker")?;
                return Ok(entries);
            }
            entries.push(self.keyed_slot(cur, depth)?);
        }
    }

    fn ecma_array(&self, cur: &mut ByteCursor, depth: usize) -> Result<Vec<KeyedEntry>> {
        let count = cur.read_u32("ecma array count")?;

        let mut entries = Vec::with_capacity((count as usize).min(MAX_PREALLOC));
        for _ in 0..count {
            entries.push(self.keyed_slot(cur, depth)?);
        }

        // The count bounds the entries; the sentinel is an optional trailer
        if cur.remaining() >= 3 && cur.peek(3, "ecma array end marker")? == OBJECT_END_SENTINEL {
            cur.skip(3, "ecma array end marker")?;
        }
        Ok(entries)
    }

    fn strict_array(&self, cur: &mut ByteCursor, depth: usize) -> Result<Vec<ScriptValue>> {
        let count = cur.read_u32("strict array count")?;

        let mut elements = Vec::with_capacity((count as usize).min(MAX_PREALLOC));
        for _ in 0..count {
            elements.push(self.value(cur, depth)?);
        }
        Ok(elements)
    }

    fn enter(&self, depth: usize, offset: u64) -> Result<usize> {
        let depth = depth + 1;
        if depth > self.max_depth {
            return Err(FlvError::format(
                offset,
                FormatError::NestingTooDeep(self.max_depth),
            ));
        }
        Ok(depth)
    }
}

impl Default for ScriptDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a string with a 16-bit length prefix
fn read_string(cur: &mut ByteCursor) -> Result<Bytes> {
    let len = cur.read_u16("string length")? as usize;
    cur.read_exact(len, "string bytes")
}

/// Convenience function to decode a whole script tag body
pub fn decode_script(payload: Bytes) -> Result<ScriptData> {
    ScriptDecoder::new().decode_body(&mut ByteCursor::new(payload))
}
