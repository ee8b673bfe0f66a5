//! Script data value types
//!
//! One enum case per value kind, each carrying its own typed payload.
//! Objects and ECMA arrays keep their entries in wire order as a `Vec`,
//! since keys are raw byte strings and may repeat.

use bytes::Bytes;

/// Decoded script data value
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    /// IEEE 754 double (0x00)
    Number(f64),

    /// Boolean, any nonzero byte is true (0x01)
    Boolean(bool),

    /// Raw bytes with a 16-bit length prefix (0x02)
    String(Bytes),

    /// Keyed entries terminated by the 0x000009 sentinel (0x03)
    Object(Vec<KeyedEntry>),

    /// Reserved marker, carries no payload (0x04)
    MovieClip,

    /// Null (0x05)
    Null,

    /// Undefined (0x06)
    Undefined,

    /// Unresolved 16-bit reference index (0x07)
    Reference(u16),

    /// Counted keyed entries (0x08)
    EcmaArray(Vec<KeyedEntry>),

    /// Standalone object end marker (0x09)
    ObjectEnd,

    /// Counted positional values (0x0A)
    StrictArray(Vec<ScriptValue>),

    /// Date (0x0B)
    Date(ScriptDate),

    /// Raw bytes with a 32-bit length prefix (0x0C)
    LongString(Bytes),
}

/// A key and its value inside an Object or ECMA array
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedEntry {
    /// Raw key bytes, may contain embedded NULs
    pub key: Bytes,
    pub value: ScriptValue,
}

/// Date value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptDate {
    /// Milliseconds since the Unix epoch
    pub timestamp: f64,
    /// Local offset from UTC in minutes
    pub utc_offset_minutes: i16,
}

impl KeyedEntry {
    pub fn new(key: impl Into<Bytes>, value: ScriptValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Key as UTF-8, if valid
    pub fn key_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.key).ok()
    }
}

impl ScriptValue {
    /// Build a short string value from text
    pub fn string(s: &str) -> Self {
        ScriptValue::String(Bytes::copy_from_slice(s.as_bytes()))
    }

    /// Wire marker byte for this value
    pub fn marker(&self) -> u8 {
        match self {
            ScriptValue::Number(_) => 0x00,
            ScriptValue::Boolean(_) => 0x01,
            ScriptValue::String(_) => 0x02,
            ScriptValue::Object(_) => 0x03,
            ScriptValue::MovieClip => 0x04,
            ScriptValue::Null => 0x05,
            ScriptValue::Undefined => 0x06,
            ScriptValue::Reference(_) => 0x07,
            ScriptValue::EcmaArray(_) => 0x08,
            ScriptValue::ObjectEnd => 0x09,
            ScriptValue::StrictArray(_) => 0x0A,
            ScriptValue::Date(_) => 0x0B,
            ScriptValue::LongString(_) => 0x0C,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ScriptValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScriptValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Raw bytes of a String or LongString
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            ScriptValue::String(b) | ScriptValue::LongString(b) => Some(b),
            _ => None,
        }
    }

    /// String or LongString as UTF-8, if valid
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Entries of an Object or ECMA array
    pub fn entries(&self) -> Option<&[KeyedEntry]> {
        match self {
            ScriptValue::Object(e) | ScriptValue::EcmaArray(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ScriptValue]> {
        match self {
            ScriptValue::StrictArray(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<ScriptDate> {
        match self {
            ScriptValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// First entry whose key equals `key`
    pub fn get(&self, key: &str) -> Option<&ScriptValue> {
        self.entries()?
            .iter()
            .find(|e| &e.key[..] == key.as_bytes())
            .map(|e| &e.value)
    }

    /// Get a number property from an Object or ECMA array
    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_number()
    }

    /// Check if this value is null or undefined
    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, ScriptValue::Null | ScriptValue::Undefined)
    }
}

impl From<f64> for ScriptValue {
    fn from(v: f64) -> Self {
        ScriptValue::Number(v)
    }
}

impl From<bool> for ScriptValue {
    fn from(v: bool) -> Self {
        ScriptValue::Boolean(v)
    }
}

impl From<&str> for ScriptValue {
    fn from(v: &str) -> Self {
        ScriptValue::string(v)
    }
}

impl From<ScriptDate> for ScriptValue {
    fn from(v: ScriptDate) -> Self {
        ScriptValue::Date(v)
    }
}

/// Decoded body of a script tag: the values in wire order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScriptData {
    values: Vec<ScriptValue>,
}

impl ScriptData {
    pub fn new(values: Vec<ScriptValue>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[ScriptValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<ScriptValue> {
        self.values
    }

    /// Event name carried by the first value, usually `onMetaData`
    pub fn name(&self) -> Option<&str> {
        self.values.first()?.as_str()
    }

    /// The value following the event name
    pub fn body(&self) -> Option<&ScriptValue> {
        self.values.get(1)
    }
}
