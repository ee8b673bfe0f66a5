//! Script data (AMF0) values carried by FLV script tags
//!
//! This module provides:
//! - An owned value tree with one case per value kind
//! - A recursive-descent decoder with exact byte accounting
//! - An encoder that inverts each decode rule

pub mod decoder;
pub mod encoder;
pub mod value;

pub use decoder::{decode_script, ScriptDecoder, OBJECT_END_SENTINEL};
pub use encoder::{encode_script, ScriptEncoder, MAX_KEY_LEN};
pub use value::{KeyedEntry, ScriptData, ScriptDate, ScriptValue};
