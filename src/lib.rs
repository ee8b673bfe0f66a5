//! FLV tag stream reader with an AMF0 script data decoder
//!
//! Reads an FLV file front to back, validating the file header and
//! yielding one typed tag at a time. Script tags are decoded into an owned
//! [`ScriptValue`] tree, so `onMetaData` fields can be looked up by name.
//!
//! ```no_run
//! use flv_parser::{FlvReader, FlvTag};
//!
//! # fn main() -> flv_parser::Result<()> {
//! let mut reader = FlvReader::open("input.flv")?;
//! while let Some(tag) = reader.next_tag()? {
//!     if let FlvTag::Script(script) = &tag {
//!         let duration = script
//!             .data
//!             .as_ref()
//!             .and_then(|d| d.body())
//!             .and_then(|b| b.get_number("duration"));
//!         println!("duration: {duration:?}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod flv;
pub mod io;
pub mod script;

pub use config::ReaderConfig;
pub use error::{FlvError, FormatError, Result};
pub use flv::{Callbacks, FileHeader, FlvHandler, FlvReader, FlvTag, FlvTagType};
pub use script::{decode_script, encode_script, KeyedEntry, ScriptData, ScriptValue};
