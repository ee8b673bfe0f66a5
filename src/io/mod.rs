//! Byte-level input
//!
//! This module provides:
//! - Big-endian field conversion
//! - A bounds-checked cursor over in-memory script payloads
//! - A forward-only source over any `std::io::Read`

pub mod cursor;
pub mod endian;
pub mod source;

pub use cursor::ByteCursor;
pub use source::StreamSource;
