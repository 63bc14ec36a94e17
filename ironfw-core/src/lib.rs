//! # IronFW Core
//!
//! Runtime support for fixed-width host record codecs.
//!
//! This crate provides:
//! - Field layouts (width, pad character, justification)
//! - Encode/decode traits implemented by generated record types
//! - A character cursor shared by all decode routines of a message
//! - Dynamic record values for table-driven codecs
//! - Error types for encoding/decoding operations

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod layout;
pub mod value;

pub use decoder::{DecodeCursor, HostDecode};
pub use encoder::{EncodeBuffer, HostEncode};
pub use error::{Error, Result};
pub use layout::{FieldLayout, Justify};
pub use value::{Record, Value};
