//! Encoding side of the fixed-width text format.
//!
//! This module provides the [`HostEncode`] trait for record types and the
//! [`EncodeBuffer`] that tracks how many characters have been written.

use crate::layout::FieldLayout;

/// Trait for record types encoded into fixed-width text.
///
/// # Example
/// ```ignore
/// // Generated encoder usage
/// let customer = Customer { Name: Some("JOHN".into()), ..Default::default() };
/// let wire = customer.encode();
/// ```
pub trait HostEncode {
    /// Appends the encoded value to `buffer`.
    fn encode_into(&self, buffer: &mut EncodeBuffer);

    /// Encodes the value into a new string.
    fn encode(&self) -> String {
        let mut buffer = EncodeBuffer::new();
        self.encode_into(&mut buffer);
        buffer.into_string()
    }
}

/// Output buffer for encode routines.
///
/// Keeps a running character count so callers can check framing without
/// re-scanning the output.
#[derive(Debug, Default, Clone)]
pub struct EncodeBuffer {
    out: String,
    width: usize,
}

impl EncodeBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            width: 0,
        }
    }

    /// Returns the number of characters written so far.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns the encoded text so far.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Consumes the buffer, returning the encoded text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.out
    }

    /// Writes a value framed by `layout`.
    pub fn put_field(&mut self, layout: FieldLayout, value: &str) {
        layout.encode_into(value, &mut self.out);
        self.width += layout.width;
    }

    /// Writes a literal constant, space padded and left justified to `width`.
    pub fn put_constant(&mut self, value: &str, width: usize) {
        self.put_field(FieldLayout::text(width), value);
    }

    /// Writes `width` spaces of filler.
    pub fn put_padding(&mut self, width: usize) {
        self.out.extend(std::iter::repeat_n(' ', width));
        self.width += width;
    }
}
