//! Decoding side of the fixed-width text format.
//!
//! This module provides the [`DecodeCursor`] shared by every decode routine of a
//! message and the [`HostDecode`] trait implemented by generated record types.

use crate::layout::FieldLayout;

/// Character cursor over a fixed-width wire buffer.
///
/// Positions are counted in characters. A read that would run past the end of
/// the buffer returns `None` and leaves the cursor where it was, so short
/// buffers leave trailing fields unset instead of failing.
#[derive(Debug, Clone)]
pub struct DecodeCursor<'a> {
    buffer: &'a str,
    byte_pos: usize,
    position: usize,
    len: usize,
}

impl<'a> DecodeCursor<'a> {
    /// Creates a cursor at the start of `buffer`.
    #[must_use]
    pub fn new(buffer: &'a str) -> Self {
        Self {
            buffer,
            byte_pos: 0,
            position: 0,
            len: buffer.chars().count(),
        }
    }

    /// Returns the underlying buffer.
    #[must_use]
    pub const fn buffer(&self) -> &'a str {
        self.buffer
    }

    /// Returns the current position in characters.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the buffer length in characters.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of characters left to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.len - self.position
    }

    /// Returns true once every character has been consumed.
    #[must_use]
    pub const fn is_at_end(&self) -> bool {
        self.position >= self.len
    }

    /// Takes the next `width` characters verbatim and advances.
    ///
    /// Returns `None` without moving if fewer than `width` characters remain.
    pub fn take(&mut self, width: usize) -> Option<&'a str> {
        if width > self.remaining() {
            return None;
        }

        let rest = &self.buffer[self.byte_pos..];
        let end = rest.char_indices().nth(width).map_or(rest.len(), |(i, _)| i);
        let slice = &rest[..end];
        self.byte_pos += end;
        self.position += width;
        Some(slice)
    }

    /// Takes the next `width` characters with surrounding whitespace trimmed.
    pub fn take_field(&mut self, width: usize) -> Option<&'a str> {
        self.take(width).map(str::trim)
    }

    /// Takes the next field framed by `layout` and strips its padding.
    ///
    /// See [`FieldLayout::decode`].
    pub fn take_value(&mut self, layout: FieldLayout) -> Option<&'a str> {
        self.take(layout.width).map(|raw| layout.decode(raw))
    }

    /// Skips `width` characters of constant or filler content.
    ///
    /// Returns false, without moving, if the buffer is too short.
    pub fn skip(&mut self, width: usize) -> bool {
        self.take(width).is_some()
    }
}

/// Trait for record types decoded from fixed-width text.
///
/// # Example
/// ```ignore
/// // Generated decoder usage
/// let customer = Customer::decode("JOHN      0042");
/// assert_eq!(customer.Name.as_deref(), Some("JOHN"));
/// ```
pub trait HostDecode: Sized {
    /// Decodes a value starting at the cursor, advancing it past the value.
    fn decode_from(cursor: &mut DecodeCursor<'_>) -> Self;

    /// Decodes a value from the start of `buffer`.
    fn decode(buffer: &str) -> Self {
        let mut cursor = DecodeCursor::new(buffer);
        Self::decode_from(&mut cursor)
    }
}
