//! Fixed-width field layout.
//!
//! A [`FieldLayout`] captures everything needed to frame one positional text
//! field: its width in characters, the pad character and the side on which
//! padding is applied. Widths always count characters, never bytes.

use crate::error::{Error, Result};

/// Side on which a value is placed inside its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Justify {
    /// Value first, padding on the right (text fields).
    #[default]
    Left,
    /// Padding first, value on the right (numeric fields).
    Right,
}

/// Width, pad character and justification of a fixed-width field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldLayout {
    /// Field width in characters.
    pub width: usize,
    /// Pad character.
    pub pad: char,
    /// Justification.
    pub justify: Justify,
}

impl FieldLayout {
    /// Creates a layout from its parts.
    #[must_use]
    pub const fn new(width: usize, pad: char, justify: Justify) -> Self {
        Self {
            width,
            pad,
            justify,
        }
    }

    /// Text layout: space padded, left justified.
    #[must_use]
    pub const fn text(width: usize) -> Self {
        Self::new(width, ' ', Justify::Left)
    }

    /// Numeric layout: zero padded, right justified.
    #[must_use]
    pub const fn numeric(width: usize) -> Self {
        Self::new(width, '0', Justify::Right)
    }

    /// Returns true for zero-padded, right-justified layouts.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        self.pad == '0' && matches!(self.justify, Justify::Right)
    }

    /// Parses a declared width attribute.
    ///
    /// # Errors
    /// Returns [`Error::InvalidWidth`] if the text is not a non-negative integer.
    pub fn parse_width(value: &str) -> Result<usize> {
        value.trim().parse().map_err(|_| Error::InvalidWidth {
            value: value.to_string(),
        })
    }

    /// Frames a value into exactly `width` characters.
    ///
    /// Longer values are truncated to their first `width` characters, shorter
    /// values are padded on the justify side.
    #[must_use]
    pub fn encode(&self, value: &str) -> String {
        let mut out = String::with_capacity(self.width);
        self.encode_into(value, &mut out);
        out
    }

    /// Frames a value and appends it to `out`.
    pub fn encode_into(&self, value: &str, out: &mut String) {
        let len = value.chars().count();
        if len >= self.width {
            out.extend(value.chars().take(self.width));
            return;
        }

        let fill = self.width - len;
        match self.justify {
            Justify::Left => {
                out.push_str(value);
                out.extend(std::iter::repeat_n(self.pad, fill));
            }
            Justify::Right => {
                out.extend(std::iter::repeat_n(self.pad, fill));
                out.push_str(value);
            }
        }
    }

    /// Recovers a value from a raw field of `width` characters.
    ///
    /// Surrounding whitespace is trimmed. A non-space pad character is also
    /// stripped from the justify side, keeping one pad character if nothing
    /// else is left (`"0000"` decodes to `"0"`).
    #[must_use]
    pub fn decode<'a>(&self, raw: &'a str) -> &'a str {
        let trimmed = raw.trim();
        if self.pad.is_whitespace() {
            return trimmed;
        }

        let stripped = match self.justify {
            Justify::Left => trimmed.trim_end_matches(self.pad),
            Justify::Right => trimmed.trim_start_matches(self.pad),
        };
        if stripped.is_empty() && !trimmed.is_empty() {
            &trimmed[trimmed.len() - self.pad.len_utf8()..]
        } else {
            stripped
        }
    }
}
