//! Error types for IronFW core operations.

use thiserror::Error;

/// Core error type for IronFW operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A dynamic value does not have the shape the field expects.
    #[error("value mismatch for field '{field}': expected {expected}, found {found}")]
    ValueMismatch {
        /// Field (property) name.
        field: String,
        /// Expected value kind.
        expected: &'static str,
        /// Value kind actually found.
        found: &'static str,
    },

    /// A declared width is not a non-negative integer.
    #[error("invalid field width '{value}'")]
    InvalidWidth {
        /// Raw width text.
        value: String,
    },
}

impl Error {
    /// Creates a value mismatch error.
    pub fn mismatch(field: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Self::ValueMismatch {
            field: field.into(),
            expected,
            found,
        }
    }
}

/// Result type alias for IronFW core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_mismatch_display() {
        let err = Error::mismatch("Name", "text", "list");
        let msg = err.to_string();
        assert!(msg.contains("'Name'"));
        assert!(msg.contains("expected text"));
        assert!(msg.contains("found list"));
    }

    #[test]
    fn test_invalid_width_display() {
        let err = Error::InvalidWidth {
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "invalid field width 'abc'");
    }
}
