//! Error types for code generation.

use thiserror::Error;

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Schema parsing error.
    #[error("schema parse error: {0}")]
    Parse(#[from] ironfw_schema::ParseError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Code generation error.
    #[error("generation error: {message}")]
    Generation {
        /// Error message.
        message: String,
    },

    /// Unknown structural type.
    #[error("unknown type '{type_name}'")]
    UnknownType {
        /// Type name.
        type_name: String,
    },

    /// Value does not fit the compiled type.
    #[error("value error: {0}")]
    Value(#[from] ironfw_core::Error),
}

impl CodegenError {
    /// Creates a generation error with the given message.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Creates an unknown type error.
    pub fn unknown_type(type_name: impl Into<String>) -> Self {
        Self::UnknownType {
            type_name: type_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            CodegenError::generation("empty").to_string(),
            "generation error: empty"
        );
        assert_eq!(
            CodegenError::unknown_type("Foo").to_string(),
            "unknown type 'Foo'"
        );
        let value: CodegenError = ironfw_core::Error::mismatch("A", "text", "list").into();
        assert!(value.to_string().starts_with("value error:"));
    }
}
