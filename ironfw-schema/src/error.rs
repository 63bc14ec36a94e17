//! Error types for schema ingestion.

use thiserror::Error;

/// Error type for schema document parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An end tag without a matching start tag, or a start tag never closed.
    #[error("unbalanced element '{element}' in '{source_name}' at line {line}")]
    UnbalancedElement {
        /// Document name.
        source_name: String,
        /// Element name.
        element: String,
        /// 1-based line.
        line: usize,
    },

    /// The document holds no root element.
    #[error("document '{source_name}' contains no elements")]
    EmptyDocument {
        /// Document name.
        source_name: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

impl ParseError {
    /// Creates an unbalanced element error.
    pub fn unbalanced(
        source_name: impl Into<String>,
        element: impl Into<String>,
        line: usize,
    ) -> Self {
        Self::UnbalancedElement {
            source_name: source_name.into(),
            element: element.into(),
            line,
        }
    }

    /// Creates an empty document error.
    pub fn empty(source_name: impl Into<String>) -> Self {
        Self::EmptyDocument {
            source_name: source_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbalanced_display() {
        let err = ParseError::unbalanced("a.xml", "record", 7);
        assert_eq!(
            err.to_string(),
            "unbalanced element 'record' in 'a.xml' at line 7"
        );
    }

    #[test]
    fn test_empty_display() {
        let err = ParseError::empty("b.xml");
        assert!(err.to_string().contains("'b.xml'"));
    }
}
