//! Prelude module for convenient imports.
//!
//! ```ignore
//! use ironfw::prelude::*;
//! ```

// Runtime
pub use ironfw_core::error::{Error as CoreError, Result as CoreResult};
pub use ironfw_core::{
    DecodeCursor, EncodeBuffer, FieldLayout, HostDecode, HostEncode, Justify, Record, Value,
};

// Schema
pub use ironfw_schema::{
    Diagnostic, LoadReport, ParseError, Registry, SchemaNode, TypeTable, audit_references,
    compile, load_dir, parse_document, parse_file,
};

// Codegen
pub use ironfw_codegen::{Artifact, CodegenError, DynamicCodec, Generator, GeneratorConfig};
