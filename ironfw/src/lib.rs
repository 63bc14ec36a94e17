//! # IronFW
//!
//! Fixed-width host record codecs generated from XML format schemas.
//!
//! Host systems describe positional text records with XML format fragments
//! spread over many documents. IronFW loads those documents into one registry,
//! compiles a root fragment into structural types and emits Rust structs with
//! matching `HostEncode`/`HostDecode` implementations.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ironfw::prelude::*;
//!
//! let report = load_dir("schemas")?;
//! let table = compile(&report.registry, "CustomerRecord");
//! let source = Generator::new(&table).generate();
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Field layouts, encode/decode traits, dynamic values
//! - [`schema`] - XML parsing, registry, structural type compiler
//! - [`codegen`] - Rust code generation and the table-driven codec

pub mod prelude;

/// Runtime types used by generated code.
pub mod core {
    pub use ironfw_core::*;
}

/// Schema parsing, registry and compilation.
pub mod schema {
    pub use ironfw_schema::*;
}

/// Code generation from compiled schemas.
pub mod codegen {
    pub use ironfw_codegen::*;
}

pub use ironfw_codegen::{DynamicCodec, Generator, GeneratorConfig};
pub use ironfw_core::{DecodeCursor, EncodeBuffer, FieldLayout, HostDecode, HostEncode};
