//! # IronFW Schema
//!
//! Host format XML schema model, registry and structural type compiler.
//!
//! This crate provides:
//! - XML document parsing into schema node trees
//! - A registry merging documents into one identifier index
//! - Field width and justification resolution
//! - Compilation of a root fragment into structural types and codec steps
//! - A reference audit over the whole registry

pub mod compiler;
pub mod error;
pub mod ir;
pub mod layout;
pub mod loader;
pub mod node;
pub mod parser;
pub mod registry;
pub mod validation;

pub use compiler::compile;
pub use error::ParseError;
pub use ir::{
    CodecStep, Diagnostic, ItemType, Property, PropertyKind, Repetition, StructuralType, TypeId,
    TypeTable,
};
pub use loader::{LoadReport, load_dir};
pub use node::{NodeKind, NodePath, Provenance, ScalarKind, SchemaNode};
pub use parser::{ParsedDocument, parse_document, parse_file};
pub use registry::{Override, Registry};
pub use validation::{ReferenceAudit, audit_references};
