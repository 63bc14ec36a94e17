//! # IronFW Codegen
//!
//! Code generation from host format XML schemas.
//!
//! This crate provides:
//! - Rust struct generation for compiled structural types
//! - `HostEncode`/`HostDecode` implementation generation
//! - A table-driven codec with the same semantics as the generated code
//! - Writing generated modules to disk

pub mod dynamic;
pub mod error;
pub mod generator;
pub mod rust;

use std::collections::BTreeMap;
use std::path::Path;

use ironfw_schema::{Registry, TypeTable};

pub use dynamic::DynamicCodec;
pub use error::CodegenError;
pub use generator::{Artifact, Generator, GeneratorConfig};

/// Compiles `root_id` and generates one artifact per structural type.
///
/// An unknown root yields an empty map.
#[must_use]
pub fn compile(registry: &Registry, root_id: &str) -> BTreeMap<String, Artifact> {
    let table = ironfw_schema::compile(registry, root_id);
    Generator::new(&table).artifacts()
}

/// Generates Rust code for `root_id` from a single XML document.
///
/// # Errors
/// Returns `CodegenError` if parsing fails or the root is not defined.
pub fn generate_from_xml(xml: &str, root_id: &str) -> Result<String, CodegenError> {
    let document = ironfw_schema::parse_document("<input>", xml)?;
    let registry: Registry = std::iter::once(document).collect();
    generate(&registry, root_id)
}

/// Generates Rust code for `root_id` from every schema in `dir`.
///
/// Documents that fail to parse are skipped, as the loader does.
///
/// # Errors
/// Returns `CodegenError` if the directory cannot be read or the root is not
/// defined by any loaded document.
pub fn generate_from_dir(dir: &Path, root_id: &str) -> Result<String, CodegenError> {
    let report = ironfw_schema::load_dir(dir)?;
    generate(&report.registry, root_id)
}

fn generate(registry: &Registry, root_id: &str) -> Result<String, CodegenError> {
    let table = compiled_root(registry, root_id)?;
    Ok(Generator::new(&table).generate())
}

fn compiled_root(registry: &Registry, root_id: &str) -> Result<TypeTable, CodegenError> {
    let table = ironfw_schema::compile(registry, root_id);
    if table.root().is_none() {
        return Err(CodegenError::generation(format!(
            "root '{root_id}' not found"
        )));
    }
    Ok(table)
}
