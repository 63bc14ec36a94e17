//! Code generator driver.
//!
//! Turns a compiled [`TypeTable`] into Rust source: one [`Artifact`] per
//! structural type, a single concatenated source, or a directory of modules.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ironfw_schema::ir::{NameScope, StructuralType, TypeTable};
use tracing::{debug, info};

use crate::error::CodegenError;
use crate::rust::ident::module_name;
use crate::rust::{CodecGenerator, TypeGenerator};

/// Imports every generated unit relies on.
pub const RUNTIME_IMPORTS: &str =
    "use ironfw_core::{DecodeCursor, EncodeBuffer, FieldLayout, HostDecode, HostEncode};\n";

const HEADER: &str = "// Generated by ironfw. Do not edit.\n";

/// Generator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Emit `// Source: <file> line <n>` comments.
    pub include_source_comments: bool,
    /// Derives on generated structs. `Default` is always added.
    pub derives: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            include_source_comments: true,
            derives: ["Debug", "Clone", "Default", "PartialEq", "Eq"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl GeneratorConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables provenance comments.
    #[must_use]
    pub fn with_source_comments(mut self, enabled: bool) -> Self {
        self.include_source_comments = enabled;
        self
    }

    /// Replaces the derive list.
    #[must_use]
    pub fn with_derives<I, S>(mut self, derives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.derives = derives.into_iter().map(Into::into).collect();
        self
    }

    /// Comma-separated derive list, always containing `Default`.
    #[must_use]
    pub fn derive_list(&self) -> String {
        let mut derives = self.derives.clone();
        if !derives.iter().any(|d| d == "Default") {
            derives.push("Default".to_string());
        }
        derives.join(", ")
    }
}

/// Generated source for one structural type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Sanitized type name.
    pub type_name: String,
    /// Property names in declaration order.
    pub properties: Vec<String>,
    /// Struct definition.
    pub definition: String,
    /// `HostEncode` implementation.
    pub encode: String,
    /// `HostDecode` implementation.
    pub decode: String,
}

impl Artifact {
    /// Definition and both codec implementations.
    #[must_use]
    pub fn source(&self) -> String {
        let mut output =
            String::with_capacity(self.definition.len() + self.encode.len() + self.decode.len());
        output.push_str(&self.definition);
        output.push_str(&self.encode);
        output.push_str(&self.decode);
        output
    }
}

/// Rust source generator over a compiled type table.
pub struct Generator<'a> {
    table: &'a TypeTable,
    config: GeneratorConfig,
}

impl<'a> Generator<'a> {
    /// Creates a generator with the default configuration.
    #[must_use]
    pub fn new(table: &'a TypeTable) -> Self {
        Self::with_config(table, GeneratorConfig::default())
    }

    /// Creates a generator with `config`.
    #[must_use]
    pub fn with_config(table: &'a TypeTable, config: GeneratorConfig) -> Self {
        Self { table, config }
    }

    /// Generates one artifact per type, keyed by sanitized type name.
    #[must_use]
    pub fn artifacts(&self) -> BTreeMap<String, Artifact> {
        self.table
            .types()
            .iter()
            .map(|ty| (ty.name.clone(), self.artifact(ty)))
            .collect()
    }

    /// Generates all types as a single source file, in discovery order.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();
        output.push_str(HEADER);
        output.push_str(RUNTIME_IMPORTS);
        output.push('\n');

        for diagnostic in self.table.diagnostics() {
            output.push_str(&format!("// warning: {diagnostic}\n"));
        }
        if !self.table.diagnostics().is_empty() {
            output.push('\n');
        }

        for ty in self.table.types() {
            output.push_str(&self.artifact(ty).source());
        }
        output
    }

    /// Writes one module per type plus a `mod.rs` into `dir`.
    ///
    /// # Errors
    /// Returns `CodegenError::Generation` if the table is empty, or
    /// `CodegenError::Io` if a file cannot be written.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, CodegenError> {
        let dir = dir.as_ref();
        if self.table.is_empty() {
            return Err(CodegenError::generation("no types to generate"));
        }
        std::fs::create_dir_all(dir)?;

        let mut modules = NameScope::new();
        let mut written = Vec::new();
        let mut index = String::from(HEADER);

        for ty in self.table.types() {
            let module = modules.unique(&module_name(&ty.name));
            let path = dir.join(format!("{module}.rs"));

            let mut output = String::from(HEADER);
            output.push_str("#[allow(unused_imports)]\n");
            output.push_str(RUNTIME_IMPORTS);
            output.push_str("#[allow(unused_imports)]\n");
            output.push_str("use super::*;\n\n");
            output.push_str(&self.artifact(ty).source());

            std::fs::write(&path, output)?;
            debug!(type_name = %ty.name, path = %path.display(), "wrote artifact");
            index.push_str(&format!("pub mod {module};\npub use {module}::*;\n"));
            written.push(path);
        }

        let mod_path = dir.join("mod.rs");
        std::fs::write(&mod_path, index)?;
        written.push(mod_path);

        info!(
            dir = %dir.display(),
            types = self.table.len(),
            "generated sources written"
        );
        Ok(written)
    }

    fn artifact(&self, ty: &StructuralType) -> Artifact {
        let types = TypeGenerator::new(self.table, &self.config);
        let codec = CodecGenerator::new(self.table);
        Artifact {
            type_name: ty.name.clone(),
            properties: ty.properties.iter().map(|p| p.name.clone()).collect(),
            definition: types.generate(ty),
            encode: codec.generate_encoder(ty),
            decode: codec.generate_decoder(ty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironfw_schema::{Registry, compile, parse_document};
    use pretty_assertions::assert_eq;

    fn table(xml: &str, root: &str) -> TypeTable {
        let registry: Registry = [parse_document("t.xml", xml).unwrap()].into_iter().collect();
        compile(&registry, root)
    }

    #[test]
    fn test_config_defaults_and_builders() {
        let config = GeneratorConfig::new();
        assert!(config.include_source_comments);
        assert_eq!(config.derive_list(), "Debug, Clone, Default, PartialEq, Eq");

        let config = config.with_source_comments(false).with_derives(["Debug"]);
        assert!(!config.include_source_comments);
        assert_eq!(config.derive_list(), "Debug, Default");
    }

    #[test]
    fn test_generate_flat_type_golden() {
        let table = table(
            r#"<fmtDef id="Cust"><fString dataName="Name"/><delimDecor length="5"/><fString dataName="Age"/><numDecor length="3"/><constant value="X"/><delimDecor length="2"/></fmtDef>"#,
            "Cust",
        );
        let config = GeneratorConfig::new().with_source_comments(false);
        let artifacts = Generator::with_config(&table, config).artifacts();
        let artifact = &artifacts["Cust"];

        assert_eq!(artifact.properties, vec!["Name", "Age"]);
        assert_eq!(
            artifact.source(),
            "/// Cust record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(non_snake_case)]
pub struct Cust {
    pub Name: Option<String>,
    pub Age: Option<String>,
}

impl HostEncode for Cust {
    fn encode_into(&self, buffer: &mut EncodeBuffer) {
        buffer.put_field(FieldLayout::text(5), self.Name.as_deref().unwrap_or(\"\"));
        buffer.put_field(FieldLayout::numeric(3), self.Age.as_deref().unwrap_or(\"\"));
        buffer.put_constant(\"X\", 2);
    }
}

impl HostDecode for Cust {
    fn decode_from(cursor: &mut DecodeCursor<'_>) -> Self {
        let mut value = Self::default();
        value.Name = cursor.take_value(FieldLayout::text(5)).map(str::to_string);
        value.Age = cursor.take_value(FieldLayout::numeric(3)).map(str::to_string);
        cursor.skip(2);
        value
    }
}

"
        );
    }

    #[test]
    fn test_generate_includes_source_comments() {
        let table = table(
            "<fmtDef id=\"R\">\n<fString dataName=\"A\"/><delimDecor length=\"1\"/></fmtDef>",
            "R",
        );
        let source = Generator::new(&table).generate();
        assert!(source.starts_with(HEADER));
        assert!(source.contains("// Source: t.xml line 1\n/// R record."));
        assert!(source.contains("    // Source: t.xml line 2\n    pub A: Option<String>,"));
    }

    #[test]
    fn test_generate_recursive_and_list_shapes() {
        let table = table(
            r#"<kColl>
                <fmtDef id="T"><record dataName="Node">
                    <fString dataName="V"/><delimDecor length="1"/>
                    <refFmt refId="T"/>
                    <fCSList dataName="Kids" times="2"><refFmt refId="KID"/></fCSList>
                    <fCSList dataName="Tags" times="*"><delimDecor length="3"/></fCSList>
                </record></fmtDef>
                <fmtDef id="KID"><fString dataName="K"/><delimDecor length="1"/></fmtDef>
            </kColl>"#,
            "T",
        );
        let source = Generator::new(&table).generate();
        assert!(source.contains("pub Node: Option<Box<Node>>,"));
        assert!(source.contains("pub Kids: Vec<KidsItem>,"));
        assert!(source.contains("pub Tags: Vec<String>,"));
        assert!(source.contains("let start = cursor.position();"));
        assert!(source.contains("if cursor.position() > start && !cursor.is_at_end() {"));
        assert!(source.contains("None => KidsItem::default().encode_into(buffer),"));
        assert!(source.contains("while let Some(item) = cursor.take_value(FieldLayout::text(3)) {"));
    }

    #[test]
    fn test_generate_reports_unresolved_reference() {
        let table = table(r#"<fmtDef id="R"><refFmt refId="GONE"/></fmtDef>"#, "R");
        let source = Generator::new(&table).generate();
        assert!(source.contains("// warning: t.xml line 1: unresolved reference 'GONE' in type 'R'"));
        assert!(source.contains("        // unresolved reference 'GONE'\n"));
        assert!(source.contains("fn encode_into(&self, _buffer: &mut EncodeBuffer) {"));
    }

    #[test]
    fn test_write_to_dir() {
        let table = table(
            r#"<fmtDef id="Root"><record dataName="CustomerInfo"><fString dataName="A"/><delimDecor length="1"/></record></fmtDef>"#,
            "Root",
        );
        let dir = tempfile::tempdir().unwrap();
        let written = Generator::new(&table).write_to_dir(dir.path()).unwrap();

        assert_eq!(written.len(), 3);
        let index = std::fs::read_to_string(dir.path().join("mod.rs")).unwrap();
        assert!(index.contains("pub mod root;\npub use root::*;\n"));
        assert!(index.contains("pub mod customer_info;\n"));

        let unit = std::fs::read_to_string(dir.path().join("customer_info.rs")).unwrap();
        assert!(unit.contains(RUNTIME_IMPORTS));
        assert!(unit.contains("pub struct CustomerInfo {"));
        assert!(unit.contains("impl HostDecode for CustomerInfo {"));
    }

    #[test]
    fn test_write_to_dir_empty_table_is_error() {
        let table = TypeTable::new();
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Generator::new(&table).write_to_dir(dir.path()),
            Err(CodegenError::Generation { .. })
        ));
    }
}
