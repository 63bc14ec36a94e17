//! Record struct code generation.

use ironfw_schema::ir::{ItemType, Property, PropertyKind, StructuralType, TypeId, TypeTable};

use crate::generator::GeneratorConfig;
use crate::rust::ident::{TypeIdents, field_idents};

/// Generator for record struct definitions.
pub struct TypeGenerator<'a> {
    table: &'a TypeTable,
    config: &'a GeneratorConfig,
    types: TypeIdents,
}

impl<'a> TypeGenerator<'a> {
    /// Creates a new type generator.
    #[must_use]
    pub fn new(table: &'a TypeTable, config: &'a GeneratorConfig) -> Self {
        Self {
            table,
            config,
            types: TypeIdents::new(table),
        }
    }

    /// Generates the struct definition of one type.
    #[must_use]
    pub fn generate(&self, ty: &StructuralType) -> String {
        let mut output = String::new();

        if self.config.include_source_comments {
            output.push_str(&format!("// Source: {}\n", ty.provenance));
        }
        output.push_str(&format!("/// {} record.\n", ty.name));
        output.push_str(&format!("#[derive({})]\n", self.config.derive_list()));
        output.push_str("#[allow(non_snake_case)]\n");

        let name = self.types.get(&ty.name);
        if ty.properties.is_empty() {
            output.push_str(&format!("pub struct {name} {{}}\n\n"));
            return output;
        }

        output.push_str(&format!("pub struct {name} {{\n"));
        for (property, field) in ty.properties.iter().zip(field_idents(ty)) {
            if self.config.include_source_comments {
                output.push_str(&format!("    // Source: {}\n", property.provenance));
            }
            output.push_str(&format!(
                "    pub {field}: {},\n",
                self.field_type(property)
            ));
        }
        output.push_str("}\n\n");

        output
    }

    /// Rust type of a property.
    #[must_use]
    pub fn field_type(&self, property: &Property) -> String {
        match property.kind {
            PropertyKind::Text { .. } => "Option<String>".to_string(),
            PropertyKind::Nested { target } if property.recursive => {
                format!("Option<Box<{}>>", self.type_name(target))
            }
            PropertyKind::Nested { target } => self.type_name(target),
            PropertyKind::List { item, .. } => match item {
                ItemType::Record(target) => format!("Vec<{}>", self.type_name(target)),
                ItemType::Text(_) => "Vec<String>".to_string(),
            },
        }
    }

    /// Rust identifier of a compiled type.
    #[must_use]
    pub fn type_name(&self, id: TypeId) -> String {
        self.types.get(&self.table.get(id).name)
    }
}
