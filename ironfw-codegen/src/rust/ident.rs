//! Rust identifier hygiene for generated code.

use std::collections::HashMap;

use ironfw_schema::ir::{NameScope, StructuralType, TypeTable, to_snake_case};

const KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
];

// Cannot be written as raw identifiers.
const NON_RAW: &[&str] = &["crate", "self", "Self", "super", "_"];

// Names the generated code refers to unqualified.
const RESERVED_TYPES: &[&str] = &[
    "Option",
    "Some",
    "None",
    "String",
    "Vec",
    "Box",
    "Default",
    "FieldLayout",
    "Justify",
    "EncodeBuffer",
    "DecodeCursor",
    "HostEncode",
    "HostDecode",
];

fn clean(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Field identifiers of every property of `ty`, in property order.
///
/// Distinct property names that clean to the same identifier get `_2`, `_3`,
/// ... suffixes so the generated struct never repeats a field.
#[must_use]
pub fn field_idents(ty: &StructuralType) -> Vec<String> {
    let mut scope = NameScope::new();
    ty.properties
        .iter()
        .map(|property| {
            let mut ident = clean(&property.name);
            if NON_RAW.contains(&ident.as_str()) {
                ident.push('_');
            }
            let ident = scope.unique(&ident);
            if KEYWORDS.contains(&ident.as_str()) {
                format!("r#{ident}")
            } else {
                ident
            }
        })
        .collect()
}

/// Type identifier for a structural type name.
#[must_use]
pub fn type_ident(name: &str) -> String {
    let ident = clean(name);
    if KEYWORDS.contains(&ident.as_str()) || RESERVED_TYPES.contains(&ident.as_str()) {
        format!("{ident}_")
    } else {
        ident
    }
}

/// Collision-free type identifiers for all types of a table.
#[derive(Debug, Clone, Default)]
pub struct TypeIdents {
    idents: HashMap<String, String>,
}

impl TypeIdents {
    /// Assigns identifiers in discovery order; later clashes get suffixes.
    #[must_use]
    pub fn new(table: &TypeTable) -> Self {
        let mut scope = NameScope::new();
        let idents = table
            .types()
            .iter()
            .map(|ty| (ty.name.clone(), scope.unique(&type_ident(&ty.name))))
            .collect();
        Self { idents }
    }

    /// Identifier of the type named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> String {
        self.idents
            .get(name)
            .cloned()
            .unwrap_or_else(|| type_ident(name))
    }
}

/// Module (file stem) name for a structural type name.
#[must_use]
pub fn module_name(name: &str) -> String {
    let module = to_snake_case(&clean(name));
    if KEYWORDS.contains(&module.as_str()) {
        format!("{module}_")
    } else {
        module
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironfw_schema::ir::{Property, PropertyKind};
    use ironfw_schema::node::Provenance;
    use ironfw_schema::{Registry, compile, parse_document};

    #[test]
    fn test_field_idents_never_repeat() {
        let mut ty = StructuralType::new("T", Provenance::new("t.xml", 1));
        for name in ["Name", "a b/c", "a_b_c", "type", "type", "self", "self_"] {
            ty.properties.push(Property {
                name: name.to_string(),
                kind: PropertyKind::Text { layout: None },
                recursive: false,
                provenance: Provenance::new("t.xml", 1),
            });
        }
        assert_eq!(
            field_idents(&ty),
            vec!["Name", "a_b_c", "a_b_c_2", "r#type", "type_2", "self_", "self__2"]
        );
    }

    #[test]
    fn test_type_idents_never_repeat() {
        let xml = r#"<fmtDef id="Order"><record dataName="String"/><record dataName="String_"/></fmtDef>"#;
        let registry: Registry = [parse_document("t.xml", xml).unwrap()].into_iter().collect();
        let table = compile(&registry, "Order");
        let idents = TypeIdents::new(&table);
        assert_eq!(idents.get("Order"), "Order");
        assert_eq!(idents.get("String"), "String_");
        assert_eq!(idents.get("String_"), "String__2");
        assert_eq!(idents.get("Missing"), "Missing");
    }

    #[test]
    fn test_type_ident() {
        assert_eq!(type_ident("Customer"), "Customer");
        assert_eq!(type_ident("String"), "String_");
        assert_eq!(type_ident("Self"), "Self_");
        assert_eq!(type_ident("_9lives"), "_9lives");
    }

    #[test]
    fn test_module_name() {
        assert_eq!(module_name("CustomerInfo"), "customer_info");
        assert_eq!(module_name("Mod"), "mod_");
        assert_eq!(module_name("LinesItem"), "lines_item");
    }
}
