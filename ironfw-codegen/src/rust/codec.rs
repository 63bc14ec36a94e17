//! Encoder/decoder code generation.
//!
//! Both routines walk the type's codec steps in order, so the encoder and the
//! decoder of a type always agree on layout.

use ironfw_core::layout::{FieldLayout, Justify};
use ironfw_schema::ir::{
    CodecStep, ItemType, Property, PropertyKind, Repetition, StructuralType, TypeId, TypeTable,
};

use crate::rust::ident::{TypeIdents, field_idents};

/// Generator for `HostEncode` / `HostDecode` implementations.
pub struct CodecGenerator<'a> {
    table: &'a TypeTable,
    types: TypeIdents,
}

impl<'a> CodecGenerator<'a> {
    /// Creates a new codec generator.
    #[must_use]
    pub fn new(table: &'a TypeTable) -> Self {
        Self {
            table,
            types: TypeIdents::new(table),
        }
    }

    /// Generates the `HostEncode` implementation of one type.
    #[must_use]
    pub fn generate_encoder(&self, ty: &StructuralType) -> String {
        let mut output = String::new();
        let name = self.types.get(&ty.name);

        output.push_str(&format!("impl HostEncode for {name} {{\n"));
        if ty.steps.is_empty() {
            output.push_str("    fn encode_into(&self, _buffer: &mut EncodeBuffer) {}\n");
            output.push_str("}\n\n");
            return output;
        }

        let buffer = if ty.steps.iter().any(|step| touches_wire(ty, step)) {
            "buffer"
        } else {
            "_buffer"
        };
        output.push_str(&format!(
            "    fn encode_into(&self, {buffer}: &mut EncodeBuffer) {{\n"
        ));
        let fields = field_idents(ty);
        for step in &ty.steps {
            output.push_str(&self.encode_step(ty, &fields, step));
        }
        output.push_str("    }\n");
        output.push_str("}\n\n");

        output
    }

    /// Generates the `HostDecode` implementation of one type.
    #[must_use]
    pub fn generate_decoder(&self, ty: &StructuralType) -> String {
        let mut output = String::new();
        let name = self.types.get(&ty.name);

        output.push_str(&format!("impl HostDecode for {name} {{\n"));
        if ty.steps.is_empty() {
            output.push_str("    fn decode_from(_cursor: &mut DecodeCursor<'_>) -> Self {\n");
            output.push_str("        Self::default()\n");
            output.push_str("    }\n");
            output.push_str("}\n\n");
            return output;
        }

        let cursor = if ty.steps.iter().any(|step| touches_wire(ty, step)) {
            "cursor"
        } else {
            "_cursor"
        };
        output.push_str(&format!(
            "    fn decode_from({cursor}: &mut DecodeCursor<'_>) -> Self {{\n"
        ));
        if ty.properties.iter().any(|p| p.recursive) {
            output.push_str("        let start = cursor.position();\n");
        }
        if ty.steps.iter().any(|step| assigns_value(ty, step)) {
            output.push_str("        let mut value = Self::default();\n");
        } else {
            output.push_str("        let value = Self::default();\n");
        }
        let fields = field_idents(ty);
        for step in &ty.steps {
            output.push_str(&self.decode_step(ty, &fields, step));
        }
        output.push_str("        value\n");
        output.push_str("    }\n");
        output.push_str("}\n\n");

        output
    }

    fn encode_step(&self, ty: &StructuralType, fields: &[String], step: &CodecStep) -> String {
        let mut output = String::new();
        match step {
            CodecStep::Field { property, layout } => {
                let field = &fields[*property];
                output.push_str(&format!(
                    "        buffer.put_field({}, self.{field}.as_deref().unwrap_or(\"\"));\n",
                    layout_expr(*layout)
                ));
            }
            CodecStep::Nested { property: index } => {
                let property = &ty.properties[*index];
                let field = &fields[*index];
                if property.recursive {
                    output.push_str(&format!(
                        "        if let Some(nested) = &self.{field} {{\n\
                         \x20           nested.encode_into(buffer);\n\
                         \x20       }}\n"
                    ));
                } else {
                    output.push_str(&format!("        self.{field}.encode_into(buffer);\n"));
                }
            }
            CodecStep::List { property } => {
                output.push_str(&self.encode_list(&ty.properties[*property], &fields[*property]));
            }
            CodecStep::Constant { value, width } => {
                output.push_str(&format!(
                    "        buffer.put_constant({value:?}, {width});\n"
                ));
            }
            CodecStep::Padding { width } => {
                output.push_str(&format!("        buffer.put_padding({width});\n"));
            }
            CodecStep::Unresolved { reference } => {
                output.push_str(&format!(
                    "        // unresolved reference '{reference}'\n"
                ));
            }
            CodecStep::ReferenceCycle { reference } => {
                output.push_str(&format!(
                    "        // reference cycle through '{reference}'\n"
                ));
            }
        }
        output
    }

    fn encode_list(&self, property: &Property, field: &str) -> String {
        let mut output = String::new();
        let PropertyKind::List { item, repetition } = property.kind else {
            return output;
        };

        match (item, repetition) {
            (ItemType::Text(None), _) => {
                output.push_str(&format!("        // {}: items without declared width\n", property.name));
            }
            (ItemType::Record(_), Repetition::Dynamic) => {
                output.push_str(&format!(
                    "        for item in &self.{field} {{\n\
                     \x20           item.encode_into(buffer);\n\
                     \x20       }}\n"
                ));
            }
            (ItemType::Record(_), Repetition::Fixed(count)) if property.recursive => {
                output.push_str(&format!(
                    "        for item in self.{field}.iter().take({count}) {{\n\
                     \x20           item.encode_into(buffer);\n\
                     \x20       }}\n"
                ));
            }
            (ItemType::Record(target), Repetition::Fixed(count)) => {
                let item_type = self.type_name(target);
                output.push_str(&format!(
                    "        for index in 0..{count} {{\n\
                     \x20           match self.{field}.get(index) {{\n\
                     \x20               Some(item) => item.encode_into(buffer),\n\
                     \x20               None => {item_type}::default().encode_into(buffer),\n\
                     \x20           }}\n\
                     \x20       }}\n"
                ));
            }
            (ItemType::Text(Some(layout)), Repetition::Dynamic) => {
                output.push_str(&format!(
                    "        for item in &self.{field} {{\n\
                     \x20           buffer.put_field({}, item);\n\
                     \x20       }}\n",
                    layout_expr(layout)
                ));
            }
            (ItemType::Text(Some(layout)), Repetition::Fixed(count)) => {
                output.push_str(&format!(
                    "        for index in 0..{count} {{\n\
                     \x20           buffer.put_field({}, self.{field}.get(index).map_or(\"\", String::as_str));\n\
                     \x20       }}\n",
                    layout_expr(layout)
                ));
            }
        }
        output
    }

    fn decode_step(&self, ty: &StructuralType, fields: &[String], step: &CodecStep) -> String {
        let mut output = String::new();
        match step {
            CodecStep::Field { property, layout } => {
                let field = &fields[*property];
                output.push_str(&format!(
                    "        value.{field} = cursor.take_value({}).map(str::to_string);\n",
                    layout_expr(*layout)
                ));
            }
            CodecStep::Nested { property: index } => {
                let property = &ty.properties[*index];
                let field = &fields[*index];
                let PropertyKind::Nested { target } = property.kind else {
                    return output;
                };
                let target = self.type_name(target);
                if property.recursive {
                    output.push_str(&format!(
                        "        if cursor.position() > start && !cursor.is_at_end() {{\n\
                         \x20           value.{field} = Some(Box::new({target}::decode_from(cursor)));\n\
                         \x20       }}\n"
                    ));
                } else {
                    output.push_str(&format!(
                        "        value.{field} = {target}::decode_from(cursor);\n"
                    ));
                }
            }
            CodecStep::List { property } => {
                output.push_str(&self.decode_list(&ty.properties[*property], &fields[*property]));
            }
            CodecStep::Constant { width, .. } | CodecStep::Padding { width } => {
                output.push_str(&format!("        cursor.skip({width});\n"));
            }
            CodecStep::Unresolved { reference } => {
                output.push_str(&format!(
                    "        // unresolved reference '{reference}'\n"
                ));
            }
            CodecStep::ReferenceCycle { reference } => {
                output.push_str(&format!(
                    "        // reference cycle through '{reference}'\n"
                ));
            }
        }
        output
    }

    fn decode_list(&self, property: &Property, field: &str) -> String {
        let mut output = String::new();
        let PropertyKind::List { item, repetition } = property.kind else {
            return output;
        };

        match (item, repetition) {
            (ItemType::Text(None), Repetition::Dynamic) => {
                output.push_str(&format!("        // {}: items without declared width\n", property.name));
            }
            (ItemType::Text(None), Repetition::Fixed(count)) => {
                output.push_str(&format!(
                    "        value.{field} = vec![String::new(); {count}];\n"
                ));
            }
            (ItemType::Text(Some(layout)), Repetition::Dynamic) => {
                output.push_str(&format!(
                    "        while let Some(item) = cursor.take_value({}) {{\n\
                     \x20           value.{field}.push(item.to_string());\n\
                     \x20       }}\n",
                    layout_expr(layout)
                ));
            }
            (ItemType::Text(Some(layout)), Repetition::Fixed(count)) => {
                output.push_str(&format!(
                    "        for _ in 0..{count} {{\n\
                     \x20           value.{field}.push(cursor.take_value({}).unwrap_or_default().to_string());\n\
                     \x20       }}\n",
                    layout_expr(layout)
                ));
            }
            (ItemType::Record(target), Repetition::Dynamic) => {
                let item_type = self.type_name(target);
                let guard = if property.recursive {
                    "cursor.position() > start && !cursor.is_at_end()"
                } else {
                    "!cursor.is_at_end()"
                };
                output.push_str(&format!(
                    "        while {guard} {{\n\
                     \x20           let before = cursor.position();\n\
                     \x20           let item = {item_type}::decode_from(cursor);\n\
                     \x20           if cursor.position() == before {{\n\
                     \x20               break;\n\
                     \x20           }}\n\
                     \x20           value.{field}.push(item);\n\
                     \x20       }}\n"
                ));
            }
            (ItemType::Record(target), Repetition::Fixed(count)) if property.recursive => {
                let item_type = self.type_name(target);
                output.push_str(&format!(
                    "        for _ in 0..{count} {{\n\
                     \x20           if cursor.position() == start || cursor.is_at_end() {{\n\
                     \x20               break;\n\
                     \x20           }}\n\
                     \x20           value.{field}.push({item_type}::decode_from(cursor));\n\
                     \x20       }}\n"
                ));
            }
            (ItemType::Record(target), Repetition::Fixed(count)) => {
                let item_type = self.type_name(target);
                output.push_str(&format!(
                    "        for _ in 0..{count} {{\n\
                     \x20           value.{field}.push({item_type}::decode_from(cursor));\n\
                     \x20       }}\n"
                ));
            }
        }
        output
    }

    fn type_name(&self, id: TypeId) -> String {
        self.types.get(&self.table.get(id).name)
    }
}

/// Item shape of a list step.
fn list_shape(ty: &StructuralType, step: &CodecStep) -> Option<(ItemType, Repetition)> {
    let CodecStep::List { property } = step else {
        return None;
    };
    match ty.properties[*property].kind {
        PropertyKind::List { item, repetition } => Some((item, repetition)),
        _ => None,
    }
}

/// Whether the step reads or writes wire bytes. Markers and lists of
/// width-less text items only leave a comment or a constant default.
fn touches_wire(ty: &StructuralType, step: &CodecStep) -> bool {
    match step {
        CodecStep::Unresolved { .. } | CodecStep::ReferenceCycle { .. } => false,
        CodecStep::List { .. } => !matches!(list_shape(ty, step), Some((ItemType::Text(None), _))),
        _ => true,
    }
}

/// Whether the decoder of the step assigns to a field of `value`.
fn assigns_value(ty: &StructuralType, step: &CodecStep) -> bool {
    match step {
        CodecStep::Field { .. } | CodecStep::Nested { .. } => true,
        CodecStep::List { .. } => !matches!(
            list_shape(ty, step),
            Some((ItemType::Text(None), Repetition::Dynamic))
        ),
        _ => false,
    }
}

/// Rust expression constructing `layout`.
#[must_use]
pub fn layout_expr(layout: FieldLayout) -> String {
    if layout == FieldLayout::text(layout.width) {
        format!("FieldLayout::text({})", layout.width)
    } else if layout == FieldLayout::numeric(layout.width) {
        format!("FieldLayout::numeric({})", layout.width)
    } else {
        let justify = match layout.justify {
            Justify::Left => "Left",
            Justify::Right => "Right",
        };
        format!(
            "FieldLayout::new({}, {:?}, ironfw_core::Justify::{justify})",
            layout.width, layout.pad
        )
    }
}
