//! Table-driven codec.
//!
//! Runs the compiled codec steps directly over [`Record`] values. Generated
//! `HostEncode`/`HostDecode` implementations follow exactly the same rules,
//! so this is also what the emitted source is tested against.

use ironfw_core::{DecodeCursor, EncodeBuffer, Error, Record, Value};
use ironfw_schema::ir::{CodecStep, ItemType, Property, PropertyKind, Repetition, TypeId};
use ironfw_schema::{Registry, TypeTable, compile};
use tracing::trace;

use crate::error::CodegenError;

/// Encoder/decoder over a compiled type table.
#[derive(Debug, Clone)]
pub struct DynamicCodec {
    table: TypeTable,
}

impl DynamicCodec {
    /// Wraps an already compiled table.
    #[must_use]
    pub fn new(table: TypeTable) -> Self {
        Self { table }
    }

    /// Compiles `root_id` from `registry`.
    #[must_use]
    pub fn compile(registry: &Registry, root_id: &str) -> Self {
        Self::new(compile(registry, root_id))
    }

    /// The underlying type table.
    #[must_use]
    pub fn table(&self) -> &TypeTable {
        &self.table
    }

    /// Name of the root type, if the root was found.
    #[must_use]
    pub fn root_name(&self) -> Option<&str> {
        self.table.root_type().map(|ty| ty.name.as_str())
    }

    /// Encodes `record` as an instance of `type_name`.
    ///
    /// Unset text properties encode as empty fields, unset nested records as
    /// default instances.
    ///
    /// # Errors
    /// Returns `CodegenError::UnknownType` for an unknown type, or
    /// `CodegenError::Value` if a property holds the wrong kind of value.
    pub fn encode(&self, type_name: &str, record: &Record) -> Result<String, CodegenError> {
        let id = self.type_id(type_name)?;
        let mut buffer = EncodeBuffer::new();
        self.encode_type(id, record, &mut buffer)?;
        trace!(type_name, width = buffer.width(), "encoded record");
        Ok(buffer.into_string())
    }

    /// Decodes `text` as an instance of `type_name`.
    ///
    /// # Errors
    /// Returns `CodegenError::UnknownType` for an unknown type.
    pub fn decode(&self, type_name: &str, text: &str) -> Result<Record, CodegenError> {
        let id = self.type_id(type_name)?;
        let mut cursor = DecodeCursor::new(text);
        let record = self.decode_type(id, &mut cursor);
        trace!(
            type_name,
            consumed = cursor.position(),
            remaining = cursor.remaining(),
            "decoded record"
        );
        Ok(record)
    }

    fn type_id(&self, type_name: &str) -> Result<TypeId, CodegenError> {
        self.table
            .find(type_name)
            .ok_or_else(|| CodegenError::unknown_type(type_name))
    }

    fn encode_type(
        &self,
        id: TypeId,
        record: &Record,
        buffer: &mut EncodeBuffer,
    ) -> Result<(), CodegenError> {
        let ty = self.table.get(id);
        for step in &ty.steps {
            match step {
                CodecStep::Field { property, layout } => {
                    let name = &ty.properties[*property].name;
                    buffer.put_field(*layout, record.text(name)?.unwrap_or(""));
                }
                CodecStep::Nested { property } => {
                    let property = &ty.properties[*property];
                    let PropertyKind::Nested { target } = property.kind else {
                        continue;
                    };
                    match record.record(&property.name)? {
                        Some(nested) => self.encode_type(target, nested, buffer)?,
                        None if property.recursive => {}
                        None => self.encode_type(target, &Record::new(), buffer)?,
                    }
                }
                CodecStep::List { property } => {
                    self.encode_list(&ty.properties[*property], record, buffer)?;
                }
                CodecStep::Constant { value, width } => buffer.put_constant(value, *width),
                CodecStep::Padding { width } => buffer.put_padding(*width),
                CodecStep::Unresolved { .. } | CodecStep::ReferenceCycle { .. } => {}
            }
        }
        Ok(())
    }

    fn encode_list(
        &self,
        property: &Property,
        record: &Record,
        buffer: &mut EncodeBuffer,
    ) -> Result<(), CodegenError> {
        let PropertyKind::List { item, repetition } = property.kind else {
            return Ok(());
        };
        let items = record.list(&property.name)?.unwrap_or_default();

        match item {
            ItemType::Text(None) => {}
            ItemType::Text(Some(layout)) => {
                let count = match repetition {
                    Repetition::Dynamic => items.len(),
                    Repetition::Fixed(count) => count,
                };
                for index in 0..count {
                    let text = match items.get(index) {
                        Some(item) => item.as_text().ok_or_else(|| {
                            Error::mismatch(&property.name, "text", item.kind_name())
                        })?,
                        None => "",
                    };
                    buffer.put_field(layout, text);
                }
            }
            ItemType::Record(target) => {
                let count = match repetition {
                    Repetition::Dynamic => items.len(),
                    Repetition::Fixed(count) if property.recursive => count.min(items.len()),
                    Repetition::Fixed(count) => count,
                };
                let empty = Record::new();
                for index in 0..count {
                    let nested = match items.get(index) {
                        Some(item) => item.as_record().ok_or_else(|| {
                            Error::mismatch(&property.name, "record", item.kind_name())
                        })?,
                        None => &empty,
                    };
                    self.encode_type(target, nested, buffer)?;
                }
            }
        }
        Ok(())
    }

    fn decode_type(&self, id: TypeId, cursor: &mut DecodeCursor<'_>) -> Record {
        let ty = self.table.get(id);
        let start = cursor.position();
        let mut record = Record::new();

        for step in &ty.steps {
            match step {
                CodecStep::Field { property, layout } => {
                    if let Some(text) = cursor.take_value(*layout) {
                        record.insert(ty.properties[*property].name.as_str(), text);
                    }
                }
                CodecStep::Nested { property } => {
                    let property = &ty.properties[*property];
                    let PropertyKind::Nested { target } = property.kind else {
                        continue;
                    };
                    if !property.recursive || (cursor.position() > start && !cursor.is_at_end())
                    {
                        let nested = self.decode_type(target, cursor);
                        record.insert(property.name.as_str(), nested);
                    }
                }
                CodecStep::List { property } => {
                    let property = &ty.properties[*property];
                    let items = self.decode_list(property, start, cursor);
                    record.insert(property.name.as_str(), items);
                }
                CodecStep::Constant { width, .. } | CodecStep::Padding { width } => {
                    cursor.skip(*width);
                }
                CodecStep::Unresolved { .. } | CodecStep::ReferenceCycle { .. } => {}
            }
        }
        record
    }

    fn decode_list(
        &self,
        property: &Property,
        start: usize,
        cursor: &mut DecodeCursor<'_>,
    ) -> Vec<Value> {
        let mut items = Vec::new();
        let PropertyKind::List { item, repetition } = property.kind else {
            return items;
        };

        match (item, repetition) {
            (ItemType::Text(None), Repetition::Dynamic) => {}
            (ItemType::Text(None), Repetition::Fixed(count)) => {
                items.resize(count, Value::from(""));
            }
            (ItemType::Text(Some(layout)), Repetition::Dynamic) => {
                while let Some(text) = cursor.take_value(layout) {
                    items.push(Value::from(text));
                }
            }
            (ItemType::Text(Some(layout)), Repetition::Fixed(count)) => {
                for _ in 0..count {
                    items.push(Value::from(cursor.take_value(layout).unwrap_or_default()));
                }
            }
            (ItemType::Record(target), Repetition::Dynamic) => {
                while (!property.recursive || cursor.position() > start) && !cursor.is_at_end() {
                    let before = cursor.position();
                    let item = self.decode_type(target, cursor);
                    if cursor.position() == before {
                        break;
                    }
                    items.push(Value::from(item));
                }
            }
            (ItemType::Record(target), Repetition::Fixed(count)) if property.recursive => {
                for _ in 0..count {
                    if cursor.position() == start || cursor.is_at_end() {
                        break;
                    }
                    items.push(Value::from(self.decode_type(target, cursor)));
                }
            }
            (ItemType::Record(target), Repetition::Fixed(count)) => {
                for _ in 0..count {
                    items.push(Value::from(self.decode_type(target, cursor)));
                }
            }
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironfw_schema::parse_document;
    use pretty_assertions::assert_eq;

    fn codec(xml: &str, root: &str) -> DynamicCodec {
        let registry: Registry = [parse_document("t.xml", xml).unwrap()].into_iter().collect();
        DynamicCodec::compile(&registry, root)
    }

    #[test]
    fn test_scalar_text_and_numeric() {
        let codec = codec(
            r#"<fmtDef id="R"><fString dataName="A"/><delimDecor length="5"/><fString dataName="N"/><numDecor length="4"/></fmtDef>"#,
            "R",
        );
        let record = Record::new().with("A", "AB").with("N", "12");
        let text = codec.encode("R", &record).unwrap();
        assert_eq!(text, "AB   0012");
        assert_eq!(codec.decode("R", &text).unwrap(), record);
    }

    #[test]
    fn test_truncation_and_unset_fields() {
        let codec = codec(
            r#"<fmtDef id="R"><fString dataName="A"/><delimDecor length="3"/><fString dataName="B"/><delimDecor length="2"/></fmtDef>"#,
            "R",
        );
        let text = codec.encode("R", &Record::new().with("A", "ABCDEF")).unwrap();
        assert_eq!(text, "ABC  ");

        let decoded = codec.decode("R", &text).unwrap();
        assert_eq!(decoded.text("A").unwrap(), Some("ABC"));
        assert_eq!(decoded.text("B").unwrap(), Some(""));
    }

    #[test]
    fn test_short_buffer_leaves_field_unset() {
        let codec = codec(
            r#"<fmtDef id="R"><fString dataName="A"/><delimDecor length="3"/><fString dataName="B"/><delimDecor length="4"/></fmtDef>"#,
            "R",
        );
        let decoded = codec.decode("R", "XYZab").unwrap();
        assert_eq!(decoded.text("A").unwrap(), Some("XYZ"));
        assert!(decoded.get("B").is_none());
    }

    #[test]
    fn test_constant_and_padding() {
        let codec = codec(
            r#"<fmtDef id="R"><constant value="HDR"/><delimDecor length="5"/><fixedLength length="2"/><fString dataName="A"/><delimDecor length="1"/></fmtDef>"#,
            "R",
        );
        let text = codec.encode("R", &Record::new().with("A", "Z")).unwrap();
        assert_eq!(text, "HDR    Z");
        let decoded = codec.decode("R", "xxxxxxxQ").unwrap();
        assert_eq!(decoded.text("A").unwrap(), Some("Q"));
    }

    #[test]
    fn test_fixed_list_synthesizes_defaults() {
        let codec = codec(
            r#"<fmtDef id="R"><fCSList dataName="L" times="3"><record><fString dataName="V"/><delimDecor length="2"/></record></fCSList></fmtDef>"#,
            "R",
        );
        let record = Record::new().with(
            "L",
            vec![Value::from(Record::new().with("V", "a"))],
        );
        let text = codec.encode("R", &record).unwrap();
        assert_eq!(text, "a     ");

        let decoded = codec.decode("R", &text).unwrap();
        assert_eq!(decoded.list("L").unwrap().map(<[Value]>::len), Some(3));
    }

    #[test]
    fn test_dynamic_text_list() {
        let codec = codec(
            r#"<fmtDef id="R"><fCSList dataName="Tags" times="*"><delimDecor length="2"/></fCSList></fmtDef>"#,
            "R",
        );
        let record = Record::new().with("Tags", vec![Value::from("a"), Value::from("bc")]);
        let text = codec.encode("R", &record).unwrap();
        assert_eq!(text, "a bc");
        assert_eq!(codec.decode("R", &text).unwrap(), record);
    }

    #[test]
    fn test_zero_width_dynamic_items_terminate() {
        let codec = codec(
            r#"<fmtDef id="R"><fCSList dataName="L" times="*"><record><fString dataName="V"/></record></fCSList></fmtDef>"#,
            "R",
        );
        let decoded = codec.decode("R", "leftover").unwrap();
        assert_eq!(decoded.list("L").unwrap(), Some(&[][..]));
    }

    #[test]
    fn test_recursive_nested_is_optional() {
        let codec = codec(
            r#"<fmtDef id="T"><record dataName="Node"><fString dataName="V"/><delimDecor length="1"/><refFmt refId="T"/></record></fmtDef>"#,
            "T",
        );
        let chain = Record::new().with(
            "Node",
            Record::new()
                .with("V", "a")
                .with("Node", Record::new().with("V", "b")),
        );
        let text = codec.encode("T", &chain).unwrap();
        assert_eq!(text, "ab");
        assert_eq!(codec.decode("T", &text).unwrap(), chain);
    }

    #[test]
    fn test_value_mismatch() {
        let codec = codec(
            r#"<fmtDef id="R"><fString dataName="A"/><delimDecor length="1"/></fmtDef>"#,
            "R",
        );
        let record = Record::new().with("A", Record::new());
        assert!(matches!(
            codec.encode("R", &record),
            Err(CodegenError::Value(Error::ValueMismatch { .. }))
        ));
    }

    #[test]
    fn test_unknown_type() {
        let codec = codec(r#"<fmtDef id="R"/>"#, "R");
        assert_eq!(codec.root_name(), Some("R"));
        assert!(matches!(
            codec.decode("Missing", ""),
            Err(CodegenError::UnknownType { .. })
        ));
    }
}
