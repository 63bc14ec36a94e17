// Generated by ironfw. Do not edit.
use ironfw_core::{DecodeCursor, EncodeBuffer, FieldLayout, HostDecode, HostEncode};

/// Customer record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(non_snake_case)]
pub struct Customer {
    pub Name: Option<String>,
    pub Age: Option<String>,
    pub Phones: Vec<PhonesItem>,
    pub Notes: Vec<String>,
}

impl HostEncode for Customer {
    fn encode_into(&self, buffer: &mut EncodeBuffer) {
        buffer.put_constant("CU", 2);
        buffer.put_field(FieldLayout::text(8), self.Name.as_deref().unwrap_or(""));
        buffer.put_field(FieldLayout::numeric(3), self.Age.as_deref().unwrap_or(""));
        for index in 0..2 {
            match self.Phones.get(index) {
                Some(item) => item.encode_into(buffer),
                None => PhonesItem::default().encode_into(buffer),
            }
        }
        buffer.put_padding(1);
        for item in &self.Notes {
            buffer.put_field(FieldLayout::text(4), item);
        }
    }
}

impl HostDecode for Customer {
    fn decode_from(cursor: &mut DecodeCursor<'_>) -> Self {
        let mut value = Self::default();
        cursor.skip(2);
        value.Name = cursor.take_value(FieldLayout::text(8)).map(str::to_string);
        value.Age = cursor.take_value(FieldLayout::numeric(3)).map(str::to_string);
        for _ in 0..2 {
            value.Phones.push(PhonesItem::decode_from(cursor));
        }
        cursor.skip(1);
        while let Some(item) = cursor.take_value(FieldLayout::text(4)) {
            value.Notes.push(item.to_string());
        }
        value
    }
}

/// PhonesItem record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(non_snake_case)]
pub struct PhonesItem {
    pub Number: Option<String>,
}

impl HostEncode for PhonesItem {
    fn encode_into(&self, buffer: &mut EncodeBuffer) {
        buffer.put_field(FieldLayout::text(5), self.Number.as_deref().unwrap_or(""));
    }
}

impl HostDecode for PhonesItem {
    fn decode_from(cursor: &mut DecodeCursor<'_>) -> Self {
        let mut value = Self::default();
        value.Number = cursor.take_value(FieldLayout::text(5)).map(str::to_string);
        value
    }
}

