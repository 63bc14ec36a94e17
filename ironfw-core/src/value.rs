//! Dynamic record values.
//!
//! Generated code works with concrete structs. Tools that drive a codec
//! straight from a compiled type table use [`Record`] and [`Value`] instead.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// A dynamically typed property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Text value.
    Text(String),
    /// Nested record.
    Record(Record),
    /// Ordered list of items.
    List(Vec<Value>),
}

impl Value {
    /// Returns a short name for the value kind, used in error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Record(_) => "record",
            Self::List(_) => "list",
        }
    }

    /// Returns the text if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the record if this is a record value.
    #[must_use]
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Returns the items if this is a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

/// A record: property name to value. Unset properties are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a property, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Returns a property value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns a text property.
    ///
    /// # Errors
    /// Returns [`Error::ValueMismatch`] if the property is set to a non-text value.
    pub fn text(&self, name: &str) -> Result<Option<&str>> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(Value::Text(s)) => Ok(Some(s)),
            Some(other) => Err(Error::mismatch(name, "text", other.kind_name())),
        }
    }

    /// Returns a nested record property.
    ///
    /// # Errors
    /// Returns [`Error::ValueMismatch`] if the property is set to a non-record value.
    pub fn record(&self, name: &str) -> Result<Option<&Record>> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(Value::Record(r)) => Ok(Some(r)),
            Some(other) => Err(Error::mismatch(name, "record", other.kind_name())),
        }
    }

    /// Returns a list property.
    ///
    /// # Errors
    /// Returns [`Error::ValueMismatch`] if the property is set to a non-list value.
    pub fn list(&self, name: &str) -> Result<Option<&[Value]>> {
        match self.fields.get(name) {
            None => Ok(None),
            Some(Value::List(items)) => Ok(Some(items)),
            Some(other) => Err(Error::mismatch(name, "list", other.kind_name())),
        }
    }

    /// Number of set properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no property is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over set properties in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder_and_accessors() {
        let inner = Record::new().with("Code", "7");
        let record = Record::new()
            .with("Name", "JOHN")
            .with("Address", inner.clone())
            .with("Phones", vec![Value::from("1"), Value::from("2")]);

        assert_eq!(record.len(), 3);
        assert_eq!(record.text("Name").unwrap(), Some("JOHN"));
        assert_eq!(record.record("Address").unwrap(), Some(&inner));
        assert_eq!(record.list("Phones").unwrap().map(<[Value]>::len), Some(2));
        assert_eq!(record.text("Missing").unwrap(), None);
    }

    #[test]
    fn test_record_kind_mismatch() {
        let record = Record::new().with("Name", "JOHN");
        let err = record.list("Name").unwrap_err();
        assert!(matches!(
            err,
            Error::ValueMismatch {
                expected: "list",
                found: "text",
                ..
            }
        ));
        assert!(record.record("Name").is_err());
    }

    #[test]
    fn test_record_iter_is_name_ordered() {
        let record = Record::new().with("b", "2").with("a", "1");
        let names: Vec<_> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(Value::from("x").kind_name(), "text");
        assert_eq!(Value::from(Record::new()).kind_name(), "record");
        assert_eq!(Value::from(Vec::new()).kind_name(), "list");
        assert_eq!(Value::from("x").as_text(), Some("x"));
        assert!(Value::from("x").as_record().is_none());
        assert!(Value::from(Vec::new()).as_list().is_some());
    }

    #[test]
    fn test_insert_replaces() {
        let mut record = Record::new();
        assert!(record.insert("a", "1").is_none());
        assert_eq!(record.insert("a", "2"), Some(Value::from("1")));
        assert!(!record.is_empty());
    }
}
