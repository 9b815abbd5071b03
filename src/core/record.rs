use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use mongodb::bson::{Bson, DateTime, Document};

/// A single typed cell of a source row.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(v) => write!(f, "{v}"),
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Text(v) => write!(f, "{v}"),
            FieldValue::Timestamp(v) => write!(f, "{v}"),
        }
    }
}

impl FieldValue {
    pub fn to_bson(&self) -> Bson {
        match self {
            FieldValue::Null => Bson::Null,
            FieldValue::Bool(v) => Bson::Boolean(*v),
            FieldValue::Int(v) => Bson::Int64(*v),
            FieldValue::Float(v) => Bson::Double(*v),
            FieldValue::Text(v) => Bson::String(v.clone()),
            FieldValue::Timestamp(v) => {
                Bson::DateTime(DateTime::from_millis(v.and_utc().timestamp_millis()))
            }
        }
    }
}

/// One row of the source dataset: field names in source column order, each
/// with a tagged value. Field names are shared between rows of the same file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleRecord {
    fields: Vec<(Arc<str>, FieldValue)>,
}

impl SampleRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Appends a field. A repeated name replaces the earlier value in place.
    pub fn push(&mut self, name: impl Into<Arc<str>>, value: FieldValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| n.as_ref() == name)
            .map(|(_, v)| v)
    }

    /// The natural document key: the named field, if present and not null.
    pub fn key(&self, field: &str) -> Option<&FieldValue> {
        self.get(field).filter(|v| !v.is_null())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_ref(), v))
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for (name, value) in &self.fields {
            doc.insert(name.as_ref(), value.to_bson());
        }
        doc
    }
}

impl<N: Into<Arc<str>>> FromIterator<(N, FieldValue)> for SampleRecord {
    fn from_iter<I: IntoIterator<Item = (N, FieldValue)>>(iter: I) -> Self {
        let mut record = SampleRecord::new();
        for (name, value) in iter {
            record.push(name, value);
        }
        record
    }
}
