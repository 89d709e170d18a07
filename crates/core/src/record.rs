//! Open keyed records and the schemas they are validated against.
//!
//! Rows coming from the backend tables or an imported sheet are kept as
//! field maps. Their expected shape lives in a [`RecordSchema`] that is
//! checked at the import boundary instead of being assumed everywhere.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A row as an ordered map of field name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from a JSON object. Returns `None` for any other JSON value.
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map.into_iter().collect())),
            _ => None,
        }
    }

    /// Adds a field, builder style.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the canonical text of the identifier field.
    ///
    /// Strings are trimmed, numbers and booleans use their JSON text, so `"7"`
    /// and `7` identify the same record. Missing, null, blank or composite
    /// values have no identifier.
    #[must_use]
    pub fn identifier(&self, id_field: &str) -> Option<String> {
        match self.0.get(id_field)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, Value>> for Record {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

/// Declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Decimal,
    Integer,
    Date,
    Boolean,
}

impl FieldType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Decimal => "decimal",
            Self::Integer => "integer",
            Self::Date => "date",
            Self::Boolean => "boolean",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
}

/// Ordered description of the fields a record set is expected to carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    #[serde(default)]
    pub fields: Vec<SchemaField>,
}

impl RecordSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required field.
    #[must_use]
    pub fn required(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.field(name, field_type, true)
    }

    /// Adds an optional field.
    #[must_use]
    pub fn optional(self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.field(name, field_type, false)
    }

    /// Adds a field, replacing an earlier declaration with the same name.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType, required: bool) -> Self {
        let name = name.into();
        self.fields.retain(|f| f.name != name);
        self.fields.push(SchemaField {
            name,
            field_type,
            required,
        });
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
    }

    /// Schema for individual bets.
    #[must_use]
    pub fn bets() -> Self {
        Self::new()
            .required("date", FieldType::Date)
            .required("stake", FieldType::Decimal)
            .required("result", FieldType::Text)
            .optional("profit", FieldType::Decimal)
            .optional("house", FieldType::Text)
    }

    /// Schema for the daily operations ledger.
    #[must_use]
    pub fn daily() -> Self {
        Self::new()
            .required("date", FieldType::Date)
            .required("result", FieldType::Decimal)
    }

    /// Schema for deposits, withdrawals and other cash movements.
    #[must_use]
    pub fn movements() -> Self {
        Self::new()
            .required("house", FieldType::Text)
            .required("date", FieldType::Date)
            .required("kind", FieldType::Text)
            .required("amount", FieldType::Decimal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identifier_canonical_text() {
        let by_string = Record::new().with("id", "7");
        let by_number = Record::new().with("id", 7);
        assert_eq!(by_string.identifier("id"), by_number.identifier("id"));
        assert_eq!(by_string.identifier("id"), Some("7".to_string()));
    }

    #[test]
    fn identifier_missing_or_blank() {
        assert_eq!(Record::new().identifier("id"), None);
        assert_eq!(Record::new().with("id", "  ").identifier("id"), None);
        assert_eq!(Record::new().with("id", Value::Null).identifier("id"), None);
    }

    #[test]
    fn from_json_requires_object() {
        let record = Record::from_json(json!({"id": "1", "v": 5})).unwrap();
        assert_eq!(record.get("v"), Some(&json!(5)));
        assert!(Record::from_json(json!([1, 2])).is_none());
    }

    #[test]
    fn record_deep_equality() {
        let a = Record::from_json(json!({"id": "1", "tags": ["x"], "v": 5})).unwrap();
        let b = Record::new().with("v", 5).with("id", "1").with("tags", json!(["x"]));
        assert_eq!(a, b);
    }

    #[test]
    fn schema_builder_keeps_order_and_replaces() {
        let schema = RecordSchema::new()
            .required("date", FieldType::Date)
            .optional("stake", FieldType::Text)
            .required("stake", FieldType::Decimal);

        let names: Vec<&str> = schema.field_names().collect();
        assert_eq!(names, vec!["date", "stake"]);
        assert_eq!(schema.get("stake").unwrap().field_type, FieldType::Decimal);
        assert_eq!(schema.required_fields().count(), 2);
    }

    #[test]
    fn schema_deserializes_from_toml_shape() {
        let schema: RecordSchema = serde_json::from_value(json!({
            "fields": [
                {"name": "date", "type": "date", "required": true},
                {"name": "note", "type": "text"}
            ]
        }))
        .unwrap();
        assert_eq!(schema.required_fields().collect::<Vec<_>>(), vec!["date"]);
    }
}
