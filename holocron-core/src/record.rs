//! User record model.
//!
//! A record is an opaque mapping of field names to JSON values. Only two
//! fields carry meaning to the client: `id`, which addresses the record on
//! the server, and `token`, which authorizes requests made on its behalf.

use crate::error::RecordError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identifier of a record, rendered the way it appears in a URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build an id from a JSON value. Numbers and non-empty strings qualify.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self(n.to_string())),
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord {
    fields: Map<String, Value>,
}

impl UserRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(RecordError::NotAnObject {
                found: value_kind(&other),
            }),
        }
    }

    pub fn id(&self) -> Option<RecordId> {
        self.fields.get("id").and_then(RecordId::from_value)
    }

    pub fn token(&self) -> Option<&str> {
        self.fields.get("token").and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Set a field, returning the previous value.
    pub fn set(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(field.into(), value)
    }

    /// Builder-style variant of [`UserRecord::set`].
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.set(field, value);
        self
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Map<String, Value>> for UserRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl TryFrom<Value> for UserRecord {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_id_renders_without_quotes() {
        let record = UserRecord::from_value(json!({"id": 42, "name": "A"})).unwrap();
        assert_eq!(record.id().unwrap().as_str(), "42");
    }

    #[test]
    fn test_string_id_and_token() {
        let record = UserRecord::new()
            .with("id", json!("u-7"))
            .with("token", json!("abc.def.ghi"));
        assert_eq!(record.id(), Some(RecordId::new("u-7")));
        assert_eq!(record.token(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_unusable_ids() {
        assert!(UserRecord::from_value(json!({"id": ""})).unwrap().id().is_none());
        assert!(UserRecord::from_value(json!({"id": null})).unwrap().id().is_none());
        assert!(UserRecord::new().id().is_none());
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        let err = UserRecord::from_value(json!([1, 2])).unwrap_err();
        assert_eq!(err, RecordError::NotAnObject { found: "array" });
    }

    #[test]
    fn test_serializes_transparently() {
        let record = UserRecord::new().with("name", json!("B"));
        assert_eq!(serde_json::to_value(&record).unwrap(), json!({"name": "B"}));
    }
}
