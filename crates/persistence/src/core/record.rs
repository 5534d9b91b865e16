//! Backend-neutral record representation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A row or document returned by a backend.
///
/// Fields are held as JSON values regardless of the store they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Fully-qualified name of the model the record belongs to.
    model_name: String,

    /// Name of the field holding the primary key.
    primary_key: String,

    /// Field values.
    fields: Map<String, Value>,
}

impl Record {
    /// Creates a record from a field map.
    pub fn new(
        model_name: impl Into<String>,
        primary_key: impl Into<String>,
        fields: Map<String, Value>,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            primary_key: primary_key.into(),
            fields,
        }
    }

    /// Creates a record from a JSON value. Non-object values yield an empty
    /// record.
    pub fn from_value(
        model_name: impl Into<String>,
        primary_key: impl Into<String>,
        value: Value,
    ) -> Self {
        let fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(model_name, primary_key, fields)
    }

    /// Returns the model name.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the primary key field name.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Returns the primary key value, if present and not null.
    pub fn id(&self) -> Option<&Value> {
        self.get(&self.primary_key)
    }

    /// Returns a field value, treating JSON null as absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    /// Returns the field map.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consumes the record and returns its fields as a JSON object.
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}
