//! Filter compilation to operator documents.

use serde_json::{Map, Value, json};

use crate::filter::{BoundValue, ColumnType, DurationResolver, FilterSpec, StatementBuilder};

/// Builds operator documents (`{"price": {"$gte": 1}}`).
pub struct DocumentStatementBuilder<'a> {
    resolver: &'a DurationResolver,
}

impl<'a> DocumentStatementBuilder<'a> {
    /// Creates a builder using the given duration resolver.
    pub fn new(resolver: &'a DurationResolver) -> Self {
        Self { resolver }
    }

    fn field(column: &str, condition: Value) -> Value {
        let mut doc = Map::new();
        doc.insert(column.to_string(), condition);
        Value::Object(doc)
    }

    fn build_for_boolean(&self, filter: &FilterSpec) -> Option<Value> {
        match filter.value.as_single()? {
            "false" | "f" | "0" => Some(Self::field(
                &filter.column,
                json!({"$in": [false, null]}),
            )),
            "true" | "t" | "1" => Some(Self::field(&filter.column, json!(true))),
            _ => None,
        }
    }

    fn build_for_string_or_text(&self, filter: &FilterSpec) -> Option<Value> {
        if filter.value.is_blank() {
            return None;
        }
        let value = filter.value.as_single()?;
        let escaped = regex::escape(value);
        let pattern = match filter.operator.as_str() {
            "default" | "like" => escaped,
            "starts_with" => format!("^{}", escaped),
            "ends_with" => format!("{}$", escaped),
            "is" | "=" => return Some(Self::field(&filter.column, json!(value))),
            _ => return None,
        };
        Some(Self::field(
            &filter.column,
            json!({"$regex": pattern, "$options": "i"}),
        ))
    }

    fn build_for_enum(&self, filter: &FilterSpec) -> Option<Value> {
        if filter.value.is_blank() {
            return None;
        }
        Some(Self::field(
            &filter.column,
            json!({"$in": filter.value.to_list()}),
        ))
    }

    fn build_for_reference(&self, filter: &FilterSpec) -> Option<Value> {
        if filter.value.is_blank() {
            return None;
        }
        let value = filter.value.as_single()?;
        Some(Self::field(&filter.column, json!(value)))
    }
}

impl StatementBuilder for DocumentStatementBuilder<'_> {
    type Predicate = Value;

    fn duration_resolver(&self) -> &DurationResolver {
        self.resolver
    }

    fn build_for_scalar_type(&self, filter: &FilterSpec) -> Option<Value> {
        match filter.column_type {
            ColumnType::Boolean => self.build_for_boolean(filter),
            ColumnType::Integer | ColumnType::Decimal | ColumnType::Float => {
                self.build_for_integer_decimal_or_float(filter)
            }
            ColumnType::String | ColumnType::Text => self.build_for_string_or_text(filter),
            ColumnType::Enum => self.build_for_enum(filter),
            ColumnType::BelongsToAssociation | ColumnType::ObjectId => {
                self.build_for_reference(filter)
            }
            _ => None,
        }
    }

    fn unary_operator(&self, column: &str, keyword: &str) -> Option<Value> {
        let condition = match keyword {
            "_blank" => json!({"$in": [null, ""]}),
            "_present" => json!({"$nin": [null, ""]}),
            "_null" => Value::Null,
            "_not_null" => json!({"$ne": null}),
            "_empty" => json!(""),
            "_not_empty" => json!({"$ne": ""}),
            _ => return None,
        };
        Some(Self::field(column, condition))
    }

    fn range_filter(
        &self,
        column: &str,
        min: Option<BoundValue>,
        max: Option<BoundValue>,
    ) -> Option<Value> {
        let condition = match (min, max) {
            (Some(min), Some(max)) => json!({"$gte": min.to_json(), "$lte": max.to_json()}),
            (Some(min), None) => json!({"$gte": min.to_json()}),
            (None, Some(max)) => json!({"$lte": max.to_json()}),
            (None, None) => return None,
        };
        Some(Self::field(column, condition))
    }

    fn column_for_value(&self, column: &str, value: BoundValue) -> Value {
        Self::field(column, value.to_json())
    }
}
