//! Filter compilation.
//!
//! A filter arrives from the admin UI as a loosely-typed triple: the column's
//! semantic type, an operator keyword and a raw string (or list of strings).
//! This module turns it into a backend predicate:
//!
//! - [`FilterSpec`] - the input triple plus the column name
//! - [`DurationResolver`] - relative and textual dates to a `(start, end)` pair
//! - [`StatementBuilder`] - the compilation algorithm, parameterised by backend
//! - [`Predicate`] - the compiled, backend-specific result
//!
//! # Example
//!
//! ```
//! use helios_admin_persistence::filter::{ColumnType, FilterSpec, FilterValue};
//!
//! let filter = FilterSpec::new("published_on", ColumnType::Date, "between", FilterValue::from(vec![
//!     "",
//!     "01/01/2024",
//!     "01/31/2024",
//! ]));
//! assert!(!filter.is_discarded());
//!
//! let disabled = FilterSpec::new("title", ColumnType::String, "like", "_discard");
//! assert!(disabled.is_discarded());
//! ```

pub mod duration;
pub mod predicate;
pub mod statement;

use serde::{Deserialize, Serialize};

pub use duration::{
    DEFAULT_FILTER_DATE_FORMAT, DateFormatProvider, Duration, DurationResolver, FixedDateFormat,
    strftime_pattern,
};
pub use predicate::{Predicate, SqlFragment, SqlParam};
pub use statement::{BoundValue, StatementBuilder, parse_round_trip};

/// Operator or value that disables a filter row.
pub const DISCARD: &str = "_discard";

/// Semantic type of the filtered column.
///
/// Unknown type names are kept as [`ColumnType::Other`]; no statement is built
/// for them unless a backend handles them explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    /// Whole numbers.
    Integer,
    /// Fixed-point numbers.
    Decimal,
    /// Floating-point numbers.
    Float,
    /// Short text.
    String,
    /// Long text.
    Text,
    /// True/false.
    Boolean,
    /// Calendar date.
    Date,
    /// Date and time.
    DateTime,
    /// Date and time (timestamp column).
    Timestamp,
    /// One of a fixed set of values.
    Enum,
    /// Foreign key of a belongs-to association.
    BelongsToAssociation,
    /// Document store object identifier.
    ObjectId,
    /// Any other type name.
    Other(String),
}

impl ColumnType {
    /// Parses a type name. Never fails.
    pub fn from_name(name: &str) -> Self {
        match name {
            "integer" => ColumnType::Integer,
            "decimal" => ColumnType::Decimal,
            "float" => ColumnType::Float,
            "string" => ColumnType::String,
            "text" => ColumnType::Text,
            "boolean" => ColumnType::Boolean,
            "date" => ColumnType::Date,
            "datetime" => ColumnType::DateTime,
            "timestamp" => ColumnType::Timestamp,
            "enum" => ColumnType::Enum,
            "belongs_to_association" => ColumnType::BelongsToAssociation,
            "bson_object_id" | "object_id" => ColumnType::ObjectId,
            other => ColumnType::Other(other.to_string()),
        }
    }

    /// Returns the type name.
    pub fn as_str(&self) -> &str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Decimal => "decimal",
            ColumnType::Float => "float",
            ColumnType::String => "string",
            ColumnType::Text => "text",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Enum => "enum",
            ColumnType::BelongsToAssociation => "belongs_to_association",
            ColumnType::ObjectId => "object_id",
            ColumnType::Other(name) => name,
        }
    }

    /// Returns true for integer, decimal and float columns.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Integer | ColumnType::Decimal | ColumnType::Float
        )
    }
}

impl From<String> for ColumnType {
    fn from(name: String) -> Self {
        ColumnType::from_name(&name)
    }
}

impl From<&str> for ColumnType {
    fn from(name: &str) -> Self {
        ColumnType::from_name(name)
    }
}

impl From<ColumnType> for String {
    fn from(column_type: ColumnType) -> Self {
        column_type.as_str().to_string()
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw filter value: a single string or a list of strings.
///
/// Range filters send `[ignored, range_start, range_end]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A single string.
    Single(String),
    /// A list of strings.
    Many(Vec<String>),
}

impl FilterValue {
    /// Returns the value when it is a single string.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            FilterValue::Single(s) => Some(s),
            FilterValue::Many(_) => None,
        }
    }

    /// Returns the single value, or the first element of a list.
    pub fn first(&self) -> Option<&str> {
        match self {
            FilterValue::Single(s) => Some(s),
            FilterValue::Many(values) => values.first().map(String::as_str),
        }
    }

    /// Returns the list element at `index`. A single value only has index 0.
    pub fn at(&self, index: usize) -> Option<&str> {
        match self {
            FilterValue::Single(s) if index == 0 => Some(s),
            FilterValue::Single(_) => None,
            FilterValue::Many(values) => values.get(index).map(String::as_str),
        }
    }

    /// Returns every element, wrapping a single value in a one-element list.
    pub fn to_list(&self) -> Vec<&str> {
        match self {
            FilterValue::Single(s) => vec![s.as_str()],
            FilterValue::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Returns true for whitespace-only strings and empty lists.
    pub fn is_blank(&self) -> bool {
        match self {
            FilterValue::Single(s) => s.trim().is_empty(),
            FilterValue::Many(values) => values.is_empty(),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Single(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Single(value)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(values: Vec<String>) -> Self {
        FilterValue::Many(values)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(values: Vec<&str>) -> Self {
        FilterValue::Many(values.into_iter().map(String::from).collect())
    }
}

/// One filter row to compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Column (or field path) the predicate applies to.
    pub column: String,

    /// Semantic type of the column.
    #[serde(rename = "type")]
    pub column_type: ColumnType,

    /// Operator keyword (e.g., "between", "like", "today"). May be empty.
    #[serde(default)]
    pub operator: String,

    /// Raw value.
    pub value: FilterValue,
}

impl FilterSpec {
    /// Creates a filter specification.
    pub fn new(
        column: impl Into<String>,
        column_type: impl Into<ColumnType>,
        operator: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            column: column.into(),
            column_type: column_type.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Returns true when the operator or the value is the discard sentinel.
    pub fn is_discarded(&self) -> bool {
        self.operator == DISCARD || self.value.as_single() == Some(DISCARD)
    }
}
