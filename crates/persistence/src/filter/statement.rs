//! The statement builder contract.
//!
//! [`StatementBuilder::to_statement`] holds the compilation algorithm shared by
//! every backend; the backend supplies the type-specific pieces through the
//! required methods.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Value, json};

use super::duration::DurationResolver;
use super::predicate::SqlParam;
use super::{ColumnType, FilterSpec, FilterValue};

/// A typed bound handed to `range_filter` and `column_for_value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundValue {
    /// Integer bound.
    Integer(i64),
    /// Floating-point bound.
    Float(f64),
    /// Date bound.
    Date(NaiveDate),
    /// Date and time bound.
    DateTime(NaiveDateTime),
}

impl BoundValue {
    /// Returns the JSON representation used by document stores.
    ///
    /// Dates and times are ISO 8601 strings (`2024-01-31`,
    /// `2024-01-31T23:59:59`); the document matcher compares them as
    /// datetimes whatever separator the stored value uses.
    pub fn to_json(&self) -> Value {
        match self {
            BoundValue::Integer(i) => json!(i),
            BoundValue::Float(f) => json!(f),
            BoundValue::Date(d) => json!(d.format("%Y-%m-%d").to_string()),
            BoundValue::DateTime(dt) => json!(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }
}

impl From<BoundValue> for SqlParam {
    fn from(value: BoundValue) -> Self {
        match value {
            BoundValue::Integer(i) => SqlParam::Integer(i),
            BoundValue::Float(f) => SqlParam::Float(f),
            BoundValue::Date(d) => SqlParam::String(d.format("%Y-%m-%d").to_string()),
            BoundValue::DateTime(dt) => {
                SqlParam::String(dt.format("%Y-%m-%d %H:%M:%S").to_string())
            }
        }
    }
}

/// Parses a numeric filter value, accepting it only if it formats back to
/// exactly the same text.
///
/// `"12"`, `"-3"` and `"1.5"` are accepted; `"12abc"`, `"+5"`, `"1.50"` and
/// `"1e3"` are not. Integer columns truncate accepted floats.
pub fn parse_round_trip(raw: &str, integer: bool) -> Option<BoundValue> {
    if let Ok(i) = raw.parse::<i64>()
        && i.to_string() == raw
    {
        return Some(if integer {
            BoundValue::Integer(i)
        } else {
            BoundValue::Float(i as f64)
        });
    }

    let f = raw.parse::<f64>().ok().filter(|f| f.is_finite())?;
    if format!("{:?}", f) != raw {
        return None;
    }
    Some(if integer {
        BoundValue::Integer(f.trunc() as i64)
    } else {
        BoundValue::Float(f)
    })
}

/// Compiles a [`FilterSpec`] into a backend predicate.
///
/// Backends implement the required methods; the provided methods implement
/// the dispatch:
///
/// 1. discard sentinel in operator or value: no predicate
/// 2. unary keyword in operator, then in value: the backend's ready-made
///    predicate
/// 3. the backend's scalar handler for the column type
/// 4. date, datetime and timestamp columns: a range over the resolved duration
/// 5. anything else: no predicate
pub trait StatementBuilder {
    /// The backend-native predicate type.
    type Predicate;

    /// Returns the resolver used for date filters.
    fn duration_resolver(&self) -> &DurationResolver;

    /// Builds a predicate for scalar column types (numbers, text, booleans,
    /// enums, keys). `None` defers to the date handling or drops the filter.
    fn build_for_scalar_type(&self, filter: &FilterSpec) -> Option<Self::Predicate>;

    /// Looks up a unary keyword (`_blank`, `_present`, `_null`, ...).
    fn unary_operator(&self, column: &str, keyword: &str) -> Option<Self::Predicate>;

    /// Builds a range predicate. One missing bound makes it open-ended; both
    /// missing yields `None`.
    fn range_filter(
        &self,
        column: &str,
        min: Option<BoundValue>,
        max: Option<BoundValue>,
    ) -> Option<Self::Predicate>;

    /// Builds an equality predicate.
    fn column_for_value(&self, column: &str, value: BoundValue) -> Self::Predicate;

    /// Compiles a filter.
    fn to_statement(&self, filter: &FilterSpec) -> Option<Self::Predicate> {
        if filter.is_discarded() {
            return None;
        }

        if let Some(predicate) = self.unary_operator(&filter.column, &filter.operator) {
            return Some(predicate);
        }
        if let Some(predicate) = filter
            .value
            .as_single()
            .and_then(|value| self.unary_operator(&filter.column, value))
        {
            return Some(predicate);
        }

        self.build_for_type_generic(filter)
    }

    /// Scalar handler first, then the date family.
    fn build_for_type_generic(&self, filter: &FilterSpec) -> Option<Self::Predicate> {
        self.build_for_scalar_type(filter)
            .or_else(|| match filter.column_type {
                ColumnType::Date => self.build_for_date(filter),
                ColumnType::DateTime | ColumnType::Timestamp => {
                    self.build_for_datetime_or_timestamp(filter)
                }
                _ => None,
            })
    }

    /// Numeric filters.
    ///
    /// A list value is `[value, range_start, range_end]`: `between` builds a
    /// range from the last two, any other operator compares against the first.
    /// Elements that do not round-trip are treated as absent.
    fn build_for_integer_decimal_or_float(&self, filter: &FilterSpec) -> Option<Self::Predicate> {
        let integer = filter.column_type == ColumnType::Integer;
        let column = filter.column.as_str();

        match &filter.value {
            FilterValue::Many(_) => {
                let parse = |index| {
                    filter
                        .value
                        .at(index)
                        .and_then(|raw| parse_round_trip(raw, integer))
                };
                match filter.operator.as_str() {
                    "between" => self.range_filter(column, parse(1), parse(2)),
                    _ => parse(0).map(|value| self.column_for_value(column, value)),
                }
            }
            FilterValue::Single(raw) => {
                parse_round_trip(raw, integer).map(|value| self.column_for_value(column, value))
            }
        }
    }

    /// Date filters: a range over the resolved days.
    fn build_for_date(&self, filter: &FilterSpec) -> Option<Self::Predicate> {
        let duration = self
            .duration_resolver()
            .resolve(&filter.operator, &filter.value);
        self.range_filter(
            &filter.column,
            duration.start.map(BoundValue::Date),
            duration.end.map(BoundValue::Date),
        )
    }

    /// Datetime and timestamp filters: the resolved days widened to cover
    /// whole days, `00:00:00` through `23:59:59`.
    fn build_for_datetime_or_timestamp(&self, filter: &FilterSpec) -> Option<Self::Predicate> {
        let duration = self
            .duration_resolver()
            .resolve(&filter.operator, &filter.value);
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        self.range_filter(
            &filter.column,
            duration
                .start
                .map(|d| BoundValue::DateTime(d.and_time(NaiveTime::MIN))),
            duration
                .end
                .map(|d| BoundValue::DateTime(d.and_time(end_of_day))),
        )
    }
}
