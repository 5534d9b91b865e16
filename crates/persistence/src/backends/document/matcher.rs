//! Evaluation of operator documents against stored documents.
//!
//! Supports the operator subset the statement builder emits plus the logical
//! combinators used in default scopes:
//!
//! | Operator | Meaning |
//! |----------|---------|
//! | `{"f": v}` / `$eq` | equal; `null` also matches a missing field; arrays match on any element |
//! | `$ne` | not equal |
//! | `$gt` `$gte` `$lt` `$lte` | ordered comparison of numbers, dates or strings |
//! | `$in` `$nin` | membership |
//! | `$exists` | field presence |
//! | `$regex` (+ `$options`) | pattern match on strings |
//! | `$not` | negated operator document |
//! | `$and` `$or` `$nor` | logical combinators |
//!
//! Dotted field paths descend into sub-documents.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::RegexBuilder;
use serde_json::{Map, Value};

use crate::error::{BackendError, BackendResult};

/// Returns true if `doc` satisfies `predicate`.
pub fn matches(doc: &Map<String, Value>, predicate: &Value) -> BackendResult<bool> {
    let Value::Object(clauses) = predicate else {
        return Err(BackendError::QueryError {
            message: format!("predicate must be a document, got {}", predicate),
        });
    };

    for (key, condition) in clauses {
        let satisfied = match key.as_str() {
            "$and" => all_of(doc, condition)?,
            "$or" => any_of(doc, condition)?,
            "$nor" => !any_of(doc, condition)?,
            op if op.starts_with('$') => {
                return Err(BackendError::QueryError {
                    message: format!("unsupported top-level operator {}", op),
                });
            }
            path => field_matches(lookup(doc, path), condition)?,
        };
        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

fn clauses_of<'a>(condition: &'a Value) -> BackendResult<&'a Vec<Value>> {
    condition.as_array().ok_or_else(|| BackendError::QueryError {
        message: format!("logical operator expects an array, got {}", condition),
    })
}

fn all_of(doc: &Map<String, Value>, condition: &Value) -> BackendResult<bool> {
    for clause in clauses_of(condition)? {
        if !matches(doc, clause)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn any_of(doc: &Map<String, Value>, condition: &Value) -> BackendResult<bool> {
    for clause in clauses_of(condition)? {
        if matches(doc, clause)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Resolves a dotted path.
fn lookup<'a>(doc: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn is_operator_document(condition: &Value) -> bool {
    condition
        .as_object()
        .is_some_and(|ops| !ops.is_empty() && ops.keys().all(|k| k.starts_with('$')))
}

fn field_matches(actual: Option<&Value>, condition: &Value) -> BackendResult<bool> {
    let Some(ops) = condition.as_object().filter(|_| is_operator_document(condition)) else {
        return Ok(equals(actual, condition));
    };

    for (op, arg) in ops {
        let satisfied = match op.as_str() {
            "$eq" => equals(actual, arg),
            "$ne" => !equals(actual, arg),
            "$gt" => compare(actual, arg).is_some_and(|o| o == Ordering::Greater),
            "$gte" => compare(actual, arg).is_some_and(|o| o != Ordering::Less),
            "$lt" => compare(actual, arg).is_some_and(|o| o == Ordering::Less),
            "$lte" => compare(actual, arg).is_some_and(|o| o != Ordering::Greater),
            "$in" => in_list(actual, arg)?,
            "$nin" => !in_list(actual, arg)?,
            "$exists" => actual.is_some() == arg.as_bool().unwrap_or(true),
            "$regex" => {
                let options = ops.get("$options").and_then(Value::as_str).unwrap_or("");
                regex_matches(actual, arg, options)?
            }
            "$options" => true,
            "$not" => !field_matches(actual, arg)?,
            other => {
                return Err(BackendError::QueryError {
                    message: format!("unsupported operator {}", other),
                });
            }
        };
        if !satisfied {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Equality as documents see it: `null` matches null or missing, and an
/// array field matches if any element does.
pub(crate) fn equals(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None | Some(Value::Null) => expected.is_null(),
        Some(Value::Array(items)) if !expected.is_array() => {
            items.iter().any(|item| values_equal(item, expected))
        }
        Some(value) => values_equal(value, expected),
    }
}

/// Equality with numbers compared by value (`1` equals `1.0`).
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) if a.is_number() && b.is_number() => x == y,
        _ => a == b,
    }
}

fn compare(actual: Option<&Value>, bound: &Value) -> Option<Ordering> {
    match (actual?, bound) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => match (parse_temporal(a), parse_temporal(b)) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => Some(a.as_str().cmp(b.as_str())),
        },
        _ => None,
    }
}

/// Parses ISO 8601 dates and datetimes with either a `T` or a space
/// separator, at second precision. Dates are taken at midnight, offsets are
/// converted to UTC.
fn parse_temporal(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    let parsed = FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })?;
    parsed.with_nanosecond(0)
}

fn in_list(actual: Option<&Value>, list: &Value) -> BackendResult<bool> {
    let items = list.as_array().ok_or_else(|| BackendError::QueryError {
        message: format!("$in expects an array, got {}", list),
    })?;
    Ok(items.iter().any(|item| equals(actual, item)))
}

fn regex_matches(actual: Option<&Value>, pattern: &Value, options: &str) -> BackendResult<bool> {
    let pattern = pattern.as_str().ok_or_else(|| BackendError::QueryError {
        message: format!("$regex expects a string, got {}", pattern),
    })?;
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(options.contains('i'))
        .multi_line(options.contains('m'))
        .build()?;

    Ok(match actual {
        Some(Value::String(s)) => regex.is_match(s),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .any(|s| regex.is_match(s)),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_equality_and_null() {
        let d = doc(json!({"title": "Hello", "tags": ["a", "b"], "score": 3}));
        assert!(matches(&d, &json!({"title": "Hello"})).unwrap());
        assert!(!matches(&d, &json!({"title": "hello"})).unwrap());
        assert!(matches(&d, &json!({"tags": "b"})).unwrap());
        assert!(matches(&d, &json!({"score": 3.0})).unwrap());
        assert!(matches(&d, &json!({"missing": null})).unwrap());
        assert!(!matches(&d, &json!({"title": null})).unwrap());
        assert!(matches(&d, &json!({})).unwrap());
    }

    #[test]
    fn test_comparisons() {
        let d = doc(json!({"score": 5, "published_on": "2024-01-10"}));
        assert!(matches(&d, &json!({"score": {"$gte": 5, "$lte": 10}})).unwrap());
        assert!(!matches(&d, &json!({"score": {"$gt": 5}})).unwrap());
        assert!(matches(&d, &json!({"score": {"$lt": 5.5}})).unwrap());
        assert!(
            matches(
                &d,
                &json!({"published_on": {"$gte": "2024-01-01", "$lte": "2024-01-31"}})
            )
            .unwrap()
        );
        assert!(!matches(&d, &json!({"missing": {"$gte": 0}})).unwrap());
    }

    #[test]
    fn test_datetime_comparisons_ignore_separator() {
        let range = json!({"at": {"$gte": "2024-01-06T00:00:00", "$lte": "2024-01-06T23:59:59"}});
        for stored in [
            "2024-01-06T10:00:00",
            "2024-01-06 10:00:00",
            "2024-01-06 23:59:59.250",
            "2024-01-06T08:00:00Z",
            "2024-01-06",
        ] {
            assert!(matches(&doc(json!({"at": stored})), &range).unwrap(), "{}", stored);
        }
        for stored in ["2024-01-05 23:59:59", "2024-01-07T00:00:00", "2024-01-07"] {
            assert!(!matches(&doc(json!({"at": stored})), &range).unwrap(), "{}", stored);
        }
    }

    #[test]
    fn test_membership_and_blank_keywords() {
        let blank = doc(json!({"title": ""}));
        let missing = doc(json!({}));
        let present = doc(json!({"title": "x"}));
        let is_blank = json!({"title": {"$in": [null, ""]}});
        let is_present = json!({"title": {"$nin": [null, ""]}});

        assert!(matches(&blank, &is_blank).unwrap());
        assert!(matches(&missing, &is_blank).unwrap());
        assert!(!matches(&present, &is_blank).unwrap());
        assert!(matches(&present, &is_present).unwrap());
        assert!(!matches(&missing, &json!({"title": {"$ne": null}})).unwrap());
    }

    #[test]
    fn test_regex() {
        let d = doc(json!({"title": "Intro to Rust"}));
        assert!(matches(&d, &json!({"title": {"$regex": "^intro", "$options": "i"}})).unwrap());
        assert!(!matches(&d, &json!({"title": {"$regex": "^intro"}})).unwrap());
        assert!(matches(&d, &json!({"title": {"$not": {"$regex": "python"}}})).unwrap());
        assert!(matches(&d, &json!({"title": {"$regex": "("}})).is_err());
    }

    #[test]
    fn test_logical_and_paths() {
        let d = doc(json!({"author": {"name": "Ann"}, "draft": false}));
        assert!(matches(&d, &json!({"author.name": "Ann"})).unwrap());
        assert!(
            matches(
                &d,
                &json!({"$or": [{"draft": true}, {"author.name": "Ann"}]})
            )
            .unwrap()
        );
        assert!(!matches(&d, &json!({"$and": [{"draft": false}, {"author.name": "Bob"}]})).unwrap());
        assert!(matches(&d, &json!({"$nor": [{"draft": true}]})).unwrap());
        assert!(matches(&d, &json!({"author": {"$exists": true}})).unwrap());
    }

    #[test]
    fn test_invalid_predicates() {
        let d = doc(json!({"a": 1}));
        assert!(matches(&d, &json!([1])).is_err());
        assert!(matches(&d, &json!({"$where": "1"})).is_err());
        assert!(matches(&d, &json!({"a": {"$near": 1}})).is_err());
        assert!(matches(&d, &json!({"$or": {"a": 1}})).is_err());
    }
}
