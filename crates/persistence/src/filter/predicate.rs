//! Compiled predicates.
//!
//! The relational backend compiles to parameterised SQL fragments; the
//! document backend compiles to operator documents. [`Predicate`] carries
//! either so a model can hand a compiled filter back to its backend.

use serde_json::Value;

/// A fragment of SQL with bound parameters.
///
/// Placeholders are anonymous `?` markers bound in order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    /// The SQL clause.
    pub sql: String,
    /// Bound parameter values.
    pub params: Vec<SqlParam>,
}

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// String parameter.
    String(String),
    /// Integer parameter.
    Integer(i64),
    /// Float parameter.
    Float(f64),
    /// Boolean parameter.
    Boolean(bool),
    /// Null parameter.
    Null,
}

impl SqlParam {
    /// Creates a string parameter.
    pub fn string(s: impl Into<String>) -> Self {
        SqlParam::String(s.into())
    }

    /// Creates an integer parameter.
    pub fn integer(i: i64) -> Self {
        SqlParam::Integer(i)
    }

    /// Creates a float parameter.
    pub fn float(f: f64) -> Self {
        SqlParam::Float(f)
    }
}

impl SqlFragment {
    /// Creates a new SQL fragment.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Creates a fragment with parameters.
    pub fn with_params(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Combines with another fragment using AND.
    pub fn and(mut self, other: SqlFragment) -> Self {
        if !self.sql.is_empty() && !other.sql.is_empty() {
            self.sql = format!("({}) AND ({})", self.sql, other.sql);
        } else if !other.sql.is_empty() {
            self.sql = other.sql;
        }
        self.params.extend(other.params);
        self
    }

    /// Combines with another fragment using OR.
    pub fn or(mut self, other: SqlFragment) -> Self {
        if !self.sql.is_empty() && !other.sql.is_empty() {
            self.sql = format!("({}) OR ({})", self.sql, other.sql);
        } else if !other.sql.is_empty() {
            self.sql = other.sql;
        }
        self.params.extend(other.params);
        self
    }

    /// Returns true if this fragment is empty.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// A compiled filter for one backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Relational predicate.
    Sql(SqlFragment),
    /// Document predicate (operator document).
    Document(Value),
}

impl Predicate {
    /// A predicate that places no constraint on the relational backend.
    pub fn all_rows() -> Self {
        Predicate::Sql(SqlFragment::new(""))
    }

    /// A predicate that places no constraint on the document backend.
    pub fn all_documents() -> Self {
        Predicate::Document(Value::Object(serde_json::Map::new()))
    }

    /// Returns the predicate family name, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Predicate::Sql(_) => "sql",
            Predicate::Document(_) => "document",
        }
    }

    /// Returns the SQL fragment, if this is a relational predicate.
    pub fn as_sql(&self) -> Option<&SqlFragment> {
        match self {
            Predicate::Sql(fragment) => Some(fragment),
            Predicate::Document(_) => None,
        }
    }

    /// Returns the operator document, if this is a document predicate.
    pub fn as_document(&self) -> Option<&Value> {
        match self {
            Predicate::Sql(_) => None,
            Predicate::Document(doc) => Some(doc),
        }
    }
}

impl From<SqlFragment> for Predicate {
    fn from(fragment: SqlFragment) -> Self {
        Predicate::Sql(fragment)
    }
}

impl From<Value> for Predicate {
    fn from(doc: Value) -> Self {
        Predicate::Document(doc)
    }
}
