//! Filter compilation to SQL fragments.
//!
//! Column names are emitted as given (they may be table-qualified, such as
//! `posts.title`); values are always bound as `?` parameters.

use crate::filter::{
    BoundValue, ColumnType, DurationResolver, FilterSpec, SqlFragment, SqlParam, StatementBuilder,
};

/// Builds parameterised SQL conditions.
pub struct SqliteStatementBuilder<'a> {
    resolver: &'a DurationResolver,
}

impl<'a> SqliteStatementBuilder<'a> {
    /// Creates a builder using the given duration resolver.
    pub fn new(resolver: &'a DurationResolver) -> Self {
        Self { resolver }
    }

    fn build_for_boolean(&self, filter: &FilterSpec) -> Option<SqlFragment> {
        let column = &filter.column;
        match filter.value.as_single()? {
            "false" | "f" | "0" => Some(SqlFragment::with_params(
                format!("({} IS NULL OR {} = ?)", column, column),
                vec![SqlParam::Boolean(false)],
            )),
            "true" | "t" | "1" => Some(SqlFragment::with_params(
                format!("({} = ?)", column),
                vec![SqlParam::Boolean(true)],
            )),
            _ => None,
        }
    }

    fn build_for_string_or_text(&self, filter: &FilterSpec) -> Option<SqlFragment> {
        if filter.value.is_blank() {
            return None;
        }
        let value = filter.value.as_single()?.to_lowercase();
        let pattern = match filter.operator.as_str() {
            "default" | "like" => format!("%{}%", value),
            "starts_with" => format!("{}%", value),
            "ends_with" => format!("%{}", value),
            "is" | "=" => value,
            _ => return None,
        };
        Some(SqlFragment::with_params(
            format!("(LOWER({}) LIKE ?)", filter.column),
            vec![SqlParam::String(pattern)],
        ))
    }

    fn build_for_enum(&self, filter: &FilterSpec) -> Option<SqlFragment> {
        if filter.value.is_blank() {
            return None;
        }
        let values = filter.value.to_list();
        let placeholders = vec!["?"; values.len()].join(", ");
        Some(SqlFragment::with_params(
            format!("({} IN ({}))", filter.column, placeholders),
            values.into_iter().map(SqlParam::string).collect(),
        ))
    }

    fn build_for_belongs_to(&self, filter: &FilterSpec) -> Option<SqlFragment> {
        let raw = filter.value.as_single()?;
        let id = raw.parse::<i64>().ok().filter(|i| i.to_string() == raw)?;
        Some(self.column_for_value(&filter.column, BoundValue::Integer(id)))
    }
}

impl StatementBuilder for SqliteStatementBuilder<'_> {
    type Predicate = SqlFragment;

    fn duration_resolver(&self) -> &DurationResolver {
        self.resolver
    }

    fn build_for_scalar_type(&self, filter: &FilterSpec) -> Option<SqlFragment> {
        match filter.column_type {
            ColumnType::Boolean => self.build_for_boolean(filter),
            ColumnType::Integer | ColumnType::Decimal | ColumnType::Float => {
                self.build_for_integer_decimal_or_float(filter)
            }
            ColumnType::String | ColumnType::Text => self.build_for_string_or_text(filter),
            ColumnType::Enum => self.build_for_enum(filter),
            ColumnType::BelongsToAssociation => self.build_for_belongs_to(filter),
            _ => None,
        }
    }

    fn unary_operator(&self, column: &str, keyword: &str) -> Option<SqlFragment> {
        let sql = match keyword {
            "_blank" => format!("({c} IS NULL OR {c} = '')", c = column),
            "_present" => format!("({c} IS NOT NULL AND {c} != '')", c = column),
            "_null" => format!("({} IS NULL)", column),
            "_not_null" => format!("({} IS NOT NULL)", column),
            "_empty" => format!("({} = '')", column),
            "_not_empty" => format!("({} != '')", column),
            _ => return None,
        };
        Some(SqlFragment::new(sql))
    }

    fn range_filter(
        &self,
        column: &str,
        min: Option<BoundValue>,
        max: Option<BoundValue>,
    ) -> Option<SqlFragment> {
        // Stored datetimes may use either a space or `T` separator.
        let is_datetime = matches!(min, Some(BoundValue::DateTime(_)))
            || matches!(max, Some(BoundValue::DateTime(_)));
        let column = if is_datetime {
            format!("datetime({})", column)
        } else {
            column.to_string()
        };
        match (min, max) {
            (Some(min), Some(max)) => Some(SqlFragment::with_params(
                format!("({} BETWEEN ? AND ?)", column),
                vec![min.into(), max.into()],
            )),
            (Some(min), None) => Some(SqlFragment::with_params(
                format!("({} >= ?)", column),
                vec![min.into()],
            )),
            (None, Some(max)) => Some(SqlFragment::with_params(
                format!("({} <= ?)", column),
                vec![max.into()],
            )),
            (None, None) => None,
        }
    }

    fn column_for_value(&self, column: &str, value: BoundValue) -> SqlFragment {
        SqlFragment::with_params(format!("({} = ?)", column), vec![value.into()])
    }
}
