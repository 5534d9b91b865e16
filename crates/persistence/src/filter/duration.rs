//! Date range resolution for date and datetime filters.
//!
//! Every date filter is reduced to a `(start, end)` pair, including the
//! point-in-time shortcuts, so the statement builder always issues a single
//! range filter.

use std::fmt::Debug;
use std::sync::Arc;

use chrono::{Datelike, Days, Local, NaiveDate};

use super::FilterValue;

/// Format used when no locale supplies one.
pub const DEFAULT_FILTER_DATE_FORMAT: &str = "mm/dd/yy";

/// Supplies the date format users type filter dates in.
///
/// Formats use the tokens `dd`, `mm` and `yy` (or `yyyy`), e.g. `"dd/mm/yy"`.
pub trait DateFormatProvider: Send + Sync + Debug {
    /// Returns the format for the active locale, if one is configured.
    fn filter_date_format(&self) -> Option<String>;
}

/// A provider that always returns the same format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedDateFormat(pub String);

impl FixedDateFormat {
    /// Creates a provider for a format.
    pub fn new(format: impl Into<String>) -> Self {
        Self(format.into())
    }
}

impl Default for FixedDateFormat {
    fn default() -> Self {
        Self::new(DEFAULT_FILTER_DATE_FORMAT)
    }
}

impl DateFormatProvider for FixedDateFormat {
    fn filter_date_format(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Translates a `dd/mm/yy` style format into a `chrono` format string.
pub fn strftime_pattern(format: &str) -> String {
    format
        .replace("dd", "%d")
        .replace("mm", "%m")
        .replace("yyyy", "%Y")
        .replace("yy", "%Y")
}

/// A resolved date range.
///
/// An endpoint is `None` when it could not be resolved (blank or unparsable
/// input). Both endpoints `None` means the filter could not be resolved at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    /// First day of the range.
    pub start: Option<NaiveDate>,
    /// Last day of the range.
    pub end: Option<NaiveDate>,
}

impl Duration {
    /// Creates a range from two endpoints.
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// A range covering exactly one day.
    pub fn day(date: NaiveDate) -> Self {
        Self::new(Some(date), Some(date))
    }

    /// A range that could not be resolved.
    pub fn unresolved() -> Self {
        Self::new(None, None)
    }

    /// Returns true when neither endpoint was resolved.
    pub fn is_unresolved(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

/// Resolves date filter operators into date ranges.
#[derive(Debug, Clone)]
pub struct DurationResolver {
    formats: Arc<dyn DateFormatProvider>,
}

impl Default for DurationResolver {
    fn default() -> Self {
        Self::new(Arc::new(FixedDateFormat::default()))
    }
}

impl DurationResolver {
    /// Creates a resolver reading formats from a provider.
    pub fn new(formats: Arc<dyn DateFormatProvider>) -> Self {
        Self { formats }
    }

    /// Resolves an operator against the current local date.
    pub fn resolve(&self, operator: &str, value: &FilterValue) -> Duration {
        self.resolve_on(operator, value, Local::now().date_naive())
    }

    /// Resolves an operator against an explicit `today`.
    ///
    /// - `between`: elements 1 and 2 of the value, each parsed independently
    /// - `today`, `yesterday`
    /// - `this_week`, `last_week`: Monday through Sunday
    /// - anything else: the value (or its first element) as a single day
    pub fn resolve_on(&self, operator: &str, value: &FilterValue, today: NaiveDate) -> Duration {
        match operator {
            "between" => Duration::new(
                self.convert_to_date(value.at(1)),
                self.convert_to_date(value.at(2)),
            ),
            "today" => Duration::day(today),
            "yesterday" => Duration::day(today - Days::new(1)),
            "this_week" => week_of(today),
            "last_week" => week_of(today - Days::new(7)),
            _ => match self.convert_to_date(value.first()) {
                Some(date) => Duration::day(date),
                None => Duration::unresolved(),
            },
        }
    }

    /// Returns the `chrono` format string for the active locale.
    pub fn date_format(&self) -> String {
        let format = self
            .formats
            .filter_date_format()
            .unwrap_or_else(|| DEFAULT_FILTER_DATE_FORMAT.to_string());
        strftime_pattern(&format)
    }

    /// Parses a user-typed date. Blank or malformed input yields `None`.
    pub fn convert_to_date(&self, value: Option<&str>) -> Option<NaiveDate> {
        let value = value.map(str::trim).filter(|v| !v.is_empty())?;
        match NaiveDate::parse_from_str(value, &self.date_format()) {
            Ok(date) => Some(date),
            Err(e) => {
                tracing::debug!("Ignoring unparsable filter date {:?}: {}", value, e);
                None
            }
        }
    }
}

fn week_of(date: NaiveDate) -> Duration {
    let start = date - Days::new(u64::from(date.weekday().num_days_from_monday()));
    Duration::new(Some(start), Some(start + Days::new(6)))
}
