//! Configuration.
//!
//! The admin layer needs very little from the surrounding configuration: the
//! list of model names to expose, whether unresolvable names are reported,
//! and the date format users type filter dates in, per locale.
//!
//! # Example
//!
//! ```
//! use helios_admin_persistence::config::AdminConfig;
//!
//! let config = AdminConfig::from_json_str(r#"{
//!     "models": ["Team", "Player"],
//!     "date_formats": { "locale": "fr", "formats": { "en": "mm/dd/yy", "fr": "dd/mm/yy" } }
//! }"#).unwrap();
//!
//! assert_eq!(config.models, vec!["Team", "Player"]);
//! assert_eq!(config.duration_resolver().date_format(), "%d/%m/%Y");
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AdminResult, ConfigError};
use crate::filter::{DEFAULT_FILTER_DATE_FORMAT, DateFormatProvider, DurationResolver};

/// Locale whose format is used when the active locale has none.
pub const FALLBACK_LOCALE: &str = "en";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Fully-qualified names of the models to expose, in display order.
    #[serde(default)]
    pub models: Vec<String>,

    /// Report model names that cannot be loaded.
    #[serde(default = "default_true")]
    pub warn_on_missing_models: bool,

    /// Filter date formats.
    #[serde(default)]
    pub date_formats: LocaleDateFormats,
}

fn default_true() -> bool {
    true
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            warn_on_missing_models: true,
            date_formats: LocaleDateFormats::default(),
        }
    }
}

impl AdminConfig {
    /// Creates a configuration exposing the given models.
    pub fn new(models: Vec<String>) -> Self {
        Self {
            models,
            ..Default::default()
        }
    }

    /// Sets whether unresolvable model names are reported.
    pub fn with_warn_on_missing_models(mut self, warn: bool) -> Self {
        self.warn_on_missing_models = warn;
        self
    }

    /// Sets the filter date formats.
    pub fn with_date_formats(mut self, date_formats: LocaleDateFormats) -> Self {
        self.date_formats = date_formats;
        self
    }

    /// Parses a JSON configuration.
    pub fn from_json_str(json: &str) -> AdminResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            ConfigError::Invalid {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> AdminResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&contents)
    }

    /// Returns a duration resolver reading this configuration's formats.
    pub fn duration_resolver(&self) -> DurationResolver {
        DurationResolver::new(Arc::new(self.date_formats.clone()))
    }
}

/// Filter date formats per locale.
///
/// Formats use the `dd`, `mm`, `yy` tokens (e.g., `"dd/mm/yy"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleDateFormats {
    /// Active locale.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Format per locale.
    #[serde(default = "default_formats")]
    pub formats: HashMap<String, String>,
}

fn default_locale() -> String {
    FALLBACK_LOCALE.to_string()
}

fn default_formats() -> HashMap<String, String> {
    HashMap::from([(
        FALLBACK_LOCALE.to_string(),
        DEFAULT_FILTER_DATE_FORMAT.to_string(),
    )])
}

impl Default for LocaleDateFormats {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            formats: default_formats(),
        }
    }
}

impl LocaleDateFormats {
    /// Sets the active locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Adds or replaces the format for a locale.
    pub fn with_format(mut self, locale: impl Into<String>, format: impl Into<String>) -> Self {
        self.formats.insert(locale.into(), format.into());
        self
    }
}

impl DateFormatProvider for LocaleDateFormats {
    fn filter_date_format(&self) -> Option<String> {
        self.formats
            .get(&self.locale)
            .or_else(|| self.formats.get(FALLBACK_LOCALE))
            .cloned()
    }
}
