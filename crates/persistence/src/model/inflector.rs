//! Name inflections for model names.

use std::sync::LazyLock;

use regex::Regex;

static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z\d]+)([A-Z][a-z])").expect("valid regex"));

static WORD_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("valid regex"));

/// Converts a CamelCase name to snake_case. Namespace separators become `/`.
///
/// ```
/// use helios_admin_persistence::model::inflector::underscore;
///
/// assert_eq!(underscore("BlogPost"), "blog_post");
/// assert_eq!(underscore("Blog::Post"), "blog/post");
/// assert_eq!(underscore("HTMLParser"), "html_parser");
/// ```
pub fn underscore(name: &str) -> String {
    let word = name.replace("::", "/");
    let word = ACRONYM_BOUNDARY.replace_all(&word, "${1}_${2}");
    let word = WORD_BOUNDARY.replace_all(&word, "${1}_${2}");
    word.replace('-', "_").to_lowercase()
}

/// Strips the namespace from a name (`"Blog::Post"` -> `"Post"`).
pub fn demodulize(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

/// Turns an underscored name into a human label (`"blog_post"` -> `"Blog post"`).
pub fn humanize(word: &str) -> String {
    let word = word.strip_suffix("_id").unwrap_or(word).replace('_', " ");
    let mut chars = word.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// URL-safe identifier for a model name (`"Blog::Post"` -> `"blog~post"`).
pub fn to_param(name: &str) -> String {
    name.split("::").map(underscore).collect::<Vec<_>>().join("~")
}

/// Form parameter key for a model name (`"Blog::Post"` -> `"blog_post"`).
pub fn param_key(name: &str) -> String {
    name.split("::").map(underscore).collect::<Vec<_>>().join("_")
}

/// Default foreign key pointing at a model (`"Blog::Post"` -> `"post_id"`).
pub fn foreign_key(name: &str) -> String {
    format!("{}_id", underscore(demodulize(name)))
}
