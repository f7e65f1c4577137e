//! Filter engine.
//!
//! A filter maps field names to matchers and is AND-combined across fields.
//! The same value is rendered to a MongoDB query document for the server
//! backend and evaluated directly against stored documents for the
//! in-memory backend, so both backends share one set of semantics:
//!
//! - `Exact(value)` matches a field equal to `value`, or an array field
//!   holding an element equal to `value`. Numbers compare by value.
//!   A missing field only matches `Exact(Null)`.
//! - `Pattern` matches a string field, or an array field holding a string
//!   element, against a regular expression, optionally case-insensitive.
//!
//! An empty filter matches every record. No OR, range or negation.

use std::fmt;

use mongodb::bson::{self, Bson, Document};
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while building a filter.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("filter must be a JSON object")]
    NotAnObject,

    #[error("unsupported filter operator: {0}")]
    UnsupportedOperator(String),

    #[error("missing or non-string $regex for field '{0}'")]
    MissingRegex(String),

    #[error("unsupported regex option: {0}")]
    UnsupportedOption(char),

    #[error("invalid pattern for field '{field}': {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid value for field '{field}': {source}")]
    InvalidValue {
        field: String,
        #[source]
        source: bson::ser::Error,
    },
}

/// Compiled regular expression matcher.
#[derive(Debug, Clone)]
struct Pattern {
    source: String,
    case_insensitive: bool,
    compiled: Regex,
}

impl Pattern {
    fn new(field: &str, source: &str, case_insensitive: bool) -> Result<Self, FilterError> {
        let compiled = RegexBuilder::new(source)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|source| FilterError::InvalidPattern {
                field: field.to_string(),
                source,
            })?;

        Ok(Self {
            source: source.to_string(),
            case_insensitive,
            compiled,
        })
    }

    fn is_match(&self, text: &str) -> bool {
        self.compiled.is_match(text)
    }

    fn to_bson(&self) -> Bson {
        Bson::RegularExpression(bson::Regex {
            pattern: self.source.clone(),
            options: if self.case_insensitive { "i".into() } else { String::new() },
        })
    }
}

/// How a single field is matched.
#[derive(Debug, Clone)]
enum Matcher {
    Exact(Bson),
    Pattern(Pattern),
}

impl Matcher {
    fn matches(&self, candidates: &[&Bson]) -> bool {
        match self {
            Matcher::Exact(expected) => {
                if candidates.is_empty() {
                    return matches!(expected, Bson::Null);
                }
                candidates.iter().any(|value| match value {
                    Bson::Array(items) => {
                        values_equal(value, expected)
                            || items.iter().any(|item| values_equal(item, expected))
                    }
                    _ => values_equal(value, expected),
                })
            }
            Matcher::Pattern(pattern) => candidates.iter().any(|value| match value {
                Bson::String(s) => pattern.is_match(s),
                Bson::Array(items) => items
                    .iter()
                    .any(|item| matches!(item, Bson::String(s) if pattern.is_match(s))),
                _ => false,
            }),
        }
    }
}

/// Field-to-matcher mapping, AND-combined.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(String, Matcher)>,
}

impl Filter {
    /// Empty filter, matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    #[must_use]
    pub fn eq(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.with_clause(field.into(), Matcher::Exact(value.into()))
    }

    /// Require `field` to match the regular expression `pattern`.
    pub fn pattern(
        self,
        field: impl Into<String>,
        pattern: &str,
        case_insensitive: bool,
    ) -> Result<Self, FilterError> {
        let field = field.into();
        let pattern = Pattern::new(&field, pattern, case_insensitive)?;
        Ok(self.with_clause(field, Matcher::Pattern(pattern)))
    }

    /// Whole-value, case-insensitive equality on `field`.
    ///
    /// `name` is escaped, so it is never interpreted as a pattern.
    pub fn name_ci(field: impl Into<String>, name: &str) -> Result<Self, FilterError> {
        Self::new().pattern(field, &format!("^{}$", regex::escape(name)), true)
    }

    /// Parse a filter from a JSON object.
    ///
    /// Values are exact matches unless given as `{"$regex": .., "$options": "i"}`.
    pub fn from_json(value: &Value) -> Result<Self, FilterError> {
        let object = value.as_object().ok_or(FilterError::NotAnObject)?;
        let mut filter = Self::new();

        for (field, value) in object {
            if field.starts_with('$') {
                return Err(FilterError::UnsupportedOperator(field.clone()));
            }

            match value {
                Value::Object(map) if map.keys().any(|k| k.starts_with('$')) => {
                    if let Some(key) = map.keys().find(|k| *k != "$regex" && *k != "$options") {
                        return Err(FilterError::UnsupportedOperator(key.clone()));
                    }
                    let pattern = map
                        .get("$regex")
                        .and_then(Value::as_str)
                        .ok_or_else(|| FilterError::MissingRegex(field.clone()))?;
                    let options = map.get("$options").and_then(Value::as_str).unwrap_or("");
                    let case_insensitive = parse_options(options)?;
                    filter = filter.pattern(field.as_str(), pattern, case_insensitive)?;
                }
                other => {
                    let bson = bson::to_bson(other).map_err(|source| FilterError::InvalidValue {
                        field: field.clone(),
                        source,
                    })?;
                    filter = filter.eq(field.as_str(), bson);
                }
            }
        }

        Ok(filter)
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Check whether a stored document satisfies every clause.
    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses.iter().all(|(field, matcher)| {
            let mut candidates = Vec::new();
            collect_values(doc, field, &mut candidates);
            matcher.matches(&candidates)
        })
    }

    /// Render as a MongoDB query document.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        for (field, matcher) in &self.clauses {
            let value = match matcher {
                Matcher::Exact(value) => value.clone(),
                Matcher::Pattern(pattern) => pattern.to_bson(),
            };
            doc.insert(field.clone(), value);
        }
        doc
    }

    // Last clause for a field wins.
    fn with_clause(mut self, field: String, matcher: Matcher) -> Self {
        match self.clauses.iter_mut().find(|(f, _)| *f == field) {
            Some(existing) => existing.1 = matcher,
            None => self.clauses.push((field, matcher)),
        }
        self
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_document())
    }
}

fn parse_options(options: &str) -> Result<bool, FilterError> {
    let mut case_insensitive = false;
    for c in options.chars() {
        match c {
            'i' => case_insensitive = true,
            other => return Err(FilterError::UnsupportedOption(other)),
        }
    }
    Ok(case_insensitive)
}

/// Resolve a dotted path, descending into sub-documents and arrays of them.
fn collect_values<'a>(doc: &'a Document, path: &str, out: &mut Vec<&'a Bson>) {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };

    let Some(value) = doc.get(head) else {
        return;
    };

    match rest {
        None => out.push(value),
        Some(rest) => match value {
            Bson::Document(inner) => collect_values(inner, rest, out),
            Bson::Array(items) => {
                for item in items {
                    if let Bson::Document(inner) = item {
                        collect_values(inner, rest, out);
                    }
                }
            }
            _ => {}
        },
    }
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(d) => Some(*d),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use serde_json::json;

    fn record(name: &str) -> Document {
        doc! {
            "modName": name,
            "author": "Bart",
            "tags": ["a", "b"],
            "views": 3_i64,
            "comments": [{ "username": "bob", "content": "hi" }],
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = Filter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&record("Foo")));
        assert!(filter.matches(&Document::new()));
    }

    #[test]
    fn test_clauses_are_anded() {
        let filter = Filter::new().eq("modName", "Foo").eq("author", "Bart");
        assert!(filter.matches(&record("Foo")));

        let filter = Filter::new().eq("modName", "Foo").eq("author", "Lisa");
        assert!(!filter.matches(&record("Foo")));
    }

    #[test]
    fn test_prefix_pattern_case_insensitive() {
        let filter = Filter::new().pattern("modName", "^Foo", true).unwrap();
        assert!(filter.matches(&record("foobar")));
        assert!(!filter.matches(&record("Baz")));

        let filter = Filter::new().pattern("modName", "^Foo", false).unwrap();
        assert!(!filter.matches(&record("foobar")));
    }

    #[test]
    fn test_name_ci_is_anchored_and_escaped() {
        let filter = Filter::name_ci("modName", "Foo.Bar").unwrap();
        assert!(filter.matches(&record("foo.bar")));
        assert!(!filter.matches(&record("FooXBar")));
        assert!(!filter.matches(&record("Foo.Bar2")));
    }

    #[test]
    fn test_array_membership() {
        assert!(Filter::new().eq("tags", "a").matches(&record("Foo")));
        assert!(!Filter::new().eq("tags", "c").matches(&record("Foo")));
        assert!(Filter::new().pattern("tags", "^B$", true).unwrap().matches(&record("Foo")));
    }

    #[test]
    fn test_numbers_compare_by_value() {
        assert!(Filter::new().eq("views", 3_i32).matches(&record("Foo")));
        assert!(Filter::new().eq("views", 3.0).matches(&record("Foo")));
        assert!(!Filter::new().eq("views", 4_i64).matches(&record("Foo")));
    }

    #[test]
    fn test_missing_field_only_matches_null() {
        assert!(!Filter::new().eq("slug", "x").matches(&record("Foo")));
        assert!(Filter::new().eq("slug", Bson::Null).matches(&record("Foo")));
    }

    #[test]
    fn test_dotted_path_into_array_of_documents() {
        assert!(Filter::new().eq("comments.username", "bob").matches(&record("Foo")));
        assert!(!Filter::new().eq("comments.username", "eve").matches(&record("Foo")));
    }

    #[test]
    fn test_to_document() {
        let filter = Filter::new()
            .eq("author", "Bart")
            .pattern("modName", "^Foo", true)
            .unwrap();
        let doc = filter.to_document();

        assert_eq!(doc.get_str("author").unwrap(), "Bart");
        match doc.get("modName") {
            Some(Bson::RegularExpression(re)) => {
                assert_eq!(re.pattern, "^Foo");
                assert_eq!(re.options, "i");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_later_clause_replaces_earlier() {
        let filter = Filter::new().eq("author", "Lisa").eq("author", "Bart");
        assert_eq!(filter.to_document().len(), 1);
        assert!(filter.matches(&record("Foo")));
    }

    #[test]
    fn test_from_json() {
        let filter = Filter::from_json(&json!({
            "author": "Bart",
            "modName": { "$regex": "^foo", "$options": "i" },
        }))
        .unwrap();

        assert!(filter.matches(&record("FooBar")));
        assert!(!filter.matches(&record("Baz")));
    }

    #[test]
    fn test_from_json_rejects_other_operators() {
        assert!(matches!(
            Filter::from_json(&json!({ "views": { "$gt": 1 } })),
            Err(FilterError::UnsupportedOperator(op)) if op == "$gt"
        ));
        assert!(matches!(
            Filter::from_json(&json!({ "$or": [] })),
            Err(FilterError::UnsupportedOperator(_))
        ));
        assert!(matches!(
            Filter::from_json(&json!({ "modName": { "$regex": "a", "$options": "x" } })),
            Err(FilterError::UnsupportedOption('x'))
        ));
        assert!(matches!(Filter::from_json(&json!([1])), Err(FilterError::NotAnObject)));
    }

    #[test]
    fn test_from_json_requires_string_regex() {
        assert!(matches!(
            Filter::from_json(&json!({ "modName": { "$options": "i" } })),
            Err(FilterError::MissingRegex(field)) if field == "modName"
        ));
        assert!(matches!(
            Filter::from_json(&json!({ "modName": { "$regex": 1 } })),
            Err(FilterError::MissingRegex(field)) if field == "modName"
        ));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            Filter::new().pattern("modName", "(", false),
            Err(FilterError::InvalidPattern { .. })
        ));
    }
}
