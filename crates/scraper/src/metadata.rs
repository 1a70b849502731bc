// ABOUTME: Captures the page's embedded JSON-LD block and resolves dot paths against it.
// ABOUTME: "actor.*.name" style wildcards broadcast the remaining path over array elements.

//! Structured metadata fallback.
//!
//! Every title page embeds a `<script type="application/ld+json">` block
//! describing the subject. It is captured once per page and then consulted by
//! the field resolvers whenever the rendered markup lacks a value.

use serde_json::{Map, Value};
use tracing::debug;

use crate::dom::{Document, DomNode};

/// Parses the first embedded JSON-LD block that is valid JSON.
///
/// Pages without a parseable block yield an empty object; malformed metadata
/// is never an error.
pub fn capture(doc: &Document) -> Value {
    for script in doc.find("script[type='application/ld+json']") {
        let text = script.text();
        let content = text
            .trim()
            .trim_start_matches("<![CDATA[")
            .trim_end_matches("]]>")
            .trim();

        match serde_json::from_str::<Value>(content) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => {
                debug!(kind = type_name(&value), "captured structured metadata");
                return value;
            }
            Ok(_) => debug!("skipping scalar ld+json block"),
            Err(e) => debug!(error = %e, "skipping malformed ld+json block"),
        }
    }
    Value::Object(Map::new())
}

fn type_name(value: &Value) -> &'static str {
    value
        .get("@type")
        .and_then(Value::as_str)
        .map(|t| if t.starts_with("TV") { "series" } else { "title" })
        .unwrap_or("untyped")
}

/// Resolves a dot separated `path` against `root`.
///
/// Literal segments index objects by key (and arrays by position). A `*`
/// segment maps the rest of the path over every element of the current array
/// (or every value of the current object) and yields the array of results.
/// Missing segments resolve to `Value::Null`; resolution never fails.
pub fn resolve(path: &str, root: &Value) -> Value {
    let segments: Vec<&str> = path.split('.').collect();
    resolve_segments(&segments, root)
}

fn resolve_segments(segments: &[&str], current: &Value) -> Value {
    let Some((head, rest)) = segments.split_first() else {
        return current.clone();
    };

    if *head == "*" {
        let elements: Vec<&Value> = match current {
            Value::Array(items) => items.iter().collect(),
            Value::Object(map) => map.values().collect(),
            _ => return Value::Null,
        };
        return Value::Array(
            elements
                .into_iter()
                .map(|item| resolve_segments(rest, item))
                .collect(),
        );
    }

    let next = match current {
        Value::Object(map) => map.get(*head),
        Value::Array(items) => head.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    };
    match next {
        Some(value) => resolve_segments(rest, value),
        None => Value::Null,
    }
}

/// Resolves `path` to a string, accepting numbers as their textual form.
pub fn resolve_str(path: &str, root: &Value) -> Option<String> {
    match resolve(path, root) {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Resolves `path` to a float, accepting numeric strings ("8,7" included).
pub fn resolve_f64(path: &str, root: &Value) -> Option<f64> {
    match resolve(path, root) {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

/// Resolves `path` to an unsigned integer, accepting numeric strings.
pub fn resolve_u64(path: &str, root: &Value) -> Option<u64> {
    match resolve(path, root) {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Resolves `path` to a list of strings. A lone string becomes a one element
/// list; non-string entries are skipped.
pub fn resolve_strings(path: &str, root: &Value) -> Vec<String> {
    match resolve(path, root) {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s),
                _ => None,
            })
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s],
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn wildcard_maps_over_array() {
        let doc = json!({"actor": [{"name": "A"}, {"name": "B"}]});
        assert_eq!(resolve("actor.*.name", &doc), json!(["A", "B"]));
    }

    #[test]
    fn nested_wildcards() {
        let doc = json!({
            "seasons": [
                {"episodes": [{"name": "Pilot"}, {"name": "Two"}]},
                {"episodes": [{"name": "Three"}]}
            ]
        });
        assert_eq!(
            resolve("seasons.*.episodes.*.name", &doc),
            json!([["Pilot", "Two"], ["Three"]])
        );
    }

    #[test]
    fn missing_segments_are_null() {
        let doc = json!({"aggregateRating": {"ratingValue": 8.7}});
        assert_eq!(resolve("aggregateRating.ratingValue", &doc), json!(8.7));
        assert_eq!(resolve("aggregateRating.bestRating", &doc), Value::Null);
        assert_eq!(resolve("trailer.url", &doc), Value::Null);
        assert_eq!(resolve("actor.*.name", &doc), Value::Null);
        assert_eq!(resolve("aggregateRating.ratingValue.deeper", &doc), Value::Null);
    }

    #[test]
    fn wildcard_elements_missing_the_key_yield_null() {
        let doc = json!({"actor": [{"name": "A"}, {"url": "/name/nm1/"}]});
        assert_eq!(resolve("actor.*.name", &doc), json!(["A", null]));
        assert_eq!(resolve_strings("actor.*.name", &doc), vec!["A"]);
    }

    #[test]
    fn numeric_segment_indexes_arrays() {
        let doc = json!({"genre": ["Drama", "Sci-Fi"]});
        assert_eq!(resolve("genre.1", &doc), json!("Sci-Fi"));
        assert_eq!(resolve("genre.5", &doc), Value::Null);
    }

    #[test]
    fn typed_helpers() {
        let doc = json!({
            "aggregateRating": {"ratingValue": "8,6", "ratingCount": 2_100_000},
            "genre": "Drama",
            "name": "  "
        });
        assert_eq!(resolve_f64("aggregateRating.ratingValue", &doc), Some(8.6));
        assert_eq!(resolve_u64("aggregateRating.ratingCount", &doc), Some(2_100_000));
        assert_eq!(resolve_strings("genre", &doc), vec!["Drama"]);
        assert_eq!(resolve_str("name", &doc), None);
    }

    #[test]
    fn capture_takes_first_valid_block() {
        let doc = Document::parse(
            r#"<html><head>
                <script type="application/ld+json">{ not json</script>
                <script type="application/ld+json">{"@type":"Movie","name":"Heat"}</script>
                <script type="application/ld+json">{"@type":"Movie","name":"Other"}</script>
            </head><body></body></html>"#,
        );
        let metadata = capture(&doc);
        assert_eq!(metadata["name"], json!("Heat"));
    }

    #[test]
    fn capture_without_blocks_is_empty_object() {
        let doc = Document::parse("<html><body><p>nothing</p></body></html>");
        assert_eq!(capture(&doc), json!({}));
    }
}
