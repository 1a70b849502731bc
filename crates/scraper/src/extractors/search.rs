// ABOUTME: Parses the JSON search suggestion payload into SearchResult records.
// ABOUTME: Invalid JSON or a payload without "d" yields an empty collection, never an error.

use serde_json::Value;
use tracing::debug;

use crate::metadata::{resolve_str, resolve_u64};
use crate::model::{Collection, SearchResult};

/// Suggestion endpoint URL for `keyword`. The keyword is decoded first so
/// already encoded input is not encoded twice.
pub fn suggestion_locator(suggestion_url: &str, keyword: &str) -> String {
    let decoded = urlencoding::decode(keyword)
        .map(|k| k.into_owned())
        .unwrap_or_else(|_| keyword.to_string());
    format!(
        "{}/{}.json?includeVideos=0",
        suggestion_url.trim_end_matches('/'),
        urlencoding::encode(decoded.trim())
    )
}

pub fn parse_suggestions(body: &str) -> Collection<SearchResult> {
    let payload: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "search payload is not JSON");
            return Collection::default();
        }
    };
    let Some(Value::Array(entries)) = payload.get("d") else {
        debug!("search payload has no result list");
        return Collection::default();
    };

    entries.iter().filter_map(search_result).collect()
}

/// Entries lacking an id or a label are skipped.
fn search_result(entry: &Value) -> Option<SearchResult> {
    Some(SearchResult {
        id: Some(resolve_str("id", entry)?),
        title: Some(resolve_str("l", entry)?),
        image: resolve_str("i.imageUrl", entry),
        year: resolve_u64("y", entry).and_then(|y| i32::try_from(y).ok()),
        kind: resolve_str("q", entry),
        category: resolve_str("qid", entry),
        starring: resolve_str("s", entry),
        rank: resolve_u64("rank", entry),
    })
}
