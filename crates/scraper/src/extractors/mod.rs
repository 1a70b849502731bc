// ABOUTME: Field extraction engine: per-field resolvers over a parsed title, season or search page.
// ABOUTME: Each resolver tries its markup location first and falls back to the embedded metadata.

//! Field extraction engine.
//!
//! Submodules:
//! - `containers`: the named page regions (hero, info list, cast block) resolvers start from.
//! - `title`: title page resolvers and [`title::extract_title_page`].
//! - `episodes`: season number discovery and season page episode lists.
//! - `tech_specs`: the technical specifications section.
//! - `search`: the JSON search suggestion payload.

pub mod containers;
pub mod episodes;
pub mod search;
pub mod tech_specs;
pub mod title;

use once_cell::sync::Lazy;
use regex::Regex;

static TITLE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/title/(tt[0-9]{7,8})/").expect("valid title id regex"));

static NAME_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/name/(nm[0-9]{7,8})/").expect("valid name id regex"));

/// Title identifier embedded in a `/title/tt.../` link.
pub fn title_id_from_link(link: &str) -> Option<String> {
    TITLE_ID_RE.captures(link).map(|caps| caps[1].to_string())
}

/// Person identifier embedded in a `/name/nm.../` link.
pub fn name_id_from_link(link: &str) -> Option<String> {
    NAME_ID_RE.captures(link).map(|caps| caps[1].to_string())
}

/// Cleaned text, or `None` when nothing but whitespace remains.
pub(crate) fn non_empty(text: &str) -> Option<String> {
    let cleaned = crate::normalize::clean(text);
    (!cleaned.is_empty()).then_some(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_come_from_anchored_link_paths() {
        assert_eq!(
            title_id_from_link("/title/tt0816692/?ref_=tt_mlt").as_deref(),
            Some("tt0816692")
        );
        assert_eq!(
            name_id_from_link("https://www.imdb.com/name/nm0000190/").as_deref(),
            Some("nm0000190")
        );
        assert_eq!(title_id_from_link("/title/tt12/"), None);
        assert_eq!(name_id_from_link("/title/tt0816692/"), None);
    }

    #[test]
    fn non_empty_drops_blank_text() {
        assert_eq!(non_empty("  \n "), None);
        assert_eq!(non_empty(" a&amp;b ").as_deref(), Some("a&b"));
    }
}
