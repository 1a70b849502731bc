// ABOUTME: Title page field resolvers: markup first, embedded JSON-LD metadata as fallback.
// ABOUTME: extract_title_page runs them all over one parsed page and assembles a Title.

//! Title page resolvers.
//!
//! Every resolver takes the parsed page and its captured metadata document
//! and returns the field's value, or `None`/empty when neither source has
//! it. A missing field is never an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::dom::{Document, DomNode};
use crate::extractors::containers::{cast_block, hero, info_items};
use crate::extractors::{episodes, name_id_from_link, non_empty, tech_specs, title_id_from_link};
use crate::metadata::{self, resolve, resolve_f64, resolve_str, resolve_strings, resolve_u64};
use crate::model::{CastMember, Collection, SimilarTitle, Title};
use crate::normalize::{absolutize_url, clean, parse_count};

static SERIES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(TV Series|Serie TV)").expect("valid series regex"));

static ORIGINAL_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(Original title|Titolo originale)\s*:?\s*").expect("valid original title regex")
});

static YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]{4})(\s*[–\-]\s*([0-9]{4}))?").expect("valid year regex")
});

static LENGTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([0-9]+[hm]\s*[0-9]+[hm])|([0-9]+[hm])").expect("valid length regex")
});

static POPULARITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9][0-9.,]*").expect("valid popularity regex"));

const TITLE_HEADING: &str = r#"h1[data-testid="hero__pageTitle"]"#;
const RATING_SCORE: &str = r#"div[data-testid="hero-rating-bar__aggregate-rating__score"]"#;
const POPULARITY_SCORE: &str = r#"div[data-testid="hero-rating-bar__popularity__score"]"#;
const REVIEW_ITEMS: &str = r#"ul[data-testid="reviewContent-all-reviews"] li"#;
const GENRE_CHIPS: &str = r#"div[data-testid="interests"] a.ipc-chip span"#;
const POSTER_IMAGE: &str = r#"div[data-testid="hero-media__poster"] img.ipc-image"#;
const TRAILER_LINK: &str = r#"a[data-testid="video-player-slate-overlay"]"#;
const PLOT: &str = r#"p[data-testid="plot"]"#;
const CAST_ITEM: &str = r#"div[data-testid="title-cast-item"]"#;
const CAST_ACTOR: &str = r#"a[data-testid="title-cast-item__actor"]"#;
const CAST_CHARACTER: &str = r#"a[data-testid="cast-item-characters-link"]"#;
const SIMILAR_CARDS: &str =
    r#"section.ipc-page-section[data-testid="MoreLikeThis"] div.ipc-poster-card[role="group"]"#;

/// Runs every title resolver over one title page.
///
/// `is_series` is resolved before the season numbers, which are empty for
/// anything that is not a series. Seasons themselves need further fetches
/// and are left empty here.
pub fn extract_title_page(id: &str, html: &str) -> Title {
    let doc = Document::parse(html);
    let metadata = metadata::capture(&doc);
    extract_title(id, &doc, &metadata)
}

/// [`extract_title_page`] over an already parsed page and metadata document.
pub fn extract_title(id: &str, doc: &Document, metadata: &Value) -> Title {
    let is_series = is_series(doc, metadata);
    let title = title(doc, metadata);
    Title {
        id: Some(id.to_string()),
        original_title: original_title(doc).or_else(|| title.clone()),
        title,
        year: year(doc, metadata),
        length: length(doc, metadata),
        rating: rating(doc, metadata),
        rating_votes: rating_votes(doc, metadata),
        popularity_score: popularity_score(doc),
        meta_score: meta_score(doc),
        genres: genres(doc, metadata),
        poster: poster(doc, metadata),
        trailer: trailer(doc, metadata),
        plot: plot(doc, metadata),
        is_series,
        cast: cast(doc, metadata),
        similars: similars(doc),
        season_numbers: episodes::season_numbers(doc, is_series),
        seasons: Collection::default(),
        technical_specs: tech_specs::technical_specs(doc),
    }
}

/// True when an info item says "TV Series", else when the metadata type is a
/// series or season.
pub fn is_series(doc: &Document, metadata: &Value) -> bool {
    if info_items(doc)
        .iter()
        .any(|item| SERIES_RE.is_match(&item.text()))
    {
        return true;
    }
    matches!(
        resolve_str("@type", metadata).as_deref(),
        Some("TVSeries" | "TVSeason")
    )
}

pub fn title(doc: &Document, metadata: &Value) -> Option<String> {
    hero(doc)
        .and_then(|hero| hero.find_one(&format!("{} span", TITLE_HEADING)))
        .and_then(|span| non_empty(&span.text()))
        .or_else(|| resolve_str("name", metadata).and_then(|name| non_empty(&name)))
}

/// The "Original title: ..." line after the heading, marker stripped.
///
/// Only `div`s following the heading are considered, the siblings themselves
/// and then their descendants, and only a div's own text is matched so a
/// wrapper never contributes its children's text. Falls back to the display
/// title in [`extract_title`].
pub fn original_title(doc: &Document) -> Option<String> {
    let heading = hero(doc)?.find_one(TITLE_HEADING)?;
    heading
        .following_siblings()
        .into_iter()
        .flat_map(|sibling| {
            let mut divs = if sibling.tag_name() == "div" {
                vec![sibling]
            } else {
                vec![]
            };
            divs.extend(sibling.find("div"));
            divs
        })
        .map(|div| clean(&div.own_text()))
        .find(|text| ORIGINAL_TITLE_RE.is_match(text))
        .and_then(|text| non_empty(&ORIGINAL_TITLE_RE.replace(&text, "")))
}

/// First four-digit year among the info items (a series' "2007–2019" gives
/// 2007), else the year of `datePublished`.
pub fn year(doc: &Document, metadata: &Value) -> Option<i32> {
    info_items(doc)
        .iter()
        .find_map(|item| {
            YEAR_RE
                .captures(&item.text())
                .and_then(|caps| caps[1].parse().ok())
        })
        .or_else(|| {
            resolve_str("datePublished", metadata)
                .and_then(|date| date.get(..4).and_then(|y| y.parse().ok()))
        })
}

/// Runtime as displayed ("2h 49m"), else the ISO duration rewritten the same
/// way ("PT2H49M" becomes "2h 49m").
pub fn length(doc: &Document, metadata: &Value) -> Option<String> {
    info_items(doc)
        .iter()
        .find_map(|item| LENGTH_RE.find(&item.text()).map(|m| clean(m.as_str())))
        .or_else(|| {
            let duration = resolve_str("duration", metadata)?;
            let rewritten = duration
                .replace("PT", "")
                .replace('H', "h ")
                .replace('M', "m ");
            non_empty(&rewritten)
        })
}

pub fn rating(doc: &Document, metadata: &Value) -> Option<f64> {
    hero(doc)
        .and_then(|hero| hero.find_one(&format!("{} span", RATING_SCORE)))
        .and_then(|span| clean(&span.text()).replace(',', ".").parse().ok())
        .or_else(|| resolve_f64("aggregateRating.ratingValue", metadata))
}

/// Vote count shown under the score ("2.1M"), else `aggregateRating.ratingCount`.
pub fn rating_votes(doc: &Document, metadata: &Value) -> Option<u64> {
    hero(doc)
        .and_then(|hero| hero.find_one(RATING_SCORE))
        .and_then(|score| score.parent())
        .and_then(|bar| bar.find("div").into_iter().last())
        .and_then(|votes| parse_count(&votes.text()))
        .or_else(|| resolve_u64("aggregateRating.ratingCount", metadata))
}

/// Popularity rank; thousands separators are dropped ("1,234" is 1234).
pub fn popularity_score(doc: &Document) -> Option<u64> {
    let text = hero(doc)?.find_one(POPULARITY_SCORE)?.text();
    let digits: String = POPULARITY_RE
        .find(&text)?
        .as_str()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// The score printed just before the "Metascore" label in the hero's review list.
pub fn meta_score(doc: &Document) -> Option<u32> {
    hero(doc)?.find(REVIEW_ITEMS).into_iter().find_map(|item| {
        let spans: Vec<String> = item
            .find("span.three-Elements span")
            .iter()
            .map(|span| clean(&span.text()))
            .collect();
        let label = spans
            .iter()
            .position(|text| text.eq_ignore_ascii_case("metascore"))?;
        spans.get(label.checked_sub(1)?)?.parse().ok()
    })
}

pub fn genres(doc: &Document, metadata: &Value) -> Vec<String> {
    let chips: Vec<String> = hero(doc)
        .map(|hero| hero.find(GENRE_CHIPS))
        .unwrap_or_default()
        .iter()
        .filter_map(|chip| non_empty(&chip.text()))
        .collect();
    if !chips.is_empty() {
        return chips;
    }
    resolve_strings("genre", metadata)
        .iter()
        .filter_map(|genre| non_empty(genre))
        .collect()
}

pub fn poster(doc: &Document, metadata: &Value) -> Option<String> {
    hero(doc)
        .and_then(|hero| hero.find_one(POSTER_IMAGE))
        .and_then(|img| img.attr("src"))
        .filter(|src| !src.trim().is_empty())
        .map(|src| absolutize_url(&src))
        .or_else(|| resolve_str("image", metadata))
}

/// Trailer page link. Only site-relative links are rewritten.
pub fn trailer(doc: &Document, metadata: &Value) -> Option<String> {
    hero(doc)
        .and_then(|hero| hero.find_one(TRAILER_LINK))
        .and_then(|link| link.attr("href"))
        .filter(|href| !href.trim().is_empty())
        .map(|href| {
            if href.starts_with('/') {
                absolutize_url(&href)
            } else {
                href
            }
        })
        .or_else(|| resolve_str("trailer.url", metadata))
}

/// Long plot when the page carries one, else the first plot variant, else
/// the metadata description.
pub fn plot(doc: &Document, metadata: &Value) -> Option<String> {
    hero(doc)
        .and_then(|hero| hero.find_one(PLOT))
        .and_then(|p| {
            p.find_one(r#"span[data-testid="plot-xl"]"#)
                .or_else(|| p.find_one("span"))
                .map(|span| span.text())
                .or_else(|| Some(p.text()))
        })
        .and_then(|text| non_empty(&text))
        .or_else(|| resolve_str("description", metadata).and_then(|d| non_empty(&d)))
}

/// Top cast from the cast block. With no cast items on the page the
/// metadata `actor` list is used instead.
pub fn cast(doc: &Document, metadata: &Value) -> Collection<CastMember> {
    let items = cast_block(doc)
        .map(|block| block.find(CAST_ITEM))
        .unwrap_or_default();

    if items.is_empty() {
        return cast_from_metadata(metadata);
    }

    items
        .iter()
        .map(|item| {
            let actor = item.find_one(CAST_ACTOR);
            let link = actor
                .and_then(|a| a.attr("href"))
                .map(|href| absolutize_url(&href));
            CastMember {
                id: link.as_deref().and_then(name_id_from_link),
                image: item
                    .find_one("img")
                    .and_then(|img| img.attr("src"))
                    .map(|src| absolutize_url(&src)),
                actor: actor.and_then(|a| non_empty(&a.text())),
                link,
                character: item
                    .find_one(CAST_CHARACTER)
                    .and_then(|c| non_empty(&c.text())),
            }
        })
        .collect()
}

fn cast_from_metadata(metadata: &Value) -> Collection<CastMember> {
    let Value::Array(names) = resolve("actor.*.name", metadata) else {
        return Collection::default();
    };
    let urls = match resolve("actor.*.url", metadata) {
        Value::Array(urls) => urls,
        _ => vec![],
    };

    names
        .iter()
        .enumerate()
        .filter_map(|(i, name)| {
            let actor = name.as_str().and_then(non_empty)?;
            let link = urls
                .get(i)
                .and_then(Value::as_str)
                .map(absolutize_url);
            Some(CastMember {
                id: link.as_deref().and_then(name_id_from_link),
                actor: Some(actor),
                link,
                ..Default::default()
            })
        })
        .collect()
}

/// "More like this" cards. There is no metadata fallback.
pub fn similars(doc: &Document) -> Collection<SimilarTitle> {
    doc.find(SIMILAR_CARDS)
        .iter()
        .map(|card| {
            let link = card
                .find_one("a.ipc-poster-card__title")
                .and_then(|a| a.attr("href"))
                .map(|href| absolutize_url(&href));
            SimilarTitle {
                id: link.as_deref().and_then(title_id_from_link),
                title: card
                    .find_one(r#"span[data-testid="title"]"#)
                    .and_then(|span| non_empty(&span.text())),
                link,
            }
        })
        .collect()
}
