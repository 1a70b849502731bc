// ABOUTME: Season number discovery on title pages and episode lists on season pages.
// ABOUTME: Season/episode numbers are parsed from the "S1.E1 ∙ Pilot" display title, best effort.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::{Document, DomNode};
use crate::extractors::{non_empty, title_id_from_link};
use crate::model::{Episode, Season};
use crate::normalize::{absolutize_url, clean, parse_count, parse_date};

static SEASON_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/title/tt[0-9]+/episodes/?\?season=([0-9]+)").expect("valid season link regex")
});

static EPISODE_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)s([0-9]+)[\s.\-]*e([0-9]+)\s*[∙·|\-]?\s*").expect("valid episode token regex")
});

const EPISODE_BROWSER: &str = r#"div[data-testid="episodes-browse-episodes"]"#;
const EPISODE_ITEM: &str = "article.episode-item-wrapper";
const EPISODE_HEADING: &str = r#"h4[data-testid="slate-list-card-title"]"#;
const EPISODE_PLOT: &str = r#"div.ipc-html-content.ipc-html-content--base.ipc-html-content--display-inline[role="presentation"]"#;
const EPISODE_RATING: &str = r#"div[data-testid="ratingGroup--container"]"#;

/// Season numbers offered by a series page, ascending and deduplicated.
///
/// Read from the season `<select>` when present, else from `?season=N`
/// links. Always empty for a non-series.
pub fn season_numbers(doc: &Document, is_series: bool) -> Vec<u32> {
    if !is_series {
        return vec![];
    }
    let Some(browser) = doc.find_one(EPISODE_BROWSER) else {
        return vec![];
    };

    let mut numbers: Vec<u32> = browser
        .find("select#browse-episodes-season option")
        .iter()
        .filter_map(|option| option.attr("value")?.trim().parse().ok())
        .filter(|n| *n > 0)
        .collect();

    if numbers.is_empty() {
        numbers = browser
            .find("a")
            .iter()
            .filter_map(|a| {
                let href = a.attr("href")?;
                SEASON_LINK_RE.captures(&href)?[1].parse().ok()
            })
            .filter(|n| *n > 0)
            .collect();
    }

    numbers.sort_unstable();
    numbers.dedup();
    numbers
}

/// Splits "S1.E3 ∙ The Title" into `(Some(1), Some(3), "The Title")`.
/// Without a recognizable token both numbers are `None` and the title is
/// only cleaned.
pub fn parse_episode_title(raw: &str) -> (Option<u32>, Option<u32>, String) {
    let cleaned = clean(raw);
    match EPISODE_TOKEN_RE.captures(&cleaned) {
        Some(caps) => {
            let season = caps[1].parse().ok();
            let episode = caps[2].parse().ok();
            let token = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
            let mut title = cleaned.clone();
            title.replace_range(token, "");
            (season, episode, title.trim().to_string())
        }
        None => (None, None, cleaned),
    }
}

/// Episodes listed on one season page, in page order.
pub fn extract_episodes(doc: &Document) -> Vec<Episode> {
    doc.find(EPISODE_ITEM)
        .iter()
        .map(|item| {
            let heading = item.find_one(EPISODE_HEADING);
            let link = heading
                .and_then(|h| h.find_one("a"))
                .and_then(|a| a.attr("href"))
                .map(|href| absolutize_url(&href));
            let (season, episode, title) = heading
                .map(|h| parse_episode_title(&h.text()))
                .unwrap_or((None, None, String::new()));
            let rating_group = item.find_one(EPISODE_RATING);

            Episode {
                id: link.as_deref().and_then(title_id_from_link),
                title: (!title.is_empty()).then_some(title),
                description: item
                    .find_one(EPISODE_PLOT)
                    .and_then(|plot| non_empty(&plot.text())),
                rating: rating_group
                    .and_then(|g| g.find_one("span.ipc-rating-star--rating"))
                    .and_then(|r| non_empty(&r.text()))
                    .and_then(|r| r.replace(',', ".").parse().ok()),
                vote_count: rating_group
                    .and_then(|g| g.find_one("span.ipc-rating-star--voteCount"))
                    .and_then(|v| parse_count(&v.text())),
                poster: item
                    .find_one("img.ipc-image")
                    .and_then(|img| img.attr("src"))
                    .map(|src| absolutize_url(&src)),
                season,
                episode,
                release_date: heading
                    .and_then(|h| h.parent())
                    .and_then(|block| block.find_one("span"))
                    .and_then(|span| parse_date(&clean(&span.text()))),
                link,
            }
        })
        .collect()
}

/// Parses a season page into a [`Season`] keyed `s{n}e{e}`.
pub fn extract_season_page(number: u32, html: &str) -> Season {
    let doc = Document::parse(html);
    let mut season = Season::new(number);
    for episode in extract_episodes(&doc) {
        season.add_episode(episode);
    }
    season
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn episode_token_is_stripped_with_its_separator() {
        assert_eq!(
            parse_episode_title("S1.E1 ∙ Pilot"),
            (Some(1), Some(1), "Pilot".to_string())
        );
        assert_eq!(
            parse_episode_title("s02e10 - The Big Bran Hypothesis"),
            (Some(2), Some(10), "The Big Bran Hypothesis".to_string())
        );
        assert_eq!(
            parse_episode_title("Episode without token"),
            (None, None, "Episode without token".to_string())
        );
    }

    #[test]
    fn season_numbers_from_select_or_links() {
        let select = Document::parse(
            r#"<div data-testid="episodes-browse-episodes">
                <select id="browse-episodes-season">
                    <option value="">Season</option><option value="2">2</option>
                    <option value="1">1</option><option value="2">2</option><option value="0">x</option>
                </select>
            </div>"#,
        );
        assert_eq!(season_numbers(&select, true), vec![1, 2]);
        assert!(season_numbers(&select, false).is_empty());

        let links = Document::parse(
            r#"<div data-testid="episodes-browse-episodes">
                <a href="/title/tt0898266/episodes/?season=3">3</a>
                <a href="/title/tt0898266/episodes?season=1">1</a>
                <a href="/title/tt0898266/">top</a>
            </div>"#,
        );
        assert_eq!(season_numbers(&links, true), vec![1, 3]);
    }

    #[test]
    fn season_page_episodes() {
        let season = extract_season_page(
            1,
            r#"<html><body>
            <article class="episode-item-wrapper">
                <img class="ipc-image" src="https://m.media-amazon.com/ep1.jpg">
                <div>
                    <h4 data-testid="slate-list-card-title"><a href="/title/tt0775431/?ref_=ttep_ep1"><div>S1.E1 ∙ Pilot</div></a></h4>
                    <span>Mon, Sep 24, 2007</span>
                </div>
                <div class="ipc-html-content ipc-html-content--base ipc-html-content--display-inline" role="presentation">A pair of physicists meet their new neighbour.</div>
                <div data-testid="ratingGroup--container">
                    <span class="ipc-rating-star--rating">8,2</span>
                    <span class="ipc-rating-star--voteCount"> (12K)</span>
                </div>
            </article>
            <article class="episode-item-wrapper">
                <div><h4 data-testid="slate-list-card-title"><a href="/list/"><div>Unaired special</div></a></h4></div>
            </article>
            </body></html>"#,
        );

        let keys: Vec<String> = season.episodes.keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["s1e1", "s1e#2"]);

        let pilot = season.episodes.first().unwrap();
        assert_eq!(pilot.id.as_deref(), Some("tt0775431"));
        assert_eq!(pilot.title.as_deref(), Some("Pilot"));
        assert_eq!(pilot.release_date.as_deref(), Some("2007-09-24"));
        assert_eq!(pilot.rating, Some(8.2));
        assert_eq!(pilot.vote_count, Some(12_000));
        assert_eq!(
            pilot.link.as_deref(),
            Some("https://www.imdb.com/title/tt0775431/")
        );
        assert_eq!(
            pilot.description.as_deref(),
            Some("A pair of physicists meet their new neighbour.")
        );

        let special = season.episodes.values()[1];
        assert_eq!(special.id, None);
        assert_eq!(special.episode, None);
        assert_eq!(special.title.as_deref(), Some("Unaired special"));
        assert_eq!(special.release_date, None);
    }

    #[test]
    fn page_without_episodes_gives_empty_season() {
        let season = extract_season_page(2, "<html><body><p>No episodes</p></body></html>");
        assert_eq!(season.number, 2);
        assert!(season.episodes.is_empty());
    }
}
