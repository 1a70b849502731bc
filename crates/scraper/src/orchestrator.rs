// ABOUTME: Orchestrates one title scrape: validate, fetch, capture metadata, resolve fields, expand seasons.
// ABOUTME: Transport errors propagate untouched; missing fields never abort the run.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::dom::Document;
use crate::error::{Result, ScrapeError};
use crate::extractors::episodes::extract_season_page;
use crate::extractors::title::extract_title;
use crate::metadata;
use crate::model::Title;
use crate::resource::{FetchOptions, Fetcher};

static TITLE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^tt[0-9]{7,8}$").expect("valid identifier regex"));

/// Lifecycle of one scraped record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Empty,
    MetadataCaptured,
    FieldsPopulated,
    SeriesExpansion,
    Done,
}

struct Run<'a> {
    id: &'a str,
    stage: Stage,
}

impl<'a> Run<'a> {
    fn new(id: &'a str) -> Self {
        Self {
            id,
            stage: Stage::Empty,
        }
    }

    fn advance(&mut self, next: Stage) {
        debug!(id = self.id, from = ?self.stage, to = ?next, "scrape stage");
        self.stage = next;
    }
}

/// Fails with `InvalidId` unless `id` looks like `tt1234567` or `tt12345678`.
pub fn validate_id(id: &str) -> Result<()> {
    if TITLE_ID_RE.is_match(id) {
        Ok(())
    } else {
        Err(ScrapeError::invalid_id(id, "validate_id"))
    }
}

pub fn title_locator(id: &str) -> String {
    format!("/title/{}/", id)
}

pub fn season_locator(id: &str, season: u32) -> String {
    format!("/title/{}/episodes/?season={}", id, season)
}

/// Runs field extraction over fetched documents.
#[derive(Debug, Clone)]
pub struct Scraper<F> {
    fetcher: F,
    fetch_opts: FetchOptions,
    seasons: bool,
}

impl<F: Fetcher> Scraper<F> {
    /// `seasons` turns on season expansion for series.
    pub fn new(fetcher: F, fetch_opts: FetchOptions, seasons: bool) -> Self {
        Self {
            fetcher,
            fetch_opts,
            seasons,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn fetch_options(&self) -> &FetchOptions {
        &self.fetch_opts
    }

    /// Scrapes the title page of `id` and, for a series with season
    /// expansion on, one page per season in ascending order. Seasons
    /// without parsed episodes are left out.
    pub async fn scrape(&self, id: &str) -> Result<Title> {
        validate_id(id)?;
        let mut run = Run::new(id);

        let page = self.fetcher.fetch(&title_locator(id), &self.fetch_opts).await?;
        let mut title = {
            let doc = Document::parse(&page.text());
            let metadata = metadata::capture(&doc);
            run.advance(Stage::MetadataCaptured);
            let title = extract_title(id, &doc, &metadata);
            run.advance(Stage::FieldsPopulated);
            title
        };

        if self.seasons && title.is_series && !title.season_numbers.is_empty() {
            run.advance(Stage::SeriesExpansion);
            for number in title.season_numbers.clone() {
                let page = self
                    .fetcher
                    .fetch(&season_locator(id, number), &self.fetch_opts)
                    .await?;
                let season = extract_season_page(number, &page.text());
                debug!(id, season = number, episodes = season.episodes.count(), "season parsed");
                if !season.episodes.is_empty() {
                    title.seasons.put(number, season);
                }
            }
        }

        run.advance(Stage::Done);
        Ok(title)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::resource::Page;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Serves canned pages by locator and records every request.
    #[derive(Clone, Default)]
    pub(crate) struct StubFetcher {
        pages: HashMap<String, Page>,
        pub(crate) requests: Arc<Mutex<Vec<String>>>,
    }

    impl StubFetcher {
        pub(crate) fn page(mut self, locator: &str, html: &str) -> Self {
            self.pages
                .insert(locator.to_string(), Page::from_html(locator, html));
            self
        }

        pub(crate) fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl Fetcher for StubFetcher {
        async fn fetch(&self, locator: &str, _opts: &FetchOptions) -> Result<Page> {
            self.requests.lock().unwrap().push(locator.to_string());
            self.pages
                .get(locator)
                .cloned()
                .ok_or_else(|| ScrapeError::status(locator, "Fetch", 404))
        }
    }

    pub(crate) const SERIES_PAGE: &str = r#"<html><head>
        <script type="application/ld+json">{"@type":"TVSeries","name":"The Big Bang Theory"}</script>
        </head><body>
        <section class="ipc-page-section" data-testid="hero-parent">
            <h1 data-testid="hero__pageTitle"><span>The Big Bang Theory</span></h1>
            <ul class="ipc-inline-list" role="presentation"><li>TV Series</li><li>2007–2019</li><li>22m</li></ul>
        </section>
        <div data-testid="episodes-browse-episodes">
            <a href="/title/tt0898266/episodes/?season=2">2</a>
            <a href="/title/tt0898266/episodes/?season=1">1</a>
        </div>
    </body></html>"#;

    pub(crate) const SEASON_ONE: &str = r#"<html><body>
        <article class="episode-item-wrapper">
            <div><h4 data-testid="slate-list-card-title"><a href="/title/tt0775431/"><div>S1.E1 ∙ Pilot</div></a></h4>
            <span>Mon, Sep 24, 2007</span></div>
        </article>
        <article class="episode-item-wrapper">
            <div><h4 data-testid="slate-list-card-title"><a href="/title/tt1091289/"><div>S1.E2 ∙ The Big Bran Hypothesis</div></a></h4></div>
        </article>
    </body></html>"#;

    #[test]
    fn identifier_shapes() {
        assert!(validate_id("tt0816692").is_ok());
        assert!(validate_id("tt12345678").is_ok());
        for bad in ["", "tt123", "tt123456789", "nm0000190", " tt0816692", "TT0816692"] {
            assert!(validate_id(bad).unwrap_err().is_invalid_id(), "{bad}");
        }
    }

    #[tokio::test]
    async fn invalid_id_fails_before_fetching() {
        let fetcher = StubFetcher::default();
        let scraper = Scraper::new(fetcher.clone(), FetchOptions::default(), true);
        let err = scraper.scrape("tt12").await.unwrap_err();
        assert!(err.is_invalid_id());
        assert!(fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn empty_seasons_are_omitted() {
        let fetcher = StubFetcher::default()
            .page("/title/tt0898266/", SERIES_PAGE)
            .page("/title/tt0898266/episodes/?season=1", SEASON_ONE)
            .page("/title/tt0898266/episodes/?season=2", "<html><body></body></html>");
        let scraper = Scraper::new(fetcher.clone(), FetchOptions::default(), true);

        let title = scraper.scrape("tt0898266").await.unwrap();
        assert!(title.is_series);
        assert_eq!(title.season_numbers, vec![1, 2]);
        assert_eq!(title.seasons.count(), 1);
        let season = title.seasons.get(&1u32.into()).unwrap();
        assert_eq!(season.number, 1);
        let keys: Vec<String> = season.episodes.keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["s1e1", "s1e2"]);
        assert_eq!(
            fetcher.requested(),
            vec![
                "/title/tt0898266/",
                "/title/tt0898266/episodes/?season=1",
                "/title/tt0898266/episodes/?season=2",
            ]
        );
    }

    #[tokio::test]
    async fn seasons_are_skipped_unless_requested() {
        let fetcher = StubFetcher::default().page("/title/tt0898266/", SERIES_PAGE);
        let scraper = Scraper::new(fetcher.clone(), FetchOptions::default(), false);
        let title = scraper.scrape("tt0898266").await.unwrap();
        assert_eq!(title.season_numbers, vec![1, 2]);
        assert!(title.seasons.is_empty());
        assert_eq!(fetcher.requested(), vec!["/title/tt0898266/"]);
    }

    #[tokio::test]
    async fn season_fetch_errors_propagate() {
        let fetcher = StubFetcher::default()
            .page("/title/tt0898266/", SERIES_PAGE)
            .page("/title/tt0898266/episodes/?season=1", SEASON_ONE);
        let scraper = Scraper::new(fetcher, FetchOptions::default(), true);
        let err = scraper.scrape("tt0898266").await.unwrap_err();
        assert!(err.is_status());
    }

    #[tokio::test]
    async fn blank_page_gives_empty_record() {
        let fetcher = StubFetcher::default().page("/title/tt0000001/", "");
        let scraper = Scraper::new(fetcher, FetchOptions::default(), true);
        let title = scraper.scrape("tt0000001").await.unwrap();
        assert_eq!(title.id.as_deref(), Some("tt0000001"));
        assert_eq!(title.title, None);
        assert!(!title.is_series);
    }
}
