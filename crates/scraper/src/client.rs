// ABOUTME: The Client facade: film lookup by identifier or keyword, keyword search, offline page parsing.
// ABOUTME: Wraps the HTTP fetcher and orchestrator with an optional lookaside cache of flattened titles.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{Cache, MemoryCache};
use crate::error::Result;
use crate::extractors::search::{parse_suggestions, suggestion_locator};
use crate::extractors::title::extract_title_page;
use crate::model::{Collection, Record, SearchResult, Title};
use crate::options::{ClientBuilder, Options};
use crate::resource::{Fetcher, HttpFetcher};
use crate::orchestrator::{validate_id, Scraper};

/// Entry point for scraping titles and searching the catalog.
#[derive(Clone)]
pub struct Client {
    opts: Options,
    scraper: Scraper<HttpFetcher>,
    cache: Option<Arc<dyn Cache>>,
}

impl Client {
    /// Create a builder for configuring a Client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn new(opts: Options) -> Result<Self> {
        let http_client = opts.http_client.clone().unwrap_or_else(|| {
            reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::limited(10))
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .cookie_store(true)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .expect("failed to build HTTP client")
        });

        let fetcher = HttpFetcher::new(http_client, &opts.base_url)?;
        let scraper = Scraper::new(fetcher, opts.fetch_options(), opts.seasons);
        let cache: Option<Arc<dyn Cache>> = if opts.cache {
            Some(Arc::new(MemoryCache::new()))
        } else {
            None
        };

        Ok(Self {
            opts,
            scraper,
            cache,
        })
    }

    /// Use `cache` for title lookups instead of the built-in memory cache.
    /// Enables caching.
    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.opts.cache = true;
        self.cache = Some(cache);
        self
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Scrapes one title.
    ///
    /// Input starting with "tt" is taken as an identifier (and must be a
    /// valid one); anything else is searched and the first result used. A
    /// search without results gives an empty [`Title`].
    pub async fn film(&self, id_or_keyword: &str) -> Result<Title> {
        let id = if id_or_keyword.starts_with("tt") {
            id_or_keyword.to_string()
        } else {
            let results = self.search(id_or_keyword).await?;
            match results.first().and_then(|result| result.id.clone()) {
                Some(id) => id,
                None => {
                    debug!(keyword = id_or_keyword, "no search result");
                    return Ok(Title::default());
                }
            }
        };

        validate_id(&id)?;
        if let Some(title) = self.cached(&id) {
            return Ok(title);
        }

        let title = self.scraper.scrape(&id).await?;

        if let Some(cache) = &self.cache {
            let stored = cache.add(&id, Value::Object(title.to_array()), Some(self.opts.cache_ttl));
            debug!(id = %id, stored, "cached title");
        }
        Ok(title)
    }

    fn cached(&self, id: &str) -> Option<Title> {
        let cache = self.cache.as_ref()?;
        if !cache.has(id) {
            debug!(id, "cache miss");
            return None;
        }
        match Title::new_from_value(cache.get(id)?) {
            Ok(title) => {
                debug!(id, "cache hit");
                Some(title)
            }
            Err(e) => {
                warn!(id, error = %e, "cached title could not be rebuilt, scraping again");
                None
            }
        }
    }

    /// Searches titles, people and companies by keyword.
    pub async fn search(&self, keyword: &str) -> Result<Collection<SearchResult>> {
        let locator = suggestion_locator(&self.opts.suggestion_url, keyword);
        let page = self
            .scraper
            .fetcher()
            .fetch(&locator, self.scraper.fetch_options())
            .await?;
        let results = parse_suggestions(&page.text());
        debug!(keyword, results = results.count(), "search finished");
        Ok(results)
    }

    /// Extracts a title from a page saved earlier. No season pages are
    /// fetched.
    pub fn parse_html(&self, id: &str, html: &str) -> Result<Title> {
        validate_id(id)?;
        Ok(extract_title_page(id, html))
    }
}
