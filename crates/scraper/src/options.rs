// ABOUTME: Configuration options for the scraper client: locale, season expansion, caching, endpoints.
// ABOUTME: ClientBuilder provides a fluent API for constructing Client instances with custom settings.

use std::collections::HashMap;
use std::time::Duration;

use crate::cache::DEFAULT_TTL;
use crate::client::Client;
use crate::error::Result;
use crate::normalize::BASE_URL;
use crate::resource::FetchOptions;

pub const SUGGESTION_URL: &str = "https://v3.sg.media-imdb.com/suggestion/x";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Configuration options for the scraper client.
#[derive(Debug, Clone)]
pub struct Options {
    /// Language of the scraped pages, e.g. "en", "it" or "pt-BR".
    pub locale: String,
    /// Fetch every season page of a series.
    pub seasons: bool,
    /// Look titles up in the cache before scraping them.
    pub cache: bool,
    pub cache_ttl: Duration,
    pub base_url: String,
    pub suggestion_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub headers: HashMap<String, String>,
    pub http_client: Option<reqwest::Client>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            seasons: false,
            cache: false,
            cache_ttl: DEFAULT_TTL,
            base_url: BASE_URL.to_string(),
            suggestion_url: SUGGESTION_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: BROWSER_USER_AGENT.to_string(),
            headers: HashMap::new(),
            http_client: None,
        }
    }
}

impl Options {
    /// Headers sent with every fetch: the locale's `Accept-Language` plus
    /// the custom headers, which win on conflict.
    pub fn fetch_options(&self) -> FetchOptions {
        let mut headers = HashMap::new();
        headers.insert("Accept-Language".to_string(), accept_language(&self.locale));
        for (key, value) in &self.headers {
            headers.insert(key.clone(), value.clone());
        }
        FetchOptions { headers }
    }
}

/// `Accept-Language` value for a locale. English asks for US English;
/// other languages fall back to English at a lower weight.
pub fn accept_language(locale: &str) -> String {
    let locale = locale.trim().replace('_', "-");
    let (lang, region) = match locale.split_once('-') {
        Some((lang, region)) => (lang.to_lowercase(), region.to_uppercase()),
        None => {
            let lang = locale.to_lowercase();
            let region = if lang == "en" || lang.is_empty() {
                "US".to_string()
            } else {
                lang.to_uppercase()
            };
            (lang, region)
        }
    };

    match lang.as_str() {
        "" | "en" => format!("en-{},en;q=0.5", region),
        _ => format!("{lang}-{region},{lang};q=0.9,en;q=0.5"),
    }
}

/// Builder for constructing Client instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    opts: Options,
}

impl ClientBuilder {
    /// Create a new ClientBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.opts.locale = locale.into();
        self
    }

    /// Enable or disable season expansion for series.
    pub fn seasons(mut self, seasons: bool) -> Self {
        self.opts.seasons = seasons;
        self
    }

    /// Enable or disable the title cache.
    pub fn cache(mut self, cache: bool) -> Self {
        self.opts.cache = cache;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.opts.cache_ttl = ttl;
        self
    }

    /// Origin of title and season pages.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.opts.base_url = base_url.into();
        self
    }

    /// Endpoint of the search suggestion payloads.
    pub fn suggestion_url(mut self, suggestion_url: impl Into<String>) -> Self {
        self.opts.suggestion_url = suggestion_url.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Build the Client with the configured options. Fails only on an
    /// unparseable base URL.
    pub fn build(self) -> Result<Client> {
        Client::new(self.opts)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let opts = Options::default();
        assert_eq!(opts.locale, "en");
        assert!(!opts.seasons);
        assert!(!opts.cache);
        assert_eq!(opts.cache_ttl, Duration::from_secs(31 * 24 * 60 * 60));
        assert_eq!(opts.base_url, "https://www.imdb.com");
        assert_eq!(opts.timeout, Duration::from_secs(30));
    }

    #[test]
    fn accept_language_per_locale() {
        assert_eq!(accept_language("en"), "en-US,en;q=0.5");
        assert_eq!(accept_language("en-GB"), "en-GB,en;q=0.5");
        assert_eq!(accept_language("it"), "it-IT,it;q=0.9,en;q=0.5");
        assert_eq!(accept_language("pt_br"), "pt-BR,pt;q=0.9,en;q=0.5");
    }

    #[test]
    fn custom_headers_override_locale() {
        let mut opts = Options {
            locale: "fr".to_string(),
            ..Default::default()
        };
        assert_eq!(
            opts.fetch_options().headers["Accept-Language"],
            "fr-FR,fr;q=0.9,en;q=0.5"
        );
        opts.headers
            .insert("Accept-Language".to_string(), "de".to_string());
        opts.headers.insert("X-Trace".to_string(), "1".to_string());
        let fetch = opts.fetch_options();
        assert_eq!(fetch.headers["Accept-Language"], "de");
        assert_eq!(fetch.headers["X-Trace"], "1");
    }
}
