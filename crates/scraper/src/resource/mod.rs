// ABOUTME: Document fetching: the Fetcher capability, its reqwest implementation and charset decoding.
// ABOUTME: 4xx/5xx become Status errors; other non-2xx answers become an empty page instead of failing.

use std::collections::HashMap;
use std::future::Future;

use bytes::Bytes;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, ScrapeError};

/// Per-request options derived from the client [`Options`](crate::Options).
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Sent with every request; includes the locale's `Accept-Language`.
    pub headers: HashMap<String, String>,
}

/// A fetched document.
#[derive(Debug, Clone)]
pub struct Page {
    pub status: u16,
    pub url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl Page {
    /// The document substituted for unexpected, non-error statuses.
    pub fn empty(url: impl Into<String>, status: u16) -> Self {
        Self {
            status,
            url: url.into(),
            content_type: None,
            body: Bytes::new(),
        }
    }

    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            status: 200,
            url: url.into(),
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: Bytes::from(html.into()),
        }
    }

    /// Decode the body using the content-type charset, else a detected one.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Retrieves documents by locator.
///
/// `locator` is an absolute URL or a path relative to the site origin.
pub trait Fetcher {
    fn fetch(&self, locator: &str, opts: &FetchOptions) -> impl Future<Output = Result<Page>> + Send;
}

/// [`Fetcher`] over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ScrapeError::invalid_input(base_url, "HttpFetcher::new", Some(e.into()))
        })?;
        Ok(Self { client, base_url })
    }

    /// Absolute URL for `locator`; relative locators are joined onto the base.
    pub fn resolve(&self, locator: &str) -> Result<Url> {
        let joined = match Url::parse(locator) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => self.base_url.join(locator),
            Err(e) => Err(e),
        };
        let url = joined.map_err(|e| {
            ScrapeError::invalid_input(locator, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(ScrapeError::invalid_input(
                locator,
                "Fetch",
                Some(anyhow::anyhow!("scheme must be http or https")),
            )),
        }
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, locator: &str, opts: &FetchOptions) -> Result<Page> {
        let url = self.resolve(locator)?;
        let target = url.to_string();

        let mut request = self.client.get(url);
        for (key, value) in &opts.headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(|e| transport_error(&target, e))?;

        let status = response.status();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_lowercase());
        debug!(url = %final_url, status = status.as_u16(), "fetched");

        if status.is_client_error() || status.is_server_error() {
            return Err(ScrapeError::status(target, "Fetch", status.as_u16()));
        }
        if !status.is_success() {
            warn!(url = %final_url, status = status.as_u16(), "unexpected status, using an empty document");
            return Ok(Page::empty(final_url, status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| transport_error(&target, e))?;

        Ok(Page {
            status: status.as_u16(),
            url: final_url,
            content_type,
            body,
        })
    }
}

fn transport_error(target: &str, e: reqwest::Error) -> ScrapeError {
    if e.is_timeout() {
        ScrapeError::timeout(target, "Fetch", Some(e.into()))
    } else {
        ScrapeError::fetch(target, "Fetch", Some(anyhow::anyhow!("request failed: {}", e)))
    }
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(encoding) = content_type
        .and_then(extract_charset)
        .and_then(|charset| encoding_rs::Encoding::for_label(charset.as_bytes()))
    {
        let (decoded, _, _) = encoding.decode(body);
        return decoded.into_owned();
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    content_type.to_lowercase().split(';').find_map(|part| {
        part.trim()
            .strip_prefix("charset=")
            .map(|charset| charset.trim_matches('"').trim_matches('\'').to_string())
    })
}
