// ABOUTME: Main library entry point for the IMDb scraper extraction engine.
// ABOUTME: Re-exports the public API: Client, ClientBuilder, Options, records, Collection and errors.

//! imdb-scraper - structured title, episode and search records from IMDb pages.
//!
//! Field resolvers read the rendered markup first and fall back to the page's
//! embedded JSON-LD metadata. Missing data yields empty fields, not errors.
//!
//! # Example
//!
//! ```no_run
//! use imdb_scraper::{Client, ScrapeError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ScrapeError> {
//!     let client = Client::builder().seasons(true).build()?;
//!     let title = client.film("tt0898266").await?;
//!     println!("{:?} ({:?})", title.title, title.year);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod dom;
pub mod error;
pub mod extractors;
pub mod metadata;
pub mod model;
pub mod normalize;
pub mod options;
pub mod orchestrator;
pub mod resource;

pub use crate::cache::{Cache, MemoryCache, DEFAULT_TTL};
pub use crate::client::Client;
pub use crate::error::{ErrorCode, Result, ScrapeError};
pub use crate::model::{
    CastMember, Collection, Episode, Key, Record, SearchResult, Season, SimilarTitle,
    TechnicalSpec, Title,
};
pub use crate::options::{ClientBuilder, Options};
pub use crate::resource::{FetchOptions, Fetcher, HttpFetcher, Page};
pub use crate::orchestrator::{validate_id, Scraper};
