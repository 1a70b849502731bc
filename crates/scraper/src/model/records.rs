// ABOUTME: Record variants: Title, Episode, Season, SearchResult, TechnicalSpec, CastMember, SimilarTitle.
// ABOUTME: Every field is nullable or an empty collection so a lookup that finds nothing is still a record.

use serde::{Deserialize, Serialize};

use crate::model::collection::Collection;
use crate::model::record::Record;

/// Full detail for one title page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Title {
    pub id: Option<String>,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub year: Option<i32>,
    /// Display runtime, e.g. "2h 49m".
    pub length: Option<String>,
    pub rating: Option<f64>,
    pub rating_votes: Option<u64>,
    pub popularity_score: Option<u64>,
    pub meta_score: Option<u32>,
    pub genres: Vec<String>,
    pub poster: Option<String>,
    pub trailer: Option<String>,
    pub plot: Option<String>,
    pub is_series: bool,
    pub cast: Collection<CastMember>,
    pub similars: Collection<SimilarTitle>,
    pub season_numbers: Vec<u32>,
    /// Keyed by season number.
    pub seasons: Collection<Season>,
    pub technical_specs: Collection<TechnicalSpec>,
}

impl Record for Title {
    const NAME: &'static str = "Title";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "originalTitle",
        "year",
        "length",
        "rating",
        "ratingVotes",
        "popularityScore",
        "metaScore",
        "genres",
        "poster",
        "trailer",
        "plot",
        "isSeries",
        "cast",
        "similars",
        "seasonNumbers",
        "seasons",
        "technicalSpecs",
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Episode {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub vote_count: Option<u64>,
    pub poster: Option<String>,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    /// Air date as `YYYY-MM-DD`.
    pub release_date: Option<String>,
    pub link: Option<String>,
}

impl Record for Episode {
    const NAME: &'static str = "Episode";
    const FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "description",
        "rating",
        "voteCount",
        "poster",
        "season",
        "episode",
        "releaseDate",
        "link",
    ];
}

/// One season of a series and its episodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Season {
    pub number: u32,
    /// Keyed `s{season}e{episode}`.
    pub episodes: Collection<Episode>,
}

impl Season {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            episodes: Collection::default(),
        }
    }

    /// Files the episode under `s{number}e{episode}`. Episodes without a
    /// parsed number are keyed by their position instead (`s{number}e#{n}`).
    pub fn add_episode(&mut self, episode: Episode) {
        let key = match episode.episode {
            Some(n) => Self::episode_key(self.number, n),
            None => format!("s{}e#{}", self.number, self.episodes.count() + 1),
        };
        self.episodes.put(key, episode);
    }

    pub fn episode_key(season: u32, episode: u32) -> String {
        format!("s{}e{}", season, episode)
    }
}

impl Record for Season {
    const NAME: &'static str = "Season";
    const FIELDS: &'static [&'static str] = &["number", "episodes"];
}

/// One entry of the search suggestion payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchResult {
    pub id: Option<String>,
    pub title: Option<String>,
    pub image: Option<String>,
    pub year: Option<i32>,
    /// e.g. "TV series", "feature".
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// e.g. "tvSeries", "movie".
    pub category: Option<String>,
    pub starring: Option<String>,
    pub rank: Option<u64>,
}

impl Record for SearchResult {
    const NAME: &'static str = "SearchResult";
    const FIELDS: &'static [&'static str] = &[
        "id", "title", "image", "year", "type", "category", "starring", "rank",
    ];
}

/// A labelled row of the technical specifications section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct TechnicalSpec {
    pub name: String,
    pub value: String,
}

impl Record for TechnicalSpec {
    const NAME: &'static str = "TechnicalSpec";
    const FIELDS: &'static [&'static str] = &["name", "value"];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CastMember {
    pub id: Option<String>,
    pub image: Option<String>,
    pub actor: Option<String>,
    pub link: Option<String>,
    pub character: Option<String>,
}

impl Record for CastMember {
    const NAME: &'static str = "CastMember";
    const FIELDS: &'static [&'static str] = &["id", "image", "actor", "link", "character"];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SimilarTitle {
    pub id: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
}

impl Record for SimilarTitle {
    const NAME: &'static str = "SimilarTitle";
    const FIELDS: &'static [&'static str] = &["id", "title", "link"];
}
