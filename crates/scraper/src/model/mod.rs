// ABOUTME: Typed record model: the ordered Collection container and the fixed-schema records.
// ABOUTME: Records flatten to plain JSON mappings and rebuild from them for caching and output.

pub mod collection;
pub mod record;
pub mod records;

pub use collection::{Collection, Key};
pub use record::Record;
pub use records::{CastMember, Episode, Season, SearchResult, SimilarTitle, TechnicalSpec, Title};
