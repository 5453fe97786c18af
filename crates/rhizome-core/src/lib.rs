//! Rhizome Core Library
//!
//! Core logic for the content link-graph index: filename metadata
//! parsing, link extraction, alias resolution, the two-pass index
//! builder and the cache snapshot wire format.
//! No IO dependencies, pure logic only.
//!

pub mod alias;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod filename;
pub mod index;
pub mod model;

pub use cache::CacheSnapshot;
pub use config::SiteConfig;
pub use error::IndexError;
pub use filename::{extract_slug_from_filename, parse_filename};
pub use index::{IndexBuilder, IndexStats, LinkIndex};
pub use model::{
    BackLink, CorpusEntry, DocumentId, DocumentMetadata, LinkFormat, LinkReference,
    LinkedReference, ScannedDocument,
};
