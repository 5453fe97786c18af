use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy for the index engine.
///
/// None of these propagate past the service API: the index is additive
/// to rendering, so every failure degrades to "index unavailable" or
/// "link unresolved" rather than failing a site build. An unresolved
/// reference is deliberately not represented here; it is a normal
/// outcome reported through the build stats.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The corpus root is missing or unlistable. Fatal to one build
    /// attempt; callers serve an empty index instead.
    #[error("corpus root {path:?} cannot be listed: {source}")]
    CorpusUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single document could not be read. Recovered by skipping the
    /// document.
    #[error("failed to read document {path:?}: {source}")]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted snapshot is unreadable or schema-mismatched.
    /// Recovered by an unconditional rebuild.
    #[error("cache snapshot {path:?} is unusable: {reason}")]
    CacheCorrupt { path: PathBuf, reason: String },
}
