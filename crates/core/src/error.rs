use std::path::PathBuf;

/// Engine-level error taxonomy.
///
/// Transient I/O and malformed records are skipped at their source and never
/// propagate as errors; the variants here are the failures that cross a
/// component boundary and need to be logged or surfaced once.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EngineError {
    /// No journal directory (or no journal files) could be found at startup.
    /// Fatal to the sync, non-fatal to the process: the engine stays idle.
    #[error("journal directory not found: {0}")]
    JournalDirMissing(PathBuf),

    /// The remote bodies service could not be reached or returned garbage.
    /// Degrades that one fetch to "no remote data".
    #[error("remote service unavailable: {0}")]
    RemoteUnavailable(String),

    /// A remote fetch completed after the tracked system changed.
    #[error("stale remote result for {requested} (now in {current})")]
    StaleRemote { requested: String, current: String },
}
