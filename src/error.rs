//! Error types for build orchestration.

use thiserror::Error;

use crate::core::scope::Scope;

/// Errors surfaced by the orchestration core.
#[derive(Debug, Error)]
pub enum Error {
    /// A recipe template references a configuration path with no value.
    /// Fatal to the single render; the malformed command is never enqueued.
    #[error("no value for `{path}` referenced by recipe template")]
    MissingVariable { path: String },

    /// A requested library cannot be located. Reported as a warning; the
    /// library's sources are skipped and the build continues.
    #[error("cannot find library `{name}` for platform `{platform}`")]
    UnresolvedLibrary { name: String, platform: String },

    /// A file-enumeration collaborator reported an error. Fatal to the
    /// scope: its queue is never populated, so the build cannot complete.
    #[error("failed to enumerate {scope} sources: {message}")]
    FileList { scope: Scope, message: String },

    /// The external runner reported a failed command. Halts the owning
    /// scope only.
    #[error("command failed in {scope} scope: {message}")]
    CommandFailed { scope: Scope, message: String },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
