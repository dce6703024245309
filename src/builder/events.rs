//! Build event types.
//!
//! Events are delivered to observers over the channel returned by
//! [`Orchestrator::events`](crate::Orchestrator::events), and serialize to
//! one JSON object per line for machine-readable consumers.
//!
//! # Event Types
//!
//! - `includes-ready`: library include paths are final; project compilation
//!   may proceed
//! - `scope-progress`: a command in a scope finished successfully
//! - `scope-completed`: a scope drained its queue (fires once per scope)
//! - `scope-failed`: a command failed; the scope is halted
//! - `build-completed`: all three scopes completed (fires at most once)
//! - `build-failed`: some scope failed; `build-completed` will never fire
//!
//! # Stability
//!
//! The JSON schema should remain backwards compatible. New fields may be
//! added, but existing fields should not be removed or renamed.

use serde::Serialize;

use crate::core::scope::Scope;

/// An event emitted during the build.
///
/// Each event is serialized as a single JSON object per line.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum BuildEvent {
    /// Library resolution finished; the accumulated include set is final.
    IncludesReady {
        /// Names of the libraries that resolved.
        libraries: Vec<String>,
        /// Names that could not be resolved and were skipped.
        unresolved: Vec<String>,
    },

    /// A command in `scope` completed successfully.
    ScopeProgress {
        scope: Scope,
        /// Commands completed so far (1-based).
        position: usize,
        /// Commands enqueued so far.
        length: usize,
    },

    /// A scope drained its queue.
    ScopeCompleted { scope: Scope },

    /// A command failed; no further commands in `scope` will run.
    ScopeFailed { scope: Scope, error: String },

    /// Core, libs, and project all completed.
    BuildCompleted,

    /// A scope failed. The other scopes are not cancelled, but the build
    /// can no longer complete.
    BuildFailed { scope: Scope, error: String },
}

impl BuildEvent {
    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
