//! Per-file compile units.

use std::path::PathBuf;

use crate::core::scope::Scope;

/// The ephemeral record used to render one compile command.
///
/// A unit is constructed per source file, written into a configuration
/// snapshot (`source_file`, `object_file`, `includes`), rendered through the
/// scope's recipe pattern, and discarded. It is never persisted.
#[derive(Debug, Clone)]
pub struct CompileUnit {
    /// Scope the rendered command is enqueued under.
    pub scope: Scope,
    /// Absolute path to the source file.
    pub source_file: PathBuf,
    /// Path the object file should be written to.
    pub object_file: PathBuf,
    /// Pre-formatted include flags (`-Ia -Ib ...`).
    pub includes: String,
}

impl CompileUnit {
    /// Source-file extension, used to select the recipe pattern
    /// (`recipe.<ext>.o.pattern`). Empty if the file has none.
    pub fn extension(&self) -> &str {
        self.source_file
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
    }
}
