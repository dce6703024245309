//! Library metadata and the library-discovery seam.
//!
//! Library discovery itself (scanning sketchbook and platform library
//! directories) lives outside this crate. The orchestrator only asks a
//! [`LibraryResolver`] to turn a library name into [`LibraryMetadata`] and
//! treats the answer as read-only input.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Recognized source-file extensions for library compilation.
pub const SOURCE_EXTENSIONS: &[&str] = &["c", "cpp"];

/// Metadata for a resolved library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryMetadata {
    /// Library name as requested.
    pub name: String,
    /// Root directory of the library.
    pub root: PathBuf,
    /// File paths relative to `root`. May contain non-source files;
    /// only recognized source extensions are compiled.
    pub files: Vec<PathBuf>,
}

impl LibraryMetadata {
    /// Iterate over the library's compilable source files (relative paths).
    pub fn source_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.files.iter().filter(|f| is_source_file(f))
    }
}

/// Resolves a library name to its metadata for a given platform.
pub trait LibraryResolver {
    /// Look up a library by name. `None` means the library cannot be
    /// located; the caller degrades gracefully by skipping it.
    fn find_library(&self, platform_id: &str, name: &str) -> Option<LibraryMetadata>;
}

/// Check whether a path has a recognized source-file extension.
pub fn is_source_file(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_is_source_file() {
        assert!(is_source_file(Path::new("Servo.cpp")));
        assert!(is_source_file(Path::new("util/twi.c")));
        assert!(!is_source_file(Path::new("Servo.h")));
        assert!(!is_source_file(Path::new("keywords.txt")));
        assert!(!is_source_file(Path::new("README")));
    }

    #[test]
    fn test_source_files_filters_headers() {
        let meta = LibraryMetadata {
            name: "Servo".to_string(),
            root: PathBuf::from("/libs/Servo"),
            files: vec![
                PathBuf::from("Servo.cpp"),
                PathBuf::from("Servo.h"),
                PathBuf::from("examples/Sweep/Sweep.ino"),
            ],
        };

        let sources: Vec<_> = meta.source_files().collect();
        assert_eq!(sources, vec![&PathBuf::from("Servo.cpp")]);
    }
}
