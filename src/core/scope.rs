//! Build scope identifiers.
//!
//! A scope is one of the three independent compile categories. The scopes
//! have no data dependency on one another until link time, so their queues
//! are free to run concurrently.

use serde::{Deserialize, Serialize};

/// One of the three independent build categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Platform runtime sources (cores/ and variants/).
    Core,
    /// Library sources resolved by name.
    Libs,
    /// User project sources.
    Project,
}

impl Scope {
    /// All scopes, in the order they are reported.
    pub const ALL: [Scope; 3] = [Scope::Core, Scope::Libs, Scope::Project];

    /// Get the scope name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Core => "core",
            Scope::Libs => "libs",
            Scope::Project => "project",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_names() {
        assert_eq!(Scope::Core.as_str(), "core");
        assert_eq!(Scope::Libs.as_str(), "libs");
        assert_eq!(Scope::Project.as_str(), "project");
    }

    #[test]
    fn test_scope_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Scope::Libs).unwrap(), "\"libs\"");
    }
}
