//! Dotted-path-addressable configuration trees.
//!
//! Platform, board, and CPU definitions arrive as nested fragments and are
//! deep-merged into a single [`ConfigTree`]. Recipe rendering takes a
//! [`snapshot`](ConfigTree::snapshot) per source file, so per-file writes
//! (`source_file`, `object_file`, `includes`) never leak across files or
//! scopes.
//!
//! Tables are ordered (`BTreeMap`), which keeps merges order-stable and the
//! serialized form deterministic.

pub mod interpolate;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use interpolate::render;

/// A configuration value: a scalar or a nested table.
///
/// The untagged representation deserializes directly from JSON and TOML
/// documents, the formats board and platform definitions arrive in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Boolean scalar, rendered as `true`/`false`.
    Bool(bool),
    /// Integer scalar, rendered in decimal.
    Integer(i64),
    /// Floating-point scalar.
    Float(f64),
    /// String scalar, rendered as-is.
    String(String),
    /// Nested table.
    Table(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Create an empty table.
    pub fn table() -> Self {
        ConfigValue::Table(BTreeMap::new())
    }

    /// Parse a fragment from a JSON document.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a fragment from a TOML document.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Borrow the nested table, if this value is one.
    pub fn as_table(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            ConfigValue::Table(map) => Some(map),
            _ => None,
        }
    }

    /// The deterministic string form used for placeholder substitution.
    /// Tables have none.
    pub fn scalar_string(&self) -> Option<String> {
        match self {
            ConfigValue::Bool(b) => Some(b.to_string()),
            ConfigValue::Integer(i) => Some(i.to_string()),
            ConfigValue::Float(f) => Some(f.to_string()),
            ConfigValue::String(s) => Some(s.clone()),
            ConfigValue::Table(_) => None,
        }
    }

    /// Deep-merge `other` into `self`. Tables merge key-by-key; any other
    /// pairing replaces the existing value wholesale.
    pub fn merge_from(&mut self, other: &ConfigValue) {
        match (self, other) {
            (ConfigValue::Table(dst), ConfigValue::Table(src)) => {
                for (key, value) in src {
                    match dst.get_mut(key) {
                        Some(existing) => existing.merge_from(value),
                        None => {
                            dst.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
            (dst, src) => *dst = src.clone(),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Integer(i)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

/// A dotted-path-addressable configuration store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTree {
    root: BTreeMap<String, ConfigValue>,
}

impl ConfigTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        ConfigTree::default()
    }

    /// Build a tree by deep-merging fragments in order. Later fragments
    /// override earlier ones at the leaf level; nested tables merge
    /// key-by-key. Inputs are left untouched.
    pub fn from_fragments<'a>(fragments: impl IntoIterator<Item = &'a ConfigValue>) -> Self {
        let mut tree = ConfigTree::new();
        for fragment in fragments {
            tree.merge_fragment(fragment);
        }
        tree
    }

    /// Deep-merge one fragment into this tree. Non-table fragments are
    /// ignored: there is no path for a bare scalar to live under.
    pub fn merge_fragment(&mut self, fragment: &ConfigValue) {
        if let ConfigValue::Table(src) = fragment {
            for (key, value) in src {
                match self.root.get_mut(key) {
                    Some(existing) => existing.merge_from(value),
                    None => {
                        self.root.insert(key.clone(), value.clone());
                    }
                }
            }
        }
    }

    /// Dotted-path lookup. Returns `None` if no value exists along the
    /// path; a read never fails and never mutates the tree.
    pub fn get(&self, path: &str) -> Option<&ConfigValue> {
        let mut current: Option<&ConfigValue> = None;
        for segment in path.split('.') {
            let table = match current {
                None => &self.root,
                Some(ConfigValue::Table(map)) => map,
                Some(_) => return None,
            };
            current = table.get(segment);
            current?;
        }
        current
    }

    /// Scalar string at `path`, if the path holds a scalar.
    pub fn get_str(&self, path: &str) -> Option<String> {
        self.get(path).and_then(ConfigValue::scalar_string)
    }

    /// Dotted-path write. Intermediate tables are created as needed; a
    /// scalar in the middle of the path is replaced by a table.
    pub fn set(&mut self, path: &str, value: impl Into<ConfigValue>) {
        let mut segments = path.split('.').peekable();
        let mut table = &mut self.root;
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                table.insert(segment.to_string(), value.into());
                return;
            }
            let entry = table
                .entry(segment.to_string())
                .or_insert_with(ConfigValue::table);
            if !matches!(entry, ConfigValue::Table(_)) {
                *entry = ConfigValue::table();
            }
            table = match entry {
                ConfigValue::Table(map) => map,
                _ => unreachable!(),
            };
        }
    }

    /// A fully independent deep copy. The clone shares no mutable
    /// sub-structure with the original.
    pub fn snapshot(&self) -> ConfigTree {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(text: &str) -> ConfigValue {
        ConfigValue::from_json(text).unwrap()
    }

    #[test]
    fn test_merge_is_order_sensitive() {
        let a = json(r#"{"a": 1}"#);
        let b = json(r#"{"a": 2}"#);
        let tree = ConfigTree::from_fragments([&a, &b]);
        assert_eq!(tree.get("a"), Some(&ConfigValue::Integer(2)));

        let tree = ConfigTree::from_fragments([&b, &a]);
        assert_eq!(tree.get("a"), Some(&ConfigValue::Integer(1)));
    }

    #[test]
    fn test_merge_nested_tables_key_by_key() {
        let a = json(r#"{"a": {"x": 1}}"#);
        let b = json(r#"{"a": {"y": 2}}"#);
        let tree = ConfigTree::from_fragments([&a, &b]);
        assert_eq!(tree.get("a.x"), Some(&ConfigValue::Integer(1)));
        assert_eq!(tree.get("a.y"), Some(&ConfigValue::Integer(2)));
    }

    #[test]
    fn test_merge_leaves_inputs_untouched() {
        let a = json(r#"{"a": {"x": 1}}"#);
        let b = json(r#"{"a": {"x": 2}}"#);
        let _ = ConfigTree::from_fragments([&a, &b]);
        assert_eq!(a, json(r#"{"a": {"x": 1}}"#));
        assert_eq!(b, json(r#"{"a": {"x": 2}}"#));
    }

    #[test]
    fn test_get_missing_path_is_none() {
        let tree = ConfigTree::from_fragments([&json(r#"{"compiler": {"path": "gcc"}}"#)]);
        assert!(tree.get("compiler.flags").is_none());
        assert!(tree.get("nothing.at.all").is_none());
        // a read through a scalar is unset, not an error
        assert!(tree.get("compiler.path.deeper").is_none());
    }

    #[test]
    fn test_set_creates_intermediate_tables() {
        let mut tree = ConfigTree::new();
        tree.set("runtime.ide.path", "/opt/arduino");
        assert_eq!(tree.get_str("runtime.ide.path").unwrap(), "/opt/arduino");
        assert!(tree.get("runtime.ide").unwrap().as_table().is_some());
    }

    #[test]
    fn test_set_replaces_scalar_in_the_middle() {
        let mut tree = ConfigTree::new();
        tree.set("build.mcu", "atmega328p");
        tree.set("build.mcu.variant", "p");
        assert_eq!(tree.get_str("build.mcu.variant").unwrap(), "p");
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut tree = ConfigTree::new();
        tree.set("build.f_cpu", "16000000L");

        let mut snap = tree.snapshot();
        snap.set("source_file", "/tmp/wiring.c");
        snap.set("build.f_cpu", "8000000L");

        assert!(tree.get("source_file").is_none());
        assert_eq!(tree.get_str("build.f_cpu").unwrap(), "16000000L");
        assert_eq!(snap.get_str("build.f_cpu").unwrap(), "8000000L");
    }

    #[test]
    fn test_scalar_string_forms() {
        assert_eq!(ConfigValue::Bool(true).scalar_string().unwrap(), "true");
        assert_eq!(ConfigValue::Integer(-42).scalar_string().unwrap(), "-42");
        assert_eq!(ConfigValue::from("x").scalar_string().unwrap(), "x");
        assert!(ConfigValue::table().scalar_string().is_none());
    }

    #[test]
    fn test_from_toml_fragment() {
        let fragment = ConfigValue::from_toml(
            r#"
            [compiler]
            path = "{runtime.ide.path}/hardware/tools/avr/bin/"
            warning_flags = "-w"
            "#,
        )
        .unwrap();
        let tree = ConfigTree::from_fragments([&fragment]);
        assert_eq!(tree.get_str("compiler.warning_flags").unwrap(), "-w");
    }
}
