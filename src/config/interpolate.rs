//! Recipe template interpolation.
//!
//! A recipe pattern is a command template containing `{dotted.path}`
//! placeholders, e.g.
//!
//! ```text
//! "{compiler.path}{compiler.c.cmd}" {compiler.c.flags} {includes} "{source_file}" -o "{object_file}"
//! ```
//!
//! [`render`] resolves each placeholder against a configuration snapshot.
//! A placeholder with no value aborts the render; no partial string is ever
//! returned, so a malformed command cannot reach a queue.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::ConfigTree;
use crate::error::{Error, Result};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)\}").expect("placeholder regex is valid")
});

/// Render `template` against `config`.
///
/// Pure: the snapshot is not mutated, and the same template against the
/// same snapshot always yields the same output. Non-string scalars use
/// their deterministic string form (decimal integers, `true`/`false`).
/// A table has no string form and counts as missing.
pub fn render(template: &str, config: &ConfigTree) -> Result<String> {
    let mut output = String::with_capacity(template.len());
    let mut last_end = 0;

    for captures in PLACEHOLDER.captures_iter(template) {
        let whole = captures.get(0).expect("match 0 always present");
        let path = &captures[1];

        let value = config
            .get(path)
            .and_then(|v| v.scalar_string())
            .ok_or_else(|| Error::MissingVariable {
                path: path.to_string(),
            })?;

        output.push_str(&template[last_end..whole.start()]);
        output.push_str(&value);
        last_end = whole.end();
    }

    output.push_str(&template[last_end..]);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> ConfigTree {
        let mut tree = ConfigTree::new();
        for (path, value) in pairs {
            tree.set(path, *value);
        }
        tree
    }

    #[test]
    fn test_render_substitutes_paths() {
        let tree = config(&[
            ("compiler.path", "/opt/avr/bin/"),
            ("compiler.c.cmd", "avr-gcc"),
            ("source_file", "/src/wiring.c"),
        ]);
        let out = render("{compiler.path}{compiler.c.cmd} -c {source_file}", &tree).unwrap();
        assert_eq!(out, "/opt/avr/bin/avr-gcc -c /src/wiring.c");
    }

    #[test]
    fn test_render_without_placeholders_is_identity() {
        let tree = ConfigTree::new();
        assert_eq!(render("avr-ar rcs core.a", &tree).unwrap(), "avr-ar rcs core.a");
    }

    #[test]
    fn test_render_missing_variable_fails() {
        let tree = config(&[("compiler.path", "gcc")]);
        let err = render("{compiler.path} -o {object_file}", &tree).unwrap_err();
        match err {
            Error::MissingVariable { path } => assert_eq!(path, "object_file"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_render_table_value_counts_as_missing() {
        let mut tree = ConfigTree::new();
        tree.set("compiler.flags.extra", "-Os");
        let err = render("{compiler.flags}", &tree).unwrap_err();
        assert!(matches!(err, Error::MissingVariable { path } if path == "compiler.flags"));
    }

    #[test]
    fn test_render_numbers_and_booleans() {
        let mut tree = ConfigTree::new();
        tree.set("build.mcu_speed", 16000000i64);
        tree.set("build.usb", true);
        let out = render("-DF_CPU={build.mcu_speed} -DUSB={build.usb}", &tree).unwrap();
        assert_eq!(out, "-DF_CPU=16000000 -DUSB=true");
    }

    #[test]
    fn test_render_is_idempotent() {
        let tree = config(&[("a.b", "x"), ("c", "y")]);
        let first = render("{a.b} {c} {a.b}", &tree).unwrap();
        let second = render("{a.b} {c} {a.b}", &tree).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "x y x");
    }

    #[test]
    fn test_render_leaves_unmatched_braces_alone() {
        // bare {} does not match the placeholder grammar and passes
        // through untouched
        let tree = config(&[("cmd", "find")]);
        let out = render("{cmd} . -exec rm {} \\;", &tree).unwrap();
        assert_eq!(out, "find . -exec rm {} \\;");
    }
}
