//! Shell-style command-line splitting.
//!
//! Rendered recipe commands are single strings with shell quoting, e.g.
//! `"/opt/avr/bin/avr-gcc" -c -Os "-I/cores/arduino" "/src/wiring.c"`.
//! [`split`] breaks such a string into argv words without involving an
//! actual shell: whitespace separates words, single and double quotes group
//! them, and backslash escapes the next character outside single quotes.

use anyhow::{bail, Result};

/// Split a command line into argv words.
pub fn split(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    'outer: while let Some(ch) = chars.next() {
        match ch {
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                for c in chars.by_ref() {
                    if c == '\'' {
                        continue 'outer;
                    }
                    current.push(c);
                }
                bail!("unterminated single quote in command: {line}");
            }
            '"' => {
                in_word = true;
                while let Some(c) = chars.next() {
                    match c {
                        '"' => continue 'outer,
                        '\\' => match chars.next() {
                            Some(escaped) => current.push(escaped),
                            None => bail!("trailing backslash in command: {line}"),
                        },
                        _ => current.push(c),
                    }
                }
                bail!("unterminated double quote in command: {line}");
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some(escaped) => current.push(escaped),
                    None => bail!("trailing backslash in command: {line}"),
                }
            }
            _ => {
                in_word = true;
                current.push(ch);
            }
        }
    }

    if in_word {
        words.push(current);
    }

    Ok(words)
}
