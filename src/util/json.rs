//! JSON files that may carry comments (`package.json`, `tsconfig.json`).

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::util::fs::read_to_string;

/// Remove `//` line comments and `/* */` block comments outside strings.
///
/// Line breaks inside block comments are kept so serde_json error positions
/// still point at the right line.
pub fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        let next = chars.peek().copied();
        match (c, next) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    if skipped == '\n' {
                        out.push('\n');
                    }
                    prev = skipped;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Deserialize JSON that may contain comments.
pub fn from_str<T: DeserializeOwned>(contents: &str) -> Result<T> {
    serde_json::from_str(&strip_comments(contents)).context("failed to parse JSON")
}

/// Read and deserialize a JSON file that may contain comments.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = read_to_string(path)?;
    serde_json::from_str(&strip_comments(&contents))
        .with_context(|| format!("failed to parse JSON: {}", path.display()))
}
