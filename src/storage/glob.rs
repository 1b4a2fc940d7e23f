//! Path glob matching for object keys
//!
//! Object stores only list by prefix, so a glob is split into its literal
//! leading directories (used as the list prefix) and a regex that every
//! listed key is checked against. `*` and `?` never cross a `/`.

use crate::error::{Error, Result};
use regex::Regex;

/// A compiled path glob such as `song_data/*/*/*/*.json`
#[derive(Debug, Clone)]
pub struct GlobPattern {
    pattern: String,
    prefix: String,
    regex: Regex,
}

impl GlobPattern {
    /// Compile a glob
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = pattern.trim_matches('/');
        if pattern.is_empty() {
            return Err(Error::config("Glob pattern must not be empty"));
        }

        let mut regex = String::from("^");
        for (idx, segment) in pattern.split('/').enumerate() {
            if segment.is_empty() {
                return Err(Error::config(format!(
                    "Glob pattern '{pattern}' contains an empty segment"
                )));
            }
            if idx > 0 {
                regex.push('/');
            }
            regex.push_str(&segment_to_regex(segment));
        }
        regex.push('$');

        let regex = Regex::new(&regex)
            .map_err(|e| Error::config(format!("Invalid glob pattern '{pattern}': {e}")))?;

        Ok(Self {
            pattern: pattern.to_string(),
            prefix: literal_prefix(pattern),
            regex,
        })
    }

    /// The original pattern text
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Leading directories that contain no wildcard
    pub fn list_prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether a `/`-separated relative key matches
    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

fn segment_to_regex(segment: &str) -> String {
    let mut out = String::new();
    let mut literal = String::new();
    for c in segment.chars() {
        match c {
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if c == '*' { "[^/]*" } else { "[^/]" });
            }
            _ => literal.push(c),
        }
    }
    out.push_str(&regex::escape(&literal));
    out
}

fn literal_prefix(pattern: &str) -> String {
    let segments: Vec<&str> = pattern.split('/').collect();
    // The last segment names files, never a directory to list under.
    segments[..segments.len() - 1]
        .iter()
        .take_while(|s| !s.contains(['*', '?']))
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}
