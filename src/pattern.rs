//! Removal pattern compiled from user text
//!
//! A pattern is a regular expression anchored at the end of the name it is
//! tested against, so `node_modules` matches `node_modules` and
//! `my_node_modules` but not `node_modules_old`.

use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

use regex::Regex;

use crate::error::{CleanError, Result};

/// What a pattern is tested against when looking for matched directories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// The last path segment only (same rule the counter uses).
    #[default]
    BaseName,
    /// The whole joined path, root prefix included.
    FullPath,
}

/// Compiled, end-anchored removal pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile user text into an end-anchored pattern.
    pub fn new(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(CleanError::MissingInput);
        }
        let regex =
            Regex::new(&format!("(?:{})$", text)).map_err(|source| CleanError::InvalidPattern {
                pattern: text.to_string(),
                source,
            })?;
        Ok(Self {
            source: text.to_string(),
            regex,
        })
    }

    /// Use a caller-compiled regex as is; no anchor is added.
    pub fn from_regex(regex: Regex) -> Self {
        Self {
            source: regex.as_str().to_string(),
            regex,
        }
    }

    /// The text the pattern was built from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Test a single path segment.
    pub fn matches_name(&self, name: &OsStr) -> bool {
        self.regex.is_match(&name.to_string_lossy())
    }

    /// Test a path according to `mode`.
    pub fn matches_path(&self, path: &Path, mode: MatchMode) -> bool {
        match mode {
            MatchMode::BaseName => path.file_name().is_some_and(|n| self.matches_name(n)),
            MatchMode::FullPath => self.regex.is_match(&path.to_string_lossy()),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
