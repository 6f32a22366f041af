//! Preview and clean runs
//!
//! A session wires the three pieces together the way the interactive shell
//! does: count for an estimate, traverse, and for every match either just
//! report it (preview) or delete it (clean), advancing progress each time.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::Level;

use crate::delete::{DeleteReport, Deleter};
use crate::error::{CleanError, Result};
use crate::logging::{SharedSink, default_sink};
use crate::pattern::Pattern;
use crate::progress::{Progress, ProgressUpdate};
use crate::tree::{CancelToken, CleanerConfig, Traverser, check_root, count};

/// What to do with each match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Report matches only
    #[default]
    Preview,
    /// Delete every match
    Clean,
}

/// Result of one run.
#[derive(Debug, Clone, Serialize)]
pub struct CleanSummary {
    pub root: PathBuf,
    pub pattern: String,
    pub mode: Mode,
    /// Matches predicted by the counter (0 = unknown)
    pub estimate: usize,
    pub matched: usize,
    /// Matched directories, sorted
    pub matches: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<DeleteReport>,
    pub dirs_scanned: usize,
    pub read_errors: usize,
    pub cancelled: bool,
}

impl CleanSummary {
    /// Completion message shown to the user.
    pub fn message(&self) -> &'static str {
        match (self.mode, self.matched) {
            (_, 0) => "No matching files/folders found",
            (Mode::Preview, _) => "All matching files/folders have been listed",
            (Mode::Clean, _) => "All matching files/folders have been deleted",
        }
    }
}

/// One validated run over a root directory.
pub struct Session {
    root: PathBuf,
    pattern: Pattern,
    mode: Mode,
    config: CleanerConfig,
    sink: SharedSink,
    cancel: Option<CancelToken>,
}

impl Session {
    /// Validate inputs. Fails before any work starts.
    pub fn new(root: impl Into<PathBuf>, pattern: &str, mode: Mode) -> Result<Self> {
        let root = root.into();
        if root.as_os_str().is_empty() || pattern.is_empty() {
            return Err(CleanError::MissingInput);
        }
        let pattern = Pattern::new(pattern)?;
        check_root(&root)?;

        Ok(Self {
            root,
            pattern,
            mode,
            config: CleanerConfig::default(),
            sink: default_sink(),
            cancel: None,
        })
    }

    pub fn with_config(mut self, config: CleanerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Count matches for the progress estimate; 0 when the count failed.
    pub fn estimate(&self) -> usize {
        match count(&self.root, &self.pattern) {
            Ok(n) => n,
            Err(e) => {
                self.sink.log(
                    Level::WARN,
                    &format!("Could not estimate matches under {}: {}", self.root.display(), e),
                );
                0
            }
        }
    }

    /// Run to completion, calling `on_progress` after every match.
    ///
    /// `on_progress` may be called from several threads at once.
    pub fn run<P>(&self, on_progress: P) -> CleanSummary
    where
        P: Fn(&Path, ProgressUpdate) + Sync,
    {
        let estimate = self.estimate();
        let progress = Progress::new(estimate);
        let matches = Mutex::new(Vec::new());
        let deleted = Mutex::new(DeleteReport::default());

        let deleter = match self.mode {
            Mode::Clean => Some(Deleter::new(&self.config).with_sink(self.sink.clone())),
            Mode::Preview => None,
        };

        let mut traverser = Traverser::new(self.config.clone()).with_sink(self.sink.clone());
        if let Some(token) = &self.cancel {
            traverser = traverser.with_cancel(token.clone());
        }

        let traversal = traverser.traverse(&self.root, &self.pattern, |path| {
            match &deleter {
                Some(deleter) => {
                    self.sink
                        .log(Level::INFO, &format!("Deleting {}...", path.display()));
                    let report = deleter.delete(path);
                    let mut total = deleted.lock().unwrap_or_else(PoisonError::into_inner);
                    *total = total.merge(report);
                }
                None => {
                    self.sink
                        .log(Level::INFO, &format!("Found {}...", path.display()));
                }
            }
            matches
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(path.to_path_buf());
            on_progress(path, progress.advance());
        });

        let mut matches = matches.into_inner().unwrap_or_else(PoisonError::into_inner);
        matches.sort();

        CleanSummary {
            root: self.root.clone(),
            pattern: self.pattern.to_string(),
            mode: self.mode,
            estimate,
            matched: traversal.matches,
            matches,
            deleted: deleter
                .is_some()
                .then(|| deleted.into_inner().unwrap_or_else(PoisonError::into_inner)),
            dirs_scanned: traversal.dirs_scanned,
            read_errors: traversal.read_errors,
            cancelled: traversal.cancelled,
        }
    }
}
