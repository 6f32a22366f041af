//! Best-effort recursive deletion
//!
//! A matched directory is walked one level at a time on a bounded rayon
//! pool: every directory of a level is listed and its files removed, and its
//! subdirectories form the next level. Directories are then removed level by
//! level, deepest first, so a parent is only attempted after all of its
//! children. Stack use stays flat however deep the tree is. Each failure is
//! logged and counted, and never stops the rest of the removal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::Level;

use crate::logging::{SharedSink, default_sink};
use crate::tree::{Child, CleanerConfig, list_children};

/// Outcome of one [`Deleter::delete`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub files_removed: usize,
    pub dirs_removed: usize,
    /// Sum of the sizes of removed files
    pub bytes_freed: u64,
    /// Entries that could not be read or removed
    pub failures: usize,
}

impl DeleteReport {
    pub fn merge(self, other: Self) -> Self {
        Self {
            files_removed: self.files_removed + other.files_removed,
            dirs_removed: self.dirs_removed + other.dirs_removed,
            bytes_freed: self.bytes_freed + other.bytes_freed,
            failures: self.failures + other.failures,
        }
    }

    /// True when nothing failed.
    pub fn is_complete(&self) -> bool {
        self.failures == 0
    }

    fn failed() -> Self {
        Self {
            failures: 1,
            ..Default::default()
        }
    }
}

/// Recursive deleter with its own bounded thread pool.
pub struct Deleter {
    sink: SharedSink,
    pool: Option<rayon::ThreadPool>,
}

impl Deleter {
    pub fn new(config: &CleanerConfig) -> Self {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_count())
            .thread_name(|i| format!("deps-cleaner-delete-{}", i))
            .build()
            .ok();
        Self {
            sink: default_sink(),
            pool,
        }
    }

    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    /// Delete `path` and everything beneath it.
    ///
    /// Blocks until the whole subtree has been processed. A missing path is a
    /// no-op. The report is returned on every outcome, partial failure
    /// included.
    pub fn delete(&self, path: &Path) -> DeleteReport {
        match &self.pool {
            Some(pool) => pool.install(|| self.remove_path(path)),
            // Fall back to rayon's global pool if custom pool creation failed
            None => self.remove_path(path),
        }
    }

    fn remove_path(&self, path: &Path) -> DeleteReport {
        match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => self.remove_dir(path),
            Ok(meta) => self.remove_file(path, meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => DeleteReport::default(),
            Err(e) => {
                self.warn(format!("Error reading {}: {}", path.display(), e));
                DeleteReport::failed()
            }
        }
    }

    fn remove_dir(&self, path: &Path) -> DeleteReport {
        let mut report = DeleteReport::default();
        let mut levels: Vec<Vec<PathBuf>> = Vec::new();
        let mut frontier = vec![path.to_path_buf()];

        while !frontier.is_empty() {
            let (next, level_report) = frontier
                .par_iter()
                .map(|dir| self.empty_files(dir))
                .reduce(
                    || (Vec::new(), DeleteReport::default()),
                    |(mut dirs, a), (more, b)| {
                        dirs.extend(more);
                        (dirs, a.merge(b))
                    },
                );
            report = report.merge(level_report);
            levels.push(std::mem::replace(&mut frontier, next));
        }

        for level in levels.iter().rev() {
            report = report.merge(self.remove_empty_dirs(level));
        }
        report
    }

    /// List `dir`, remove its files and return its subdirectories.
    fn empty_files(&self, dir: &Path) -> (Vec<PathBuf>, DeleteReport) {
        match list_children(dir) {
            Ok(children) => {
                let (dirs, files): (Vec<Child>, Vec<Child>) =
                    children.into_iter().partition(|c| c.is_dir);
                let report = self.remove_files(&files);
                (dirs.into_iter().map(|c| c.path).collect(), report)
            }
            Err(e) => {
                self.warn(format!("Error reading directory {}: {}", dir.display(), e));
                (Vec::new(), DeleteReport::failed())
            }
        }
    }

    fn remove_files(&self, files: &[Child]) -> DeleteReport {
        files
            .iter()
            .map(|child| {
                let size = child.path.symlink_metadata().map(|m| m.len()).unwrap_or(0);
                self.remove_file(&child.path, size)
            })
            .fold(DeleteReport::default(), DeleteReport::merge)
    }

    /// Remove directories whose children have all been processed.
    fn remove_empty_dirs(&self, dirs: &[PathBuf]) -> DeleteReport {
        dirs.par_iter()
            .map(|dir| match fs::remove_dir(dir) {
                Ok(()) => DeleteReport {
                    dirs_removed: 1,
                    ..Default::default()
                },
                Err(e) => {
                    self.warn(format!("Error deleting directory {}: {}", dir.display(), e));
                    DeleteReport::failed()
                }
            })
            .reduce(DeleteReport::default, DeleteReport::merge)
    }

    fn remove_file(&self, path: &Path, size: u64) -> DeleteReport {
        match fs::remove_file(path) {
            Ok(()) => DeleteReport {
                files_removed: 1,
                bytes_freed: size,
                ..Default::default()
            },
            // Already gone
            Err(e) if e.kind() == io::ErrorKind::NotFound => DeleteReport::default(),
            Err(e) => {
                self.warn(format!("Error deleting file {}: {}", path.display(), e));
                DeleteReport::failed()
            }
        }
    }

    fn warn(&self, line: String) {
        self.sink.log(Level::WARN, &line);
    }
}

/// Delete with the default configuration and tracing sink.
pub fn delete(path: &Path) -> DeleteReport {
    Deleter::new(&CleanerConfig::default()).delete(path)
}
