//! Pruning traverser
//!
//! Walks the tree on a fixed pool of worker threads sharing one work queue.
//! A directory that matches is reported and never entered; files are never
//! looked at. The call returns only once the whole tree has been drained.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use serde::Serialize;
use tracing::Level;

use crate::logging::{LogSink, SharedSink, default_sink};
use crate::pattern::{MatchMode, Pattern};

use super::config::CleanerConfig;
use super::queue::{Completion, WorkQueue};
use super::utils::{Child, list_children};

/// Caller-owned flag that stops a running traversal early.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Totals for one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TraversalSummary {
    /// Callbacks invoked
    pub matches: usize,
    /// Directories listed, root included
    pub dirs_scanned: usize,
    /// Directories that could not be listed
    pub read_errors: usize,
    pub cancelled: bool,
}

#[derive(Default)]
struct Tally {
    matches: AtomicUsize,
    dirs_scanned: AtomicUsize,
    read_errors: AtomicUsize,
}

/// Concurrent, pruning directory walker.
pub struct Traverser {
    config: CleanerConfig,
    sink: SharedSink,
    cancel: Option<CancelToken>,
}

impl Traverser {
    pub fn new(config: CleanerConfig) -> Self {
        Self {
            config,
            sink: default_sink(),
            cancel: None,
        }
    }

    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Walk `root`, calling `on_match` once per topmost matching directory.
    ///
    /// `on_match` runs on worker threads, possibly several at once, in no
    /// particular order. An unreadable root is logged and yields an empty
    /// summary.
    pub fn traverse<F>(&self, root: &Path, pattern: &Pattern, on_match: F) -> TraversalSummary
    where
        F: Fn(&Path) + Sync,
    {
        let tally = Tally::default();

        let children = match list_children(root) {
            Ok(children) => children,
            Err(e) => {
                self.sink.log(
                    Level::WARN,
                    &format!("Directory not found: {} ({})", root.display(), e),
                );
                return TraversalSummary {
                    read_errors: 1,
                    ..Default::default()
                };
            }
        };
        tally.dirs_scanned.fetch_add(1, Ordering::Relaxed);

        let workers = self.config.worker_count();
        let queue = WorkQueue::new(workers);
        let visit = Visit {
            pattern,
            mode: self.config.match_mode,
            on_match: &on_match,
            sink: self.sink.as_ref(),
            cancel: self.cancel.as_ref(),
            tally: &tally,
            queue: &queue,
        };

        // Root children are queued before any worker starts, so the pending
        // count cannot reach zero until they have all been visited.
        visit.dispatch(children);

        if queue.pending() > 0 {
            thread::scope(|s| {
                for _ in 0..workers {
                    s.spawn(|| visit.run_worker());
                }
            });
        }

        TraversalSummary {
            matches: tally.matches.load(Ordering::Relaxed),
            dirs_scanned: tally.dirs_scanned.load(Ordering::Relaxed),
            read_errors: tally.read_errors.load(Ordering::Relaxed),
            cancelled: visit.cancelled(),
        }
    }
}

/// Traverse with the default configuration and tracing sink.
pub fn traverse<F>(root: &Path, pattern: &Pattern, on_match: F) -> TraversalSummary
where
    F: Fn(&Path) + Sync,
{
    Traverser::new(CleanerConfig::default()).traverse(root, pattern, on_match)
}

/// State borrowed by every worker for one traversal.
struct Visit<'a, F> {
    pattern: &'a Pattern,
    mode: MatchMode,
    on_match: &'a F,
    sink: &'a dyn LogSink,
    cancel: Option<&'a CancelToken>,
    tally: &'a Tally,
    queue: &'a WorkQueue,
}

impl<F> Visit<'_, F>
where
    F: Fn(&Path) + Sync,
{
    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(CancelToken::is_cancelled)
    }

    /// Report matching child directories and queue the rest.
    fn dispatch(&self, children: Vec<Child>) {
        for child in children {
            if !child.is_dir {
                continue;
            }
            if self.cancelled() {
                return;
            }
            if self.pattern.matches_path(&child.path, self.mode) {
                self.tally.matches.fetch_add(1, Ordering::Relaxed);
                self.sink
                    .log(Level::DEBUG, &format!("Matched {}", child.path.display()));
                (self.on_match)(&child.path);
            } else {
                self.queue.push(child.path);
            }
        }
    }

    fn run_worker(&self) {
        while let Some(dir) = self.queue.next() {
            let _done = Completion(self.queue);
            if self.cancelled() {
                continue;
            }
            match list_children(&dir) {
                Ok(children) => {
                    self.tally.dirs_scanned.fetch_add(1, Ordering::Relaxed);
                    self.dispatch(children);
                }
                Err(e) => {
                    self.tally.read_errors.fetch_add(1, Ordering::Relaxed);
                    self.sink.log(
                        Level::WARN,
                        &format!("Error reading directory {}: {}", dir.display(), e),
                    );
                }
            }
        }
    }
}
