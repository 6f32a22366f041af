//! Progress estimate for a cleaning run
//!
//! The total comes from an independent count and may be stale, so the
//! fraction can overshoot 1.0 or never reach it.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

/// Running match index against an estimated total.
#[derive(Debug, Default)]
pub struct Progress {
    total: usize,
    index: AtomicUsize,
}

/// Snapshot taken after one match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub index: usize,
    pub total: usize,
    /// `index / total`; `None` when the estimate is unknown (zero).
    pub fraction: Option<f64>,
}

impl ProgressUpdate {
    fn new(index: usize, total: usize) -> Self {
        let fraction = (total > 0).then(|| index as f64 / total as f64);
        Self {
            index,
            total,
            fraction,
        }
    }

    /// Percentage clamped to 100 for display.
    pub fn percent(&self) -> Option<u8> {
        self.fraction.map(|f| (f * 100.0).clamp(0.0, 100.0) as u8)
    }
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            index: AtomicUsize::new(0),
        }
    }

    /// Record one match.
    pub fn advance(&self) -> ProgressUpdate {
        let index = self.index.fetch_add(1, Ordering::AcqRel) + 1;
        ProgressUpdate::new(index, self.total)
    }
}
