//! Work queue shared by every traversal worker
//!
//! Directories waiting to be listed sit on a crossbeam channel. A pending
//! counter tracks work that is queued or in progress; when it drops to zero
//! nothing can enqueue more, so the queue sends one stop message per worker.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};

enum Job {
    Visit(PathBuf),
    Stop,
}

pub struct WorkQueue {
    tx: Sender<Job>,
    rx: Receiver<Job>,
    pending: AtomicUsize,
    workers: usize,
}

impl WorkQueue {
    pub fn new(workers: usize) -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            pending: AtomicUsize::new(0),
            workers,
        }
    }

    /// Queue a directory. Never blocks.
    pub fn push(&self, dir: PathBuf) {
        self.pending.fetch_add(1, Ordering::AcqRel);
        // Both ends live in self, so the channel cannot be disconnected.
        let _ = self.tx.send(Job::Visit(dir));
    }

    /// Block for the next directory; `None` once the queue has drained.
    pub fn next(&self) -> Option<PathBuf> {
        match self.rx.recv() {
            Ok(Job::Visit(dir)) => Some(dir),
            Ok(Job::Stop) | Err(_) => None,
        }
    }

    /// Mark one directory returned by [`next`](Self::next) as finished.
    ///
    /// Children must be pushed before their parent is completed.
    pub fn complete(&self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            for _ in 0..self.workers {
                let _ = self.tx.send(Job::Stop);
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }
}

/// Completes a directory when dropped, so a panicking callback cannot
/// leave the other workers waiting forever.
pub struct Completion<'a>(pub &'a WorkQueue);

impl Drop for Completion<'_> {
    fn drop(&mut self) {
        self.0.complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_drain_stops_all_workers() {
        let queue = WorkQueue::new(2);
        queue.push(PathBuf::from("/a"));
        queue.push(PathBuf::from("/b"));
        assert_eq!(queue.pending(), 2);

        let first = queue.next().unwrap();
        queue.complete();
        let second = queue.next().unwrap();
        assert_ne!(first, second);
        queue.complete();

        assert_eq!(queue.pending(), 0);
        assert!(queue.next().is_none());
        assert!(queue.next().is_none());
    }

    #[test]
    fn test_children_keep_queue_open() {
        let queue = WorkQueue::new(4);
        queue.push(PathBuf::from("/root/a"));

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    while let Some(dir) = queue.next() {
                        let _done = Completion(&queue);
                        if dir.components().count() < 6 {
                            queue.push(dir.join("x"));
                            queue.push(dir.join("y"));
                        }
                    }
                });
            }
        });

        assert_eq!(queue.pending(), 0);
    }
}
