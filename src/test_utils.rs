//! Test utilities for building temporary directory trees.
//!
//! This module is only compiled for tests and benchmarks.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory tree for testing.
///
/// The tree is automatically cleaned up when dropped.
pub struct TestTree {
    dir: TempDir,
}

impl TestTree {
    /// Create a new empty temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `rel` inside the tree.
    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Add a file, creating parent directories as needed.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Add a directory and its parents.
    pub fn add_dir(&self, path: &str) -> PathBuf {
        let full_path = self.join(path);
        fs::create_dir_all(&full_path).expect("Failed to create dir");
        full_path
    }

    /// Add `count` sibling projects, each with one nested `pattern_dir`
    /// holding a few files.
    pub fn add_projects(&self, count: usize, pattern_dir: &str) {
        for i in 0..count {
            self.add_file(&format!("project_{}/src/index.js", i), "// entry");
            for j in 0..3 {
                self.add_file(
                    &format!("project_{}/{}/pkg_{}/index.js", i, pattern_dir, j),
                    "module.exports = {};",
                );
            }
        }
    }

    pub fn exists(&self, path: &str) -> bool {
        self.join(path).exists()
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}
