//! Shared filesystem helpers for the tree walkers and the deleter

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{CleanError, Result};

/// An immediate child of a listed directory.
#[derive(Debug, Clone)]
pub struct Child {
    pub path: PathBuf,
    /// True for real directories only; a symlink to a directory is false.
    pub is_dir: bool,
}

/// List the immediate children of `dir`.
///
/// Entries that vanish or fail while being read are skipped; only a failure
/// to open the directory itself is an error.
pub fn list_children(dir: &Path) -> io::Result<Vec<Child>> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir)?.filter_map(|e| e.ok()) {
        let path = entry.path();
        let is_dir = match entry.file_type() {
            Ok(ft) => ft.is_dir(),
            Err(_) => path.symlink_metadata().is_ok_and(|m| m.is_dir()),
        };
        children.push(Child { path, is_dir });
    }
    Ok(children)
}

/// Check that `root` exists and is a directory.
pub fn check_root(root: &Path) -> Result<()> {
    let meta = match fs::metadata(root) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(CleanError::RootNotFound(root.to_path_buf()));
        }
        Err(source) => {
            return Err(CleanError::Io {
                path: root.to_path_buf(),
                source,
            });
        }
    };
    if !meta.is_dir() {
        return Err(CleanError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}
