//! Edge case and error handling tests for the library


use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use deps_cleaner::{
    CleanerConfig, Deleter, MemorySink, Mode, Pattern, Session, Traverser, count, delete,
    traverse,
};
use harness::TestTree;

fn pattern(text: &str) -> Pattern {
    Pattern::new(text).unwrap()
}

fn matches_of(tree: &TestTree, text: &str) -> Vec<PathBuf> {
    let found = Mutex::new(Vec::new());
    traverse(tree.path(), &pattern(text), |p| {
        found.lock().unwrap().push(p.to_path_buf())
    });
    let mut found = found.into_inner().unwrap();
    found.sort();
    found
}

// ============================================================================
// Counter / Traverser agreement
// ============================================================================

#[test]
fn test_reference_scenario() {
    let tree = TestTree::new();
    tree.add_dir("node_modules/a");
    tree.add_dir("node_modules/b");
    tree.add_dir("src/node_modules/c");

    assert_eq!(
        matches_of(&tree, "node_modules"),
        vec![tree.join("node_modules"), tree.join("src/node_modules")]
    );
    assert_eq!(count(tree.path(), &pattern("node_modules")).unwrap(), 2);
}

#[test]
fn test_empty_root() {
    let tree = TestTree::new();
    assert_eq!(count(tree.path(), &pattern("anything")).unwrap(), 0);
    assert!(matches_of(&tree, "anything").is_empty());
}

#[test]
fn test_count_sees_nested_matches_traverse_does_not() {
    let tree = TestTree::new();
    tree.add_dir("target/debug/build/target");
    tree.add_file("target.lock", "");

    assert_eq!(count(tree.path(), &pattern("target")).unwrap(), 2);
    assert_eq!(matches_of(&tree, "target"), vec![tree.join("target")]);
}

#[test]
fn test_many_projects() {
    let tree = TestTree::new();
    tree.add_projects(40, "node_modules");

    assert_eq!(matches_of(&tree, "node_modules").len(), 40);
    assert_eq!(count(tree.path(), &pattern("node_modules")).unwrap(), 40);
}

#[test]
fn test_callback_runs_concurrently_without_core_locking() {
    let tree = TestTree::new();
    tree.add_dir("p0/target");
    tree.add_dir("p1/target");

    // Each call waits until the other one is in flight too. A traverser that
    // serialized callbacks would leave the peak at 1 once the wait times out.
    let in_flight = Mutex::new((0usize, 0usize));
    let both_in = Condvar::new();
    let traverser = Traverser::new(CleanerConfig {
        workers: 2,
        ..Default::default()
    });
    let summary = traverser.traverse(tree.path(), &pattern("target"), |_| {
        let mut state = in_flight.lock().unwrap();
        state.0 += 1;
        state.1 = state.1.max(state.0);
        both_in.notify_all();
        let (mut state, _) = both_in
            .wait_timeout_while(state, Duration::from_secs(10), |(current, peak)| {
                *current < 2 && *peak < 2
            })
            .unwrap();
        state.0 -= 1;
    });

    assert_eq!(summary.matches, 2);
    assert_eq!(in_flight.into_inner().unwrap().1, 2);
}

// ============================================================================
// Symlinks
// ============================================================================

#[cfg(unix)]
#[test]
fn test_symlink_loop_terminates() {
    use std::os::unix::fs::symlink;

    let tree = TestTree::new();
    tree.add_dir("a/b");
    symlink(tree.path(), tree.join("a/b/loop")).unwrap();
    symlink(tree.join("a"), tree.join("a/b/node_modules")).unwrap();

    // Symlinked directories are neither entered nor matched
    assert!(matches_of(&tree, "node_modules").is_empty());
    assert!(matches_of(&tree, "loop").is_empty());
}

#[cfg(unix)]
#[test]
fn test_delete_through_symlink_keeps_target() {
    use std::os::unix::fs::symlink;

    let tree = TestTree::new();
    let keep = tree.add_file("shared/lib.js", "keep");
    tree.add_dir("app/node_modules");
    symlink(tree.join("shared"), tree.join("app/node_modules/shared")).unwrap();

    let session = Session::new(tree.path(), "node_modules", Mode::Clean).unwrap();
    let summary = session.run(|_, _| {});

    assert_eq!(summary.matched, 1);
    assert!(!tree.exists("app/node_modules"));
    assert!(keep.exists());
}

// ============================================================================
// Deletion
// ============================================================================

#[test]
fn test_delete_is_idempotent() {
    let tree = TestTree::new();
    let target = tree.add_dir("node_modules/x/y");
    tree.add_file("node_modules/x/y/z.js", "z");

    let first = delete(&tree.join("node_modules"));
    assert_eq!(first.files_removed, 1);
    assert!(!target.exists());

    let second = delete(&tree.join("node_modules"));
    assert_eq!(second, Default::default());
}

#[cfg(unix)]
#[test]
fn test_locked_file_does_not_stop_deletion() {
    use std::os::unix::fs::PermissionsExt;

    let tree = TestTree::new();
    if harness::permissions_are_bypassed(&tree) {
        eprintln!("skipping: permission checks are bypassed for this user");
        return;
    }

    tree.add_file("node_modules/a.js", "a");
    tree.add_file("node_modules/pkg/b.js", "b");
    let locked = tree.add_file("node_modules/locked/secret.js", "s");
    let locked_dir = tree.join("node_modules/locked");
    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o555)).unwrap();

    let sink = Arc::new(MemorySink::new());
    let report = Deleter::new(&CleanerConfig::default())
        .with_sink(sink.clone())
        .delete(&tree.join("node_modules"));

    fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(!tree.exists("node_modules/a.js"));
    assert!(!tree.exists("node_modules/pkg"));
    assert!(locked.exists(), "locked file stays");
    // locked file, its directory, and the root directory
    assert_eq!(report.failures, 3);
    assert_eq!(report.files_removed, 2);
    assert!(sink.contains("Error deleting file"));
    assert!(sink.contains("Error deleting directory"));
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_skipped_by_traverse() {
    use std::os::unix::fs::PermissionsExt;

    let tree = TestTree::new();
    if harness::permissions_are_bypassed(&tree) {
        eprintln!("skipping: permission checks are bypassed for this user");
        return;
    }

    tree.add_dir("open/node_modules");
    let closed = tree.add_dir("closed/inner/node_modules");
    let closed_root = tree.join("closed");
    fs::set_permissions(&closed_root, fs::Permissions::from_mode(0o000)).unwrap();

    let sink = Arc::new(MemorySink::new());
    let found = Mutex::new(Vec::new());
    let summary = Traverser::new(CleanerConfig::default())
        .with_sink(sink.clone())
        .traverse(tree.path(), &pattern("node_modules"), |p| {
            found.lock().unwrap().push(p.to_path_buf())
        });

    fs::set_permissions(&closed_root, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(found.into_inner().unwrap(), vec![tree.join("open/node_modules")]);
    assert_eq!(summary.read_errors, 1);
    assert!(sink.contains("Error reading directory"));
    assert!(closed.exists());

    // The counter stops at the first error instead
    fs::set_permissions(&closed_root, fs::Permissions::from_mode(0o000)).unwrap();
    let counted = count(tree.path(), &pattern("node_modules"));
    fs::set_permissions(&closed_root, fs::Permissions::from_mode(0o755)).unwrap();
    assert!(counted.is_err());
}

#[test]
fn test_session_clean_with_single_worker() {
    let tree = TestTree::new();
    tree.add_projects(10, "target");

    let session = Session::new(tree.path(), "target", Mode::Clean)
        .unwrap()
        .with_config(CleanerConfig {
            workers: 1,
            ..Default::default()
        });
    let summary = session.run(|_, _| {});

    assert_eq!(summary.matched, 10);
    let deleted = summary.deleted.unwrap();
    assert_eq!(deleted.files_removed, 30);
    assert!(deleted.is_complete());
    for i in 0..10 {
        assert!(!tree.exists(&format!("project_{}/target", i)));
        assert!(tree.exists(&format!("project_{}/src/index.js", i)));
    }
}
