//! Host backend round trips: move, delete and the same-backend probe on local disk.

use crate::Filesystem;
use crate::delete::delete_tree;
use crate::host::HostFilesystem;
use crate::memory::MemoryFilesystem;
use crate::mover::move_tree;
use crate::probe::probe_same_backend;
use crate::testing::{Fixture, seed};
use crate::walk::collect_tree;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tempfile::TempDir;

#[tokio::test]
async fn test_move_and_delete_on_host() {
    let dir = TempDir::new().expect("create temp dir");
    let fs = HostFilesystem::new();
    let src = dir.path().join("source");
    let dst = dir.path().join("result");

    seed(&fs, &src, super::SAMPLE_TREE).await.unwrap();
    let _ = move_tree(&src, &fs, &dst, &fs).await.unwrap();

    let source = collect_tree(&fs, &src).await.unwrap();
    let result = collect_tree(&fs, &dst).await.unwrap();
    assert_eq!(source.len(), super::SAMPLE_TREE.len());
    assert_eq!(result.len(), source.len());

    let relative = |entries: &[crate::TreeEntry]| -> BTreeSet<PathBuf> {
        entries.iter().map(|e| e.relative_path.clone()).collect()
    };
    assert_eq!(relative(&source), relative(&result));

    assert_eq!(
        fs.read(&dst.join("dir1/dir1/file3")).await.unwrap(),
        b"/dir1/dir1/file1 content"
    );
    assert_eq!(
        fs.resolve_symlink(&dst.join("dir1/dir1/dir1")).await.unwrap(),
        dst
    );

    let _ = delete_tree(&fs, &dst).await.unwrap();
    let _ = delete_tree(&fs, &src).await.unwrap();
    assert!(!fs.exists(&dst).await.unwrap());
    assert!(!fs.exists(&src).await.unwrap());
    assert!(fs.list_children(dir.path()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_probe_host_backends() {
    let host = HostFilesystem::new();
    assert!(probe_same_backend(&host, &HostFilesystem::new()).await.unwrap());
    assert!(!probe_same_backend(&host, &MemoryFilesystem::new()).await.unwrap());
}

#[tokio::test]
async fn test_list_and_delete_with_symlink_cycle() {
    let dir = TempDir::new().expect("create temp dir");
    let fs = HostFilesystem::new();
    let root = dir.path().join("t");
    seed(
        &fs,
        &root,
        &[
            Fixture::Directory("d"),
            Fixture::File("d/f", "f"),
            Fixture::Symlink("a", "b"),
            Fixture::Symlink("b", "a"),
        ],
    )
    .await
    .unwrap();

    let entries = collect_tree(&fs, &root).await.unwrap();
    let mut paths: Vec<PathBuf> = entries.iter().map(|e| e.relative_path.clone()).collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("a"),
            PathBuf::from("b"),
            PathBuf::from("d"),
            PathBuf::from("d/f"),
        ]
    );
    for entry in entries.iter().filter(|e| e.is_symlink()) {
        assert!(!entry.is_directory);
    }
    assert_eq!(
        entries
            .iter()
            .find(|e| e.relative_path == PathBuf::from("a"))
            .and_then(|e| e.symlink_target.clone()),
        Some(root.join("b"))
    );

    let report = delete_tree(&fs, &root).await.unwrap();
    assert_eq!(report.files, 3);
    assert_eq!(report.directories, 2);
    assert!(!fs.exists(&root).await.unwrap());
}
