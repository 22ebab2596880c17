use crate::Filesystem;
use crate::config::TreeOptions;
use crate::copy::{copy_file, copy_file_with};
use crate::error::Error;
use crate::memory::MemoryFilesystem;
use crate::testing::{FaultyFilesystem, Faults, is_injected};
use std::path::Path;

fn small_chunks() -> TreeOptions {
    TreeOptions {
        chunk_size: 7,
        ..TreeOptions::default()
    }
}

fn binary_content() -> Vec<u8> {
    (0..=255u8).cycle().take(1000).collect()
}

#[tokio::test]
async fn test_copy_between_backends() {
    let src = MemoryFilesystem::new();
    let dst = MemoryFilesystem::new();
    let content = binary_content();
    src.write(Path::new("/in.bin"), &content).await.unwrap();

    let bytes = copy_file_with(
        Path::new("/in.bin"),
        &src,
        Path::new("/out.bin"),
        &dst,
        &small_chunks(),
    )
    .await
    .unwrap();

    assert_eq!(bytes, 1000);
    assert_eq!(dst.read(Path::new("/out.bin")).await.unwrap(), content);
    assert_eq!(src.read(Path::new("/in.bin")).await.unwrap(), content);
}

#[tokio::test]
async fn test_copy_empty_file_and_overwrite() {
    let src = MemoryFilesystem::new();
    let dst = MemoryFilesystem::new();
    src.write(Path::new("/empty"), b"").await.unwrap();
    dst.write(Path::new("/target"), b"old content").await.unwrap();

    let bytes = copy_file(Path::new("/empty"), &src, Path::new("/target"), &dst)
        .await
        .unwrap();
    assert_eq!(bytes, 0);
    assert!(dst.read(Path::new("/target")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_interrupted_copy_leaves_no_file() {
    let src = MemoryFilesystem::new();
    src.write(Path::new("/in.bin"), &binary_content()).await.unwrap();

    let dst_inner = MemoryFilesystem::new();
    let dst = FaultyFilesystem::new(
        dst_inner.clone(),
        Faults {
            write_limit: Some(100),
            ..Faults::default()
        },
    );

    let err = copy_file_with(
        Path::new("/in.bin"),
        &src,
        Path::new("/out.bin"),
        &dst,
        &small_chunks(),
    )
    .await
    .unwrap_err();

    assert!(is_injected(&err), "unexpected error: {err}");
    assert!(matches!(&err, Error::Io { path, .. } if path == Path::new("/out.bin")));
    assert!(!dst_inner.exists(Path::new("/out.bin")).await.unwrap());
}

#[tokio::test]
async fn test_cleanup_failure_replaces_original() {
    let src = MemoryFilesystem::new();
    src.write(Path::new("/in.bin"), &binary_content()).await.unwrap();

    let dst_inner = MemoryFilesystem::new();
    let dst = FaultyFilesystem::new(
        dst_inner.clone(),
        Faults {
            write_limit: Some(100),
            deny_delete: true,
            ..Faults::default()
        },
    );

    let result = copy_file_with(
        Path::new("/in.bin"),
        &src,
        Path::new("/out.bin"),
        &dst,
        &small_chunks(),
    )
    .await;

    assert!(result.is_err());
    // The partial file could not be removed.
    let partial = dst_inner.read(Path::new("/out.bin")).await.unwrap();
    assert!(partial.len() <= 100);
}

#[tokio::test]
async fn test_missing_source() {
    let src = MemoryFilesystem::new();
    let dst = MemoryFilesystem::new();
    let err = copy_file(Path::new("/missing"), &src, Path::new("/out"), &dst)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert!(!dst.exists(Path::new("/out")).await.unwrap());
}
