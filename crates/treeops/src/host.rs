// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Host filesystem backend.
//!
//! Maps the [`Filesystem`] capability directly onto `tokio::fs`. Paths are
//! host paths and are used exactly as given.

use crate::backend::{FileReader, FileWriter, Filesystem};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The local disk, seen through `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFilesystem;

impl HostFilesystem {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// `NotFound` keeps its own variant; everything else is wrapped with the path.
fn host_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |err| {
        if err.kind() == ErrorKind::NotFound {
            Error::not_found(path)
        } else {
            Error::io(path, err)
        }
    }
}

/// Run a metadata probe, treating a missing node as `false`.
fn probe<F>(path: &Path, metadata: std::io::Result<std::fs::Metadata>, check: F) -> Result<bool>
where
    F: FnOnce(&std::fs::Metadata) -> bool,
{
    match metadata {
        Ok(meta) => Ok(check(&meta)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(Error::io(path, err)),
    }
}

/// Metadata of the node at `path`, following at most one symlink hop.
/// Relative link targets are resolved against the link's directory.
async fn one_hop_metadata(path: &Path) -> std::io::Result<std::fs::Metadata> {
    let meta = tokio::fs::symlink_metadata(path).await?;
    if !meta.file_type().is_symlink() {
        return Ok(meta);
    }
    let target = tokio::fs::read_link(path).await?;
    let target = match path.parent() {
        Some(parent) => parent.join(target),
        None => target,
    };
    tokio::fs::symlink_metadata(target).await
}

#[cfg(unix)]
async fn symlink(target: &Path, link: &Path) -> Result<()> {
    tokio::fs::symlink(target, link)
        .await
        .map_err(Error::io_at(link))
}

#[cfg(not(unix))]
async fn symlink(_target: &Path, link: &Path) -> Result<()> {
    Err(Error::unsupported("create_symlink", link))
}

#[async_trait]
impl Filesystem for HostFilesystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        probe(path, tokio::fs::symlink_metadata(path).await, |_| true)
    }

    async fn is_directory(&self, path: &Path) -> Result<bool> {
        probe(path, one_hop_metadata(path).await, |meta| meta.is_dir())
    }

    async fn is_file(&self, path: &Path) -> Result<bool> {
        probe(path, one_hop_metadata(path).await, |meta| meta.is_file())
    }

    async fn is_symlink(&self, path: &Path) -> Result<bool> {
        probe(path, tokio::fs::symlink_metadata(path).await, |meta| {
            meta.file_type().is_symlink()
        })
    }

    async fn resolve_symlink(&self, path: &Path) -> Result<PathBuf> {
        tokio::fs::read_link(path).await.map_err(host_error(path))
    }

    async fn list_children(&self, path: &Path) -> Result<Vec<String>> {
        let mut dir = tokio::fs::read_dir(path).await.map_err(host_error(path))?;
        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(host_error(path))? {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        Ok(names)
    }

    async fn create_dir_all(&self, path: &Path, mode: u32) -> Result<()> {
        let mut builder = tokio::fs::DirBuilder::new();
        _ = builder.recursive(true);
        #[cfg(unix)]
        {
            _ = builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        builder.create(path).await.map_err(Error::io_at(path))
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        tokio::fs::remove_file(path).await.map_err(host_error(path))
    }

    async fn delete_directory(&self, path: &Path) -> Result<()> {
        tokio::fs::remove_dir(path).await.map_err(host_error(path))
    }

    async fn create_symlink(&self, target: &Path, link: &Path) -> Result<()> {
        symlink(target, link).await
    }

    async fn open_reader(&self, path: &Path) -> Result<FileReader> {
        let file = tokio::fs::File::open(path).await.map_err(host_error(path))?;
        Ok(Box::pin(file))
    }

    async fn open_writer(&self, path: &Path) -> Result<FileWriter> {
        let file = tokio::fs::File::create(path)
            .await
            .map_err(host_error(path))?;
        Ok(Box::pin(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_probes() {
        let dir = TempDir::new().expect("create temp dir");
        let fs = HostFilesystem::new();
        let file = dir.path().join("f");
        fs.write(&file, b"hello").await.expect("write");

        assert!(fs.exists(&file).await.expect("probe"));
        assert!(fs.is_file(&file).await.expect("probe"));
        assert!(!fs.is_directory(&file).await.expect("probe"));
        assert!(fs.is_directory(dir.path()).await.expect("probe"));
        assert!(!fs.exists(&dir.path().join("missing")).await.expect("probe"));
        assert_eq!(fs.read(&file).await.expect("read"), b"hello");
    }

    #[tokio::test]
    async fn test_missing_maps_to_not_found() {
        let dir = TempDir::new().expect("create temp dir");
        let fs = HostFilesystem::new();
        assert!(matches!(
            fs.delete_file(&dir.path().join("missing")).await,
            Err(Error::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_and_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().expect("create temp dir");
        let fs = HostFilesystem::new();
        let nested = dir.path().join("a/b");
        fs.create_dir_all(&nested, 0o750).await.expect("mkdir");
        let mode = std::fs::metadata(&nested)
            .expect("stat")
            .permissions()
            .mode();
        // The process umask may clear bits but never adds any.
        assert_eq!(mode & 0o777 & !0o750, 0);

        let link = dir.path().join("link");
        fs.create_symlink(&nested, &link).await.expect("symlink");
        assert!(fs.is_symlink(&link).await.expect("probe"));
        assert!(fs.is_directory(&link).await.expect("probe"));
        assert_eq!(fs.resolve_symlink(&link).await.expect("readlink"), nested);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probes_follow_one_hop() {
        let dir = TempDir::new().expect("create temp dir");
        let fs = HostFilesystem::new();
        let target = dir.path().join("d");
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        let dangling = dir.path().join("dangling");
        fs.create_dir_all(&target, 0o755).await.expect("mkdir");
        fs.create_symlink(Path::new("d"), &first).await.expect("symlink");
        fs.create_symlink(&first, &second).await.expect("symlink");
        fs.create_symlink(&dir.path().join("gone"), &dangling)
            .await
            .expect("symlink");

        // Relative target, one hop.
        assert!(fs.is_directory(&first).await.expect("probe"));
        // Two hops away from the directory.
        assert!(!fs.is_directory(&second).await.expect("probe"));
        assert!(!fs.is_file(&second).await.expect("probe"));

        assert!(fs.exists(&dangling).await.expect("probe"));
        assert!(!fs.is_directory(&dangling).await.expect("probe"));
        assert!(!fs.is_file(&dangling).await.expect("probe"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_cycle_is_neither_file_nor_directory() {
        let dir = TempDir::new().expect("create temp dir");
        let fs = HostFilesystem::new();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs.create_symlink(&b, &a).await.expect("symlink");
        fs.create_symlink(&a, &b).await.expect("symlink");

        for link in [&a, &b] {
            assert!(fs.is_symlink(link).await.expect("probe"));
            assert!(!fs.is_directory(link).await.expect("probe"));
            assert!(!fs.is_file(link).await.expect("probe"));
        }
    }
}
