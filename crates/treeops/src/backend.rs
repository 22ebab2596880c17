// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Filesystem capability trait.
//!
//! Every tree operation in this crate is written against [`Filesystem`]
//! and works with any backend that implements it. Implementations in this
//! crate are [`crate::MemoryFilesystem`] and [`crate::HostFilesystem`].

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Stream handle returned by [`Filesystem::open_reader`].
///
/// A read of zero bytes marks end of stream. Dropping the handle releases it.
pub type FileReader = Pin<Box<dyn AsyncRead + Send>>;

/// Stream handle returned by [`Filesystem::open_writer`].
///
/// `shutdown()` closes the handle cleanly. Dropping it releases it without
/// flushing any buffered state.
pub type FileWriter = Pin<Box<dyn AsyncWrite + Send>>;

/// The capability surface tree operations need from a backend.
///
/// `exists` and `is_symlink` inspect the node at `path` itself.
/// `is_directory` and `is_file` follow one symlink hop, so a link to a
/// directory reports as a directory and a dangling link reports neither.
#[async_trait]
pub trait Filesystem: Send + Sync {
    async fn exists(&self, path: &Path) -> Result<bool>;

    async fn is_directory(&self, path: &Path) -> Result<bool>;

    async fn is_file(&self, path: &Path) -> Result<bool>;

    async fn is_symlink(&self, path: &Path) -> Result<bool>;

    /// Target of the symlink at `path`, exactly as stored.
    async fn resolve_symlink(&self, path: &Path) -> Result<PathBuf>;

    /// Names of the immediate children of `path`, in backend order.
    async fn list_children(&self, path: &Path) -> Result<Vec<String>>;

    /// Create `path` and any missing ancestors with the given mode.
    async fn create_dir_all(&self, path: &Path, mode: u32) -> Result<()>;

    /// Remove a file or symlink node.
    async fn delete_file(&self, path: &Path) -> Result<()>;

    /// Remove an empty directory.
    async fn delete_directory(&self, path: &Path) -> Result<()>;

    async fn create_symlink(&self, target: &Path, link: &Path) -> Result<()>;

    async fn open_reader(&self, path: &Path) -> Result<FileReader>;

    /// Open `path` for writing, creating or truncating it.
    async fn open_writer(&self, path: &Path) -> Result<FileWriter>;

    /// Replace the content of `path` with `content`.
    async fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        let mut writer = self.open_writer(path).await?;
        writer.write_all(content).await.map_err(Error::io_at(path))?;
        writer.shutdown().await.map_err(Error::io_at(path))?;
        Ok(())
    }

    /// Read the whole content of `path`.
    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let mut reader = self.open_reader(path).await?;
        let mut buffer = Vec::new();
        _ = reader
            .read_to_end(&mut buffer)
            .await
            .map_err(Error::io_at(path))?;
        Ok(buffer)
    }
}

#[async_trait]
impl<T: Filesystem + ?Sized> Filesystem for &T {
    async fn exists(&self, path: &Path) -> Result<bool> {
        (**self).exists(path).await
    }

    async fn is_directory(&self, path: &Path) -> Result<bool> {
        (**self).is_directory(path).await
    }

    async fn is_file(&self, path: &Path) -> Result<bool> {
        (**self).is_file(path).await
    }

    async fn is_symlink(&self, path: &Path) -> Result<bool> {
        (**self).is_symlink(path).await
    }

    async fn resolve_symlink(&self, path: &Path) -> Result<PathBuf> {
        (**self).resolve_symlink(path).await
    }

    async fn list_children(&self, path: &Path) -> Result<Vec<String>> {
        (**self).list_children(path).await
    }

    async fn create_dir_all(&self, path: &Path, mode: u32) -> Result<()> {
        (**self).create_dir_all(path, mode).await
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        (**self).delete_file(path).await
    }

    async fn delete_directory(&self, path: &Path) -> Result<()> {
        (**self).delete_directory(path).await
    }

    async fn create_symlink(&self, target: &Path, link: &Path) -> Result<()> {
        (**self).create_symlink(target, link).await
    }

    async fn open_reader(&self, path: &Path) -> Result<FileReader> {
        (**self).open_reader(path).await
    }

    async fn open_writer(&self, path: &Path) -> Result<FileWriter> {
        (**self).open_writer(path).await
    }

    async fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        (**self).write(path, content).await
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        (**self).read(path).await
    }
}
