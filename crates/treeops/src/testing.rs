// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: capability wrappers for fault injection and call
//! recording, and a fixture builder for seeding trees.

use crate::backend::{FileReader, FileWriter, Filesystem};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;

/// One node of a fixture tree, with a path relative to the fixture root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fixture {
    Directory(&'static str),
    File(&'static str, &'static str),
    /// Link at the first path pointing at the second, both relative to the
    /// fixture root. The stored target is absolute.
    Symlink(&'static str, &'static str),
}

/// Create `fixtures` under `root`, in order. Parents must come first.
pub async fn seed<F: Filesystem + ?Sized>(fs: &F, root: &Path, fixtures: &[Fixture]) -> Result<()> {
    fs.create_dir_all(root, 0o755).await?;
    for fixture in fixtures {
        match fixture {
            Fixture::Directory(path) => fs.create_dir_all(&root.join(path), 0o755).await?,
            Fixture::File(path, content) => fs.write(&root.join(path), content.as_bytes()).await?,
            Fixture::Symlink(path, target) => {
                fs.create_symlink(&root.join(target), &root.join(path))
                    .await?
            }
        }
    }
    Ok(())
}

/// A capability call observed by [`RecordingFilesystem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DeleteFile(PathBuf),
    DeleteDirectory(PathBuf),
    CreateDirectory(PathBuf),
    CreateSymlink { target: PathBuf, link: PathBuf },
    OpenReader(PathBuf),
    OpenWriter(PathBuf),
}

/// Delegates to an inner backend and records every mutating call and
/// every opened stream, in order.
pub struct RecordingFilesystem<F> {
    inner: F,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl<F: Filesystem> RecordingFilesystem<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: Call) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl<F: Filesystem> Filesystem for RecordingFilesystem<F> {
    async fn exists(&self, path: &Path) -> Result<bool> {
        self.inner.exists(path).await
    }

    async fn is_directory(&self, path: &Path) -> Result<bool> {
        self.inner.is_directory(path).await
    }

    async fn is_file(&self, path: &Path) -> Result<bool> {
        self.inner.is_file(path).await
    }

    async fn is_symlink(&self, path: &Path) -> Result<bool> {
        self.inner.is_symlink(path).await
    }

    async fn resolve_symlink(&self, path: &Path) -> Result<PathBuf> {
        self.inner.resolve_symlink(path).await
    }

    async fn list_children(&self, path: &Path) -> Result<Vec<String>> {
        self.inner.list_children(path).await
    }

    async fn create_dir_all(&self, path: &Path, mode: u32) -> Result<()> {
        self.record(Call::CreateDirectory(path.to_path_buf()));
        self.inner.create_dir_all(path, mode).await
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        self.record(Call::DeleteFile(path.to_path_buf()));
        self.inner.delete_file(path).await
    }

    async fn delete_directory(&self, path: &Path) -> Result<()> {
        self.record(Call::DeleteDirectory(path.to_path_buf()));
        self.inner.delete_directory(path).await
    }

    async fn create_symlink(&self, target: &Path, link: &Path) -> Result<()> {
        self.record(Call::CreateSymlink {
            target: target.to_path_buf(),
            link: link.to_path_buf(),
        });
        self.inner.create_symlink(target, link).await
    }

    async fn open_reader(&self, path: &Path) -> Result<FileReader> {
        self.record(Call::OpenReader(path.to_path_buf()));
        self.inner.open_reader(path).await
    }

    async fn open_writer(&self, path: &Path) -> Result<FileWriter> {
        self.record(Call::OpenWriter(path.to_path_buf()));
        self.inner.open_writer(path).await
    }
}

/// Which calls a [`FaultyFilesystem`] should break.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    /// Writers fail once more than this many bytes have been accepted.
    pub write_limit: Option<usize>,
    /// Probes and listings of this exact path fail.
    pub broken_path: Option<PathBuf>,
    /// Only listings of this exact path fail.
    pub unlistable: Option<PathBuf>,
    /// `delete_file` always fails.
    pub deny_delete: bool,
}

/// Delegates to an inner backend, injecting the configured [`Faults`].
pub struct FaultyFilesystem<F> {
    inner: F,
    faults: Faults,
}

impl<F: Filesystem> FaultyFilesystem<F> {
    pub fn new(inner: F, faults: Faults) -> Self {
        Self { inner, faults }
    }

    fn check(&self, path: &Path) -> Result<()> {
        match &self.faults.broken_path {
            Some(broken) if broken == path => Err(injected(path)),
            _ => Ok(()),
        }
    }
}

/// The error every injected fault produces.
pub fn injected(path: &Path) -> Error {
    Error::io(path, std::io::Error::other("injected fault"))
}

/// True if `err` came from a [`FaultyFilesystem`].
pub fn is_injected(err: &Error) -> bool {
    matches!(err, Error::Io { source, .. } if source.to_string() == "injected fault")
}

#[async_trait]
impl<F: Filesystem> Filesystem for FaultyFilesystem<F> {
    async fn exists(&self, path: &Path) -> Result<bool> {
        self.check(path)?;
        self.inner.exists(path).await
    }

    async fn is_directory(&self, path: &Path) -> Result<bool> {
        self.check(path)?;
        self.inner.is_directory(path).await
    }

    async fn is_file(&self, path: &Path) -> Result<bool> {
        self.check(path)?;
        self.inner.is_file(path).await
    }

    async fn is_symlink(&self, path: &Path) -> Result<bool> {
        self.check(path)?;
        self.inner.is_symlink(path).await
    }

    async fn resolve_symlink(&self, path: &Path) -> Result<PathBuf> {
        self.check(path)?;
        self.inner.resolve_symlink(path).await
    }

    async fn list_children(&self, path: &Path) -> Result<Vec<String>> {
        self.check(path)?;
        if self.faults.unlistable.as_deref() == Some(path) {
            return Err(injected(path));
        }
        self.inner.list_children(path).await
    }

    async fn create_dir_all(&self, path: &Path, mode: u32) -> Result<()> {
        self.inner.create_dir_all(path, mode).await
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        if self.faults.deny_delete {
            return Err(injected(path));
        }
        self.inner.delete_file(path).await
    }

    async fn delete_directory(&self, path: &Path) -> Result<()> {
        self.inner.delete_directory(path).await
    }

    async fn create_symlink(&self, target: &Path, link: &Path) -> Result<()> {
        self.inner.create_symlink(target, link).await
    }

    async fn open_reader(&self, path: &Path) -> Result<FileReader> {
        self.inner.open_reader(path).await
    }

    async fn open_writer(&self, path: &Path) -> Result<FileWriter> {
        let writer = self.inner.open_writer(path).await?;
        match self.faults.write_limit {
            Some(limit) => Ok(Box::pin(LimitedWriter {
                inner: writer,
                remaining: limit,
            })),
            None => Ok(writer),
        }
    }
}

/// Forwards writes until `remaining` bytes are used up, then fails.
struct LimitedWriter {
    inner: FileWriter,
    remaining: usize,
}

impl AsyncWrite for LimitedWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        if buf.len() > self.remaining {
            return Poll::Ready(Err(std::io::Error::other("injected fault")));
        }
        let poll = self.inner.as_mut().poll_write(cx, buf);
        if let Poll::Ready(Ok(n)) = &poll {
            self.remaining -= *n;
        }
        poll
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        self.inner.as_mut().poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        self.inner.as_mut().poll_shutdown(cx)
    }
}
