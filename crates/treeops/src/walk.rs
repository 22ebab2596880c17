// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Depth-first tree listing.
//!
//! [`TreeWalker`] turns per-directory listings into one lazy sequence of
//! [`TreeEntry`] values in pre-order. Pending paths live on an explicit
//! stack owned by the walker, so depth is bounded by memory rather than by
//! the call stack. Symlinks are reported but never descended into.

use crate::backend::Filesystem;
use crate::error::{Error, Result};
use crate::path;
use diagnostics::*;
use futures::stream::{Stream, TryStreamExt};
use std::path::{Path, PathBuf};
use std::pin::Pin;

/// One node discovered during a traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Path relative to the traversal root.
    pub relative_path: PathBuf,
    /// Traversal root joined with `relative_path`.
    pub full_path: PathBuf,
    /// Directory-like according to the backend. For a symlink this reflects
    /// what the link points at.
    pub is_directory: bool,
    /// Set iff the node is a symlink; holds the stored link target.
    pub symlink_target: Option<PathBuf>,
}

impl TreeEntry {
    pub fn is_symlink(&self) -> bool {
        self.symlink_target.is_some()
    }

    /// A real directory: directory-like and not a symlink.
    pub fn is_plain_directory(&self) -> bool {
        self.is_directory && !self.is_symlink()
    }

    /// Number of separators in `relative_path`.
    pub fn depth(&self) -> usize {
        path::depth(&self.relative_path)
    }
}

/// Boxed stream returned by [`list_tree`].
pub type TreeStream<'a> = Pin<Box<dyn Stream<Item = Result<TreeEntry>> + Send + 'a>>;

/// Explicit-state depth-first walker.
///
/// Single use: once [`TreeWalker::next_entry`] has returned `Ok(None)` or
/// an error, the walk is over.
pub struct TreeWalker<'a, F: Filesystem + ?Sized> {
    fs: &'a F,
    root: PathBuf,
    /// Not-yet-visited relative paths. The next one to visit is at the end.
    pending: Vec<PathBuf>,
    /// Last yielded plain directory, listed on the following pull.
    expand: Option<PathBuf>,
    done: bool,
}

impl<'a, F: Filesystem + ?Sized + 'a> TreeWalker<'a, F> {
    /// Check that `root` is a directory and seed the stack with its children.
    pub async fn new<P: AsRef<Path>>(fs: &'a F, root: P) -> Result<Self> {
        let root = path::normalize(root);
        if !fs.is_directory(&root).await? {
            return Err(Error::not_a_directory(&root));
        }

        let mut walker = Self {
            fs,
            root,
            pending: Vec::new(),
            expand: None,
            done: false,
        };
        let children = fs.list_children(&walker.root).await?;
        walker.push_children(Path::new(""), children);
        Ok(walker)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Push children so that the first listed child is popped first.
    fn push_children(&mut self, parent: &Path, children: Vec<String>) {
        self.pending
            .extend(children.into_iter().rev().map(|name| parent.join(name)));
    }

    /// Produce the next entry, `Ok(None)` when the tree is exhausted.
    ///
    /// An error ends the walk; later calls return `Ok(None)`.
    pub async fn next_entry(&mut self) -> Result<Option<TreeEntry>> {
        if self.done {
            return Ok(None);
        }
        match self.advance().await {
            Ok(Some(entry)) => Ok(Some(entry)),
            other => {
                self.done = true;
                self.pending.clear();
                self.expand = None;
                other
            }
        }
    }

    async fn advance(&mut self) -> Result<Option<TreeEntry>> {
        if let Some(parent) = self.expand.take() {
            let children = self.fs.list_children(&self.root.join(&parent)).await?;
            self.push_children(&parent, children);
        }

        let Some(relative_path) = self.pending.pop() else {
            return Ok(None);
        };
        let full_path = self.root.join(&relative_path);

        let is_directory = self.fs.is_directory(&full_path).await?;
        let symlink_target = if self.fs.is_symlink(&full_path).await? {
            Some(self.fs.resolve_symlink(&full_path).await?)
        } else {
            None
        };

        let entry = TreeEntry {
            relative_path,
            full_path,
            is_directory,
            symlink_target,
        };

        if entry.is_plain_directory() {
            self.expand = Some(entry.relative_path.clone());
        }

        debug!("walk visited {path}", path: entry.full_path.display().to_string());
        Ok(Some(entry))
    }

    /// Drive the walker as a stream. The walker only advances when the
    /// consumer polls for the next item.
    pub fn into_stream(mut self) -> TreeStream<'a> {
        Box::pin(async_stream::stream! {
            loop {
                match self.next_entry().await {
                    Ok(Some(entry)) => yield Ok(entry),
                    Ok(None) => break,
                    Err(err) => {
                        yield Err(err);
                        break;
                    }
                }
            }
        })
    }
}

/// List every node under `root` in pre-order depth-first order.
///
/// Fails with [`Error::NotADirectory`] before producing anything if `root`
/// is not a directory. Any later failure is delivered as the final item.
pub async fn list_tree<'a, F, P>(fs: &'a F, root: P) -> Result<TreeStream<'a>>
where
    F: Filesystem + ?Sized,
    P: AsRef<Path>,
{
    Ok(TreeWalker::new(fs, root).await?.into_stream())
}

/// Drain a listing into memory.
pub async fn collect_tree<F, P>(fs: &F, root: P) -> Result<Vec<TreeEntry>>
where
    F: Filesystem + ?Sized,
    P: AsRef<Path>,
{
    list_tree(fs, root).await?.try_collect().await
}
