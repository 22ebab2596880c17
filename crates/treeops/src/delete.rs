// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Recursive deletion.
//!
//! Files and symlinks are removed as the walk reaches them. Directories are
//! collected into buckets by depth and removed deepest bucket first once the
//! walk is finished, then the root itself.

use crate::backend::Filesystem;
use crate::error::Result;
use crate::walk::TreeWalker;
use diagnostics::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Summary of a completed [`delete_tree`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteReport {
    /// Files and symlinks removed.
    pub files: usize,
    /// Directories removed, including the root.
    pub directories: usize,
}

/// Remove `root` and everything below it.
///
/// Symlinks are deleted as links, never followed. A failure aborts the
/// remaining work; what was already removed stays removed.
pub async fn delete_tree<F, P>(fs: &F, root: P) -> Result<DeleteReport>
where
    F: Filesystem + ?Sized,
    P: AsRef<Path>,
{
    let mut walker = TreeWalker::new(fs, root).await?;
    let root = walker.root().to_path_buf();
    let mut report = DeleteReport::default();
    let mut levels: BTreeMap<usize, Vec<PathBuf>> = BTreeMap::new();

    while let Some(entry) = walker.next_entry().await? {
        if entry.is_plain_directory() {
            levels
                .entry(entry.depth())
                .or_default()
                .push(entry.relative_path);
        } else {
            debug!("delete file {path}", path: entry.full_path.display().to_string());
            fs.delete_file(&entry.full_path).await?;
            report.files += 1;
        }
    }

    for (_, dirs) in levels.into_iter().rev() {
        for relative in dirs {
            let full = root.join(&relative);
            if fs.is_directory(&full).await? {
                debug!("delete directory {path}", path: full.display().to_string());
                fs.delete_directory(&full).await?;
                report.directories += 1;
            }
        }
    }

    if fs.is_directory(&root).await? {
        fs.delete_directory(&root).await?;
        report.directories += 1;
    }

    info!(
        "deleted tree {path}: {files} files, {directories} directories",
        path: root.display().to_string(),
        files: report.files,
        directories: report.directories
    );
    Ok(report)
}
