// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Cross-backend tree replication.
//!
//! [`move_tree`] mirrors a file or a directory tree from one backend onto
//! another. It copies: the source is only read, never modified. Symlinks
//! are recreated after every file and directory is in place, with targets
//! under the source root rebased onto the destination root.

use crate::backend::Filesystem;
use crate::config::TreeOptions;
use crate::copy::copy_file_with;
use crate::error::{Error, Result};
use crate::path;
use crate::walk::{TreeEntry, TreeWalker};
use diagnostics::*;
use std::path::{Path, PathBuf};

/// Counts of what a [`move_tree`] produced on the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveReport {
    pub directories_created: usize,
    pub files_copied: usize,
    pub bytes_copied: u64,
    pub symlinks_created: usize,
}

/// Replicate `src` from `src_fs` under `dst` on `dst_fs` with default options.
pub async fn move_tree<S, D>(src: &Path, src_fs: &S, dst: &Path, dst_fs: &D) -> Result<MoveReport>
where
    S: Filesystem + ?Sized,
    D: Filesystem + ?Sized,
{
    move_tree_with(src, src_fs, dst, dst_fs, &TreeOptions::default()).await
}

/// Replicate `src` from `src_fs` under `dst` on `dst_fs`.
///
/// `dst` is created as a directory if it is not one already. A directory
/// source has its contents mirrored into `dst`; a file source is copied
/// into `dst` under its own name. Files are copied one at a time in walk
/// order. Nothing is rolled back on failure.
pub async fn move_tree_with<S, D>(
    src: &Path,
    src_fs: &S,
    dst: &Path,
    dst_fs: &D,
    options: &TreeOptions,
) -> Result<MoveReport>
where
    S: Filesystem + ?Sized,
    D: Filesystem + ?Sized,
{
    let src = path::normalize(src);
    let dst = path::normalize(dst);
    let mut report = MoveReport::default();

    if !src_fs.exists(&src).await? {
        return Err(Error::not_found(&src));
    }

    if !dst_fs.is_directory(&dst).await? {
        dst_fs.create_dir_all(&dst, options.directory_mode).await?;
        report.directories_created += 1;
    }

    if src_fs.is_file(&src).await? {
        let name = path::basename(&src).ok_or_else(|| Error::not_a_file(&src))?;
        let target = dst.join(name);
        report.bytes_copied += copy_file_with(&src, src_fs, &target, dst_fs, options).await?;
        report.files_copied += 1;
        log_report(&src, &dst, &report);
        return Ok(report);
    }

    let mut symlinks: Vec<TreeEntry> = Vec::new();
    let mut walker = TreeWalker::new(src_fs, &src).await?;

    while let Some(entry) = walker.next_entry().await? {
        if entry.is_symlink() {
            symlinks.push(entry);
            continue;
        }

        let target = path::join_relative(&dst, &entry.relative_path);
        if entry.is_directory {
            if !dst_fs.is_directory(&target).await? {
                dst_fs.create_dir_all(&target, options.directory_mode).await?;
                report.directories_created += 1;
            }
            continue;
        }

        report.bytes_copied +=
            copy_file_with(&entry.full_path, src_fs, &target, dst_fs, options).await?;
        report.files_copied += 1;
    }

    for entry in symlinks {
        let Some(original) = entry.symlink_target.as_deref() else {
            continue;
        };
        let rewritten = rewrite_target(original, &src, &dst);
        let link = path::join_relative(&dst, &entry.relative_path);
        debug!(
            "relocate symlink {link} -> {target}",
            link: link.display().to_string(),
            target: rewritten.display().to_string()
        );
        dst_fs.create_symlink(&rewritten, &link).await?;
        report.symlinks_created += 1;
    }

    log_report(&src, &dst, &report);
    Ok(report)
}

/// Rebase a symlink target from the source root onto the destination root.
///
/// Targets outside the source root, including relative ones, are kept as
/// they are.
pub fn rewrite_target(target: &Path, src: &Path, dst: &Path) -> PathBuf {
    path::rebase(target, src, dst).unwrap_or_else(|| target.to_path_buf())
}

fn log_report(src: &Path, dst: &Path, report: &MoveReport) {
    info!(
        "moved {src} -> {dst}: {files} files ({bytes} bytes), {symlinks} symlinks",
        src: src.display().to_string(),
        dst: dst.display().to_string(),
        files: report.files_copied,
        bytes: report.bytes_copied,
        symlinks: report.symlinks_created
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_target() {
        let src = Path::new("/d1");
        let dst = Path::new("/out");
        assert_eq!(
            rewrite_target(Path::new("/d1/d2/f1"), src, dst),
            PathBuf::from("/out/d2/f1")
        );
        assert_eq!(rewrite_target(Path::new("/d1"), src, dst), PathBuf::from("/out"));
        assert_eq!(rewrite_target(Path::new("/"), src, dst), PathBuf::from("/"));
        assert_eq!(
            rewrite_target(Path::new("../f1"), src, dst),
            PathBuf::from("../f1")
        );
    }
}
