// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Same-storage detection by marker file.

use crate::backend::Filesystem;
use crate::config::TreeOptions;
use crate::error::Result;
use diagnostics::*;
use std::path::{Path, PathBuf};

/// Probe with default options. See [`probe_same_backend_with`].
pub async fn probe_same_backend<A, B>(fs_a: &A, fs_b: &B) -> Result<bool>
where
    A: Filesystem + ?Sized,
    B: Filesystem + ?Sized,
{
    probe_same_backend_with(fs_a, fs_b, &TreeOptions::default()).await
}

/// Guess whether `fs_a` and `fs_b` address the same storage.
///
/// Writes a uniquely named marker with unique content through `fs_a` and
/// checks that `fs_b` sees a file at the same path with the same content.
/// The marker is removed through `fs_a` whatever the outcome. Errors writing
/// or removing the marker are returned, not reported as `false`.
pub async fn probe_same_backend_with<A, B>(fs_a: &A, fs_b: &B, options: &TreeOptions) -> Result<bool>
where
    A: Filesystem + ?Sized,
    B: Filesystem + ?Sized,
{
    let token = uuid7::uuid7().to_string();
    let marker = marker_path(&options.marker_directory(), &token);

    fs_a.write(&marker, token.as_bytes()).await?;

    let observed = observe(fs_b, &marker, token.as_bytes()).await;
    fs_a.delete_file(&marker).await?;
    let same = observed?;

    debug!(
        "backend probe via {path}: {same}",
        path: marker.display().to_string(),
        same: same
    );
    Ok(same)
}

fn marker_path(dir: &Path, token: &str) -> PathBuf {
    dir.join(format!("treeops-probe-{token}"))
}

async fn observe<B: Filesystem + ?Sized>(fs: &B, marker: &Path, expected: &[u8]) -> Result<bool> {
    if !fs.is_file(marker).await? {
        return Ok(false);
    }
    Ok(fs.read(marker).await? == expected)
}
