// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Path helpers used by the tree operations.
//!
//! Paths are handled as `Path` components rather than strings, so repeated
//! separators and `.` segments disappear during normalization and prefix
//! rewriting never matches a separator that is part of a file name.

use std::path::{Component, Path, PathBuf};

/// Collapse repeated separators and drop `.` components.
///
/// `..` is kept as-is: resolving it is the backend's business.
pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
    path.as_ref()
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Nesting depth of a path relative to a traversal root: the number of
/// separators between its components. `a` is 0, `a/b/c` is 2.
pub fn depth<P: AsRef<Path>>(relative: P) -> usize {
    relative
        .as_ref()
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count()
        .saturating_sub(1)
}

/// Replace the `from` prefix of `path` with `to`.
///
/// Returns `None` when `path` is not located under `from`.
pub fn rebase<P, F, T>(path: P, from: F, to: T) -> Option<PathBuf>
where
    P: AsRef<Path>,
    F: AsRef<Path>,
    T: AsRef<Path>,
{
    let path = normalize(path);
    let from = normalize(from);
    path.strip_prefix(&from)
        .ok()
        .map(|rest| join_relative(to, rest))
}

/// Join a relative path under `base`. An empty `relative` yields `base`.
pub fn join_relative<B: AsRef<Path>, R: AsRef<Path>>(base: B, relative: R) -> PathBuf {
    let base = normalize(base);
    let relative = relative.as_ref();
    if relative.as_os_str().is_empty() {
        base
    } else {
        base.join(normalize(relative))
    }
}

/// Final component of a path, if it has one.
pub fn basename<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .components()
        .next_back()
        .and_then(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().to_string()),
            _ => None,
        })
}
