// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by tree operations and by the filesystem backends they drive.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("Not a symlink: {}", .0.display())]
    NotASymlink(PathBuf),

    #[error("Entry already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Directory not empty: {}", .0.display())]
    DirectoryNotEmpty(PathBuf),

    #[error("Unsupported operation '{op}': {}", path.display())]
    Unsupported { op: &'static str, path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn not_a_directory<P: AsRef<Path>>(path: P) -> Self {
        Error::NotADirectory(path.as_ref().to_path_buf())
    }

    pub fn not_found<P: AsRef<Path>>(path: P) -> Self {
        Error::NotFound(path.as_ref().to_path_buf())
    }

    pub fn not_a_file<P: AsRef<Path>>(path: P) -> Self {
        Error::NotAFile(path.as_ref().to_path_buf())
    }

    pub fn not_a_symlink<P: AsRef<Path>>(path: P) -> Self {
        Error::NotASymlink(path.as_ref().to_path_buf())
    }

    pub fn already_exists<P: AsRef<Path>>(path: P) -> Self {
        Error::AlreadyExists(path.as_ref().to_path_buf())
    }

    pub fn directory_not_empty<P: AsRef<Path>>(path: P) -> Self {
        Error::DirectoryNotEmpty(path.as_ref().to_path_buf())
    }

    pub fn unsupported<P: AsRef<Path>>(op: &'static str, path: P) -> Self {
        Error::Unsupported {
            op,
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn io<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build a `map_err` adapter that attaches `path` to an `std::io::Error`.
    pub fn io_at<P: AsRef<Path>>(path: P) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| Error::Io { path, source }
    }
}
