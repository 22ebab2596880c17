// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! treeops - tree-level operations over an abstract async filesystem
//!
//! Everything here is written against the [`Filesystem`] capability trait:
//! - [`list_tree`]: lazy pre-order listing that never follows symlinks
//! - [`delete_tree`]: bottom-up recursive removal
//! - [`move_tree`]: replicate a file or tree onto another backend
//! - [`copy_file`]: streamed single-file copy with cleanup on failure
//! - [`probe_same_backend`]: marker-file check for shared storage
//!
//! Set TREEOPS_LOG to control logging (see the `diagnostics` crate).

// Capability trait and stream handle types
pub mod backend;

// Error types
pub mod error;

// Options shared by all operations
pub mod config;

pub mod path;

// Tree operations
pub mod copy;
pub mod delete;
pub mod mover;
pub mod probe;
pub mod walk;

// Backends
pub mod host;
pub mod memory;

// Fault injection and fixtures
pub mod testing;

pub use backend::{FileReader, FileWriter, Filesystem};
pub use config::TreeOptions;
pub use copy::{copy_file, copy_file_with};
pub use delete::{DeleteReport, delete_tree};
pub use error::{Error, Result};
pub use host::HostFilesystem;
pub use memory::MemoryFilesystem;
pub use mover::{MoveReport, move_tree, move_tree_with};
pub use probe::{probe_same_backend, probe_same_backend_with};
pub use walk::{TreeEntry, TreeStream, TreeWalker, collect_tree, list_tree};

#[cfg(test)]
mod tests;
