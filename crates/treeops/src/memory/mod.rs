// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory filesystem backend.
//!
//! Primarily the mock capability for tests. All state sits behind one
//! shared lock, so clones of a [`MemoryFilesystem`] observe the same tree
//! while two separately constructed instances are fully independent.
//! Paths are absolute; the root directory `/` always exists.

mod file;

pub use file::{MemoryContent, MemoryWriter};

use crate::backend::{FileReader, FileWriter, Filesystem};
use crate::error::{Error, Result};
use crate::path::normalize;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Default mode recorded for directories created implicitly.
const DEFAULT_DIR_MODE: u32 = 0o755;

#[derive(Clone)]
enum MemoryNode {
    Directory { mode: u32 },
    File(MemoryContent),
    Symlink(PathBuf),
}

#[derive(Clone)]
pub struct MemoryFilesystem(Arc<Mutex<State>>);

struct State {
    nodes: BTreeMap<PathBuf, MemoryNode>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::from([(
                PathBuf::from("/"),
                MemoryNode::Directory {
                    mode: DEFAULT_DIR_MODE,
                },
            )]),
        }
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(State::default())))
    }

    /// Mode a directory was created with, or `None` if `path` is not a
    /// directory.
    pub async fn directory_mode<P: AsRef<Path>>(&self, path: P) -> Option<u32> {
        let state = self.0.lock().await;
        match state.nodes.get(&key(path.as_ref()).ok()?) {
            Some(MemoryNode::Directory { mode }) => Some(*mode),
            _ => None,
        }
    }

    /// Number of nodes, including the root directory.
    pub async fn node_count(&self) -> usize {
        self.0.lock().await.nodes.len()
    }
}

/// Normalize `path` into a map key. Only absolute paths are accepted.
fn key(path: &Path) -> Result<PathBuf> {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::RootDir => resolved.push("/"),
            Component::Normal(name) => resolved.push(name),
            Component::ParentDir => {
                _ = resolved.pop();
            }
            Component::CurDir => {}
            Component::Prefix(_) => return Err(Error::unsupported("prefix", path)),
        }
    }
    if !resolved.has_root() {
        return Err(Error::Other(format!(
            "memory filesystem paths must be absolute: {}",
            path.display()
        )));
    }
    Ok(resolved)
}

impl State {
    fn get(&self, path: &Path) -> Option<&MemoryNode> {
        self.nodes.get(path)
    }

    /// Follow a single symlink hop from `path`, returning the key of the
    /// node it designates.
    fn follow(&self, path: &Path) -> Result<PathBuf> {
        match self.get(path) {
            Some(MemoryNode::Symlink(target)) => {
                let target = if target.is_absolute() {
                    target.clone()
                } else {
                    path.parent().unwrap_or(Path::new("/")).join(target)
                };
                key(&target)
            }
            _ => Ok(path.to_path_buf()),
        }
    }

    fn followed(&self, path: &Path) -> Result<Option<&MemoryNode>> {
        Ok(self.get(&self.follow(path)?))
    }

    fn is_directory(&self, path: &Path) -> Result<bool> {
        Ok(matches!(
            self.followed(path)?,
            Some(MemoryNode::Directory { .. })
        ))
    }

    /// Intermediate components are never followed through symlinks.
    fn require_parent_directory(&self, path: &Path) -> Result<()> {
        let parent = path.parent().ok_or_else(|| Error::already_exists(path))?;
        match self.get(parent) {
            Some(MemoryNode::Directory { .. }) => Ok(()),
            Some(_) => Err(Error::not_a_directory(parent)),
            None => Err(Error::not_found(parent)),
        }
    }

    fn children(&self, dir: &Path) -> impl Iterator<Item = &PathBuf> {
        self.nodes
            .keys()
            .filter(move |candidate| candidate.parent() == Some(dir))
    }

    fn list_children(&self, path: &Path) -> Result<Vec<String>> {
        let dir = self.follow(path)?;
        match self.get(&dir) {
            Some(MemoryNode::Directory { .. }) => Ok(self
                .children(&dir)
                .filter_map(|child| crate::path::basename(child))
                .collect()),
            Some(_) => Err(Error::not_a_directory(path)),
            None => Err(Error::not_found(path)),
        }
    }

    fn create_dir_all(&mut self, path: &Path, mode: u32) -> Result<()> {
        let mut ancestors: Vec<&Path> = path.ancestors().collect();
        ancestors.reverse();
        for dir in ancestors {
            if self.get(dir).is_none() {
                _ = self
                    .nodes
                    .insert(dir.to_path_buf(), MemoryNode::Directory { mode });
            } else if !matches!(self.get(dir), Some(MemoryNode::Directory { .. })) {
                return Err(Error::already_exists(dir));
            }
        }
        Ok(())
    }

    fn delete_file(&mut self, path: &Path) -> Result<()> {
        match self.get(path) {
            Some(MemoryNode::File(_) | MemoryNode::Symlink(_)) => {
                _ = self.nodes.remove(path);
                Ok(())
            }
            Some(MemoryNode::Directory { .. }) => Err(Error::not_a_file(path)),
            None => Err(Error::not_found(path)),
        }
    }

    fn delete_directory(&mut self, path: &Path) -> Result<()> {
        match self.get(path) {
            Some(MemoryNode::Directory { .. }) => {
                if path.parent().is_none() {
                    return Err(Error::unsupported("delete root", path));
                }
                if self.children(path).next().is_some() {
                    return Err(Error::directory_not_empty(path));
                }
                _ = self.nodes.remove(path);
                Ok(())
            }
            Some(_) => Err(Error::not_a_directory(path)),
            None => Err(Error::not_found(path)),
        }
    }

    fn create_symlink(&mut self, target: &Path, link: &Path) -> Result<()> {
        self.require_parent_directory(link)?;
        if self.get(link).is_some() {
            return Err(Error::already_exists(link));
        }
        _ = self
            .nodes
            .insert(link.to_path_buf(), MemoryNode::Symlink(target.to_path_buf()));
        Ok(())
    }

    fn content(&self, path: &Path) -> Result<MemoryContent> {
        match self.followed(path)? {
            Some(MemoryNode::File(content)) => Ok(content.clone()),
            Some(_) => Err(Error::not_a_file(path)),
            None => Err(Error::not_found(path)),
        }
    }

    fn open_for_write(&mut self, path: &Path) -> Result<MemoryContent> {
        let target = self.follow(path)?;
        match self.get(&target) {
            Some(MemoryNode::File(content)) => {
                content.truncate().map_err(Error::io_at(path))?;
                Ok(content.clone())
            }
            Some(_) => Err(Error::not_a_file(path)),
            None => {
                self.require_parent_directory(&target)?;
                let content = MemoryContent::default();
                _ = self
                    .nodes
                    .insert(target, MemoryNode::File(content.clone()));
                Ok(content)
            }
        }
    }
}

#[async_trait]
impl Filesystem for MemoryFilesystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        let path = key(path)?;
        Ok(self.0.lock().await.get(&path).is_some())
    }

    async fn is_directory(&self, path: &Path) -> Result<bool> {
        let path = key(path)?;
        self.0.lock().await.is_directory(&path)
    }

    async fn is_file(&self, path: &Path) -> Result<bool> {
        let path = key(path)?;
        let state = self.0.lock().await;
        Ok(matches!(state.followed(&path)?, Some(MemoryNode::File(_))))
    }

    async fn is_symlink(&self, path: &Path) -> Result<bool> {
        let path = key(path)?;
        Ok(matches!(
            self.0.lock().await.get(&path),
            Some(MemoryNode::Symlink(_))
        ))
    }

    async fn resolve_symlink(&self, path: &Path) -> Result<PathBuf> {
        let path = key(path)?;
        match self.0.lock().await.get(&path) {
            Some(MemoryNode::Symlink(target)) => Ok(target.clone()),
            Some(_) => Err(Error::not_a_symlink(&path)),
            None => Err(Error::not_found(&path)),
        }
    }

    async fn list_children(&self, path: &Path) -> Result<Vec<String>> {
        let path = key(path)?;
        self.0.lock().await.list_children(&path)
    }

    async fn create_dir_all(&self, path: &Path, mode: u32) -> Result<()> {
        let path = key(path)?;
        self.0.lock().await.create_dir_all(&path, mode)
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        let path = key(path)?;
        self.0.lock().await.delete_file(&path)
    }

    async fn delete_directory(&self, path: &Path) -> Result<()> {
        let path = key(path)?;
        self.0.lock().await.delete_directory(&path)
    }

    async fn create_symlink(&self, target: &Path, link: &Path) -> Result<()> {
        let link = key(link)?;
        self.0
            .lock()
            .await
            .create_symlink(&normalize(target), &link)
    }

    async fn open_reader(&self, path: &Path) -> Result<FileReader> {
        let path = key(path)?;
        let content = self.0.lock().await.content(&path)?;
        let reader = content.reader().map_err(Error::io_at(&path))?;
        Ok(Box::pin(reader))
    }

    async fn open_writer(&self, path: &Path) -> Result<FileWriter> {
        let path = key(path)?;
        let content = self.0.lock().await.open_for_write(&path)?;
        Ok(Box::pin(content.writer()))
    }
}
