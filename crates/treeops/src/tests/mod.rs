mod copy;
#[cfg(unix)]
mod host;

use crate::testing::Fixture;

/// The tree used by the move round-trip tests: directories, files,
/// file symlinks, a symlink to a symlink, and a directory symlink that
/// loops back to the root.
pub(crate) const SAMPLE_TREE: &[Fixture] = &[
    Fixture::Directory("dir1"),
    Fixture::Directory("dir1/dir1"),
    Fixture::File("dir1/dir1/file1", "/dir1/dir1/file1 content"),
    Fixture::File("dir1/dir1/file2", "/dir1/dir1/file2 content"),
    Fixture::Symlink("dir1/dir1/file3", "dir1/dir1/file1"),
    Fixture::Symlink("dir1/dir1/file4", "dir1/dir1/file2"),
    Fixture::Symlink("dir1/dir1/dir1", ""),
    Fixture::Directory("dir1/dir2"),
    Fixture::File("dir1/dir2/file1", "/dir1/dir2/file1 content"),
    Fixture::Symlink("dir1/dir2/file2", "dir1/dir1/file1"),
    Fixture::File("dir1/file1", "/dir1/file1 content"),
    Fixture::Symlink("dir1/file2", "dir1/dir2/file2"),
];
