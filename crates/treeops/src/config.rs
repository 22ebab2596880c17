// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Bytes requested per read while copying.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Mode for directories created on the destination side.
pub const DEFAULT_DIRECTORY_MODE: u32 = 0o750;

/// Tunables shared by the tree operations.
///
/// ```yaml
/// chunk_size: 65536
/// directory_mode: 448   # 0o700
/// marker_directory: /var/tmp
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeOptions {
    pub chunk_size: usize,
    pub directory_mode: u32,
    /// Where the same-backend probe writes its marker file. `None` means
    /// the process temp directory.
    pub marker_directory: Option<PathBuf>,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            directory_mode: DEFAULT_DIRECTORY_MODE,
            marker_directory: None,
        }
    }
}

impl TreeOptions {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let options: Self = serde_yaml_ng::from_str(yaml)
            .map_err(|e| Error::Other(format!("Invalid tree options: {e}")))?;
        if options.chunk_size == 0 {
            return Err(Error::Other("chunk_size must be positive".to_string()));
        }
        Ok(options)
    }

    /// Read size for copies; never zero.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }

    pub fn marker_directory(&self) -> PathBuf {
        self.marker_directory
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TreeOptions::default();
        assert_eq!(options.chunk_size(), 8192);
        assert_eq!(options.directory_mode, 0o750);
        assert_eq!(options.marker_directory(), std::env::temp_dir());
    }

    #[test]
    fn test_from_yaml_partial() {
        let options = TreeOptions::from_yaml_str("chunk_size: 16\n").expect("parse");
        assert_eq!(options.chunk_size, 16);
        assert_eq!(options.directory_mode, DEFAULT_DIRECTORY_MODE);

        let options =
            TreeOptions::from_yaml_str("directory_mode: 448\nmarker_directory: /scratch\n")
                .expect("parse");
        assert_eq!(options.directory_mode, 0o700);
        assert_eq!(options.marker_directory(), PathBuf::from("/scratch"));
    }

    #[test]
    fn test_from_yaml_rejects_bad_input() {
        assert!(TreeOptions::from_yaml_str("chunk_size: 0\n").is_err());
        assert!(TreeOptions::from_yaml_str("unknown_key: 1\n").is_err());
    }
}
