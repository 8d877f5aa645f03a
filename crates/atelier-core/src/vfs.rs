use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Snapshot of the client-side virtual file system, keyed by absolute path.
/// BTreeMap keeps serialization order stable across snapshots.
pub type FileSystemData = BTreeMap<String, FileNode>;

/// One entry in the virtual file system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileNode {
    File { content: String },
    Directory,
}

impl FileNode {
    pub fn file(content: impl Into<String>) -> Self {
        Self::File {
            content: content.into(),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File { .. })
    }
}
