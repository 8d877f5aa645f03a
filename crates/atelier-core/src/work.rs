use serde::{Deserialize, Serialize};

use crate::messages::ChatMessage;
use crate::vfs::FileSystemData;

/// Chat and file-system state accumulated before the user authenticated.
///
/// A snapshot with zero messages is treated as absent by consumers: editing
/// files without ever chatting does not count as work worth preserving.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymousWork {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub file_system: FileSystemData,
}

impl AnonymousWork {
    pub fn new(messages: Vec<ChatMessage>, file_system: FileSystemData) -> Self {
        Self {
            messages,
            file_system,
        }
    }

    /// Whether this snapshot counts as present for reconciliation purposes.
    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::FileNode;

    #[test]
    fn empty_snapshot_has_no_messages() {
        assert!(!AnonymousWork::default().has_messages());
    }

    #[test]
    fn snapshot_with_only_files_has_no_messages() {
        let mut fs = FileSystemData::new();
        fs.insert("/App.jsx".into(), FileNode::file("test"));
        let work = AnonymousWork::new(Vec::new(), fs);
        assert!(!work.has_messages());
    }

    #[test]
    fn snapshot_with_messages_is_present() {
        let work = AnonymousWork::new(vec![ChatMessage::user("Hello")], FileSystemData::new());
        assert!(work.has_messages());
    }

    #[test]
    fn serde_defaults_missing_file_system() {
        let json = r#"{"messages":[{"id":"msg_1","role":"user","content":"Hi"}]}"#;
        let work: AnonymousWork = serde_json::from_str(json).unwrap();
        assert!(work.has_messages());
        assert!(work.file_system.is_empty());
    }
}
