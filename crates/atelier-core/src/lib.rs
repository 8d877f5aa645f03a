pub mod ids;
pub mod messages;
pub mod vfs;
pub mod work;

pub use messages::{ChatMessage, MessageRole};
pub use vfs::{FileNode, FileSystemData};
pub use work::AnonymousWork;
