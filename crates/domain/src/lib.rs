mod models;
mod thread;
pub mod wire;

pub use models::{CommentNode, CommentRecord, CommentType, PageId};
pub use thread::{build_thread, present, DisplayMode};
pub use wire::RawComment;
