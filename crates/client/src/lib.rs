mod api;
mod device;
mod feed;

pub use api::{ApiError, CommentApi, HttpApi, LikeOutcome, NewComment, SubmitOutcome, UserInfo};
pub use device::{device_id, DeviceStore, MemoryStore};
pub use feed::{toggle_like_in, CommentFeed};
