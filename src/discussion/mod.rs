//! 讨论组件：班级回复同步、讨论串索引、审核与通知
//!
//! - **thread**: 帖子/回复两级索引，非破坏性删除的可见性判定
//! - **controller**: 按身份分流的加载与推送增量更新
//! - **notify**: 回复通知的分发规则

pub mod controller;
pub mod notify;
pub mod thread;

pub use controller::{spawn_push_listener, DiscussionController, DiscussionHandle, Phase};
pub use notify::dispatch_reply_notifications;
pub use thread::{ThreadIndex, ThreadedPost};
