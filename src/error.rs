//! 同步层错误定义

use thiserror::Error;

/// 保存/检索/推送过程中的错误
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Student work store error: {0}")]
    Store(String),

    #[error("Push channel error: {0}")]
    Push(String),

    #[error("Operation not permitted: {0}")]
    Permission(String),

    #[error("Event channel closed")]
    ChannelClosed,

    #[error("Configuration error: {0}")]
    Config(String),
}
