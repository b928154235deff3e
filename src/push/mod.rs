//! 推送通道抽象层
//!
//! 传输层实现不在本仓库范围内，这里只定义消息契约与进程内实现：
//! 同一班次内的所有订阅者都会收到消息（按约定发送者自身的回声由接收方去重）。
//! 不保证恰好一次投递。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::SyncError;
use crate::model::{ComponentState, Notification};

/// 推送消息
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PushMessage {
    /// 同学刚提交的作业（附作者显示名，接收端无名册映射时使用）
    StudentData {
        component_state: ComponentState,
        #[serde(default)]
        usernames: Vec<String>,
    },
    /// 已持久化的通知
    Notification { notification: Notification },
}

/// 推送通道接口
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// 向同一班次的同学广播
    async fn send_to_period(&self, message: PushMessage) -> Result<(), SyncError>;

    /// 订阅入站消息；订阅随讨论实例一起销毁
    fn subscribe(&self) -> broadcast::Receiver<PushMessage>;
}

/// 进程内推送通道（tokio broadcast）
pub struct InProcessPushChannel {
    tx: broadcast::Sender<PushMessage>,
}

impl InProcessPushChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }
}

impl Default for InProcessPushChannel {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl PushChannel for InProcessPushChannel {
    async fn send_to_period(&self, message: PushMessage) -> Result<(), SyncError> {
        // 无订阅者不算错误：消息丢失由后续全量加载兜底
        let _ = self.tx.send(message);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PushMessage> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_reaches_all_subscribers() {
        let channel = InProcessPushChannel::new(8);
        let mut rx1 = channel.subscribe();
        let mut rx2 = channel.subscribe();

        let state = ComponentState::new("node1", "component1", "Discussion");
        channel
            .send_to_period(PushMessage::StudentData {
                component_state: state,
                usernames: vec!["Ada".to_string()],
            })
            .await
            .unwrap();

        assert!(matches!(rx1.recv().await.unwrap(), PushMessage::StudentData { .. }));
        assert!(matches!(rx2.recv().await.unwrap(), PushMessage::StudentData { .. }));
    }

    #[tokio::test]
    async fn test_send_without_subscribers_is_ok() {
        let channel = InProcessPushChannel::new(8);
        let notification =
            Notification::discussion_reply("node1", "component1", 2, 1, "hello");
        channel
            .send_to_period(PushMessage::Notification { notification })
            .await
            .unwrap();
    }
}
