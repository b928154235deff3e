//! 通知持久化抽象层

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::SyncError;
use crate::model::Notification;

/// 通知存储接口
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// 保存一条通知，返回服务端确认后的通知（含 id）
    async fn save(&self, notification: Notification) -> Result<Notification, SyncError>;
}

/// 内存版通知存储
#[derive(Default)]
pub struct InMemoryNotificationStore {
    notifications: RwLock<Vec<Notification>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<Notification> {
        self.notifications.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.notifications.read().await.len()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn save(&self, mut notification: Notification) -> Result<Notification, SyncError> {
        let mut guard = self.notifications.write().await;
        if notification.id.is_none() {
            notification.id = Some(format!("nt_{}", guard.len() + 1));
        }
        guard.push(notification.clone());
        Ok(notification)
    }
}
