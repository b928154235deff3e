//! 自动保存调度器
//!
//! 周期性向节点事件通道发送 AutosaveTick；是否真正保存由编排器根据
//! 脏集合决定。事件循环串行处理 tick，天然避免重叠的自动保存。
//! stop 基于 CancellationToken，幂等：节点退出时恰好取消一次即可。

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::events::NodeEvent;

/// 自动保存调度器
pub struct AutosaveScheduler {
    token: CancellationToken,
}

impl AutosaveScheduler {
    /// 启动定时任务；事件端关闭或 token 取消时退出
    pub fn start(interval: Duration, events: mpsc::UnboundedSender<NodeEvent>) -> Self {
        let token = CancellationToken::new();
        let task_token = token.clone();

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            // 第一次 tick 立即返回，跳过
            timer.tick().await;

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = timer.tick() => {
                        if events.send(NodeEvent::AutosaveTick).is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Autosave scheduler stopped");
        });

        Self { token }
    }

    /// 停止定时器（幂等）
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for AutosaveScheduler {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
