//! classwork - 学生作业同步核心
//!
//! 入口：初始化日志与配置，用进程内协作方跑一轮模拟课堂：
//! 两个工作组进入同一讨论节点，先后发帖与回复，推送增量同步
//! 双方视图，回复触发通知，最后退出节点完成收尾保存。

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::RwLock;

use classwork::config::load_config;
use classwork::discussion::{spawn_push_listener, DiscussionController, DiscussionHandle};
use classwork::model::{ComponentContent, NodeContent};
use classwork::node::{NodeOrchestrator, SaveTrigger};
use classwork::push::{InProcessPushChannel, PushChannel};
use classwork::services::{
    InMemoryAnnotationStore, InMemoryNotificationStore, InMemoryRoster, InMemoryStudentWorkStore,
    Mode, Roster, StudentWorkStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    classwork::observability::init();

    let cfg = load_config(None).context("Failed to load config")?;
    tracing::info!(
        app = cfg.app.name.as_deref().unwrap_or("classwork"),
        auto_save_interval_secs = cfg.sync.auto_save_interval_secs,
        "Starting simulated classroom"
    );

    // 进程内协作方：同一班次的两个工作组共享存储与推送通道
    let annotations = Arc::new(InMemoryAnnotationStore::new());
    let store = Arc::new(
        InMemoryStudentWorkStore::new().with_annotation_source(annotations.clone()),
    );
    let notifications = Arc::new(InMemoryNotificationStore::new());
    let push: Arc<dyn PushChannel> =
        Arc::new(InProcessPushChannel::new(cfg.push.channel_capacity));

    let mut node = NodeContent::new("node1");
    node.components
        .push(ComponentContent::new("component1", "Discussion"));

    let roster_a: Arc<dyn Roster> = InMemoryRoster::new(1, 10, 100, Mode::Student)
        .with_workgroup(100, &["Ada"], &[1])
        .with_workgroup(101, &["Grace"], &[2])
        .into_arc();
    let roster_b: Arc<dyn Roster> = InMemoryRoster::new(1, 10, 101, Mode::Student)
        .with_workgroup(100, &["Ada"], &[1])
        .with_workgroup(101, &["Grace"], &[2])
        .into_arc();

    // 工作组 100：发一条顶层帖
    let controller_a = Arc::new(RwLock::new(DiscussionController::new(
        "node1",
        node.component("component1").cloned().context("missing component")?,
        store.clone(),
        annotations.clone(),
        notifications.clone(),
        push.clone(),
        roster_a.clone(),
        &cfg.notification.reply_message,
    )));
    controller_a.write().await.load_initial_responses().await?;
    let listener_a = spawn_push_listener(controller_a.clone(), push.clone());

    let mut orchestrator_a = NodeOrchestrator::new(
        node.clone(),
        store.clone(),
        roster_a,
        Duration::from_secs(cfg.sync.auto_save_interval_secs),
    );
    orchestrator_a.register_component(
        "component1",
        Arc::new(DiscussionHandle::new(controller_a.clone())),
    );

    orchestrator_a.enter().await?;
    controller_a
        .write()
        .await
        .set_compose("What did everyone observe in the experiment?", None);
    orchestrator_a
        .save_work(SaveTrigger::SingleComponent("component1".to_string()), false, true)
        .await?;

    let post_id = {
        let guard = controller_a.read().await;
        guard
            .threads()
            .top_level(false)
            .first()
            .and_then(|p| p.state.id.clone())
            .context("post was not registered")?
    };
    tracing::info!(%post_id, "Workgroup 100 posted");

    // 工作组 101：加载班级视图后回复
    let controller_b = Arc::new(RwLock::new(DiscussionController::new(
        "node1",
        node.component("component1").cloned().context("missing component")?,
        store.clone(),
        annotations.clone(),
        notifications.clone(),
        push.clone(),
        roster_b.clone(),
        &cfg.notification.reply_message,
    )));
    controller_b.write().await.load_initial_responses().await?;
    let listener_b = spawn_push_listener(controller_b.clone(), push.clone());

    let mut orchestrator_b = NodeOrchestrator::new(
        node.clone(),
        store.clone(),
        roster_b,
        Duration::from_secs(cfg.sync.auto_save_interval_secs),
    );
    orchestrator_b.register_component(
        "component1",
        Arc::new(DiscussionHandle::new(controller_b.clone())),
    );

    orchestrator_b.enter().await?;
    controller_b
        .write()
        .await
        .set_compose("The reaction sped up when we raised the temperature.", Some(&post_id));
    orchestrator_b
        .save_work(SaveTrigger::SingleComponent("component1".to_string()), false, true)
        .await?;

    // 推送在独立任务中消费，给它一个调度机会
    tokio::time::sleep(Duration::from_millis(50)).await;

    {
        let guard = controller_a.read().await;
        tracing::info!(
            replies = guard.threads().replies_of(&post_id, false).len(),
            notifications = guard.inbox().len(),
            "Workgroup 100 view after reply"
        );
    }

    orchestrator_a.exit().await?;
    orchestrator_b.exit().await?;
    listener_a.cancel();
    listener_b.cancel();

    tracing::info!(
        posts = store.states_by_node("node1").await.len(),
        events = store.event_count().await,
        notifications = notifications.count().await,
        "Simulated classroom finished"
    );
    Ok(())
}
