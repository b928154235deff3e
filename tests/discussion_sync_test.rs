//! 端到端：两个工作组经由进程内推送通道同步同一讨论组件，
//! 教师在评分视图中审核。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use classwork::discussion::{spawn_push_listener, DiscussionController, DiscussionHandle};
use classwork::model::{ComponentContent, FlagAction, NodeContent};
use classwork::node::{NodeOrchestrator, SaveTrigger};
use classwork::push::{InProcessPushChannel, PushChannel};
use classwork::services::{
    InMemoryAnnotationStore, InMemoryNotificationStore, InMemoryRoster, InMemoryStudentWorkStore,
    Mode, Roster, StudentWorkStore,
};

const REPLY_TEMPLATE: &str = "{usernames} replied to a discussion you were in";

struct Classroom {
    store: Arc<InMemoryStudentWorkStore>,
    annotations: Arc<InMemoryAnnotationStore>,
    notifications: Arc<InMemoryNotificationStore>,
    push: Arc<dyn PushChannel>,
    node: NodeContent,
}

impl Classroom {
    fn new() -> Self {
        let mut node = NodeContent::new("node1");
        node.components
            .push(ComponentContent::new("component1", "Discussion"));
        let annotations = Arc::new(InMemoryAnnotationStore::new());
        Self {
            store: Arc::new(
                InMemoryStudentWorkStore::new().with_annotation_source(annotations.clone()),
            ),
            annotations,
            notifications: Arc::new(InMemoryNotificationStore::new()),
            push: Arc::new(InProcessPushChannel::new(16)),
            node,
        }
    }

    fn roster(&self, workgroup_id: i64, mode: Mode) -> Arc<dyn Roster> {
        InMemoryRoster::new(1, 10, workgroup_id, mode)
            .with_workgroup(100, &["Ada"], &[1])
            .with_workgroup(101, &["Grace"], &[2])
            .into_arc()
    }

    fn controller(&self, roster: Arc<dyn Roster>) -> Arc<RwLock<DiscussionController>> {
        Arc::new(RwLock::new(DiscussionController::new(
            "node1",
            self.node.component("component1").cloned().unwrap(),
            self.store.clone(),
            self.annotations.clone(),
            self.notifications.clone(),
            self.push.clone(),
            roster,
            REPLY_TEMPLATE,
        )))
    }

    fn orchestrator(
        &self,
        roster: Arc<dyn Roster>,
        controller: Arc<RwLock<DiscussionController>>,
    ) -> NodeOrchestrator {
        let mut orchestrator = NodeOrchestrator::new(
            self.node.clone(),
            self.store.clone(),
            roster,
            Duration::from_secs(3600),
        );
        orchestrator.register_component("component1", Arc::new(DiscussionHandle::new(controller)));
        orchestrator
    }
}

async fn settle() {
    // 推送消费在独立任务中，让出调度
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn test_two_workgroups_sync_over_push_channel() {
    let classroom = Classroom::new();

    let roster_a = classroom.roster(100, Mode::Student);
    let roster_b = classroom.roster(101, Mode::Student);

    let controller_a = classroom.controller(roster_a.clone());
    let controller_b = classroom.controller(roster_b.clone());
    controller_a.write().await.load_initial_responses().await.unwrap();
    controller_b.write().await.load_initial_responses().await.unwrap();
    let _listener_a = spawn_push_listener(controller_a.clone(), classroom.push.clone());
    let _listener_b = spawn_push_listener(controller_b.clone(), classroom.push.clone());

    let mut orchestrator_a = classroom.orchestrator(roster_a, controller_a.clone());
    let mut orchestrator_b = classroom.orchestrator(roster_b, controller_b.clone());
    orchestrator_a.enter().await.unwrap();
    orchestrator_b.enter().await.unwrap();

    // 工作组 100 发顶层帖
    controller_a.write().await.set_compose("What did you observe?", None);
    orchestrator_a
        .save_work(SaveTrigger::SingleComponent("component1".to_string()), false, true)
        .await
        .unwrap();
    settle().await;

    let post_id = {
        let guard = controller_b.read().await;
        let top = guard.threads().top_level(false);
        assert_eq!(top.len(), 1, "classmate post should arrive over push");
        assert_eq!(top[0].usernames, "Ada");
        top[0].state.id.clone().unwrap()
    };

    // 工作组 101 回复
    controller_b
        .write()
        .await
        .set_compose("It turned blue.", Some(&post_id));
    orchestrator_b
        .save_work(SaveTrigger::SingleComponent("component1".to_string()), false, true)
        .await
        .unwrap();
    settle().await;

    // 双方视图各有 1 顶层帖 + 1 回复，回声没有造成重复
    for controller in [&controller_a, &controller_b] {
        let guard = controller.read().await;
        assert_eq!(guard.threads().len(), 2);
        assert_eq!(guard.threads().top_level(false).len(), 1);
        assert_eq!(guard.threads().replies_of(&post_id, false).len(), 1);
    }

    // 原帖作者收到回复通知（持久化 + 推送入箱）
    assert_eq!(classroom.notifications.count().await, 1);
    let inbox_a = controller_a.read().await.inbox().to_vec();
    assert_eq!(inbox_a.len(), 1);
    assert_eq!(inbox_a[0].message, "Grace replied to a discussion you were in");
    assert!(controller_b.read().await.inbox().is_empty());

    // 退出：收尾保存 + 导航事件
    orchestrator_a.exit().await.unwrap();
    orchestrator_b.exit().await.unwrap();
    let events = classroom.store.events().await;
    assert_eq!(
        events.iter().filter(|e| e.event == "nodeExited").count(),
        2
    );
}

#[tokio::test]
async fn test_moderation_hides_post_for_students_after_reload() {
    let classroom = Classroom::new();

    // 既有讨论：100 发帖，101 回复
    let roster_a = classroom.roster(100, Mode::Student);
    let controller_a = classroom.controller(roster_a.clone());
    controller_a.write().await.load_initial_responses().await.unwrap();
    let mut orchestrator_a = classroom.orchestrator(roster_a, controller_a.clone());
    controller_a.write().await.set_compose("A questionable post", None);
    orchestrator_a
        .save_work(SaveTrigger::SingleComponent("component1".to_string()), false, true)
        .await
        .unwrap();

    let post = classroom.store.states_by_node("node1").await[0].clone();

    // 教师在评分视图中删除
    let teacher = classroom.roster(
        900,
        Mode::Grading {
            target_workgroup_id: 100,
        },
    );
    let grading = classroom.controller(teacher);
    grading.write().await.load_initial_responses().await.unwrap();
    grading
        .write()
        .await
        .moderate(&post, FlagAction::Delete)
        .await
        .unwrap();

    // 教师仍看得到，学生全量加载后看不到
    assert_eq!(grading.read().await.threads().top_level(true).len(), 1);
    assert_eq!(grading.read().await.threads().top_level(false).len(), 0);

    let student = classroom.controller(classroom.roster(101, Mode::Student));
    student.write().await.load_initial_responses().await.unwrap();
    assert_eq!(student.read().await.threads().top_level(false).len(), 0);

    // 撤销删除后恢复可见
    grading
        .write()
        .await
        .moderate(&post, FlagAction::UndoDelete)
        .await
        .unwrap();
    let student = classroom.controller(classroom.roster(101, Mode::Student));
    student.write().await.load_initial_responses().await.unwrap();
    assert_eq!(student.read().await.threads().top_level(false).len(), 1);
}
