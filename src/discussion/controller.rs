//! 讨论组件控制器
//!
//! 管理一个 Discussion 组件的班级回复视图：初始加载按身份分流
//! （学生/预览/评分），之后靠推送消息增量更新；审核动作走批注
//! 存储并整组重载。提交草稿通过 [`DiscussionHandle`] 汇入节点
//! 编排器的保存批次。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error::SyncError;
use crate::model::{
    latest_inappropriate_flag, Annotation, AnnotationKind, ComponentContent, ComponentRef,
    ComponentState, FlagAction, Notification, StudentData,
};
use crate::node::{
    has_connected_components, is_import_work_mode, is_show_work_mode, ComponentHandle,
};
use crate::push::{PushChannel, PushMessage};
use crate::services::{
    display_name, AnnotationStore, Mode, NotificationStore, Roster, StudentWorkStore,
};

use super::notify::dispatch_reply_notifications;
use super::thread::{ThreadIndex, ThreadedPost};

/// 班级回复视图的加载阶段。Ready 之前到达的推送一律丢弃，
/// 随后的全量加载会补齐。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loading,
    Ready,
}

/// 尚未提交的草稿
#[derive(Debug, Clone)]
pub struct PendingPost {
    pub response: String,
    pub reply_to: Option<String>,
}

pub struct DiscussionController {
    node_id: String,
    component: ComponentContent,
    store: Arc<dyn StudentWorkStore>,
    annotations: Arc<dyn AnnotationStore>,
    notifications: Arc<dyn NotificationStore>,
    push: Arc<dyn PushChannel>,
    roster: Arc<dyn Roster>,
    reply_message_template: String,
    phase: Phase,
    threads: ThreadIndex,
    compose: Option<PendingPost>,
    disabled: bool,
    /// 发给本工作组的通知（推送到达顺序）
    inbox: Vec<Notification>,
}

impl DiscussionController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        node_id: &str,
        component: ComponentContent,
        store: Arc<dyn StudentWorkStore>,
        annotations: Arc<dyn AnnotationStore>,
        notifications: Arc<dyn NotificationStore>,
        push: Arc<dyn PushChannel>,
        roster: Arc<dyn Roster>,
        reply_message_template: &str,
    ) -> Self {
        Self {
            node_id: node_id.to_string(),
            component,
            store,
            annotations,
            notifications,
            push,
            roster,
            reply_message_template: reply_message_template.to_string(),
            phase: Phase::Uninitialized,
            threads: ThreadIndex::new(),
            compose: None,
            disabled: false,
            inbox: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn threads(&self) -> &ThreadIndex {
        &self.threads
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn inbox(&self) -> &[Notification] {
        &self.inbox
    }

    /// 记录草稿；提交时由编排器通过句柄取走
    pub fn set_compose(&mut self, response: &str, reply_to: Option<&str>) {
        self.compose = Some(PendingPost {
            response: response.to_string(),
            reply_to: reply_to.map(str::to_string),
        });
    }

    pub fn has_compose(&self) -> bool {
        self.compose.is_some()
    }

    /// 班级回复的检索来源：声明了连接组件则看那些组件
    /// （importWork 模式下加上自己），否则只看自己
    fn classmate_refs(&self) -> Vec<ComponentRef> {
        let own = ComponentRef {
            node_id: self.node_id.clone(),
            component_id: self.component.id.clone(),
        };
        if self.component.connected_components.is_empty() {
            return vec![own];
        }
        let mut refs: Vec<ComponentRef> = self
            .component
            .connected_components
            .iter()
            .map(ComponentRef::from)
            .collect();
        if is_import_work_mode(&self.component) {
            refs.push(own);
        }
        refs
    }

    /// 本组件的坐标，或任意一条连接声明的坐标。
    /// 与检索来源无关：声明了连接时本组件自己的帖子仍然要接收。
    fn is_listened_component(&self, state: &ComponentState) -> bool {
        if state.node_id == self.node_id && state.component_id == self.component.id {
            return true;
        }
        self.component
            .connected_components
            .iter()
            .any(|r| r.node_id == state.node_id && r.component_id == state.component_id)
    }

    /// 初始加载，按身份分流
    pub async fn load_initial_responses(&mut self) -> Result<(), SyncError> {
        self.phase = Phase::Loading;

        match self.roster.mode() {
            Mode::Preview | Mode::Authoring => {
                // 离线：不查服务端，从本地历史构建（自己的帖子 + 连接组件的本地历史）
                let mut states = Vec::new();
                for r in self.classmate_refs() {
                    states.extend(
                        self.store
                            .states_by_node_and_component(&r.node_id, &r.component_id)
                            .await,
                    );
                }
                self.set_class_responses(states, &[]);
                self.phase = Phase::Ready;
            }
            Mode::Grading {
                target_workgroup_id,
            }
            | Mode::GradingRevision {
                target_workgroup_id,
            } => {
                self.reload_workgroup_posts(target_workgroup_id).await?;
            }
            Mode::Student => {
                if is_show_work_mode(&self.component) {
                    // 只读镜像其他讨论的内容，本组件不可发帖
                    self.disabled = true;
                }
                if has_connected_components(&self.component) {
                    // 声明了连接：立即发起批量查询，门控不适用
                    self.load_classmate_responses().await?;
                } else if self.component.gate_classmate_responses
                    && !self.has_own_submission().await
                {
                    // 门控且无连接：自己发帖之前看不到同学的回复
                    self.threads = ThreadIndex::new();
                    self.phase = Phase::Ready;
                } else {
                    self.load_classmate_responses().await?;
                }
            }
        }
        Ok(())
    }

    async fn has_own_submission(&self) -> bool {
        let own = self.roster.current_workgroup_id();
        self.store
            .states_by_node_and_component(&self.node_id, &self.component.id)
            .await
            .iter()
            .any(|s| s.workgroup_id == own && s.is_submit)
    }

    async fn load_classmate_responses(&mut self) -> Result<(), SyncError> {
        let refs = self.classmate_refs();
        let response = self
            .store
            .classmate_responses(
                self.roster.current_run_id(),
                self.roster.current_period_id(),
                &refs,
            )
            .await?;
        self.set_class_responses(response.student_work_list, &response.annotations);
        self.phase = Phase::Ready;
        tracing::debug!(
            component_id = %self.component.id,
            posts = self.threads.len(),
            "Classmate responses loaded"
        );
        Ok(())
    }

    /// 用一批状态与伴随批注重建讨论串
    pub fn set_class_responses(&mut self, states: Vec<ComponentState>, annotations: &[Annotation]) {
        let posts = states
            .into_iter()
            .filter(|s| s.is_submit)
            .map(|state| {
                let flag = state
                    .id
                    .as_deref()
                    .and_then(|id| latest_inappropriate_flag(annotations, id))
                    .cloned();
                let usernames = display_name(self.roster.as_ref(), state.workgroup_id);
                ThreadedPost::new(state, usernames, flag)
            })
            .collect();
        self.threads.rebuild(posts);
    }

    /// 增量登记一条班级回复。重复的状态 id 是 no-op。
    pub fn add_class_response(&mut self, state: ComponentState, usernames: Option<String>) {
        if !state.is_submit {
            return;
        }
        if let Some(id) = state.id.as_deref() {
            if self.threads.contains(id) {
                return;
            }
        }
        let usernames = usernames
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| display_name(self.roster.as_ref(), state.workgroup_id));
        self.threads.insert(ThreadedPost::new(state, usernames, None));
    }

    /// 把草稿变成待保存的组件状态。
    /// 预览发新帖与编辑模式下没有服务端回执，由客户端分配 id。
    pub fn make_component_state(&mut self) -> Option<ComponentState> {
        let pending = self.compose.take()?;
        let mut state = ComponentState::new(&self.node_id, &self.component.id, "Discussion");
        state.is_submit = true;
        state.student_data = StudentData {
            response: pending.response,
            component_state_id_replying_to: pending.reply_to,
            ..Default::default()
        };

        let client_assigns_id = match self.roster.mode() {
            Mode::Preview => !state.is_reply(),
            Mode::Authoring => true,
            _ => false,
        };
        if client_assigns_id {
            state = state.with_client_id();
        }
        Some(state)
    }

    /// 保存确认回调：登记自己的新帖、推送给班级、为回复分发通知。
    /// 门控组件的首次提交改为全量加载，顺带拉进同学已有的回复。
    pub async fn on_own_work_saved(&mut self, state: &ComponentState) -> Result<(), SyncError> {
        if !state.is_submit || !self.is_listened_component(state) {
            return Ok(());
        }

        if self.component.gate_classmate_responses && self.threads.is_empty() {
            self.load_classmate_responses().await?;
        } else {
            self.add_class_response(state.clone(), None);
        }
        if is_show_work_mode(&self.component) {
            self.disabled = true;
        }

        if self.roster.mode().is_student() {
            let usernames = self
                .roster
                .usernames_for_workgroup(self.roster.current_workgroup_id());
            self.push
                .send_to_period(PushMessage::StudentData {
                    component_state: state.clone(),
                    usernames,
                })
                .await?;

            if state.is_reply() {
                dispatch_reply_notifications(
                    state,
                    &self.threads,
                    self.roster.as_ref(),
                    self.notifications.as_ref(),
                    self.push.as_ref(),
                    &self.reply_message_template,
                )
                .await?;
            }
        }
        Ok(())
    }

    /// 推送消息到达。同学的新帖增量登记，其余情况丢弃：
    /// 自己的回声、别的组件、Ready 之前、重复 id。
    pub async fn on_push_message(&mut self, message: PushMessage) {
        match message {
            PushMessage::StudentData {
                component_state,
                usernames,
            } => {
                if self.phase != Phase::Ready {
                    return;
                }
                if !self.is_listened_component(&component_state) {
                    return;
                }
                if component_state.workgroup_id == self.roster.current_workgroup_id() {
                    return;
                }
                let usernames = if usernames.is_empty() {
                    None
                } else {
                    Some(usernames.join(", "))
                };
                self.add_class_response(component_state, usernames);
            }
            PushMessage::Notification { notification } => {
                if notification.to_workgroup_id == self.roster.current_workgroup_id() {
                    self.inbox.push(notification);
                }
            }
        }
    }

    /// 审核：写一条 inappropriateFlag 批注并整组重载。
    /// 帖子本体不删除，学生视图按最近批注隐藏。
    pub async fn moderate(
        &mut self,
        state: &ComponentState,
        action: FlagAction,
    ) -> Result<(), SyncError> {
        let mode = self.roster.mode();
        if !mode.is_moderation_capable() {
            return Err(SyncError::Permission(
                "moderation requires a grading mode".to_string(),
            ));
        }
        let student_work_id = state.id.as_deref().ok_or_else(|| {
            SyncError::Permission("cannot moderate an unsaved post".to_string())
        })?;

        let period_id = self
            .roster
            .period_id_for_workgroup(state.workgroup_id)
            .unwrap_or_else(|| self.roster.current_period_id());
        let annotation = Annotation::inappropriate_flag(
            self.roster.current_run_id(),
            period_id,
            &state.node_id,
            &state.component_id,
            self.roster.current_workgroup_id(),
            state.workgroup_id,
            student_work_id,
            action,
        );
        self.annotations.save(annotation).await?;
        tracing::info!(student_work_id, ?action, "Post moderated");

        let target = mode
            .grading_target()
            .unwrap_or(state.workgroup_id);
        self.reload_workgroup_posts(target).await
    }

    /// 评分视图：加载某工作组的帖子连同其所在讨论串，并补上各帖的最新批注
    async fn reload_workgroup_posts(&mut self, workgroup_id: i64) -> Result<(), SyncError> {
        let states = self
            .store
            .posts_by_workgroup(&self.component.id, workgroup_id)
            .await?;

        let mut posts = Vec::with_capacity(states.len());
        for state in states {
            if !state.is_submit {
                continue;
            }
            let flag = match state.id.as_deref() {
                Some(id) => {
                    self.annotations
                        .latest_by_student_work_id_and_kind(id, AnnotationKind::InappropriateFlag)
                        .await
                }
                None => None,
            };
            let usernames = display_name(self.roster.as_ref(), state.workgroup_id);
            posts.push(ThreadedPost::new(state, usernames, flag));
        }
        self.threads.rebuild(posts);
        self.phase = Phase::Ready;
        Ok(())
    }
}

/// 节点编排器一侧的句柄：提交时上交草稿，确认后回灌控制器
pub struct DiscussionHandle {
    inner: Arc<RwLock<DiscussionController>>,
}

impl DiscussionHandle {
    pub fn new(inner: Arc<RwLock<DiscussionController>>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ComponentHandle for DiscussionHandle {
    /// 讨论组件只随提交保存，普通保存/自动保存没有可上报的状态
    async fn report_state(&self, is_submit: bool) -> Option<ComponentState> {
        if !is_submit {
            return None;
        }
        let mut controller = self.inner.write().await;
        if controller.is_disabled() {
            return None;
        }
        controller.make_component_state()
    }

    async fn on_work_saved(&self, state: &ComponentState) {
        let mut controller = self.inner.write().await;
        if let Err(e) = controller.on_own_work_saved(state).await {
            tracing::warn!("Post-save discussion sync failed: {}", e);
        }
    }

    async fn set_disabled(&self, disabled: bool) {
        self.inner.write().await.disabled = disabled;
    }
}

/// 订阅推送通道，把入站消息喂给控制器。
/// 返回的 token 取消时任务结束（随节点退出一起销毁）。
pub fn spawn_push_listener(
    controller: Arc<RwLock<DiscussionController>>,
    push: Arc<dyn PushChannel>,
) -> CancellationToken {
    let token = CancellationToken::new();
    let task_token = token.clone();
    let mut rx = push.subscribe();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = task_token.cancelled() => break,
                received = rx.recv() => match received {
                    Ok(message) => {
                        controller.write().await.on_push_message(message).await;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        // 积压被丢弃：继续消费，缺口由下一次全量加载兜底
                        tracing::warn!(skipped, "Push subscriber lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    });

    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConnectedComponentKind, ConnectedComponentRef};
    use crate::push::InProcessPushChannel;
    use crate::services::{
        InMemoryAnnotationStore, InMemoryNotificationStore, InMemoryRoster,
        InMemoryStudentWorkStore,
    };

    struct Fixture {
        store: Arc<InMemoryStudentWorkStore>,
        annotations: Arc<InMemoryAnnotationStore>,
        notifications: Arc<InMemoryNotificationStore>,
        push: Arc<InProcessPushChannel>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: Arc::new(InMemoryStudentWorkStore::new()),
                annotations: Arc::new(InMemoryAnnotationStore::new()),
                notifications: Arc::new(InMemoryNotificationStore::new()),
                push: Arc::new(InProcessPushChannel::new(16)),
            }
        }

        fn controller(
            &self,
            component: ComponentContent,
            roster: Arc<dyn Roster>,
        ) -> DiscussionController {
            DiscussionController::new(
                "node1",
                component,
                self.store.clone(),
                self.annotations.clone(),
                self.notifications.clone(),
                self.push.clone(),
                roster,
                "{usernames} replied to a discussion you were in",
            )
        }
    }

    fn discussion_component() -> ComponentContent {
        ComponentContent::new("component1", "Discussion")
    }

    fn student_roster(workgroup_id: i64) -> Arc<dyn Roster> {
        let name = format!("wg{}", workgroup_id);
        InMemoryRoster::new(1, 10, workgroup_id, Mode::Student)
            .with_workgroup(workgroup_id, &[name.as_str()], &[workgroup_id])
            .into_arc()
    }

    fn submitted_post(id: &str, workgroup_id: i64, reply_to: Option<&str>) -> ComponentState {
        let mut state = ComponentState::new("node1", "component1", "Discussion");
        state.id = Some(id.to_string());
        state.run_id = 1;
        state.period_id = 10;
        state.workgroup_id = workgroup_id;
        state.is_submit = true;
        state.student_data = StudentData {
            response: format!("post {}", id),
            component_state_id_replying_to: reply_to.map(str::to_string),
            ..Default::default()
        };
        state
    }

    #[tokio::test]
    async fn test_student_initial_load_builds_threads() {
        let fixture = Fixture::new();
        fixture
            .store
            .seed(vec![
                submitted_post("sw_1", 100, None),
                submitted_post("sw_2", 101, Some("sw_1")),
            ])
            .await;

        let mut controller = fixture.controller(discussion_component(), student_roster(102));
        controller.load_initial_responses().await.unwrap();

        assert_eq!(controller.phase(), Phase::Ready);
        assert_eq!(controller.threads().top_level(false).len(), 1);
        assert_eq!(controller.threads().replies_of("sw_1", false).len(), 1);
    }

    #[tokio::test]
    async fn test_preview_builds_from_local_history_only() {
        let fixture = Fixture::new();
        // 预览的本地历史：一条已提交、一条草稿
        let mut draft = submitted_post("sw_2", -1, None);
        draft.is_submit = false;
        fixture
            .store
            .seed(vec![submitted_post("sw_1", -1, None), draft])
            .await;

        let roster = InMemoryRoster::new(1, 10, -1, Mode::Preview).into_arc();
        let mut controller = fixture.controller(discussion_component(), roster);
        controller.load_initial_responses().await.unwrap();

        assert_eq!(controller.phase(), Phase::Ready);
        // 草稿不进班级视图
        assert_eq!(controller.threads().len(), 1);
        assert!(controller.threads().contains("sw_1"));
    }

    #[tokio::test]
    async fn test_gated_component_hides_classmates_until_own_submit() {
        let fixture = Fixture::new();
        fixture.store.seed(vec![submitted_post("sw_1", 100, None)]).await;

        let mut component = discussion_component();
        component.gate_classmate_responses = true;

        let mut controller = fixture.controller(component, student_roster(101));
        controller.load_initial_responses().await.unwrap();
        assert!(controller.threads().is_empty());

        // 自己的首次提交确认后补全班级视图
        let own = submitted_post("sw_2", 101, None);
        fixture.store.seed(vec![own.clone()]).await;
        controller.on_own_work_saved(&own).await.unwrap();

        assert_eq!(controller.threads().len(), 2);
    }

    #[tokio::test]
    async fn test_gated_component_with_connections_queries_immediately() {
        let fixture = Fixture::new();
        // 连接来源组件里已有一条提交
        let mut source_post = submitted_post("sw_1", 100, None);
        source_post.node_id = "node0".to_string();
        source_post.component_id = "componentA".to_string();
        fixture.store.seed(vec![source_post]).await;

        let mut component = discussion_component();
        component.gate_classmate_responses = true;
        component.connected_components.push(ConnectedComponentRef {
            node_id: "node0".to_string(),
            component_id: "componentA".to_string(),
            kind: ConnectedComponentKind::Other,
        });

        // 查看者自己还没发过帖：有连接声明时门控不生效
        let mut controller = fixture.controller(component, student_roster(101));
        controller.load_initial_responses().await.unwrap();

        assert_eq!(controller.phase(), Phase::Ready);
        assert_eq!(controller.threads().len(), 1);
    }

    #[tokio::test]
    async fn test_push_for_own_component_accepted_despite_connections() {
        let fixture = Fixture::new();
        let mut component = discussion_component();
        component.connected_components.push(ConnectedComponentRef {
            node_id: "node0".to_string(),
            component_id: "componentA".to_string(),
            kind: ConnectedComponentKind::Other,
        });

        let mut controller = fixture.controller(component, student_roster(100));
        controller.load_initial_responses().await.unwrap();

        // 同学在本组件发帖：即使声明了连接也要接收
        controller
            .on_push_message(PushMessage::StudentData {
                component_state: submitted_post("sw_9", 101, None),
                usernames: vec![],
            })
            .await;
        assert!(controller.threads().contains("sw_9"));

        // 自己在本组件的提交确认也要合入
        let own = submitted_post("sw_10", 100, None);
        controller.on_own_work_saved(&own).await.unwrap();
        assert!(controller.threads().contains("sw_10"));
    }

    #[tokio::test]
    async fn test_show_work_mode_disables_posting() {
        let fixture = Fixture::new();
        let mut component = discussion_component();
        component.connected_components.push(ConnectedComponentRef {
            node_id: "node0".to_string(),
            component_id: "componentA".to_string(),
            kind: ConnectedComponentKind::ShowWork,
        });

        let mut controller = fixture.controller(component, student_roster(100));
        controller.load_initial_responses().await.unwrap();
        assert!(controller.is_disabled());
    }

    #[tokio::test]
    async fn test_push_guards_drop_echo_duplicate_and_foreign_component() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller(discussion_component(), student_roster(100));
        controller.load_initial_responses().await.unwrap();

        // 自己的回声
        controller
            .on_push_message(PushMessage::StudentData {
                component_state: submitted_post("sw_1", 100, None),
                usernames: vec![],
            })
            .await;
        assert!(controller.threads().is_empty());

        // 别的组件
        let mut foreign = submitted_post("sw_2", 101, None);
        foreign.component_id = "other".to_string();
        controller
            .on_push_message(PushMessage::StudentData {
                component_state: foreign,
                usernames: vec![],
            })
            .await;
        assert!(controller.threads().is_empty());

        // 同学的新帖：登记一次，重复 id 丢弃
        let classmate = submitted_post("sw_3", 101, None);
        controller
            .on_push_message(PushMessage::StudentData {
                component_state: classmate.clone(),
                usernames: vec!["Ada".to_string()],
            })
            .await;
        controller
            .on_push_message(PushMessage::StudentData {
                component_state: classmate,
                usernames: vec!["Ada".to_string()],
            })
            .await;
        assert_eq!(controller.threads().len(), 1);
        assert_eq!(
            controller.threads().get("sw_3").unwrap().usernames,
            "Ada"
        );
    }

    #[tokio::test]
    async fn test_push_before_ready_is_dropped() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller(discussion_component(), student_roster(100));

        controller
            .on_push_message(PushMessage::StudentData {
                component_state: submitted_post("sw_1", 101, None),
                usernames: vec![],
            })
            .await;
        assert!(controller.threads().is_empty());
    }

    #[tokio::test]
    async fn test_moderation_requires_grading_mode() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller(discussion_component(), student_roster(100));
        let post = submitted_post("sw_1", 101, None);

        let result = controller.moderate(&post, FlagAction::Delete).await;
        assert!(matches!(result, Err(SyncError::Permission(_))));
        assert_eq!(fixture.annotations.count().await, 0);
    }

    #[tokio::test]
    async fn test_moderation_flags_and_reloads_latest_wins() {
        let fixture = Fixture::new();
        fixture
            .store
            .seed(vec![
                submitted_post("sw_1", 100, None),
                submitted_post("sw_2", 101, Some("sw_1")),
            ])
            .await;

        let roster = InMemoryRoster::new(
            1,
            10,
            900,
            Mode::Grading {
                target_workgroup_id: 100,
            },
        )
        .into_arc();
        let mut controller = fixture.controller(discussion_component(), roster);
        controller.load_initial_responses().await.unwrap();
        assert_eq!(controller.threads().len(), 2);

        let post = submitted_post("sw_1", 100, None);
        controller.moderate(&post, FlagAction::Delete).await.unwrap();

        // 帖子未被移除，只是对学生隐藏
        assert_eq!(controller.threads().len(), 2);
        assert!(controller.threads().get("sw_1").unwrap().is_hidden());
        assert_eq!(controller.threads().top_level(false).len(), 0);

        controller
            .moderate(&post, FlagAction::UndoDelete)
            .await
            .unwrap();
        assert!(!controller.threads().get("sw_1").unwrap().is_hidden());
        assert_eq!(fixture.annotations.count().await, 2);
    }

    #[tokio::test]
    async fn test_make_component_state_assigns_client_id_in_preview_only_for_new_posts() {
        let fixture = Fixture::new();
        let roster = InMemoryRoster::new(1, 10, -1, Mode::Preview).into_arc();
        let mut controller = fixture.controller(discussion_component(), roster);

        controller.set_compose("a new idea", None);
        let state = controller.make_component_state().unwrap();
        assert!(state.id.is_some());
        assert!(state.is_submit);

        controller.set_compose("a reply", Some("cs_123"));
        let state = controller.make_component_state().unwrap();
        assert!(state.id.is_none());

        // 草稿被消费后没有可上报的状态
        assert!(controller.make_component_state().is_none());
    }

    #[tokio::test]
    async fn test_own_reply_saved_pushes_and_notifies() {
        let fixture = Fixture::new();
        fixture.store.seed(vec![submitted_post("sw_1", 100, None)]).await;

        let mut controller = fixture.controller(discussion_component(), student_roster(101));
        controller.load_initial_responses().await.unwrap();

        let mut rx = fixture.push.subscribe();
        let reply = submitted_post("sw_9", 101, Some("sw_1"));
        controller.on_own_work_saved(&reply).await.unwrap();

        assert!(controller.threads().contains("sw_9"));
        assert!(matches!(
            rx.recv().await.unwrap(),
            PushMessage::StudentData { .. }
        ));
        assert!(matches!(
            rx.recv().await.unwrap(),
            PushMessage::Notification { notification } if notification.to_workgroup_id == 100
        ));
        assert_eq!(fixture.notifications.count().await, 1);
    }
}
