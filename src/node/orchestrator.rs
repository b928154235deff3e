//! 节点编排器：保存/提交主控循环
//!
//! 负责：按触发范围聚合各组件的状态上报、打 isAutoSave/isSubmit 标记、
//! 批量发给持久化协作方；确认后更新保存状态显示、求值过渡逻辑、
//! 回调各组件；本地变更时向连接组件同步扇出。
//! 自动保存 tick 与其余事件在同一循环中串行消费，不会出现重叠批次。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::SyncError;
use crate::model::{ComponentState, NodeContent, StudentWorkEvent, TransitionTrigger};
use crate::services::{Roster, SaveBatch, SaveResponse, StudentWorkStore};

use super::autosave::AutosaveScheduler;
use super::component::{ComponentHandle, TransitionEvaluator};
use super::dirty::DirtySet;
use super::events::{NodeEvent, SaveTrigger};

/// 保存/提交按钮旁的状态显示
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveMessage {
    pub text: String,
    pub time: Option<i64>,
}

impl SaveMessage {
    fn set(&mut self, text: &str, time: Option<i64>) {
        self.text = text.to_string();
        self.time = time;
    }

    fn clear(&mut self) {
        self.text.clear();
        self.time = None;
    }
}

/// 节点编排器
pub struct NodeOrchestrator {
    content: NodeContent,
    /// 组件 id -> 能力句柄（对应子控制器注册表）
    components: HashMap<String, Arc<dyn ComponentHandle>>,
    dirty: DirtySet,
    save_message: SaveMessage,
    disabled: bool,
    exited: bool,
    auto_save_interval: Duration,
    store: Arc<dyn StudentWorkStore>,
    roster: Arc<dyn Roster>,
    transitions: Option<Arc<dyn TransitionEvaluator>>,
    scheduler: Option<AutosaveScheduler>,
    events_tx: mpsc::UnboundedSender<NodeEvent>,
    events_rx: Option<mpsc::UnboundedReceiver<NodeEvent>>,
}

impl NodeOrchestrator {
    pub fn new(
        content: NodeContent,
        store: Arc<dyn StudentWorkStore>,
        roster: Arc<dyn Roster>,
        auto_save_interval: Duration,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            content,
            components: HashMap::new(),
            dirty: DirtySet::new(),
            save_message: SaveMessage::default(),
            disabled: false,
            exited: false,
            auto_save_interval,
            store,
            roster,
            transitions: None,
            scheduler: None,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// 注入过渡逻辑求值器（节点内容声明了 transitionLogic 时使用）
    pub fn with_transitions(mut self, transitions: Arc<dyn TransitionEvaluator>) -> Self {
        self.transitions = Some(transitions);
        self
    }

    /// 组件注册自己的能力句柄
    pub fn register_component(&mut self, component_id: &str, handle: Arc<dyn ComponentHandle>) {
        if !self.content.contains_component(component_id) {
            tracing::warn!(component_id, "Registering handle for undeclared component");
        }
        self.components.insert(component_id.to_string(), handle);
    }

    /// 事件发送端（组件与 UI 持有）
    pub fn events(&self) -> mpsc::UnboundedSender<NodeEvent> {
        self.events_tx.clone()
    }

    pub fn save_message(&self) -> &SaveMessage {
        &self.save_message
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_dirty(&self, component_id: &str) -> bool {
        self.dirty.is_dirty(component_id)
    }

    /// 自上次提交以来是否有变化；不在集合中即视为无变化
    pub fn is_submit_dirty(&self, component_id: &str) -> bool {
        self.dirty.is_submit_dirty(component_id)
    }

    /// 进入节点：计算锁定、恢复状态显示、启动自动保存、记录审计事件
    pub async fn enter(&mut self) -> Result<(), SyncError> {
        self.calculate_disabled().await;

        // 用最近一条历史初始化状态显示，不发起新的保存
        if let Some(latest) = self.store.latest_state(&self.content.id, None).await {
            if latest.is_submit {
                self.save_message
                    .set("Last submitted", Some(latest.client_save_time));
            } else {
                self.save_message
                    .set("Last saved", Some(latest.client_save_time));
            }
        }

        self.scheduler = Some(AutosaveScheduler::start(
            self.auto_save_interval,
            self.events_tx.clone(),
        ));

        self.store
            .save_event(StudentWorkEvent::navigation(&self.content.id, "nodeEntered"))
            .await?;

        self.evaluate_transitions(TransitionTrigger::EnterNode).await;

        tracing::info!(node_id = %self.content.id, "Node entered");
        Ok(())
    }

    /// 主控循环：串行消费节点事件，ExitRequested 后结束
    pub async fn run(mut self) {
        let mut rx = match self.events_rx.take() {
            Some(rx) => rx,
            None => return,
        };

        while let Some(event) = rx.recv().await {
            if !self.handle_event(event).await {
                break;
            }
        }
    }

    /// 处理单个事件；返回 false 表示循环应当结束
    pub async fn handle_event(&mut self, event: NodeEvent) -> bool {
        match event {
            NodeEvent::SaveRequested { trigger } => {
                if let Err(e) = self.save_work(trigger, false, false).await {
                    tracing::warn!("Save failed: {}", e);
                }
            }
            NodeEvent::SubmitRequested { trigger } => {
                if let Err(e) = self.save_work(trigger, false, true).await {
                    tracing::warn!("Submit failed: {}", e);
                }
            }
            NodeEvent::StudentDataChanged {
                component_id,
                component_state,
            } => {
                self.notify_connected_components(&component_id, &component_state)
                    .await;
            }
            NodeEvent::DirtyChanged {
                component_id,
                is_dirty,
            } => {
                if is_dirty {
                    self.dirty.mark_dirty(&component_id);
                } else {
                    self.dirty.clear_dirty(&component_id);
                }
            }
            NodeEvent::SubmitDirtyChanged {
                component_id,
                is_dirty,
            } => {
                if is_dirty {
                    self.dirty.mark_submit_dirty(&component_id);
                } else {
                    self.dirty.clear_submit_dirty(&component_id);
                }
            }
            NodeEvent::AutosaveTick => {
                if self.dirty.any_dirty() {
                    if let Err(e) = self.save_work(SaveTrigger::WholeNode, true, false).await {
                        tracing::warn!("Autosave failed: {}", e);
                    }
                }
            }
            NodeEvent::ExitRequested => {
                if let Err(e) = self.exit().await {
                    tracing::warn!("Exit save failed: {}", e);
                }
                return false;
            }
        }
        true
    }

    /// 聚合组件状态并保存
    ///
    /// 空批次不发送（返回 Ok(None)）。失败不重试且不动脏集合，
    /// 下一次自动保存 tick 或手动保存会带着同样的数据再试。
    pub async fn save_work(
        &mut self,
        trigger: SaveTrigger,
        is_auto_save: bool,
        is_submit: bool,
    ) -> Result<Option<SaveResponse>, SyncError> {
        let component_states = self
            .collect_component_states(&trigger, is_auto_save, is_submit)
            .await;
        let component_annotations = self.collect_unsaved_annotations().await;

        let batch = SaveBatch {
            component_states,
            node_states: Vec::new(),
            component_events: Vec::new(),
            component_annotations,
        };
        if batch.is_empty() {
            return Ok(None);
        }

        // 在途快照：确认后只清这一批涉及的 id
        let saved_ids: Vec<String> = batch
            .component_states
            .iter()
            .map(|s| s.component_id.clone())
            .collect();

        let response = self.store.save(batch).await?;

        for component_id in &saved_ids {
            self.dirty.clear_dirty(component_id);
            if is_submit {
                self.dirty.clear_submit_dirty(component_id);
            }
        }

        self.evaluate_transitions(TransitionTrigger::StudentDataChanged)
            .await;

        // 状态显示：整节点且有新历史时按优先级设置，否则清空
        let whole_node = trigger == SaveTrigger::WholeNode;
        match response.student_work_list.last() {
            Some(latest) if whole_node => {
                let time = Some(latest.client_save_time);
                if is_auto_save {
                    self.save_message.set("Auto-Saved", time);
                } else if is_submit {
                    self.save_message.set("Submitted", time);
                } else {
                    self.save_message.set("Saved", time);
                }
            }
            _ => self.save_message.clear(),
        }

        // 按组件回调保存确认
        for state in &response.student_work_list {
            if let Some(handle) = self.components.get(&state.component_id) {
                handle.on_work_saved(state).await;
            }
        }

        Ok(Some(response))
    }

    async fn collect_component_states(
        &self,
        trigger: &SaveTrigger,
        is_auto_save: bool,
        is_submit: bool,
    ) -> Vec<ComponentState> {
        let run_id = self.roster.current_run_id();
        let period_id = self.roster.current_period_id();
        let workgroup_id = self.roster.current_workgroup_id();

        let mut states = Vec::new();
        for component in &self.content.components {
            match trigger {
                SaveTrigger::SingleComponent(id) if id != &component.id => continue,
                _ => {}
            }

            // 缺失句柄是合法的 no-op（组件尚未挂载）
            let handle = match self.components.get(&component.id) {
                Some(h) => h,
                None => continue,
            };

            let mut state = match handle.report_state(is_submit).await {
                Some(s) => s,
                None => continue,
            };

            state.run_id = run_id;
            state.period_id = period_id;
            state.workgroup_id = workgroup_id;
            state.node_id = self.content.id.clone();
            state.component_id = component.id.clone();
            state.component_type = component.component_type.clone();

            match trigger {
                SaveTrigger::WholeNode => {
                    // 节点触发：所有组件统一打标
                    state.is_auto_save = is_auto_save;
                    if is_submit {
                        state.is_submit = true;
                    }
                }
                SaveTrigger::SingleComponent(_) => {
                    // 组件触发：只有该组件打标，且一定不是自动保存
                    state.is_auto_save = false;
                    if is_submit {
                        state.is_submit = true;
                    }
                }
            }
            states.push(state);
        }
        states
    }

    async fn collect_unsaved_annotations(&self) -> Vec<crate::model::Annotation> {
        let mut annotations = Vec::new();
        for component in &self.content.components {
            if let Some(handle) = self.components.get(&component.id) {
                if let Some(annotation) = handle.take_unsaved_annotation().await {
                    annotations.push(annotation);
                }
            }
        }
        annotations
    }

    /// 向监听 changed_component_id 的组件同步扇出新状态
    pub async fn notify_connected_components(
        &self,
        changed_component_id: &str,
        component_state: &ComponentState,
    ) {
        let source_content = match self.content.component(changed_component_id) {
            Some(c) => c.clone(),
            None => return,
        };

        for component in &self.content.components {
            for params in &component.connected_components {
                if params.component_id != changed_component_id {
                    continue;
                }
                let Some(handle) = self.components.get(&component.id) else {
                    continue;
                };
                handle
                    .on_connected_component_changed(&source_content, params, component_state)
                    .await;
            }
        }
    }

    /// lockAfterSubmit：进入节点时已有提交历史则整节点禁用，会话内不再解锁
    async fn calculate_disabled(&mut self) {
        if !self.content.lock_after_submit {
            return;
        }
        let states = self.store.states_by_node(&self.content.id).await;
        if states.iter().any(|s| s.is_submit) {
            self.disabled = true;
            for handle in self.components.values() {
                handle.set_disabled(true).await;
            }
            tracing::info!(node_id = %self.content.id, "Node locked after submit");
        }
    }

    /// 退出节点：恰好一次停表、一次无条件收尾保存、一条审计事件
    pub async fn exit(&mut self) -> Result<(), SyncError> {
        if self.exited {
            return Ok(());
        }
        self.exited = true;

        if let Some(scheduler) = &self.scheduler {
            scheduler.stop();
        }

        // 收尾保存不看脏集合，无条件发起
        let result = self.save_work(SaveTrigger::WholeNode, true, false).await;

        self.store
            .save_event(StudentWorkEvent::navigation(&self.content.id, "nodeExited"))
            .await?;

        self.evaluate_transitions(TransitionTrigger::ExitNode).await;

        tracing::info!(node_id = %self.content.id, "Node exited");
        result.map(|_| ())
    }

    async fn evaluate_transitions(&self, trigger: TransitionTrigger) {
        if !self.content.transition_declared_on(trigger) {
            return;
        }
        if let Some(transitions) = &self.transitions {
            transitions.evaluate().await;
        }
    }
}
