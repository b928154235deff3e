//! 学生作业持久化抽象层
//!
//! 对应服务端的学生数据接口：批量保存、同学响应查询、按工作组查询、
//! 本地历史读取与审计事件。内存实现同时扮演本地历史缓存与模拟后端。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::SyncError;
use crate::model::{Annotation, ComponentRef, ComponentState, StudentWorkEvent};

use super::annotation::{AnnotationStore, InMemoryAnnotationStore};

/// 一次保存批次：组件状态 + 节点状态 + 组件事件 + 组件批注
#[derive(Debug, Clone, Default)]
pub struct SaveBatch {
    pub component_states: Vec<ComponentState>,
    pub node_states: Vec<serde_json::Value>,
    pub component_events: Vec<serde_json::Value>,
    pub component_annotations: Vec<Annotation>,
}

impl SaveBatch {
    pub fn is_empty(&self) -> bool {
        self.component_states.is_empty()
            && self.node_states.is_empty()
            && self.component_events.is_empty()
            && self.component_annotations.is_empty()
    }
}

/// 保存确认：服务端回写的权威作业列表（含分配的 id 与保存时间）
#[derive(Debug, Clone, Default)]
pub struct SaveResponse {
    pub student_work_list: Vec<ComponentState>,
}

/// 同学响应查询结果
#[derive(Debug, Clone, Default)]
pub struct ClassmateResponses {
    pub student_work_list: Vec<ComponentState>,
    pub annotations: Vec<Annotation>,
}

/// 学生作业存储接口
#[async_trait]
pub trait StudentWorkStore: Send + Sync {
    /// 保存一个批次，返回服务端确认
    async fn save(&self, batch: SaveBatch) -> Result<SaveResponse, SyncError>;

    /// 按组件坐标集合查询全班已提交的响应（含审核批注）
    async fn classmate_responses(
        &self,
        run_id: i64,
        period_id: i64,
        refs: &[ComponentRef],
    ) -> Result<ClassmateResponses, SyncError>;

    /// 查询与某个工作组相关的讨论帖（该组的帖子及其所在线程）
    async fn posts_by_workgroup(
        &self,
        component_id: &str,
        workgroup_id: i64,
    ) -> Result<Vec<ComponentState>, SyncError>;

    /// 本地历史：某组件的全部状态（时间顺序）
    async fn states_by_node_and_component(
        &self,
        node_id: &str,
        component_id: &str,
    ) -> Vec<ComponentState>;

    /// 本地历史：某节点的全部状态
    async fn states_by_node(&self, node_id: &str) -> Vec<ComponentState>;

    /// 本地历史：节点（或指定组件）最新一条状态
    async fn latest_state(&self, node_id: &str, component_id: Option<&str>)
        -> Option<ComponentState>;

    /// 记录审计事件（nodeEntered / nodeExited）
    async fn save_event(&self, event: StudentWorkEvent) -> Result<(), SyncError>;
}

/// 内存版学生作业存储
#[derive(Default)]
pub struct InMemoryStudentWorkStore {
    states: RwLock<Vec<ComponentState>>,
    events: RwLock<Vec<StudentWorkEvent>>,
    next_id: AtomicU64,
    /// 同学响应查询要连带返回批注，模拟后端从这里取
    annotation_source: Option<Arc<InMemoryAnnotationStore>>,
}

impl InMemoryStudentWorkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 绑定批注来源，使同学响应查询连带返回审核批注
    pub fn with_annotation_source(mut self, annotations: Arc<InMemoryAnnotationStore>) -> Self {
        self.annotation_source = Some(annotations);
        self
    }

    /// 预置历史数据（测试/演示用）
    pub async fn seed(&self, states: Vec<ComponentState>) {
        let mut guard = self.states.write().await;
        for mut state in states {
            if state.id.is_none() {
                state.id = Some(self.assign_id());
            }
            guard.push(state);
        }
    }

    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn events(&self) -> Vec<StudentWorkEvent> {
        self.events.read().await.clone()
    }

    fn assign_id(&self) -> String {
        format!("sw_{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

#[async_trait]
impl StudentWorkStore for InMemoryStudentWorkStore {
    async fn save(&self, batch: SaveBatch) -> Result<SaveResponse, SyncError> {
        let mut saved = Vec::with_capacity(batch.component_states.len());
        {
            let mut guard = self.states.write().await;
            for mut state in batch.component_states {
                if state.id.is_none() {
                    state.id = Some(self.assign_id());
                }
                guard.push(state.clone());
                saved.push(state);
            }
        }
        if let Some(annotations) = &self.annotation_source {
            for annotation in batch.component_annotations {
                annotations.save(annotation).await?;
            }
        }
        Ok(SaveResponse {
            student_work_list: saved,
        })
    }

    async fn classmate_responses(
        &self,
        run_id: i64,
        period_id: i64,
        refs: &[ComponentRef],
    ) -> Result<ClassmateResponses, SyncError> {
        let guard = self.states.read().await;
        let student_work_list = guard
            .iter()
            .filter(|s| {
                s.run_id == run_id
                    && s.period_id == period_id
                    && s.is_submit
                    && refs
                        .iter()
                        .any(|r| r.node_id == s.node_id && r.component_id == s.component_id)
            })
            .cloned()
            .collect();
        let annotations = match &self.annotation_source {
            Some(source) => source.all().await,
            None => Vec::new(),
        };
        Ok(ClassmateResponses {
            student_work_list,
            annotations,
        })
    }

    async fn posts_by_workgroup(
        &self,
        component_id: &str,
        workgroup_id: i64,
    ) -> Result<Vec<ComponentState>, SyncError> {
        let guard = self.states.read().await;

        // 该工作组自己的帖子
        let own: Vec<&ComponentState> = guard
            .iter()
            .filter(|s| s.component_id == component_id && s.workgroup_id == workgroup_id)
            .collect();

        // 加上它们所在线程的其余帖子（顶层帖与回复）
        let own_ids: Vec<&str> = own.iter().filter_map(|s| s.id.as_deref()).collect();
        let parents: Vec<&str> = own.iter().filter_map(|s| s.reply_target()).collect();

        let posts = guard
            .iter()
            .filter(|s| {
                s.component_id == component_id
                    && (s.workgroup_id == workgroup_id
                        || s.id.as_deref().map(|id| parents.contains(&id)).unwrap_or(false)
                        || s.reply_target().map(|p| own_ids.contains(&p)).unwrap_or(false))
            })
            .cloned()
            .collect();
        Ok(posts)
    }

    async fn states_by_node_and_component(
        &self,
        node_id: &str,
        component_id: &str,
    ) -> Vec<ComponentState> {
        self.states
            .read()
            .await
            .iter()
            .filter(|s| s.node_id == node_id && s.component_id == component_id)
            .cloned()
            .collect()
    }

    async fn states_by_node(&self, node_id: &str) -> Vec<ComponentState> {
        self.states
            .read()
            .await
            .iter()
            .filter(|s| s.node_id == node_id)
            .cloned()
            .collect()
    }

    async fn latest_state(
        &self,
        node_id: &str,
        component_id: Option<&str>,
    ) -> Option<ComponentState> {
        self.states
            .read()
            .await
            .iter()
            .filter(|s| {
                s.node_id == node_id
                    && component_id.map(|c| c == s.component_id).unwrap_or(true)
            })
            .last()
            .cloned()
    }

    async fn save_event(&self, event: StudentWorkEvent) -> Result<(), SyncError> {
        self.events.write().await.push(event);
        Ok(())
    }
}
